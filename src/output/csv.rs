// src/output/csv.rs

//! Minimal CSV writing (quotes + embedded newlines).

use crate::models::CourseRecord;

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Append one CSV row.
pub fn push_row<S: AsRef<str>>(out: &mut String, row: &[S]) {
    let mut first = true;
    for cell in row {
        if !first {
            out.push(',');
        } else {
            first = false;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Render records as a CSV table with the fixed column header.
pub fn render_records<'a>(records: impl IntoIterator<Item = &'a CourseRecord>) -> String {
    let mut out = String::new();
    push_row(&mut out, &CourseRecord::COLUMNS);
    for record in records {
        push_row(&mut out, &record.to_row());
    }
    out
}
