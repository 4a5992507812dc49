// src/services/detail.rs

//! Detail page extraction.
//!
//! Detail pages vary in which sections they include. Every field is
//! extracted inside its own scope and maps structural absence to an empty
//! value, so one missing section never blanks out the others.
//!
//! Labeled values sit in sibling blocks: a label span inside one `div`,
//! the bold value text in the following `div`s. Section tables are found
//! by a marker string in their header row.

use scraper::{ElementRef, Selector};

use crate::error::Result;
use crate::models::CourseDetail;
use crate::render::Page;
use crate::services::{element_text, parse_selector};

const DEPARTMENT_LABEL: &str = "Nazwa jednostki prowadzącej zajęcia:";
const COORDINATOR_LABEL: &str = "Imię i nazwisko koordynatora";
const ASSISTANT_LABEL: &str = "semestr";
const NO_ASSISTANTS: &str = "nie ma asystentów";

const SYLLABUS_MARKER: &str = "Treści kształcenia";
const WORKLOAD_MARKER: &str = "Praca przed zajęciami";
const GRADING_MARKER: &str = "Sposób wystawiania oceny podsumowującej";

/// Extracts the six enrichment fields from a course detail page.
pub struct DetailExtractor {
    span: Selector,
    bold: Selector,
    table: Selector,
    header_cell: Selector,
    body_row: Selector,
    cell: Selector,
}

impl DetailExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            span: parse_selector("span")?,
            bold: parse_selector("b")?,
            table: parse_selector("table")?,
            header_cell: parse_selector("thead th")?,
            body_row: parse_selector("tbody tr")?,
            cell: parse_selector("td")?,
        })
    }

    /// Extract all fields, each degrading independently on absence.
    pub fn extract(&self, page: &Page) -> CourseDetail {
        CourseDetail {
            department: self.department(page).unwrap_or_default(),
            coordinators: self.coordinators(page).unwrap_or_default(),
            assistants: self.assistants(page),
            syllabus: self.syllabus(page).unwrap_or_default(),
            workload: self.workload(page).unwrap_or_default(),
            grading: self.grading(page).unwrap_or_default(),
        }
    }

    fn department(&self, page: &Page) -> Option<String> {
        let values = self.labeled_values(page, |text| text == DEPARTMENT_LABEL)?;
        values.into_iter().next()
    }

    fn coordinators(&self, page: &Page) -> Option<String> {
        let values = self.labeled_values(page, |text| text.starts_with(COORDINATOR_LABEL))?;
        if values.is_empty() {
            return None;
        }
        Some(values.join(", "))
    }

    /// Assistants are listed per semester, one labeled section per term;
    /// every section contributes, and only the text before the first
    /// comma of each entry names the person. An empty list renders as a
    /// literal placeholder rather than an empty string.
    fn assistants(&self, page: &Page) -> String {
        let spans: Vec<ElementRef> = self
            .label_spans(page, |text| {
                text.to_lowercase().starts_with(ASSISTANT_LABEL)
            })
            .collect();

        let names: Vec<String> = spans
            .into_iter()
            .flat_map(|span| {
                self.value_blocks(span)
                    .filter(|block| {
                        !block
                            .value()
                            .attr("style")
                            .is_some_and(|style| style.contains("clear:both"))
                    })
                    .flat_map(|block| {
                        block
                            .select(&self.bold)
                            .map(|b| element_text(&b))
                            .collect::<Vec<_>>()
                    })
                    .map(|text| match text.split_once(',') {
                        Some((name, _)) => name.trim().to_string(),
                        None => text,
                    })
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect();

        if names.is_empty() {
            NO_ASSISTANTS.to_string()
        } else {
            names.join(", ")
        }
    }

    fn syllabus(&self, page: &Page) -> Option<String> {
        self.section_rows(page, SYLLABUS_MARKER, |cells| {
            (cells.len() >= 4).then(|| format!("{} - {}", cells[2], cells[3]))
        })
    }

    fn workload(&self, page: &Page) -> Option<String> {
        self.section_rows(page, WORKLOAD_MARKER, |cells| {
            (cells.len() >= 4).then(|| {
                let effort = cells[1..4]
                    .iter()
                    .filter(|part| !part.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{} - {}", cells[0], effort)
            })
        })
    }

    fn grading(&self, page: &Page) -> Option<String> {
        self.section_rows(page, GRADING_MARKER, |cells| {
            (cells.len() >= 2).then(|| format!("{} - {}", cells[0], cells[1]))
        })
    }

    /// All label spans matching the predicate, in document order.
    fn label_spans<'a>(
        &'a self,
        page: &'a Page,
        matches: impl Fn(&str) -> bool + 'a,
    ) -> impl Iterator<Item = ElementRef<'a>> {
        page.select(&self.span)
            .filter(move |span| matches(&element_text(span)))
    }

    /// Bold texts from the value blocks following every matching label.
    ///
    /// `None` when no label matches at all, so callers can tell a missing
    /// section from an empty one.
    fn labeled_values(
        &self,
        page: &Page,
        matches: impl Fn(&str) -> bool,
    ) -> Option<Vec<String>> {
        let spans: Vec<ElementRef> = self.label_spans(page, matches).collect();
        if spans.is_empty() {
            return None;
        }

        let values: Vec<String> = spans
            .into_iter()
            .flat_map(|span| self.value_blocks(span))
            .flat_map(|block| {
                block
                    .select(&self.bold)
                    .map(|b| element_text(&b))
                    .collect::<Vec<_>>()
            })
            .filter(|text| !text.is_empty())
            .collect();
        Some(values)
    }

    /// Formatted lines from the body rows of a marker-headed table.
    fn section_rows(
        &self,
        page: &Page,
        marker: &str,
        line: impl Fn(&[String]) -> Option<String>,
    ) -> Option<String> {
        let table = page.select(&self.table).find(|table| {
            table
                .select(&self.header_cell)
                .any(|th| element_text(&th).contains(marker))
        })?;

        let lines: Vec<String> = table
            .select(&self.body_row)
            .filter_map(|row| {
                let cells: Vec<String> = row
                    .select(&self.cell)
                    .map(|cell| element_text(&cell))
                    .collect();
                line(&cells)
            })
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Sibling `div` blocks following a label span's enclosing block, up
    /// to the next labeled block.
    fn value_blocks<'a>(&'a self, span: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
        span.parent()
            .and_then(ElementRef::wrap)
            .into_iter()
            .flat_map(|parent| {
                parent
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "div")
            })
            .take_while(|block| block.select(&self.span).next().is_none())
    }
}
