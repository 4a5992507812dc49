//! Utility functions and helpers.

pub mod url;

/// Sanitize a display name into a safe file stem.
///
/// Keeps alphanumeric characters (any script), maps runs of everything
/// else to single underscores.
pub fn sanitize_file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut last_was_sep = true;
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            stem.extend(ch.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            stem.push('_');
            last_was_sep = true;
        }
    }
    while stem.ends_with('_') {
        stem.pop();
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain() {
        assert_eq!(sanitize_file_stem("Inżynieria oprogramowania"), "inżynieria_oprogramowania");
    }

    #[test]
    fn test_sanitize_punctuation_runs() {
        assert_eq!(sanitize_file_stem("  Sieci / systemy  (2023)  "), "sieci_systemy_2023");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_file_stem("--"), "");
    }
}
