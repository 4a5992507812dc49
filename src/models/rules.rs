// src/models/rules.rs

//! Semester rule tables.
//!
//! Some courses are known to repeat across consecutive semesters; the
//! catalog lists them once per term with a different starting semester.
//! The rule file records a semester-range offset per course name prefix
//! and the set of such "special" course names. Both are matched
//! case-insensitively and loaded once per run.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Rule tables for semester-range normalization.
///
/// Range prefixes keep the order they have in the rule file; a lookup
/// returns the first matching prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Lower-cased names of courses that recur across terms.
    #[serde(
        default,
        rename = "special_courses",
        deserialize_with = "lowered_set"
    )]
    special: BTreeSet<String>,

    /// Lower-cased name prefix → semester-range offset, in file order.
    #[serde(default, rename = "semester_ranges", with = "ordered_map")]
    ranges: Vec<(String, u32)>,
}

impl RuleSet {
    /// Build a rule set from explicit tables (keys are lower-cased here).
    pub fn from_parts(
        ranges: impl IntoIterator<Item = (String, u32)>,
        special: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            ranges: ranges
                .into_iter()
                .map(|(prefix, offset)| (prefix.to_lowercase(), offset))
                .collect(),
            special: special.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Load rules from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load rules, falling back to empty tables when the file is absent
    /// or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Rules load failed from {:?}: {}. Starting with empty rule tables.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Write the rules back to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Offset of the first range prefix the given name starts with.
    pub fn range_offset(&self, name: &str) -> Option<u32> {
        let lower = name.to_lowercase();
        self.ranges
            .iter()
            .find(|(prefix, _)| lower.starts_with(prefix.as_str()))
            .map(|(_, offset)| *offset)
    }

    /// Exact-name membership in the special-course set.
    pub fn is_special(&self, name: &str) -> bool {
        self.special.contains(&name.to_lowercase())
    }

    /// Rewrite a raw semester value into a range for matching courses.
    ///
    /// When a range rule matches the canonical name and the raw value
    /// parses as an integer `s`, the result is `"s - (s+offset)"`. A
    /// non-integer raw value is passed through unchanged even when a rule
    /// matches; so is any value when no rule matches.
    pub fn normalize_semester(&self, canonical_name: &str, raw: &str) -> String {
        let Some(offset) = self.range_offset(canonical_name) else {
            return raw.to_string();
        };
        match raw.trim().parse::<u32>() {
            Ok(start) => format!("{} - {}", start, start + offset),
            Err(_) => raw.to_string(),
        }
    }

    /// Record or update the range rule for a recurring course.
    pub fn set_range(&mut self, name: &str, offset: u32) {
        let key = name.to_lowercase();
        match self.ranges.iter_mut().find(|(prefix, _)| *prefix == key) {
            Some(entry) => entry.1 = offset,
            None => self.ranges.push((key.clone(), offset)),
        }
        self.special.insert(key);
    }

    /// Merge occurrence counts from a rule-discovery pass.
    ///
    /// A name seen `n > 1` times spans `n` consecutive semesters, so its
    /// offset is `n - 1`.
    pub fn record_occurrences<'a>(
        &mut self,
        counts: impl IntoIterator<Item = (&'a str, usize)>,
    ) -> usize {
        let mut updated = 0;
        for (name, count) in counts {
            if count > 1 {
                self.set_range(name, (count - 1) as u32);
                updated += 1;
            }
        }
        updated
    }

    /// Number of range rules.
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Number of special course names.
    pub fn special_count(&self) -> usize {
        self.special.len()
    }
}

fn lowered_set<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    Ok(names.into_iter().map(|name| name.to_lowercase()).collect())
}

/// Serde adapter keeping a TOML mapping in document order.
mod ordered_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(
        ranges: &[(String, u32)],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(ranges.len()))?;
        for (prefix, offset) in ranges {
            map.serialize_entry(prefix, offset)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Vec<(String, u32)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor;

        impl<'de> Visitor<'de> for OrderedMapVisitor {
            type Value = Vec<(String, u32)>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of name prefix to semester offset")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut ranges = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((prefix, offset)) = access.next_entry::<String, u32>()? {
                    ranges.push((prefix.to_lowercase(), offset));
                }
                Ok(ranges)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> RuleSet {
        RuleSet::from_parts(
            [
                ("Algorytmy".to_string(), 2),
                ("Język angielski".to_string(), 3),
            ],
            ["algorytmy".to_string(), "język angielski".to_string()],
        )
    }

    #[test]
    fn test_range_offset_prefix_and_case() {
        let rules = sample_rules();
        assert_eq!(rules.range_offset("ALGORYTMY i struktury danych"), Some(2));
        assert_eq!(rules.range_offset("Fizyka"), None);
    }

    #[test]
    fn test_range_offset_first_match_wins() {
        let rules = RuleSet::from_parts(
            [("seminarium".to_string(), 1), ("semin".to_string(), 5)],
            [],
        );
        assert_eq!(rules.range_offset("Seminarium dyplomowe"), Some(1));
    }

    #[test]
    fn test_is_special_exact_name() {
        let rules = sample_rules();
        assert!(rules.is_special("Algorytmy"));
        assert!(!rules.is_special("Algorytmy i struktury danych"));
    }

    #[test]
    fn test_normalize_semester_rewrites_range() {
        let rules = sample_rules();
        assert_eq!(rules.normalize_semester("Algorytmy", "3"), "3 - 5");
    }

    #[test]
    fn test_normalize_semester_no_match_passthrough() {
        let rules = sample_rules();
        assert_eq!(rules.normalize_semester("Fizyka", "2"), "2");
    }

    #[test]
    fn test_normalize_semester_non_integer_passthrough() {
        let rules = sample_rules();
        assert_eq!(rules.normalize_semester("Algorytmy", "1 - 2"), "1 - 2");
    }

    #[test]
    fn test_record_occurrences() {
        let mut rules = RuleSet::default();
        let updated = rules.record_occurrences([("WF", 4usize), ("Fizyka", 1usize)]);
        assert_eq!(updated, 1);
        assert_eq!(rules.range_offset("wf"), Some(3));
        assert!(rules.is_special("wf"));
        assert!(!rules.is_special("fizyka"));
    }

    #[test]
    fn test_toml_round_trip_preserves_order() {
        let input = r#"
special_courses = ["Język angielski", "WF"]

[semester_ranges]
"język angielski" = 3
"wf" = 1
"#;
        let rules: RuleSet = toml::from_str(input).unwrap();
        assert_eq!(rules.range_offset("Język ANGIELSKI b2"), Some(3));
        assert!(rules.is_special("wf"));

        let rendered = toml::to_string_pretty(&rules).unwrap();
        let reparsed: RuleSet = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed.range_count(), 2);
        assert_eq!(reparsed.range_offset("język angielski b2"), Some(3));
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let rules = RuleSet::load_or_default("/definitely/not/there.toml");
        assert_eq!(rules.range_count(), 0);
        assert_eq!(rules.special_count(), 0);
    }
}
