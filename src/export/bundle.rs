//! Section name to generated text mapping.

use crate::crew::CrewOutput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sections the exporter always renders, in document order.
pub const SECTIONS: [(&str, &str); 4] = [
    ("requirements_analysis", "Requirements Analysis"),
    ("test_cases", "Detailed Test Cases"),
    ("test_data", "Test Data Sets"),
    ("validation_report", "Validation Report"),
];

/// Generated text keyed by section.
///
/// Lookups of absent sections yield the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultBundle {
    sections: BTreeMap<String, String>,
}

impl ResultBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect each task's raw output under its section key.
    pub fn from_crew_output(output: &CrewOutput) -> Self {
        let mut bundle = Self::new();
        for task in &output.tasks {
            bundle.insert(&task.section, &task.raw);
        }
        bundle
    }

    pub fn insert(&mut self, section: impl Into<String>, text: impl Into<String>) {
        self.sections.insert(section.into(), text.into());
    }

    /// Text of `section`, or `""` when absent.
    pub fn get(&self, section: &str) -> &str {
        self.sections.get(section).map(String::as_str).unwrap_or("")
    }

    /// Sections in export order: the fixed sections first, then any others
    /// sorted by key.
    pub fn ordered_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = SECTIONS.iter().map(|(key, _)| *key).collect();
        keys.extend(
            self.sections
                .keys()
                .map(String::as_str)
                .filter(|key| !SECTIONS.iter().any(|(fixed, _)| fixed == key)),
        );
        keys
    }
}

/// Human-readable title of a section key.
pub fn section_title(key: &str) -> String {
    if let Some((_, title)) = SECTIONS.iter().find(|(fixed, _)| *fixed == key) {
        return title.to_string();
    }

    key.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
