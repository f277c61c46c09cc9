use serde::{Deserialize, Serialize};

/// Which values of a cost-allocation tag a report covers.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TagSelector {
    /// Every value of `key` the provider has seen in the report window.
    AllValuesOf { key: String },
    /// Exactly one value of `key`.
    SpecificValue { key: String, value: String },
}

impl TagSelector {
    /// A missing or empty `value` selects every value of the key. Anything else, whitespace
    /// included, is matched exactly.
    pub fn new(key: impl Into<String>, value: Option<&str>) -> Self {
        let key = key.into();
        match value.filter(|v| !v.is_empty()) {
            Some(value) => TagSelector::SpecificValue {
                key,
                value: value.to_string(),
            },
            None => TagSelector::AllValuesOf { key },
        }
    }

    pub fn key(&self) -> &str {
        match self {
            TagSelector::AllValuesOf { key } => key,
            TagSelector::SpecificValue { key, .. } => key,
        }
    }

    /// The human-facing name of the selection, used in the email subject and attachment name.
    pub fn display(&self) -> String {
        match self {
            TagSelector::AllValuesOf { key } => format!("All {key}"),
            TagSelector::SpecificValue { value, .. } => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_selects_all() {
        assert_eq!(
            TagSelector::new("Team", Some("")),
            TagSelector::AllValuesOf { key: "Team".into() }
        );
        assert_eq!(
            TagSelector::new("Team", None),
            TagSelector::AllValuesOf { key: "Team".into() }
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(TagSelector::new("Team", None).display(), "All Team");
        let specific = TagSelector::new("Team", Some("Alpha"));
        assert_eq!(specific.display(), "Alpha");
        assert_eq!(specific.key(), "Team");
    }

    #[test]
    fn test_whitespace_value_is_a_specific_value() {
        assert_eq!(
            TagSelector::new("Team", Some(" ")),
            TagSelector::SpecificValue {
                key: "Team".into(),
                value: " ".into()
            }
        );
    }
}
