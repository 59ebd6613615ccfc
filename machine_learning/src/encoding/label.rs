use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// Maps the labels of a single categorical column to small integer codes.
///
/// The classes are kept sorted and deduplicated, a label's code is its position among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fits a new `LabelEncoder` over the observed labels of a column.
    ///
    /// # Arguments
    /// * `column` - The name of the encoded column.
    /// * `labels` - Every label observed for that column, duplicates allowed.
    ///
    /// # Returns
    /// The fitted encoder or an error if no label was given.
    pub fn fit<I, S>(column: &str, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();

        if classes.is_empty() {
            return Err(MlErr::EmptyVocabulary {
                column: column.to_string(),
            });
        }

        Ok(Self {
            column: column.to_string(),
            classes: classes.into_iter().collect(),
        })
    }

    /// Returns the name of the encoded column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the known classes, in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.code_of(label).is_some()
    }

    /// Returns the class used in place of unseen labels, the first known one.
    pub fn fallback(&self) -> &str {
        self.classes.first().map(String::as_str).unwrap_or_default()
    }

    /// Encodes `label`.
    ///
    /// # Returns
    /// The label's code or an error if it was not seen while fitting.
    pub fn transform(&self, label: &str) -> Result<usize> {
        self.code_of(label).ok_or_else(|| MlErr::UnseenLabel {
            column: self.column.clone(),
            label: label.to_string(),
        })
    }

    /// Encodes `label`, mapping unseen labels to the code of the fallback class.
    pub fn transform_or_fallback(&self, label: &str) -> usize {
        self.code_of(label).unwrap_or(0)
    }

    /// Checks the invariants a deserialized encoder must uphold.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(MlErr::EmptyVocabulary {
                column: self.column.clone(),
            });
        }

        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MlErr::InvalidConfig(format!(
                "the classes of '{}' are not sorted and unique",
                self.column
            )));
        }

        Ok(())
    }

    fn code_of(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_sorts_and_deduplicates() {
        let enc = LabelEncoder::fit("stops", ["zero", "one", "two_or_more", "one"]).unwrap();

        assert_eq!(enc.classes(), ["one", "two_or_more", "zero"]);
        assert_eq!(enc.transform("zero").unwrap(), 2);
        assert_eq!(enc.fallback(), "one");
    }

    #[test]
    fn fit_without_labels_fails() {
        let err = LabelEncoder::fit("stops", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, MlErr::EmptyVocabulary { .. }));
    }

    #[test]
    fn unseen_label_maps_to_first_class() {
        let enc = LabelEncoder::fit("class", ["Economy", "Business"]).unwrap();

        assert!(!enc.contains("First"));
        assert!(enc.transform("First").is_err());
        assert_eq!(enc.transform_or_fallback("First"), 0);
        assert_eq!(enc.transform_or_fallback("Economy"), 1);
    }

    #[test]
    fn validate_rejects_unsorted_classes() {
        let enc = LabelEncoder {
            column: "class".into(),
            classes: vec!["Economy".into(), "Business".into()],
        };

        assert!(enc.validate().is_err());
    }

    #[test]
    fn validate_rejects_an_empty_vocabulary() {
        let enc = LabelEncoder {
            column: "stops".into(),
            classes: Vec::new(),
        };

        assert!(enc.is_empty());
        assert!(matches!(
            enc.validate(),
            Err(MlErr::EmptyVocabulary { .. })
        ));
    }
}
