//! Per-frame detection labels

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single labeled detection reported by the perception model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label (e.g. "Eyeclosed", "Yawn")
    pub label: String,
    /// Model confidence (0-1)
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Unordered set of labels observed in one sampled instant.
///
/// Labels outside the estimator's vocabulary are carried along and ignored
/// at evaluation time, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionSet {
    labels: HashSet<String>,
}

impl DetectionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from scored detections, keeping those at or above `min_confidence`
    pub fn from_detections<I>(detections: I, min_confidence: f32) -> Self
    where
        I: IntoIterator<Item = Detection>,
    {
        detections
            .into_iter()
            .filter(|d| d.confidence >= min_confidence)
            .map(|d| d.label)
            .collect()
    }

    /// Add a label; returns false if it was already present
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        self.labels.insert(label.into())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// True if any of `labels` is present
    pub fn contains_any<'a, I>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        labels.into_iter().any(|l| self.labels.contains(l))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DetectionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for DetectionSet {
    fn from(labels: [S; N]) -> Self {
        labels.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_gate() {
        let set = DetectionSet::from_detections(
            vec![
                Detection::new("Eyeclosed", 0.82),
                Detection::new("Yawn", 0.39),
                Detection::new("Drowsy eye", 0.4),
            ],
            0.4,
        );

        assert!(set.contains("Eyeclosed"));
        assert!(set.contains("Drowsy eye")); // at threshold is kept
        assert!(!set.contains("Yawn"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = DetectionSet::from(["Yawn", "Yawn", "Eyeclosed"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_contains_any() {
        let closed = vec!["Eyeclosed".to_string(), "Drowsy eye".to_string()];
        assert!(DetectionSet::from(["Drowsy eye"]).contains_any(&closed));
        assert!(!DetectionSet::from(["Yawn", "Phone"]).contains_any(&closed));
        assert!(!DetectionSet::new().contains_any(&closed));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let set: DetectionSet = serde_json::from_str(r#"["Yawn"]"#).unwrap();
        assert!(set.contains("Yawn"));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["Yawn"]"#);
    }
}
