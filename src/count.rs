// src/count.rs - Per-image tally keyed by color label

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Object count per color label, in configuration order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountRecord {
    counts: IndexMap<String, usize>,
}

impl CountRecord {
    pub fn get(&self, label: &str) -> Option<usize> {
        self.counts.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Build a record holding exactly `labels`, in that order.
///
/// Counts are copied verbatim; labels with no count default to 0 and
/// counts for unconfigured labels are dropped.
pub fn aggregate<'a, L, C>(labels: L, counts: C) -> CountRecord
where
    L: IntoIterator<Item = &'a str>,
    C: IntoIterator<Item = (&'a str, usize)>,
{
    let mut record: IndexMap<String, usize> = labels
        .into_iter()
        .map(|label| (label.to_string(), 0))
        .collect();

    for (label, count) in counts {
        if let Some(slot) = record.get_mut(label) {
            *slot = count;
        }
    }

    CountRecord { counts: record }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 4] = ["red", "yellow", "green", "purple"];

    #[test]
    fn missing_labels_default_to_zero() {
        let record = aggregate(LABELS, [("green", 3)]);
        assert_eq!(record.len(), 4);
        assert_eq!(record.get("green"), Some(3));
        assert_eq!(record.get("red"), Some(0));
        assert_eq!(record.total(), 3);
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let record = aggregate(LABELS, [("blue", 7), ("red", 1)]);
        assert_eq!(record.get("blue"), None);
        assert_eq!(record.labels().collect::<Vec<_>>(), LABELS.to_vec());
    }

    #[test]
    fn serializes_in_configuration_order() {
        let record = aggregate(LABELS, [("purple", 2), ("red", 1)]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"red":1,"yellow":0,"green":0,"purple":2}"#);
    }
}
