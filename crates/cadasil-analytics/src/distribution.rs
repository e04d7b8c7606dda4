//! Ordered label counters.

use serde::{Deserialize, Serialize};

/// One labelled group in a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

/// Label counts kept in the order each label was first seen.
///
/// Sorting is stable, so buckets with equal counts keep their
/// first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution {
    buckets: Vec<Bucket>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given labels at zero, in order.
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            buckets: labels
                .into_iter()
                .map(|label| Bucket {
                    label: label.into(),
                    count: 0,
                })
                .collect(),
        }
    }

    /// Counts one occurrence of `label`.
    pub fn add(&mut self, label: &str) {
        match self.buckets.iter_mut().find(|bucket| bucket.label == label) {
            Some(bucket) => bucket.count += 1,
            None => self.buckets.push(Bucket {
                label: label.to_string(),
                count: 1,
            }),
        }
    }

    /// Count for `label`, 0 when it was never seen.
    pub fn count(&self, label: &str) -> usize {
        self.buckets
            .iter()
            .find(|bucket| bucket.label == label)
            .map_or(0, |bucket| bucket.count)
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }

    /// Orders buckets by count, largest first.
    #[must_use]
    pub fn sorted_by_count(mut self) -> Self {
        self.buckets.sort_by(|a, b| b.count.cmp(&a.count));
        self
    }

    /// Keeps at most `limit` buckets.
    #[must_use]
    pub fn truncated(mut self, limit: usize) -> Self {
        self.buckets.truncate(limit);
        self
    }
}

impl<S: AsRef<str>> FromIterator<S> for Distribution {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut distribution = Self::new();
        for label in iter {
            distribution.add(label.as_ref());
        }
        distribution
    }
}

impl<'a> IntoIterator for &'a Distribution {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}
