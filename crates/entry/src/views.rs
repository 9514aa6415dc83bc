//! Label-keyed aggregations over typed projection lists.

use serde::Serialize;

/// Ordered `label -> values` map over one typed projection list.
///
/// Labels appear in first-seen order and values keep their insertion order
/// within a label. An unresolvable label groups under `None`. Views are
/// rebuilt from the current projection state on every query, never cached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GroupedView<T> {
    groups: Vec<(Option<String>, Vec<T>)>,
}

impl<T> GroupedView<T> {
    /// Build a view from `(label, value)` pairs in one scan.
    pub fn collect(pairs: impl IntoIterator<Item = (Option<String>, T)>) -> Self {
        let mut view = GroupedView { groups: Vec::new() };
        for (label, value) in pairs {
            match view.groups.iter_mut().find(|(key, _)| *key == label) {
                Some((_, values)) => values.push(value),
                None => view.groups.push((label, vec![value])),
            }
        }
        view
    }

    /// Values grouped under `label`.
    pub fn get(&self, label: &str) -> Option<&[T]> {
        self.groups
            .iter()
            .find(|(key, _)| key.as_deref() == Some(label))
            .map(|(_, values)| values.as_slice())
    }

    /// Values whose label could not be resolved.
    pub fn unlabeled(&self) -> Option<&[T]> {
        self.groups
            .iter()
            .find(|(key, _)| key.is_none())
            .map(|(_, values)| values.as_slice())
    }

    /// Labels in first-seen order (`None` for the unlabeled group).
    pub fn labels(&self) -> impl Iterator<Item = Option<&str>> {
        self.groups.iter().map(|(key, _)| key.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &[T])> {
        self.groups
            .iter()
            .map(|(key, values)| (key.as_deref(), values.as_slice()))
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total element count across all groups.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, values)| values.len()).sum()
    }
}
