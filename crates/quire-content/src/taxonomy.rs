//! Tag and category indices.

use std::collections::BTreeMap;

/// Index from taxonomy name to fragment positions in collection order.
///
/// Positions refer to the collection's `all` list. Each bucket keeps the
/// order in which fragments were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Taxonomy {
    all: BTreeMap<String, Vec<usize>>,
    visible: BTreeMap<String, Vec<usize>>,
}

impl Taxonomy {
    /// Add a fragment to every named bucket, once per bucket.
    pub(crate) fn add(&mut self, names: &[String], index: usize, visible: bool) {
        for name in names {
            push_once(self.all.entry(name.clone()).or_default(), index);
            if visible {
                push_once(self.visible.entry(name.clone()).or_default(), index);
            }
        }
    }

    /// Buckets including invisible fragments.
    #[must_use]
    pub fn all(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.all
    }

    /// Buckets of visible fragments only.
    #[must_use]
    pub fn visible(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.visible
    }
}

/// Fragments are added in index order, so a repeat can only be the last entry.
fn push_once(bucket: &mut Vec<usize>, index: usize) {
    if bucket.last() != Some(&index) {
        bucket.push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_splits_visible() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.add(&["rust".to_owned(), "web".to_owned()], 0, true);
        taxonomy.add(&["rust".to_owned()], 1, false);
        taxonomy.add(&["rust".to_owned()], 2, true);

        assert_eq!(taxonomy.all()["rust"], vec![0, 1, 2]);
        assert_eq!(taxonomy.visible()["rust"], vec![0, 2]);
        assert_eq!(taxonomy.all()["web"], vec![0]);
    }

    #[test]
    fn test_repeated_name_added_once() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.add(&["a".to_owned(), "b".to_owned(), "a".to_owned()], 0, true);
        taxonomy.add(&["a".to_owned()], 1, true);

        assert_eq!(taxonomy.all()["a"], vec![0, 1]);
        assert_eq!(taxonomy.visible()["a"], vec![0, 1]);
        assert_eq!(taxonomy.all()["b"], vec![0]);
    }

    #[test]
    fn test_invisible_only_bucket_absent_from_visible() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.add(&["draft".to_owned()], 0, false);
        assert!(taxonomy.all().contains_key("draft"));
        assert!(!taxonomy.visible().contains_key("draft"));
    }
}
