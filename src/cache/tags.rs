//! Tag Index
//!
//! Secondary `tag -> keys` index so bulk invalidation only touches the
//! entries it removes. The store keeps it in sync on every insert and removal.

use std::collections::{HashMap, HashSet};

// == Tag Index ==
#[derive(Debug, Default)]
pub(crate) struct TagIndex {
    keys_by_tag: HashMap<String, HashSet<String>>,
}

impl TagIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `key` under each of `tags`.
    pub(crate) fn insert(&mut self, key: &str, tags: &HashSet<String>) {
        for tag in tags {
            self.keys_by_tag
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
    }

    /// Unregisters `key` from each of `tags`, dropping emptied tags.
    pub(crate) fn remove(&mut self, key: &str, tags: &HashSet<String>) {
        for tag in tags {
            if let Some(keys) = self.keys_by_tag.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.keys_by_tag.remove(tag);
                }
            }
        }
    }

    /// Keys carrying at least one of `tags`.
    pub(crate) fn keys_for<'a, I>(&self, tags: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter()
            .filter_map(|tag| self.keys_by_tag.get(tag))
            .flatten()
            .cloned()
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.keys_by_tag.clear();
    }

    #[cfg(test)]
    pub(crate) fn tag_count(&self) -> usize {
        self.keys_by_tag.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keys_for_union_of_tags() {
        let mut index = TagIndex::new();
        index.insert("p1", &tags(&["promo"]));
        index.insert("p2", &tags(&["promo", "home"]));
        index.insert("p3", &tags(&["other"]));

        let keys = index.keys_for(["promo", "home"]);
        assert_eq!(keys, tags(&["p1", "p2"]));
    }

    #[test]
    fn test_remove_drops_empty_tags() {
        let mut index = TagIndex::new();
        index.insert("p1", &tags(&["promo", "home"]));
        index.remove("p1", &tags(&["promo", "home"]));

        assert_eq!(index.tag_count(), 0);
        assert!(index.keys_for(["promo"]).is_empty());
    }

    #[test]
    fn test_unknown_tag_matches_nothing() {
        let mut index = TagIndex::new();
        index.insert("p1", &tags(&["promo"]));
        assert!(index.keys_for(["missing"]).is_empty());
    }
}
