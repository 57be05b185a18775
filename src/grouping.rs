//! Category Grouper
//!
//! Stable partition of a feature's properties by their category tag.
//! Categories keep the order in which they are first seen; entries keep
//! their input order within each partition.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroups<T> {
    /// Category label -> entries carrying it
    pub grouped: IndexMap<String, Vec<T>>,
    /// Entries without a category
    pub ungrouped: Vec<T>,
}

impl<T> CategoryGroups<T> {
    pub fn len(&self) -> usize {
        self.grouped.values().map(Vec::len).sum::<usize>() + self.ungrouped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.grouped.keys().map(String::as_str)
    }
}

impl<T> Default for CategoryGroups<T> {
    fn default() -> Self {
        Self {
            grouped: IndexMap::new(),
            ungrouped: Vec::new(),
        }
    }
}

/// Partition `entries` by the category `category_of` reports for each
pub fn group_by_category<T, I, F>(entries: I, category_of: F) -> CategoryGroups<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Option<String>,
{
    let mut groups = CategoryGroups::default();
    for entry in entries {
        match category_of(&entry) {
            Some(category) => groups.grouped.entry(category).or_default().push(entry),
            None => groups.ungrouped.push(entry),
        }
    }
    groups
}
