//! Lookup of per-entity metadata attributes, scoped to one group level.

use crate::input::GroupMetadataRow;

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupIndex {
    level: String,
    entries: FxHashMap<String, Attributes>,
    /// Entity ids in first-seen order, so group resolution is stable.
    order: Vec<String>,
}

/// Folds attribute rows of `level` into one attribute map per entity.
///
/// Returns `None` when there are no rows at all, or when `level` does not
/// occur in them; the latter is an integration mistake and gets a warning.
pub fn index(rows: &[GroupMetadataRow], level: &str) -> Option<GroupIndex> {
    if rows.is_empty() {
        return None;
    }

    let mut by_level: FxHashMap<&str, GroupIndex> = FxHashMap::default();

    for row in rows {
        let group = by_level
            .entry(row.level.as_str())
            .or_insert_with(|| GroupIndex {
                level: row.level.clone(),
                entries: FxHashMap::default(),
                order: Vec::new(),
            });

        if !group.entries.contains_key(&row.entity_id) {
            group.order.push(row.entity_id.clone());
        }
        group
            .entries
            .entry(row.entity_id.clone())
            .or_default()
            .insert(row.attribute_name.clone(), row.attribute_value.clone());
    }

    match by_level.remove(level) {
        Some(group) => Some(group),
        None => {
            let mut available: Vec<&str> = by_level.keys().copied().collect();
            available.sort_unstable();
            log::warn!(
                "group level {level:?} not present in metadata (available: {})",
                available.join(", ")
            );
            None
        }
    }
}

impl GroupIndex {
    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn attributes(&self, entity_id: &str) -> Option<&Attributes> {
        self.entries.get(entity_id)
    }

    pub fn attribute(&self, entity_id: &str, name: &str) -> Option<&str> {
        self.attributes(entity_id)?.get(name).map(String::as_str)
    }

    /// Entities whose `field` attribute equals `value`, in first-seen order.
    pub fn entities_where(&self, field: &str, value: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| self.attribute(id, field) == Some(value))
            .cloned()
            .collect()
    }

    pub fn distinct_values(&self, field: &str) -> Vec<String> {
        let mut values: Vec<String> = self
            .order
            .iter()
            .filter_map(|id| self.attribute(id, field))
            .map(str::to_string)
            .collect();
        values.sort();
        values.dedup();
        values
    }
}
