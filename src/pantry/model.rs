use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::collation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub category: Category,
}

/// Category label -> ingredients. Labels keep map order; items are collated.
pub type CategoryMap = BTreeMap<String, Vec<Ingredient>>;

/// Trimmed, lowercased storage key; `None` for blank input.
pub fn normalize_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}

pub fn group_by_category(items: Vec<Ingredient>) -> CategoryMap {
    let mut grouped = CategoryMap::new();
    for item in items {
        grouped
            .entry(item.category.label().to_string())
            .or_default()
            .push(item);
    }
    for list in grouped.values_mut() {
        list.sort_by(|a, b| collation::compare(&a.name, &b.name));
    }
    grouped
}
