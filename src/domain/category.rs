//! Domain types representing codex categories.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

const ID_PREFIX: &str = "cat";

/// Default swatch palette used when a category is created without an
/// explicit color. Any string is accepted as a color afterwards.
const CATEGORY_COLORS: &[&str] = &[
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
    "#bcf60c", "#fabebe", "#008080", "#e6beff", "#9a6324", "#800000", "#aaffc3", "#808000",
];

/// Groups codex entries into a user-defined taxonomy.
///
/// Categories form a forest: `parent_id` is a weak reference into the same
/// flat collection, and `order` sorts siblings for display. Ids live in a
/// single namespace across the whole collection, nested or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub order: u32,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            description: None,
            color: random_color(),
            parent_id: None,
            order: 0,
        }
    }

    /// Parent reference with empty strings treated the same as absent.
    /// Codex files produced by older exports use `""` for top-level entries.
    pub fn parent_ref(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|p| !p.trim().is_empty())
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_ref().is_none()
    }
}

impl Identifiable for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.name, self.id)
    }
}

/// Produces a fresh category id: a namespace prefix plus a v4 UUID.
pub fn generate_id() -> String {
    format!("{}-{}", ID_PREFIX, Uuid::new_v4().simple())
}

/// Picks a random default color for a newly created category.
pub fn random_color() -> String {
    let mut rng = rand::thread_rng();
    CATEGORY_COLORS
        .choose(&mut rng)
        .copied()
        .unwrap_or("#808080")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_prefixed_and_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert!(a.starts_with("cat-"));
        assert_ne!(a, b);
    }

    #[test]
    fn empty_parent_string_counts_as_top_level() {
        let mut category = Category::new("Regions");
        category.parent_id = Some(String::new());
        assert!(category.is_top_level());
        assert_eq!(category.parent_ref(), None);
    }

    #[test]
    fn new_category_gets_a_palette_color() {
        let category = Category::new("Factions");
        assert!(category.color.starts_with('#'));
    }
}
