use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// A world codex: the authored content file this tool owns.
///
/// The category collection is the flat source of truth; tree views are
/// derived from it on demand (see [`crate::core::tree`]). Outer tools file
/// their own entities (locations, characters, factions, templates) under
/// these category ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "World::schema_version_default")]
    pub schema_version: u8,
}

impl World {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            categories: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_category(&mut self, category: Category) -> String {
        let id = category.id.clone();
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_mut(&mut self, id: &str) -> Option<&mut Category> {
        self.categories
            .iter_mut()
            .find(|category| category.id == id)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_category_returns_its_id() {
        let mut world = World::new("Aldmere");
        let category = Category::new("Regions");
        let id = world.add_category(category);
        assert!(world.category(&id).is_some());
        assert_eq!(world.category_count(), 1);
    }
}
