//! Single-slot draft workflow for creating and editing categories.
//!
//! The editor never holds a hidden copy of the committed collection: it
//! receives the current [`World`] on every call and hands mutations back
//! through it. The only state it owns is the one in-progress draft.

use crate::domain::category::{self, Category};
use crate::domain::world::World;

use super::{ServiceError, ServiceResult};

/// Editing workflow states. `delete` of the drafted id forces
/// `Editing` back to `Idle` via [`CategoryEditor::handle_removed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Idle,
    Editing {
        draft: Category,
    },
}

#[derive(Debug, Default)]
pub struct CategoryEditor {
    state: EditorState,
}

impl CategoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&Category> {
        match &self.state {
            EditorState::Editing { draft } => Some(draft),
            EditorState::Idle => None,
        }
    }

    /// Field updates go straight to the draft; validation waits until
    /// [`CategoryEditor::save`].
    pub fn draft_mut(&mut self) -> Option<&mut Category> {
        match &mut self.state {
            EditorState::Editing { draft } => Some(draft),
            EditorState::Idle => None,
        }
    }

    /// Starts a fresh draft: generated id, random color, no parent, and
    /// `order` set to the current collection size so the entry lands last
    /// among top-level siblings. The committed collection is not touched.
    /// An already-open draft is silently replaced.
    pub fn begin_create(&mut self, world: &World) -> &Category {
        let draft = Category {
            id: category::generate_id(),
            name: String::new(),
            description: None,
            color: category::random_color(),
            parent_id: None,
            order: world.category_count() as u32,
        };
        self.state = EditorState::Editing { draft };
        self.draft().expect("draft just created")
    }

    /// Copies the committed entry with `id` into the draft. Edits mutate the
    /// copy only; nothing reaches the collection until save.
    pub fn begin_edit(&mut self, world: &World, id: &str) -> ServiceResult<&Category> {
        let entry = world
            .category(id)
            .ok_or_else(|| ServiceError::NotFound(format!("category `{}` not found", id)))?;
        self.state = EditorState::Editing {
            draft: entry.clone(),
        };
        Ok(self.draft().expect("draft just created"))
    }

    /// Validates and merges the draft into the committed collection, keyed
    /// by id: an existing entry is replaced at its position, otherwise the
    /// draft is appended. On validation failure the draft is retained so the
    /// caller can correct it.
    pub fn save(&mut self, world: &mut World) -> ServiceResult<String> {
        let draft = match &self.state {
            EditorState::Editing { draft } => draft,
            EditorState::Idle => {
                return Err(ServiceError::Validation("no draft in progress".into()));
            }
        };

        let id = draft.id.trim();
        if id.is_empty() {
            return Err(ServiceError::Validation("category id is required".into()));
        }
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("category name is required".into()));
        }

        let mut entry = draft.clone();
        entry.id = id.to_string();
        entry.name = name.to_string();
        if entry.parent_ref().is_none() {
            entry.parent_id = None;
        }

        let id = entry.id.clone();
        match world.category_mut(&id) {
            Some(existing) => *existing = entry,
            None => {
                world.categories.push(entry);
            }
        }
        world.touch();
        tracing::debug!(id = %id, "category draft saved");
        self.state = EditorState::Idle;
        Ok(id)
    }

    /// Discards the draft without touching the committed collection.
    pub fn cancel(&mut self) {
        self.state = EditorState::Idle;
    }

    /// Called after a committed entry is removed; discards the draft if it
    /// was the one being edited. Returns whether a draft was discarded.
    pub fn handle_removed(&mut self, id: &str) -> bool {
        if self.draft().is_some_and(|draft| draft.id == id) {
            self.state = EditorState::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_create_leaves_collection_untouched() {
        let world = World::new("Test");
        let mut editor = CategoryEditor::new();
        let draft = editor.begin_create(&world);
        assert!(draft.name.is_empty());
        assert_eq!(draft.order, 0);
        assert_eq!(world.category_count(), 0);
    }

    #[test]
    fn begin_edit_missing_id_reports_not_found() {
        let world = World::new("Test");
        let mut editor = CategoryEditor::new();
        let err = editor.begin_edit(&world, "cat-missing").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(!editor.is_editing());
    }

    #[test]
    fn save_with_blank_name_retains_draft() {
        let mut world = World::new("Test");
        let mut editor = CategoryEditor::new();
        editor.begin_create(&world);
        editor.draft_mut().unwrap().name = "   ".into();

        let err = editor.save(&mut world).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(editor.is_editing());
        assert_eq!(world.category_count(), 0);
    }

    #[test]
    fn save_replaces_existing_entry_in_place() {
        let mut world = World::new("Test");
        let mut editor = CategoryEditor::new();

        for name in ["Regions", "Factions", "Relics"] {
            editor.begin_create(&world);
            editor.draft_mut().unwrap().name = name.into();
            editor.save(&mut world).unwrap();
        }
        let target = world.categories[1].id.clone();

        editor.begin_edit(&world, &target).unwrap();
        editor.draft_mut().unwrap().name = "Guilds".into();
        editor.save(&mut world).unwrap();

        assert_eq!(world.categories.len(), 3);
        assert_eq!(world.categories[1].id, target);
        assert_eq!(world.categories[1].name, "Guilds");
    }

    #[test]
    fn new_draft_replaces_open_draft() {
        let world = World::new("Test");
        let mut editor = CategoryEditor::new();
        editor.begin_create(&world);
        let first = editor.draft().unwrap().id.clone();
        editor.begin_create(&world);
        assert_ne!(editor.draft().unwrap().id, first);
    }

    #[test]
    fn handle_removed_discards_matching_draft_only() {
        let mut world = World::new("Test");
        let mut editor = CategoryEditor::new();
        editor.begin_create(&world);
        editor.draft_mut().unwrap().name = "Regions".into();
        let id = editor.save(&mut world).unwrap();

        editor.begin_edit(&world, &id).unwrap();
        assert!(!editor.handle_removed("cat-other"));
        assert!(editor.is_editing());
        assert!(editor.handle_removed(&id));
        assert!(!editor.is_editing());
    }
}
