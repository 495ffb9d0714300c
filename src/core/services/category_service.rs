use crate::domain::category::Category;
use crate::domain::world::World;

use super::{ServiceError, ServiceResult};

pub struct CategoryService;

impl CategoryService {
    pub fn add(world: &mut World, category: Category) -> ServiceResult<String> {
        Self::validate_id_free(world, &category.id)?;
        if let Some(parent_id) = category.parent_ref() {
            Self::validate_parent(world, parent_id, Some(&category.id))?;
        }
        let id = world.add_category(category);
        tracing::debug!(id = %id, "category added");
        Ok(id)
    }

    pub fn edit(world: &mut World, id: &str, changes: Category) -> ServiceResult<()> {
        if let Some(parent_id) = changes.parent_ref() {
            Self::validate_parent(world, parent_id, Some(id))?;
        }
        let category = world
            .category_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("category `{}` not found", id)))?;
        category.name = changes.name;
        category.description = changes.description;
        category.color = changes.color;
        category.parent_id = changes.parent_id;
        category.order = changes.order;
        world.touch();
        tracing::debug!(id = %id, "category edited");
        Ok(())
    }

    /// Removes the entry with `id`. Children that reference it are left in
    /// the collection with their `parent_id` intact: they become orphans,
    /// invisible to root-rooted tree walks. No cascade, no reparenting.
    pub fn remove(world: &mut World, id: &str) -> ServiceResult<()> {
        let before = world.categories.len();
        world.categories.retain(|category| category.id != id);
        if world.categories.len() == before {
            return Err(ServiceError::NotFound(format!(
                "category `{}` not found",
                id
            )));
        }
        world.touch();
        tracing::debug!(id = %id, "category removed");
        Ok(())
    }

    pub fn list(world: &World) -> Vec<&Category> {
        world.categories.iter().collect()
    }

    fn validate_id_free(world: &World, candidate: &str) -> ServiceResult<()> {
        if world.category(candidate).is_some() {
            Err(ServiceError::Validation(format!(
                "category id `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }

    fn validate_parent(world: &World, parent_id: &str, current: Option<&str>) -> ServiceResult<()> {
        if Some(parent_id) == current {
            return Err(ServiceError::Validation(
                "category cannot be its own parent".into(),
            ));
        }
        if world.category(parent_id).is_none() {
            return Err(ServiceError::Validation(format!(
                "parent category `{}` not found",
                parent_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_category_succeeds() {
        let mut world = World::new("Test");
        let category = Category::new("Flora");
        CategoryService::add(&mut world, category).unwrap();
        assert_eq!(world.categories.len(), 1);
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut world = World::new("Test");
        let category = Category::new("Flora");
        let clash = category.clone();
        CategoryService::add(&mut world, category).unwrap();
        let err = CategoryService::add(&mut world, clash).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn self_parent_rejected() {
        let mut world = World::new("Test");
        let mut category = Category::new("Flora");
        category.parent_id = Some(category.id.clone());
        let err = CategoryService::add(&mut world, category).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(world.categories.is_empty());
    }

    #[test]
    fn edit_unknown_parent_rejected() {
        let mut world = World::new("Test");
        let category = Category::new("Flora");
        let id = category.id.clone();
        CategoryService::add(&mut world, category).unwrap();

        let mut changes = world.category(&id).unwrap().clone();
        changes.parent_id = Some("cat-missing".into());
        let err = CategoryService::edit(&mut world, &id, changes).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(world.category(&id).unwrap().is_top_level());
    }

    #[test]
    fn remove_orphans_children_in_place() {
        let mut world = World::new("Test");
        let parent = Category::new("Regions");
        let parent_id = parent.id.clone();
        CategoryService::add(&mut world, parent).unwrap();

        let mut child = Category::new("Coastline");
        child.parent_id = Some(parent_id.clone());
        let child_id = child.id.clone();
        CategoryService::add(&mut world, child).unwrap();

        CategoryService::remove(&mut world, &parent_id).unwrap();
        assert_eq!(world.categories.len(), 1);
        let orphan = world.category(&child_id).unwrap();
        assert_eq!(orphan.parent_ref(), Some(parent_id.as_str()));
    }

    #[test]
    fn remove_missing_reports_not_found() {
        let mut world = World::new("Test");
        let err = CategoryService::remove(&mut world, "cat-missing").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
