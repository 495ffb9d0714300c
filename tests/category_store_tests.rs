use codex_core::core::services::{CategoryEditor, CategoryService, ServiceError};
use codex_core::core::tree;
use codex_core::domain::{Category, World};

fn world_with(names: &[&str]) -> World {
    let mut world = World::new("Test");
    let mut editor = CategoryEditor::new();
    for name in names {
        editor.begin_create(&world);
        editor.draft_mut().unwrap().name = (*name).into();
        editor.save(&mut world).unwrap();
    }
    world
}

#[test]
fn begin_edit_of_missing_id_changes_nothing() {
    let world = world_with(&["Regions"]);
    let snapshot = world.categories.clone();
    let mut editor = CategoryEditor::new();

    let err = editor.begin_edit(&world, "cat-does-not-exist").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(world.categories, snapshot);
    assert!(!editor.is_editing());
}

#[test]
fn whitespace_name_never_commits() {
    let mut world = World::new("Test");
    let mut editor = CategoryEditor::new();
    editor.begin_create(&world);
    editor.draft_mut().unwrap().name = " \t ".into();

    let err = editor.save(&mut world).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(world.categories.is_empty());
    // Draft is retained so the user can correct it.
    assert!(editor.is_editing());
    editor.draft_mut().unwrap().name = "Regions".into();
    editor.save(&mut world).unwrap();
    assert_eq!(world.categories.len(), 1);
}

#[test]
fn blank_id_never_commits() {
    let mut world = World::new("Test");
    let mut editor = CategoryEditor::new();
    editor.begin_create(&world);
    {
        let draft = editor.draft_mut().unwrap();
        draft.id = "  ".into();
        draft.name = "Regions".into();
    }
    let err = editor.save(&mut world).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(world.categories.is_empty());
    assert!(editor.is_editing());
}

#[test]
fn edit_without_change_preserves_collection_and_position() {
    let mut world = world_with(&["Regions", "Factions", "Relics"]);
    let snapshot = world.categories.clone();
    let target = world.categories[1].id.clone();

    let mut editor = CategoryEditor::new();
    editor.begin_edit(&world, &target).unwrap();
    editor.save(&mut world).unwrap();

    assert_eq!(world.categories, snapshot);
    assert_eq!(world.categories[1].id, target);
}

#[test]
fn sequential_creates_assign_orders_without_renumbering() {
    let mut world = world_with(&["A", "B", "C", "D"]);
    let orders: Vec<u32> = world.categories.iter().map(|c| c.order).collect();
    assert_eq!(orders, [0, 1, 2, 3]);

    // Deleting elsewhere does not renumber survivors; the next creation
    // takes the current collection size.
    let second = world.categories[1].id.clone();
    CategoryService::remove(&mut world, &second).unwrap();
    let orders: Vec<u32> = world.categories.iter().map(|c| c.order).collect();
    assert_eq!(orders, [0, 2, 3]);

    let mut editor = CategoryEditor::new();
    editor.begin_create(&world);
    assert_eq!(editor.draft().unwrap().order, 3);
}

#[test]
fn children_of_is_stable_across_calls() {
    let mut world = world_with(&["Regions", "Factions"]);
    // Force an order tie so the stable tiebreak is exercised.
    world.categories[0].order = 5;
    world.categories[1].order = 5;

    let first: Vec<String> = tree::children_of(&world.categories, None)
        .iter()
        .map(|c| c.id.clone())
        .collect();
    let second: Vec<String> = tree::children_of(&world.categories, None)
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(first, second);
    assert_eq!(first[0], world.categories[0].id);
}

#[test]
fn deleting_a_parent_orphans_children_but_keeps_them() {
    let mut world = world_with(&["Regions"]);
    let parent_id = world.categories[0].id.clone();

    let mut editor = CategoryEditor::new();
    editor.begin_create(&world);
    {
        let draft = editor.draft_mut().unwrap();
        draft.name = "Coastline".into();
        draft.parent_id = Some(parent_id.clone());
    }
    let child_id = editor.save(&mut world).unwrap();

    CategoryService::remove(&mut world, &parent_id).unwrap();

    assert_eq!(world.categories.len(), 1);
    let child = world.category(&child_id).unwrap();
    assert_eq!(child.parent_ref(), Some(parent_id.as_str()));

    // Invisible to root-rooted traversal, but still listed as an orphan.
    assert!(tree::children_of(&world.categories, None).is_empty());
    let rows = tree::flatten(&world.categories, None).unwrap();
    assert!(rows.is_empty());
    let orphan_ids: Vec<&str> = tree::orphans(&world.categories)
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(orphan_ids, [child_id.as_str()]);
}

#[test]
fn delete_while_editing_discards_the_draft() {
    let mut world = world_with(&["Regions"]);
    let id = world.categories[0].id.clone();

    let mut editor = CategoryEditor::new();
    editor.begin_edit(&world, &id).unwrap();
    CategoryService::remove(&mut world, &id).unwrap();
    assert!(editor.handle_removed(&id));
    assert!(!editor.is_editing());
}

#[test]
fn authoring_flow_end_to_end() {
    let mut world = World::new("Aldmere");
    let mut editor = CategoryEditor::new();

    let d1 = editor.begin_create(&world).id.clone();
    assert_eq!(editor.draft().unwrap().order, 0);
    editor.draft_mut().unwrap().name = "Forest".into();
    editor.save(&mut world).unwrap();

    assert_eq!(world.categories.len(), 1);
    let forest = &world.categories[0];
    assert_eq!(forest.id, d1);
    assert_eq!(forest.name, "Forest");
    assert!(forest.is_top_level());
    assert_eq!(forest.order, 0);

    let d2 = editor.begin_create(&world).id.clone();
    assert_eq!(editor.draft().unwrap().order, 1);
    {
        let draft = editor.draft_mut().unwrap();
        draft.name = "Glade".into();
        draft.parent_id = Some(d1.clone());
    }
    editor.save(&mut world).unwrap();

    let top: Vec<&str> = tree::children_of(&world.categories, None)
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(top, [d1.as_str()]);
    let nested: Vec<&str> = tree::children_of(&world.categories, Some(&d1))
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(nested, [d2.as_str()]);

    // Deleting the parent leaves the child committed but unreachable.
    CategoryService::remove(&mut world, &d1).unwrap();
    assert_eq!(world.categories.len(), 1);
    assert_eq!(world.categories[0].id, d2);
    assert_eq!(world.categories[0].parent_ref(), Some(d1.as_str()));
    assert!(tree::children_of(&world.categories, None).is_empty());
}

#[test]
fn saving_a_draft_twice_requires_a_new_begin() {
    let mut world = World::new("Test");
    let mut editor = CategoryEditor::new();
    editor.begin_create(&world);
    editor.draft_mut().unwrap().name = "Regions".into();
    editor.save(&mut world).unwrap();

    let err = editor.save(&mut world).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(world.categories.len(), 1);
}

#[test]
fn cancel_discards_draft_without_mutation() {
    let mut world = world_with(&["Regions"]);
    let snapshot = world.categories.clone();
    let mut editor = CategoryEditor::new();
    editor.begin_edit(&world, &snapshot[0].id).unwrap();
    editor.draft_mut().unwrap().name = "Renamed".into();
    editor.cancel();

    assert!(!editor.is_editing());
    assert_eq!(world.categories, snapshot);
}

#[test]
fn trimmed_fields_are_committed() {
    let mut world = World::new("Test");
    let mut editor = CategoryEditor::new();
    editor.begin_create(&world);
    editor.draft_mut().unwrap().name = "  Forest  ".into();
    let id = editor.save(&mut world).unwrap();
    assert_eq!(world.category(&id).unwrap().name, "Forest");
}

#[test]
fn empty_parent_string_is_committed_as_top_level() {
    let mut world = World::new("Test");
    let mut editor = CategoryEditor::new();
    editor.begin_create(&world);
    {
        let draft = editor.draft_mut().unwrap();
        draft.name = "Forest".into();
        draft.parent_id = Some(String::new());
    }
    let id = editor.save(&mut world).unwrap();
    assert_eq!(world.category(&id).unwrap().parent_id, None);
}
