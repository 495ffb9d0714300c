use std::collections::HashSet;

use colored::Colorize;

use crate::cli::commands::CommandDefinition;
use crate::cli::context::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::core::services::CategoryService;
use crate::core::tree;
use crate::domain::world::World;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "category",
        "Manage the category taxonomy",
        "category <add|edit|rm|list|tree>",
        cmd_category,
    )]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: category <add|edit|rm|list|tree>".into(),
        ));
    }

    match args[0].to_lowercase().as_str() {
        "add" => {
            if context.mode() == CliMode::Interactive && args.len() == 1 {
                add_interactive(context)
            } else {
                add_script(context, &args[1..])
            }
        }
        "edit" => {
            if context.mode() != CliMode::Interactive {
                return Err(CommandError::InvalidArguments(
                    "category edit is only available in interactive mode".into(),
                ));
            }
            let id = match args.get(1) {
                Some(needle) => resolve_category(context.world()?, needle)?.0,
                None => match select_category(context, "Select a category to edit")? {
                    Some(id) => id,
                    None => return Ok(()),
                },
            };
            edit_interactive(context, &id)
        }
        "rm" | "delete" => remove(context, &args[1..]),
        "list" => list(context),
        "tree" => tree_view(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown category subcommand `{}`",
            other
        ))),
    }
}

fn add_script(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: category add <name> [parent]".into())
    })?;

    let parent_id = match args.get(1) {
        Some(needle) => Some(resolve_category(context.world()?, needle)?.0),
        None => None,
    };

    let world = context.manager.current.as_ref().ok_or(CommandError::WorldNotLoaded)?;
    context.editor.begin_create(world);
    let draft = context.editor.draft_mut().expect("draft in progress");
    draft.name = name.to_string();
    draft.parent_id = parent_id;

    let world = context.manager.current.as_mut().ok_or(CommandError::WorldNotLoaded)?;
    context.editor.save(world)?;
    context.dirty = true;
    io::print_success(format!("Category `{}` added.", name));
    Ok(())
}

fn add_interactive(context: &mut ShellContext) -> CommandResult {
    let (labels, values) = {
        let world = context.world()?;
        parent_options(world, &HashSet::new())
    };

    let world = context.manager.current.as_ref().ok_or(CommandError::WorldNotLoaded)?;
    context.editor.begin_create(world);

    let collected = collect_draft_fields(context, &labels, &values, 0, None);
    if let Err(err) = collected {
        context.editor.cancel();
        io::print_info("Category creation cancelled.");
        return Err(err);
    }

    let world = context.manager.current.as_mut().ok_or(CommandError::WorldNotLoaded)?;
    let id = context.editor.save(world)?;
    context.dirty = true;
    let name = world.category(&id).map(|c| c.name.clone()).unwrap_or(id);
    io::print_success(format!("Category `{}` saved.", name));
    Ok(())
}

fn edit_interactive(context: &mut ShellContext, id: &str) -> CommandResult {
    let (labels, values, default_parent) = {
        let world = context.world()?;
        let mut exclude = descendants(world, id);
        exclude.insert(id.to_string());
        let (labels, values) = parent_options(world, &exclude);
        let current_parent = world
            .category(id)
            .and_then(|category| category.parent_ref().map(str::to_string));
        let default_parent = values
            .iter()
            .position(|value| value.as_deref() == current_parent.as_deref())
            .unwrap_or(0);
        (labels, values, default_parent)
    };

    let world = context.manager.current.as_ref().ok_or(CommandError::WorldNotLoaded)?;
    let initial = context.editor.begin_edit(world, id)?.clone();

    let collected = collect_draft_fields(context, &labels, &values, default_parent, Some(&initial));
    if let Err(err) = collected {
        context.editor.cancel();
        io::print_info("Category update cancelled.");
        return Err(err);
    }

    let world = context.manager.current.as_mut().ok_or(CommandError::WorldNotLoaded)?;
    let id = context.editor.save(world)?;
    context.dirty = true;
    let name = world.category(&id).map(|c| c.name.clone()).unwrap_or(id);
    io::print_success(format!("Category `{}` updated.", name));
    Ok(())
}

/// Prompts for the draft's fields and writes them into the open draft.
/// Nothing reaches the committed collection here; that happens on save.
fn collect_draft_fields(
    context: &mut ShellContext,
    parent_labels: &[String],
    parent_values: &[Option<String>],
    default_parent: usize,
    initial: Option<&crate::domain::category::Category>,
) -> CommandResult {
    let name = io::prompt_text(
        &context.theme,
        "Category name",
        initial.map(|c| c.name.as_str()),
        false,
    )?;
    let description = io::prompt_text(
        &context.theme,
        "Description (optional)",
        initial.and_then(|c| c.description.as_deref()),
        true,
    )?;
    let default_color = context
        .editor
        .draft()
        .map(|draft| draft.color.clone())
        .unwrap_or_default();
    let color = io::prompt_text(&context.theme, "Color", Some(&default_color), false)?;
    let parent_index = io::select_index(
        &context.theme,
        "Parent category",
        parent_labels,
        default_parent,
    )?;

    let draft = context.editor.draft_mut().expect("draft in progress");
    draft.name = name;
    draft.description = non_empty(description);
    draft.color = color;
    draft.parent_id = parent_values[parent_index].clone();
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = match args.first() {
        Some(needle) => resolve_category(context.world()?, needle)?.0,
        None => {
            if context.mode() != CliMode::Interactive {
                return Err(CommandError::InvalidArguments(
                    "usage: category rm <name>".into(),
                ));
            }
            match select_category(context, "Select a category to delete")? {
                Some(id) => id,
                None => return Ok(()),
            }
        }
    };

    let (name, child_count) = {
        let world = context.world()?;
        let name = world
            .category(&id)
            .map(|category| category.name.clone())
            .unwrap_or_else(|| id.clone());
        let child_count = tree::children_of(&world.categories, Some(&id)).len();
        (name, child_count)
    };

    let prompt = if child_count > 0 {
        format!(
            "Delete category `{}`? {} child categor{} will be orphaned.",
            name,
            child_count,
            if child_count == 1 { "y" } else { "ies" }
        )
    } else {
        format!("Delete category `{}`?", name)
    };
    if !context.confirm(&prompt, false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    let world = context.manager.current.as_mut().ok_or(CommandError::WorldNotLoaded)?;
    CategoryService::remove(world, &id)?;
    if context.editor.handle_removed(&id) {
        io::print_info("Open draft discarded.");
    }
    context.dirty = true;
    io::print_success(format!("Category `{}` removed.", name));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let world = context.world()?;
    if world.categories.is_empty() {
        io::print_warning("No categories defined.");
        return Ok(());
    }
    output::section("Categories");
    for (idx, category) in world.categories.iter().enumerate() {
        let parent = match category.parent_ref() {
            Some(parent_id) => world
                .category(parent_id)
                .map(|parent| parent.name.clone())
                .unwrap_or_else(|| format!("(missing `{}`)", parent_id)),
            None => "-".into(),
        };
        io::print_info(format!(
            "  [{}] {} {}  parent: {}  [{}]",
            idx,
            color_swatch(&category.color),
            category.name,
            parent,
            category.id
        ));
    }
    Ok(())
}

fn tree_view(context: &mut ShellContext) -> CommandResult {
    let world = context.world()?;
    if world.categories.is_empty() {
        io::print_warning("No categories defined.");
        return Ok(());
    }

    output::section("Category tree");
    let rows = tree::flatten(&world.categories, None)?;
    for row in &rows {
        io::print_info(format!(
            "{}{} {}",
            "  ".repeat(row.depth + 1),
            color_swatch(&row.category.color),
            row.category.name
        ));
    }

    let orphans = tree::orphans(&world.categories);
    if !orphans.is_empty() {
        output::section("Orphaned");
        for category in orphans {
            let parent = category.parent_ref().unwrap_or("-");
            io::print_warning(format!(
                "  {} [{}]  parent `{}` unreachable",
                category.name, category.id, parent
            ));
        }
    }
    Ok(())
}

/// Resolves a category by exact id, falling back to the first
/// case-insensitive name match. Returns (id, name).
fn resolve_category(world: &World, needle: &str) -> Result<(String, String), CommandError> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Err(CommandError::InvalidArguments(
            "category reference cannot be empty".into(),
        ));
    }
    world
        .categories
        .iter()
        .find(|category| category.id == needle)
        .or_else(|| {
            world
                .categories
                .iter()
                .find(|category| category.name.eq_ignore_ascii_case(needle))
        })
        .map(|category| (category.id.clone(), category.name.clone()))
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "category `{}` not found. Use `category list` to view available names.",
                needle
            ))
        })
}

fn select_category(
    context: &ShellContext,
    prompt: &str,
) -> Result<Option<String>, CommandError> {
    let world = context.world()?;
    if world.categories.is_empty() {
        io::print_warning("No categories available.");
        return Ok(None);
    }
    let labels: Vec<String> = world
        .categories
        .iter()
        .map(|category| format!("{} [{}]", category.name, short_id(&category.id)))
        .collect();
    let index = io::select_index(&context.theme, prompt, &labels, 0)?;
    Ok(world.categories.get(index).map(|c| c.id.clone()))
}

fn parent_options(
    world: &World,
    exclude: &HashSet<String>,
) -> (Vec<String>, Vec<Option<String>>) {
    let mut labels = vec!["None".to_string()];
    let mut values = vec![None];
    for category in &world.categories {
        if exclude.contains(&category.id) {
            continue;
        }
        labels.push(format!("{} [{}]", category.name, short_id(&category.id)));
        values.push(Some(category.id.clone()));
    }
    (labels, values)
}

/// Ids of every category below `root`, following child links. The visited
/// set doubles as loop protection over user-controlled parent references.
fn descendants(world: &World, root: &str) -> HashSet<String> {
    let mut descendants = HashSet::new();
    let mut stack = vec![root.to_string()];
    while let Some(current) = stack.pop() {
        for category in world
            .categories
            .iter()
            .filter(|category| category.parent_ref() == Some(current.as_str()))
        {
            if descendants.insert(category.id.clone()) {
                stack.push(category.id.clone());
            }
        }
    }
    descendants
}

fn short_id(id: &str) -> &str {
    let end = id
        .char_indices()
        .nth(12)
        .map(|(idx, _)| idx)
        .unwrap_or(id.len());
    &id[..end]
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn color_swatch(color: &str) -> String {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() == 6 {
        let channels = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        );
        if let (Ok(r), Ok(g), Ok(b)) = channels {
            return "■".truecolor(r, g, b).to_string();
        }
    }
    "■".into()
}
