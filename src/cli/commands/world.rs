use crate::cli::commands::CommandDefinition;
use crate::cli::context::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::core::tree;
use crate::domain::world::World;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "world",
            "Create, open, and save worlds",
            "world <new|open|save|close|list|info>",
            cmd_world,
        ),
        CommandDefinition::new(
            "backup",
            "Manage world backups",
            "backup <create|list|restore>",
            cmd_backup,
        ),
    ]
}

fn cmd_world(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: world <new|open|save|close|list|info>".into(),
        ));
    }
    match args[0].to_lowercase().as_str() {
        "new" => world_new(context, &args[1..]),
        "open" => world_open(context, &args[1..]),
        "save" => world_save(context, &args[1..]),
        "close" => world_close(context),
        "list" => world_list(context),
        "info" => world_info(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown world subcommand `{}`",
            other
        ))),
    }
}

fn world_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if context.manager.current.is_some()
        && context.dirty
        && !context.confirm("Discard unsaved changes in the current world?", false)?
    {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    let name = if args.is_empty() {
        if context.mode() != CliMode::Interactive {
            return Err(CommandError::InvalidArguments(
                "usage: world new <name>".into(),
            ));
        }
        io::prompt_text(&context.theme, "World name", None, false)?
    } else {
        args.join(" ")
    };

    let world = World::new(name.clone());
    context.manager.set_current(world, None, Some(name));
    context.editor.cancel();
    context.dirty = true;
    io::print_success("New world created.");
    Ok(())
}

fn world_open(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = match args.first() {
        Some(raw) => raw.to_string(),
        None => {
            if context.mode() != CliMode::Interactive {
                return Err(CommandError::InvalidArguments(
                    "usage: world open <name>".into(),
                ));
            }
            let names = context.manager.list_worlds()?;
            if names.is_empty() {
                io::print_warning("No saved worlds available.");
                return Ok(());
            }
            let index = io::select_index(&context.theme, "Select a world to open", &names, 0)?;
            names[index].clone()
        }
    };

    let report = context.manager.load(&name)?;
    context.editor.cancel();
    context.dirty = false;
    io::print_success(format!(
        "World `{}` loaded from {}.",
        name,
        report.path.display()
    ));
    context.report_load(&report.warnings);
    context.update_last_opened(Some(&name))?;
    Ok(())
}

fn world_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.world()?;
    let (path, name) = match args.first() {
        Some(name) => {
            let path = context.manager.save_as(name)?;
            (path, Some(name.to_string()))
        }
        None => {
            let path = context.manager.save()?;
            let name = context.manager.current_name().map(|name| name.to_string());
            (path, name)
        }
    };
    context.dirty = false;
    io::print_success(format!("World saved to {}.", path.display()));
    context.update_last_opened(name.as_deref())?;
    Ok(())
}

fn world_close(context: &mut ShellContext) -> CommandResult {
    context.world()?;
    if context.dirty && !context.confirm("Close world and discard unsaved changes?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    context.manager.clear();
    context.editor.cancel();
    context.dirty = false;
    io::print_success("World closed.");
    Ok(())
}

fn world_list(context: &mut ShellContext) -> CommandResult {
    let names = context.manager.list_worlds()?;
    if names.is_empty() {
        io::print_warning("No saved worlds.");
        return Ok(());
    }
    let active = context.manager.current_name().map(|name| name.to_string());
    output::section("Worlds");
    for name in names {
        let marker = if active.as_deref().is_some_and(|current| current == name) {
            " (active)"
        } else {
            ""
        };
        io::print_info(format!("  {}{}", name, marker));
    }
    Ok(())
}

fn world_info(context: &mut ShellContext) -> CommandResult {
    let world = context.world()?;
    let orphan_count = tree::orphans(&world.categories).len();
    output::section(&world.name);
    io::print_info(format!("  Id: {}", world.id));
    if let Some(description) = &world.description {
        io::print_info(format!("  Description: {}", description));
    }
    io::print_info(format!("  Categories: {}", world.category_count()));
    if orphan_count > 0 {
        io::print_warning(format!("  Orphaned categories: {}", orphan_count));
    }
    io::print_info(format!("  Updated: {}", world.updated_at));
    if let Some(path) = context.manager.current_path() {
        io::print_info(format!("  Path: {}", path.display()));
    }
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: backup <create|list|restore>".into(),
        ));
    }
    match args[0].to_lowercase().as_str() {
        "create" => backup_create(context, &args[1..]),
        "list" => backup_list(context),
        "restore" => backup_restore(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown backup subcommand `{}`",
            other
        ))),
    }
}

fn require_named_world(context: &ShellContext) -> Result<String, CommandError> {
    context
        .manager
        .current_name()
        .map(|name| name.to_string())
        .ok_or_else(|| {
            CommandError::InvalidArguments(
                "No named world associated. Use `world save <name>` once to bind it.".into(),
            )
        })
}

fn backup_create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.world()?;
    require_named_world(context)?;
    let note = if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    };
    let path = context.manager.backup(note.as_deref())?;
    let label = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("backup");
    io::print_success(format!("Backup created: {}", label));
    Ok(())
}

fn backup_list(context: &mut ShellContext) -> CommandResult {
    let name = require_named_world(context)?;
    let backups = context.manager.list_backups(&name)?;
    if backups.is_empty() {
        io::print_warning("No backups available.");
        return Ok(());
    }
    io::print_info("Available backups:");
    for (idx, backup_name) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", idx + 1, backup_name));
    }
    Ok(())
}

fn backup_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = require_named_world(context)?;
    let reference = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: backup restore <index|name>".into())
    })?;

    let backups = context.manager.list_backups(&name)?;
    if backups.is_empty() {
        return Err(CommandError::InvalidArguments(
            "no backups available to restore".into(),
        ));
    }
    let target = if let Ok(index_raw) = reference.parse::<usize>() {
        let index = index_raw.saturating_sub(1);
        backups
            .get(index)
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!("backup index {} out of range", reference))
            })?
            .clone()
    } else {
        backups
            .iter()
            .find(|candidate| candidate.contains(reference))
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no backup matches reference `{}`",
                    reference
                ))
            })?
    };

    if !context.confirm(
        &format!("Restore world `{}` from backup `{}`?", name, target),
        false,
    )? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    let report = context.manager.restore_backup(&name, &target)?;
    context.editor.cancel();
    context.dirty = false;
    context.report_load(&report.warnings);
    io::print_success(format!("World `{}` loaded from backup `{}`.", name, target));
    context.update_last_opened(Some(&name))?;
    Ok(())
}
