use crate::cli::commands::CommandDefinition;
use crate::cli::context::{apply_output_config, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "Show and change tool configuration",
        "config <show|set|backup|backups|restore>",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: config <show|set|backup|backups|restore>".into(),
        ));
    }
    match args[0].to_lowercase().as_str() {
        "show" => show(context),
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(
                    "usage: config set <key> <value>".into(),
                ));
            }
            set_value(context, args[1], &args[2..].join(" "))
        }
        "backup" => backup(context, &args[1..]),
        "backups" => list_backups(context),
        "restore" => {
            let reference = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: config restore <index|name>".into())
            })?;
            restore(context, reference)
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{}`",
            other
        ))),
    }
}

fn show(context: &mut ShellContext) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    io::print_info(format!(
        "  Theme: {}",
        config.theme.as_deref().unwrap_or("default")
    ));
    io::print_info(format!(
        "  Last opened world: {}",
        config.last_opened_world.as_deref().unwrap_or("(none)")
    ));
    io::print_info(format!("  Backup retention: {}", config.backup_retention));
    io::print_info(format!("  Quiet: {}", if config.quiet { "on" } else { "off" }));
    Ok(())
}

fn set_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    match key.to_lowercase().as_str() {
        "theme" => {
            if value.eq_ignore_ascii_case("none") || value.is_empty() {
                context.config.theme = None;
            } else {
                context.config.theme = Some(value.to_string());
            }
        }
        "quiet" => {
            context.config.quiet = parse_bool(value)?;
        }
        "backup_retention" => {
            let parsed: usize = value.parse().map_err(|_| {
                CommandError::InvalidArguments("backup_retention must be numeric".into())
            })?;
            if parsed == 0 {
                return Err(CommandError::InvalidArguments(
                    "backup_retention must be at least 1".into(),
                ));
            }
            context.config.backup_retention = parsed;
        }
        "last_opened_world" => {
            if value.eq_ignore_ascii_case("none") || value.is_empty() {
                context.config.last_opened_world = None;
            } else {
                context.config.last_opened_world = Some(value.to_string());
            }
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown config key `{}`",
                other
            )))
        }
    }
    context.persist_config()?;
    apply_output_config(&context.config);
    io::print_success("Configuration updated.");
    Ok(())
}

fn backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    };
    let name = context
        .config_manager
        .backup(&context.config, note.as_deref())?;
    io::print_success(format!("Configuration backup saved: {}", name));
    Ok(())
}

fn list_backups(context: &mut ShellContext) -> CommandResult {
    let backups = context.config_manager.list_backups()?;
    if backups.is_empty() {
        io::print_warning("No configuration backups found.");
        return Ok(());
    }
    io::print_info("Available configuration backups:");
    for (idx, name) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", idx + 1, name));
    }
    Ok(())
}

fn restore(context: &mut ShellContext, reference: &str) -> CommandResult {
    let backups = context.config_manager.list_backups()?;
    if backups.is_empty() {
        return Err(CommandError::InvalidArguments(
            "no configuration backups available".into(),
        ));
    }
    let target = if let Ok(index_raw) = reference.parse::<usize>() {
        let index = index_raw.saturating_sub(1);
        backups
            .get(index)
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "configuration backup index {} out of range",
                    reference
                ))
            })?
            .clone()
    } else {
        backups
            .iter()
            .find(|candidate| candidate.contains(reference))
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no configuration backup matches reference `{}`",
                    reference
                ))
            })?
    };

    let restored = context.config_manager.restore(&target)?;
    context.config = restored;
    context.persist_config()?;
    apply_output_config(&context.config);
    io::print_success(format!("Configuration restored from `{}`.", target));
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, CommandError> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        other => Err(CommandError::InvalidArguments(format!(
            "expected true/false, got `{}`",
            other
        ))),
    }
}
