use crate::cli::commands::CommandDefinition;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("exit", "Leave the shell", "exit", cmd_exit),
        CommandDefinition::new("quit", "Leave the shell", "quit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let definition = context.registry.get(&name.to_lowercase()).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown command `{}`", name))
        })?;
        io::print_info(format!("{} — {}", definition.name, definition.description));
        io::print_info(format!("usage: {}", definition.usage));
        return Ok(());
    }

    output::section("Commands");
    for definition in context.registry.iter() {
        io::print_info(format!("  {:<10} {}", definition.name, definition.description));
    }
    io::print_info("Use `help <command>` for usage details.");
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
