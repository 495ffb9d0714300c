//! Shell context, dispatch, and error reporting.

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::services::{CategoryEditor, ServiceError},
    core::world_manager::WorldManager,
    domain::world::World,
    errors::CodexError,
    storage::JsonStorage,
};

use super::commands::{self, CommandRegistry};
use super::io as cli_io;
use super::output::{self, OutputPreferences};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Errors that abort the shell itself rather than a single command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Codex(#[from] CodexError),
}

/// Errors surfaced by individual commands; reported and recoverable.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("no world loaded")]
    WorldNotLoaded,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Codex(#[from] CodexError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) manager: WorldManager,
    pub(crate) config: Config,
    pub(crate) config_manager: ConfigManager,
    pub(crate) editor: CategoryEditor,
    pub(crate) theme: ColorfulTheme,
    pub(crate) dirty: bool,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let registry = CommandRegistry::new(commands::all_definitions());

        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        apply_output_config(&config);

        let storage = JsonStorage::new(None, Some(config.backup_retention))?;
        let manager = WorldManager::new(Box::new(storage));

        let mut context = ShellContext {
            mode,
            registry,
            manager,
            config,
            config_manager,
            editor: CategoryEditor::new(),
            theme: ColorfulTheme::default(),
            dirty: false,
            running: true,
        };
        context.auto_load_last();
        Ok(context)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive || self.manager.current.is_some() {
            return;
        }
        let Some(name) = self.config.last_opened_world.clone() else {
            return;
        };
        match self.manager.load(&name) {
            Ok(report) => {
                self.report_load(&report.warnings);
                cli_io::print_success(format!("Automatically loaded last world `{}`.", name));
            }
            Err(err) => {
                tracing::debug!(world = %name, %err, "auto-load of last world skipped");
            }
        }
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn prompt(&self) -> String {
        match self.manager.current.as_ref() {
            Some(world) => format!("{}> ", world.name),
            None => "codex> ".into(),
        }
    }

    pub(crate) fn world(&self) -> Result<&World, CommandError> {
        self.manager.current.as_ref().ok_or(CommandError::WorldNotLoaded)
    }

    pub(crate) fn report_load(&self, warnings: &[String]) {
        for warning in warnings {
            cli_io::print_warning(warning);
        }
    }

    /// Yes/no confirmation; script mode answers yes without prompting.
    pub(crate) fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, default)
    }

    pub(crate) fn update_last_opened(&mut self, name: Option<&str>) -> CommandResult {
        self.config.last_opened_world = name.map(|value| value.to_string());
        self.config_manager.save(&self.config)?;
        self.manager.record_last_opened(name)?;
        Ok(())
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(definition) = self.registry.get(command) {
            match (definition.handler)(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        let (prompt, default) = if self.dirty {
            ("Exit with unsaved changes?", false)
        } else {
            ("Exit shell?", true)
        };
        match cli_io::confirm_action(&self.theme, prompt, default) {
            Ok(answer) => Ok(answer),
            Err(_) => Ok(false),
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_info("Use `help <command>` for usage details.");
            }
            CommandError::WorldNotLoaded => {
                cli_io::print_error("No world loaded. Use `world new` or `world open` first.");
                cli_io::print_info("Try `world new Aldmere` to get started.");
            }
            other => {
                cli_io::print_error(other.to_string());
            }
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }
}

pub(crate) fn apply_output_config(config: &Config) {
    output::set_preferences(OutputPreferences {
        quiet: config.quiet,
        plain: config.theme.as_deref() == Some("plain"),
    });
}
