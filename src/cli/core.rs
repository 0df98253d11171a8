//! Shell context, dispatch and error reporting.

use std::{cell::RefCell, io, path::PathBuf, rc::Rc};

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::{Config, ConfigManager},
    errors::AssetError,
    portfolio::Portfolio,
    storage::JsonAssetStore,
};

use super::commands::{self, CommandDefinition};
use super::fields::{CliKind, KindName};
use super::io as cli_io;

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

/// Failures that end the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Command failed: {0}")]
    Command(String),
}

/// Failures of a single command; reported and the shell carries on.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) portfolio: Portfolio,
    pub(crate) store: Rc<RefCell<JsonAssetStore>>,
    pub(crate) config: Config,
    pub(crate) config_manager: ConfigManager,
    pub(crate) theme: ColorfulTheme,
    pub(crate) running: bool,
}

impl ShellContext {
    /// Loads configuration from the application data directory, opens the asset
    /// store it points at and performs the initial refresh.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let store_path = config_manager.store_path(&config);
        let store = Rc::new(RefCell::new(JsonAssetStore::open(&store_path)?));
        info!("asset store opened at {}", store_path.display());

        let mut context = ShellContext {
            mode,
            portfolio: Portfolio::backed_by(Rc::clone(&store)),
            store,
            config,
            config_manager,
            theme: ColorfulTheme::default(),
            running: true,
        };
        if !context.portfolio.refresh_all() {
            context.report_controller_errors();
        }
        Ok(context)
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn store_path(&self) -> Option<PathBuf> {
        self.store.borrow().path().map(|path| path.to_path_buf())
    }

    pub(crate) fn prompt(&self) -> String {
        let open: Vec<&str> = KindName::ALL
            .iter()
            .filter(|kind| self.editor_open(**kind))
            .map(KindName::as_str)
            .collect();
        if open.is_empty() {
            "assets> ".to_string()
        } else {
            format!("assets [{}]> ", open.join(","))
        }
    }

    fn editor_open(&self, kind: KindName) -> bool {
        match kind {
            KindName::Cash => self.portfolio.cash_accounts.is_editor_open(),
            KindName::Holdings => self.portfolio.holdings.is_editor_open(),
            KindName::Fixed => self.portfolio.fixed_assets.is_editor_open(),
            KindName::Liabilities => self.portfolio.liabilities.is_editor_open(),
            KindName::Other => self.portfolio.other_assets.is_editor_open(),
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        commands::registry().names().collect()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(definition) = commands::registry().get(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        debug!("dispatching `{}` with {} argument(s)", definition.name, args.len());
        let outcome = (definition.handler)(self, args);
        self.report_controller_errors();
        match outcome {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn command(&self, name: &str) -> Option<&'static CommandDefinition> {
        commands::registry().get(name)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = commands::registry()
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
        cli_io::confirm_action(&self.theme, "Exit shell?", true)
            .map_err(|err| CliError::Command(err.to_string()))
    }

    /// Asks before a destructive change unless the configuration or mode says not to.
    pub(crate) fn confirm_destructive(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script || !self.config.confirm_destructive {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }

    /// Prints whatever the controllers put in their error slot, then clears it.
    pub(crate) fn report_controller_errors(&mut self) {
        report_and_clear(&mut self.portfolio.cash_accounts);
        report_and_clear(&mut self.portfolio.holdings);
        report_and_clear(&mut self.portfolio.fixed_assets);
        report_and_clear(&mut self.portfolio.liabilities);
        report_and_clear(&mut self.portfolio.other_assets);
    }
}

fn report_and_clear<K: CliKind>(controller: &mut crate::sync::CollectionController<K>) {
    if let Some(message) = controller.error_message() {
        cli_io::print_error(format!("[{}] {}", K::NAME, message));
        controller.clear_error();
    }
}
