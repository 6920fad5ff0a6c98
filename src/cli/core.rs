//! Shell context, dispatch, and the lookups shared by command handlers.

use std::{io, path::PathBuf, sync::Arc};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::Services,
    domain::{BudgetItem, Expense, Identifiable, NamedEntity, ParentTask, SubTask, User},
    errors::CoreError,
    storage::JsonStore,
    utils::paths::PathResolver,
};

use super::commands;
use super::output;
use super::registry::CommandRegistry;

pub use crate::errors::CliError;

const SUGGESTION_DISTANCE: usize = 3;

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

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub services: Arc<Services>,
    pub config: Config,
    pub store_path: PathBuf,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Opens the store and configuration under the application home directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = PathResolver::base_dir();
        let config = ConfigManager::with_base_dir(base.clone())?.load()?;
        let store = Arc::new(JsonStore::open_in(&PathResolver::data_dir_in(&base))?);
        let store_path = store.path().to_path_buf();
        let services = Services::new(store, &config);
        tracing::debug!(store = %store_path.display(), "shell context ready");
        Ok(Self::with_services(mode, services, config, store_path))
    }

    pub fn with_services(
        mode: CliMode,
        services: Services,
        config: Config,
        store_path: PathBuf,
    ) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        Self {
            mode,
            registry,
            services: Arc::new(services),
            config,
            store_path,
            last_command: None,
            running: true,
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        "interreg> ".to_string()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
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
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(name) = self.registry.closest(input, SUGGESTION_DISTANCE) {
            output::info(format!("Suggestion: `{name}`?"));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(CoreError::Storage(message)) => {
                Err(CliError::Core(CoreError::Storage(message)))
            }
            other => {
                output::error(other.to_string());
                Ok(())
            }
        }
    }

    /// Finds a task by id or exact title.
    pub(crate) fn resolve_task(&self, key: &str) -> Result<ParentTask, CommandError> {
        lookup(self.services.tasks.tasks()?, "task", key)
    }

    /// Finds a subtask by id or exact title across every task.
    pub(crate) fn resolve_subtask(&self, key: &str) -> Result<SubTask, CommandError> {
        let mut subtasks = Vec::new();
        for task in self.services.tasks.tasks()? {
            subtasks.extend(self.services.tasks.subtasks(task.id)?);
        }
        lookup(subtasks, "subtask", key)
    }

    pub(crate) fn resolve_budget_item(&self, key: &str) -> Result<BudgetItem, CommandError> {
        lookup(self.services.budgets.budget_items()?, "budget item", key)
    }

    pub(crate) fn resolve_user(&self, key: &str) -> Result<User, CommandError> {
        lookup(self.services.users.users()?, "user", key)
    }

    pub(crate) fn resolve_expense(&self, key: &str) -> Result<Expense, CommandError> {
        let id = Uuid::parse_str(key).map_err(|_| {
            CommandError::InvalidArguments(format!("`{key}` is not an expense id"))
        })?;
        Ok(self.services.expenses.expense(id)?)
    }
}

/// Picks the single entry whose id or name equals `key`.
fn lookup<T>(candidates: Vec<T>, what: &str, key: &str) -> Result<T, CommandError>
where
    T: Identifiable + NamedEntity,
{
    let id = Uuid::parse_str(key).ok();
    let mut matches: Vec<T> = candidates
        .into_iter()
        .filter(|entry| Some(entry.id()) == id || entry.name() == key)
        .collect();
    match matches.len() {
        0 => Err(CommandError::InvalidArguments(format!(
            "no {what} named `{key}`"
        ))),
        1 => Ok(matches.remove(0)),
        n => Err(CommandError::InvalidArguments(format!(
            "{n} entries match {what} `{key}`; use its id instead"
        ))),
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<Decimal, CommandError> {
    input
        .parse::<Decimal>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{input}`")))
}

pub(crate) fn parse_count(input: &str, what: &str) -> Result<u32, CommandError> {
    input.parse::<u32>().map_err(|_| {
        CommandError::InvalidArguments(format!("{what} must be a whole number, got `{input}`"))
    })
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn context() -> ShellContext {
        let config = Config::default();
        let services = Services::new(Arc::new(MemoryStore::new()), &config);
        ShellContext::with_services(CliMode::Script, services, config, PathBuf::new())
    }

    #[test]
    fn resolves_task_by_title_or_id() {
        let ctx = context();
        let task = ctx
            .services
            .tasks
            .create_task(crate::core::NewTask {
                title: "Steering committee".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ctx.resolve_task("Steering committee").unwrap().id, task.id);
        assert_eq!(ctx.resolve_task(&task.id.to_string()).unwrap().id, task.id);
        assert!(matches!(
            ctx.resolve_task("Unknown"),
            Err(CommandError::InvalidArguments(_))
        ));
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let ctx = context();
        ctx.services.users.register_user("Ana", "manager").unwrap();
        ctx.services.users.register_user("Ana", "partner").unwrap();
        let err = ctx.resolve_user("Ana").unwrap_err();
        assert!(err.to_string().contains("use its id"));
    }

    #[test]
    fn unknown_command_keeps_loop_running() {
        let mut ctx = context();
        let control = ctx.dispatch("genrate", "genrate", &[]).unwrap();
        assert_eq!(control, LoopControl::Continue);
    }

    #[test]
    fn exit_command_stops_loop() {
        let mut ctx = context();
        assert_eq!(ctx.dispatch("exit", "exit", &[]).unwrap(), LoopControl::Exit);
    }
}
