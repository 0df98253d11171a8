use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
    domain::{Identifiable, RecordId},
    sync::{CashAccounts, EditorState, FixedAssets, Holdings, Liabilities, OtherAssets},
    utils::build_info,
};

use super::core::{CommandError, CommandResult, ShellContext};
use super::fields::{apply_assignments, CliKind, KindName};
use super::io;
use super::output::section;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

static REGISTRY: Lazy<CommandRegistry> = Lazy::new(|| CommandRegistry::new(definitions()));

pub fn registry() -> &'static CommandRegistry {
    &REGISTRY
}

fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("list", "List the records of a kind", "list <kind>", cmd_list),
        CommandDefinition::new(
            "refresh",
            "Reload one kind, or every kind, from the store",
            "refresh [kind]",
            cmd_refresh,
        ),
        CommandDefinition::new("new", "Open the editor to create a record", "new <kind>", cmd_new),
        CommandDefinition::new(
            "edit",
            "Open the editor on an existing record",
            "edit <kind> <id>",
            cmd_edit,
        ),
        CommandDefinition::new(
            "submit",
            "Save the open editor with the given fields",
            "submit <kind> field=value...",
            cmd_submit,
        ),
        CommandDefinition::new("remove", "Delete a record", "remove <kind> <id>", cmd_remove),
        CommandDefinition::new("close", "Close the editor of a kind", "close <kind>", cmd_close),
        CommandDefinition::new("status", "Show editors, counts and totals", "status", cmd_status),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

/// Runs a generic handler for the asset kind named on the command line.
macro_rules! with_kind {
    ($kind:expr, $handler:ident ( $($arg:expr),* $(,)? )) => {
        match $kind {
            KindName::Cash => $handler::<CashAccounts>($($arg),*),
            KindName::Holdings => $handler::<Holdings>($($arg),*),
            KindName::Fixed => $handler::<FixedAssets>($($arg),*),
            KindName::Liabilities => $handler::<Liabilities>($($arg),*),
            KindName::Other => $handler::<OtherAssets>($($arg),*),
        }
    };
}

fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("Usage: {}", usage))
}

fn parse_kind(args: &[&str], usage: &str) -> Result<KindName, CommandError> {
    let raw = args.first().ok_or_else(|| usage_error(usage))?;
    raw.parse::<KindName>()
        .map_err(CommandError::InvalidArguments)
}

fn parse_id(args: &[&str], usage: &str) -> Result<RecordId, CommandError> {
    let raw = args.get(1).ok_or_else(|| usage_error(usage))?;
    raw.parse::<RecordId>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{}` is not a record id.", raw)))
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&name) {
            Some(command) => {
                section(format!("Help: {}", command.name));
                io::print_info(format!("  Description: {}", command.description));
                io::print_info(format!("  Usage: {}", command.usage));
                if command.name == "submit" {
                    for kind in KindName::ALL {
                        io::print_info(format!("  {:<12} {}", kind, fields_of(kind).join(", ")));
                    }
                }
            }
            None => context.suggest_command(args[0]),
        }
        return Ok(());
    }

    section("Available commands");
    for command in registry().iter() {
        io::print_info(format!("  {:<10} {}", command.name, command.description));
    }
    let kinds: Vec<&str> = KindName::ALL.iter().map(KindName::as_str).collect();
    io::print_info(format!("Kinds: {}", kinds.join(", ")));
    io::print_info("Use `help <command>` for details.");
    Ok(())
}

fn fields_of(kind: KindName) -> &'static [&'static str] {
    match kind {
        KindName::Cash => CashAccounts::FIELDS,
        KindName::Holdings => Holdings::FIELDS,
        KindName::Fixed => FixedAssets::FIELDS,
        KindName::Liabilities => Liabilities::FIELDS,
        KindName::Other => OtherAssets::FIELDS,
    }
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = parse_kind(args, "list <kind>")?;
    with_kind!(kind, list_kind(context));
    Ok(())
}

fn list_kind<K: CliKind>(context: &ShellContext) {
    let controller = K::controller(&context.portfolio);
    section(format!("{} ({})", K::NAME, controller.items().len()));
    if controller.items().is_empty() {
        io::print_info(format!("No {} records yet.", K::LABEL));
    }
    for record in controller.items() {
        let pending = if controller.is_provisional(record.id()) {
            " (pending)"
        } else {
            ""
        };
        io::print_info(format!("  #{:<5} {}{}", record.id(), K::describe(record), pending));
    }
    match controller.editor() {
        EditorState::Closed => {}
        EditorState::Creating => io::print_hint(format!("Creating a new {}.", K::LABEL)),
        EditorState::Editing(id) => io::print_hint(format!("Editing {} #{}.", K::LABEL, id)),
    }
}

fn cmd_refresh(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        if context.portfolio.refresh_all() {
            io::print_success("Refreshed every asset kind.");
        }
        return Ok(());
    }
    let kind = parse_kind(args, "refresh [kind]")?;
    with_kind!(kind, refresh_kind(context));
    Ok(())
}

fn refresh_kind<K: CliKind>(context: &mut ShellContext) {
    let controller = K::controller_mut(&mut context.portfolio);
    if controller.refresh() {
        io::print_success(format!(
            "Loaded {} {} record(s).",
            controller.items().len(),
            K::NAME
        ));
    }
}

fn cmd_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = parse_kind(args, "new <kind>")?;
    with_kind!(kind, new_kind(context));
    Ok(())
}

fn new_kind<K: CliKind>(context: &mut ShellContext) {
    K::controller_mut(&mut context.portfolio).open_create();
    io::print_info(format!("Creating a new {}. Fields: {}", K::LABEL, K::FIELDS.join(", ")));
    io::print_hint(format!("Use `submit {} field=value ...` to save it.", K::NAME));
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "edit <kind> <id>";
    let kind = parse_kind(args, usage)?;
    let id = parse_id(args, usage)?;
    with_kind!(kind, edit_kind(context, id))
}

fn edit_kind<K: CliKind>(context: &mut ShellContext, id: RecordId) -> CommandResult {
    let record = find_record::<K>(context, id)?;
    if K::controller_mut(&mut context.portfolio).open_edit(&record) {
        io::print_info(format!("Editing {} #{}: {}", K::LABEL, id, K::describe(&record)));
        io::print_hint(format!("Use `submit {} field=value ...` to save changes.", K::NAME));
    }
    Ok(())
}

fn find_record<K: CliKind>(context: &ShellContext, id: RecordId) -> Result<K::Record, CommandError> {
    K::controller(&context.portfolio)
        .get(id)
        .cloned()
        .ok_or_else(|| CommandError::Message(format!("No {} with id {}.", K::LABEL, id)))
}

fn cmd_submit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = parse_kind(args, "submit <kind> field=value...")?;
    with_kind!(kind, submit_kind(context, &args[1..]))
}

enum SubmitStart<I> {
    Input(I),
    Stale,
}

fn submit_kind<K: CliKind>(context: &mut ShellContext, assignments: &[&str]) -> CommandResult {
    let controller = K::controller(&context.portfolio);
    let editing = controller.editor().editing_id();
    let start = match controller.editor() {
        EditorState::Closed => {
            return Err(CommandError::Message(format!(
                "No {} editor is open. Use `new {}` or `edit {} <id>` first.",
                K::LABEL,
                K::NAME,
                K::NAME
            )))
        }
        EditorState::Creating => SubmitStart::Input(K::blank_input()),
        EditorState::Editing(_) => match controller.editing_record() {
            Some(record) => SubmitStart::Input(K::input_from(record)),
            None => SubmitStart::Stale,
        },
    };

    let input = match start {
        SubmitStart::Input(mut input) => {
            apply_assignments::<K>(&mut input, assignments)
                .map_err(CommandError::InvalidArguments)?;
            K::validate(&input).map_err(CommandError::InvalidArguments)?;
            input
        }
        // The controller reports the vanished record itself.
        SubmitStart::Stale => K::blank_input(),
    };

    let controller = K::controller_mut(&mut context.portfolio);
    if controller.submit(&input) {
        let saved = match editing {
            Some(id) => controller.get(id),
            None => controller.items().first(),
        };
        match saved {
            Some(record) => io::print_success(format!(
                "Saved {} #{}: {}",
                K::LABEL,
                record.id(),
                K::describe(record)
            )),
            None => io::print_success(format!("Saved {}.", K::LABEL)),
        }
    }
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "remove <kind> <id>";
    let kind = parse_kind(args, usage)?;
    let id = parse_id(args, usage)?;
    with_kind!(kind, remove_kind(context, id))
}

fn remove_kind<K: CliKind>(context: &mut ShellContext, id: RecordId) -> CommandResult {
    let record = find_record::<K>(context, id)?;
    let prompt = format!("Remove {} #{} ({})?", K::LABEL, id, K::describe(&record));
    if !context.confirm_destructive(&prompt)? {
        io::print_info("Removal cancelled.");
        return Ok(());
    }
    if K::controller_mut(&mut context.portfolio).remove(&record) {
        io::print_success(format!("Removed {} #{}.", K::LABEL, id));
    }
    Ok(())
}

fn cmd_close(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = parse_kind(args, "close <kind>")?;
    with_kind!(kind, close_kind(context));
    Ok(())
}

fn close_kind<K: CliKind>(context: &mut ShellContext) {
    K::controller_mut(&mut context.portfolio).close_editor();
    io::print_info(format!("Closed the {} editor.", K::LABEL));
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    section("Portfolio status");
    io::print_info(format!(
        "  Config       : {}",
        context.config_manager.path().display()
    ));
    if let Some(path) = context.store_path() {
        io::print_info(format!("  Store        : {}", path.display()));
    }
    for kind in KindName::ALL {
        let line = with_kind!(kind, status_line(context));
        io::print_info(line);
    }

    let totals = context.portfolio.totals();
    io::print_info(format!("  Assets       : {:.2} CNY", totals.assets_cny));
    io::print_info(format!("  Liabilities  : {:.2} CNY", totals.liabilities_cny));
    io::print_info(format!("  Net worth    : {:.2} CNY", totals.net_worth_cny));
    if totals.unvalued > 0 {
        io::print_hint(format!(
            "{} record(s) have no CNY value yet and are left out of the totals.",
            totals.unvalued
        ));
    }
    if !context.config.base_currency.is_cny() {
        io::print_hint(format!(
            "Totals are in CNY; configured base currency is {}.",
            context.config.base_currency
        ));
    }
    Ok(())
}

fn status_line<K: CliKind>(context: &ShellContext) -> String {
    let controller = K::controller(&context.portfolio);
    let editor = match controller.editor() {
        EditorState::Closed => "closed".to_string(),
        EditorState::Creating => "creating".to_string(),
        EditorState::Editing(id) => format!("editing #{}", id),
    };
    format!(
        "  {:<12} : {} record(s), editor {}",
        K::NAME,
        controller.items().len(),
        editor
    )
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    section(format!("Asset Tracker {}", meta.version));
    io::print_info(format!("  Build hash   : {} ({})", meta.git_hash, meta.git_status));
    io::print_info(format!("  Built at     : {}", meta.timestamp));
    io::print_info(format!("  Target       : {}", meta.target));
    io::print_info(format!("  Profile      : {}", meta.profile));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
