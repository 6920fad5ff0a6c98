//! Command handlers registered with the shell.

use crate::api::{self, AppState};
use crate::core::{NewTask, RegenerationReport};
use crate::domain::common::DISPLAY_DATE_FORMAT;
use crate::domain::{
    ApprovalDecision, Displayable, RecurrenceKind, RecurrenceSpec, SubTaskStatus,
};

use super::core::{
    parse_amount, parse_count, parse_date, short_id, CommandError, CommandResult, ShellContext,
};
use super::help;
use super::output;
use super::registry::{CommandEntry, CommandGroup, CommandRegistry};

pub fn register_all(registry: &mut CommandRegistry) {
    use CommandGroup::{Budget, System, Tasks, Users};

    for entry in [
        CommandEntry::new("help", System, "Show available commands", &["help [command]"], cmd_help),
        CommandEntry::new("version", System, "Show build information", &["version"], cmd_version),
        CommandEntry::new(
            "user",
            Users,
            "Register or list users",
            &["user add <name> <role>", "user list"],
            cmd_user,
        ),
        CommandEntry::new(
            "task",
            Tasks,
            "Create or list parent tasks",
            &[
                "task add <title> [--start YYYY-MM-DD] [--end YYYY-MM-DD] [--kind KIND] [--interval N] [--frequency N]",
                "task list",
            ],
            cmd_task,
        ),
        CommandEntry::new(
            "recur",
            Tasks,
            "Replace a task's recurrence and regenerate its subtasks",
            &["recur <task> <KIND> [interval] [frequency]"],
            cmd_recur,
        ),
        CommandEntry::new(
            "generate",
            Tasks,
            "Regenerate a task's subtasks from its recurrence",
            &["generate <task>"],
            cmd_generate,
        ),
        CommandEntry::new("subtasks", Tasks, "List a task's subtasks", &["subtasks <task>"], cmd_subtasks),
        CommandEntry::new("complete", Tasks, "Mark a subtask completed", &["complete <subtask>"], cmd_complete),
        CommandEntry::new("reopen", Tasks, "Mark a subtask pending again", &["reopen <subtask>"], cmd_reopen),
        CommandEntry::new(
            "budget",
            Budget,
            "Create, list, or inspect budget items",
            &["budget add <name> <planned>", "budget list", "budget show <item>"],
            cmd_budget,
        ),
        CommandEntry::new(
            "expense",
            Budget,
            "Submit or inspect expenses",
            &["expense submit <item> <amount> [description]", "expense show <expense-id>"],
            cmd_expense,
        ),
        CommandEntry::new(
            "approve",
            Budget,
            "Record an approval on an expense",
            &["approve <expense-id> <user> [comment]"],
            cmd_approve,
        ),
        CommandEntry::new(
            "reject",
            Budget,
            "Record a rejection on an expense",
            &["reject <expense-id> <user> [comment]"],
            cmd_reject,
        ),
        CommandEntry::new("serve", System, "Start the HTTP API", &["serve [address]"], cmd_serve),
        CommandEntry::new("exit", System, "Leave the shell", &["exit"], cmd_exit),
    ] {
        registry.register(entry);
    }
}

fn usage_error(ctx: &ShellContext, command: &str) -> CommandError {
    let usage = ctx
        .registry
        .get(command)
        .map(|entry| entry.usage_line())
        .unwrap_or_default();
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

fn cmd_help(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(name) => match ctx.registry.get(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => ctx.suggest_command(name),
        },
        None => help::print_overview(&ctx.registry),
    }
    Ok(())
}

fn cmd_version(_ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(format!(
        "interreg_core {} (build {} {}, {} profile, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("INTERREG_CORE_BUILD_HASH"),
        env!("INTERREG_CORE_BUILD_STATUS"),
        env!("INTERREG_CORE_BUILD_PROFILE"),
        env!("INTERREG_CORE_BUILD_TIMESTAMP"),
    ));
    Ok(())
}

fn cmd_user(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["add", name, role] => {
            let user = ctx.services.users.register_user(name, role)?;
            output::success(format!(
                "Registered user `{}` ({}) with id {}",
                user.name, user.role, user.id
            ));
            Ok(())
        }
        ["list"] => {
            let users = ctx.services.users.users()?;
            let levels = ctx.services.expenses.levels();
            let rows: Vec<Vec<String>> = users
                .iter()
                .map(|user| {
                    vec![
                        short_id(user.id),
                        user.name.clone(),
                        user.role.clone(),
                        levels
                            .level_for(&user.role)
                            .map(|level| level.to_string())
                            .unwrap_or_else(|| "-".into()),
                    ]
                })
                .collect();
            output::section("Users");
            output::table(&["ID", "NAME", "ROLE", "LEVEL"], &rows);
            Ok(())
        }
        _ => Err(usage_error(ctx, "user")),
    }
}

fn cmd_task(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["add", title, rest @ ..] => {
            let input = parse_task_flags(title, rest)?;
            let task = ctx.services.tasks.create_task(input)?;
            output::success(format!("Created task `{}` with id {}", task.title, task.id));
            Ok(())
        }
        ["list"] => {
            let window = ctx.services.tasks.program_window();
            let rows: Vec<Vec<String>> = ctx
                .services
                .tasks
                .tasks()?
                .iter()
                .map(|task| {
                    let span = task.window(window);
                    vec![
                        short_id(task.id),
                        task.title.clone(),
                        span.start.to_string(),
                        span.end.to_string(),
                        task.recurrence
                            .as_ref()
                            .map(RecurrenceSpec::label)
                            .unwrap_or_else(|| "-".into()),
                    ]
                })
                .collect();
            output::section("Tasks");
            output::table(&["ID", "TITLE", "START", "END", "RECURRENCE"], &rows);
            Ok(())
        }
        _ => Err(usage_error(ctx, "task")),
    }
}

fn parse_task_flags(title: &str, flags: &[&str]) -> Result<NewTask, CommandError> {
    let mut input = NewTask {
        title: title.to_string(),
        ..NewTask::default()
    };
    let mut spec: Option<RecurrenceSpec> = None;
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        let value = iter.next().ok_or_else(|| {
            CommandError::InvalidArguments(format!("flag `{flag}` needs a value"))
        })?;
        match *flag {
            "--start" => input.start_date = Some(parse_date(value)?),
            "--end" => input.end_date = Some(parse_date(value)?),
            "--kind" => {
                let kind = RecurrenceKind::parse(value);
                spec = Some(match spec {
                    Some(existing) => RecurrenceSpec { kind, ..existing },
                    None => RecurrenceSpec::new(kind),
                });
            }
            "--interval" => {
                let interval = parse_count(value, "interval")?;
                spec = Some(
                    spec.unwrap_or_else(|| RecurrenceSpec::new(RecurrenceKind::Monthly))
                        .with_interval(interval),
                );
            }
            "--frequency" => {
                let frequency = parse_count(value, "frequency")?;
                spec = Some(
                    spec.unwrap_or_else(|| RecurrenceSpec::new(RecurrenceKind::Monthly))
                        .with_frequency(frequency),
                );
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown flag `{other}`"
                )))
            }
        }
    }
    input.recurrence = spec;
    Ok(input)
}

fn report_generation(report: &RegenerationReport) {
    output::success(format!(
        "Generated {} subtasks between {} and {} (replaced {}).",
        report.count(),
        report.window.start,
        report.window.end,
        report.removed
    ));
    if report.truncated {
        output::warning("Schedule was cut short by the due-date safety cap.");
    }
    for failure in &report.failed {
        output::warning(format!(
            "Could not create the subtask due {}: {}",
            failure.due_date, failure.reason
        ));
    }
}

fn cmd_recur(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (task, kind, rest) = match args {
        [task, kind, rest @ ..] if rest.len() <= 2 => (*task, *kind, rest),
        _ => return Err(usage_error(ctx, "recur")),
    };
    let mut spec = RecurrenceSpec::new(RecurrenceKind::parse(kind));
    if let Some(interval) = rest.first() {
        spec = spec.with_interval(parse_count(interval, "interval")?);
    }
    if let Some(frequency) = rest.get(1) {
        spec = spec.with_frequency(parse_count(frequency, "frequency")?);
    }
    let task = ctx.resolve_task(task)?;
    let report = ctx.services.tasks.set_recurrence(task.id, spec)?;
    report_generation(&report);
    Ok(())
}

fn cmd_generate(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [task] = args else {
        return Err(usage_error(ctx, "generate"));
    };
    let task = ctx.resolve_task(task)?;
    let report = ctx.services.tasks.regenerate_subtasks(task.id)?;
    report_generation(&report);
    Ok(())
}

fn cmd_subtasks(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [task] = args else {
        return Err(usage_error(ctx, "subtasks"));
    };
    let task = ctx.resolve_task(task)?;
    let subtasks = ctx.services.tasks.subtasks(task.id)?;
    let rows: Vec<Vec<String>> = subtasks
        .iter()
        .map(|subtask| {
            vec![
                short_id(subtask.id),
                subtask.due_date.format(DISPLAY_DATE_FORMAT).to_string(),
                match subtask.status {
                    SubTaskStatus::Pending => "PENDING".into(),
                    SubTaskStatus::Completed => "COMPLETED".into(),
                },
                subtask.title.clone(),
            ]
        })
        .collect();
    output::section(format!("{} ({} subtasks)", task.display_label(), subtasks.len()));
    output::table(&["ID", "DUE", "STATUS", "TITLE"], &rows);
    Ok(())
}

fn change_subtask(
    ctx: &mut ShellContext,
    args: &[&str],
    command: &str,
    status: SubTaskStatus,
) -> CommandResult {
    let [key] = args else {
        return Err(usage_error(ctx, command));
    };
    let subtask = ctx.resolve_subtask(key)?;
    let updated = ctx.services.tasks.set_subtask_status(subtask.id, status)?;
    output::success(format!(
        "`{}` is now {}.",
        updated.title,
        match updated.status {
            SubTaskStatus::Pending => "pending",
            SubTaskStatus::Completed => "completed",
        }
    ));
    Ok(())
}

fn cmd_complete(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    change_subtask(ctx, args, "complete", SubTaskStatus::Completed)
}

fn cmd_reopen(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    change_subtask(ctx, args, "reopen", SubTaskStatus::Pending)
}

fn cmd_budget(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let currency = ctx.config.currency.clone();
    match args {
        ["add", name, planned] => {
            let item = ctx
                .services
                .budgets
                .create_budget_item(*name, parse_amount(planned)?)?;
            output::success(format!(
                "Created budget item `{}` planning {} {} with id {}",
                item.name, item.planned_amount, currency, item.id
            ));
            Ok(())
        }
        ["list"] => {
            let rows: Vec<Vec<String>> = ctx
                .services
                .budgets
                .budget_items()?
                .iter()
                .map(|item| {
                    vec![
                        short_id(item.id),
                        item.name.clone(),
                        item.planned_amount.to_string(),
                        item.spent_amount.to_string(),
                        item.remaining().to_string(),
                    ]
                })
                .collect();
            output::section(format!("Budget items ({currency})"));
            output::table(&["ID", "NAME", "PLANNED", "SPENT", "REMAINING"], &rows);
            Ok(())
        }
        ["show", key] => {
            let item = ctx.resolve_budget_item(key)?;
            let status = ctx.services.budgets.status(item.id)?;
            output::section(format!("Budget item `{}`", status.item.name));
            output::info(format!("Planned:   {} {currency}", status.item.planned_amount));
            output::info(format!("Spent:     {} {currency}", status.item.spent_amount));
            output::info(format!("Remaining: {} {currency}", status.remaining));
            if let Some(percent) = status.utilization_percent {
                output::info(format!("Used:      {percent}%"));
            }
            output::info(format!(
                "Pending:   {} {currency} across {} expense(s)",
                status.pending_exposure, status.pending_count
            ));
            output::info(format!(
                "Approved:  {} expense(s), rejected: {}",
                status.approved_count, status.rejected_count
            ));
            if status.over_budget {
                output::warning("Spending exceeds the planned amount.");
            }
            Ok(())
        }
        _ => Err(usage_error(ctx, "budget")),
    }
}

fn cmd_expense(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["submit", item, amount, description @ ..] => {
            let item = ctx.resolve_budget_item(item)?;
            let expense = ctx.services.expenses.submit_expense(
                item.id,
                parse_amount(amount)?,
                description.join(" "),
            )?;
            output::success(format!(
                "Submitted expense {} for {} against `{}` (PENDING).",
                expense.id, expense.amount, item.name
            ));
            Ok(())
        }
        ["show", key] => {
            let expense = ctx.resolve_expense(key)?;
            output::section(format!("Expense {}", expense.id));
            output::info(format!("Amount:      {}", expense.amount));
            output::info(format!("Status:      {}", expense.status));
            if !expense.description.is_empty() {
                output::info(format!("Description: {}", expense.description));
            }
            let rows: Vec<Vec<String>> = expense
                .approvals
                .iter()
                .map(|approval| {
                    vec![
                        short_id(approval.approver_id),
                        approval.approver_level.to_string(),
                        approval.status.to_string(),
                        approval.comment.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            output::table(&["APPROVER", "LEVEL", "DECISION", "COMMENT"], &rows);
            Ok(())
        }
        _ => Err(usage_error(ctx, "expense")),
    }
}

fn decide(
    ctx: &mut ShellContext,
    args: &[&str],
    command: &str,
    decision: ApprovalDecision,
) -> CommandResult {
    let (expense, user, comment) = match args {
        [expense, user, comment @ ..] => (*expense, *user, comment.join(" ")),
        _ => return Err(usage_error(ctx, command)),
    };
    let expense = ctx.resolve_expense(expense)?;
    let user = ctx.resolve_user(user)?;
    let comment = (!comment.is_empty()).then_some(comment);
    let result = ctx
        .services
        .expenses
        .submit_approval(expense.id, user.id, decision, comment)?;
    output::success(format!(
        "Recorded {} by `{}` (level {}). Expense is {}.",
        result.approval.status, user.name, result.approval.approver_level, result.expense.status
    ));
    if result.transitioned {
        output::info(format!(
            "Budget item `{}` has spent {} of {}.",
            result.budget_item.name,
            result.budget_item.spent_amount,
            result.budget_item.planned_amount
        ));
    }
    Ok(())
}

fn cmd_approve(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    decide(ctx, args, "approve", ApprovalDecision::Approved)
}

fn cmd_reject(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    decide(ctx, args, "reject", ApprovalDecision::Rejected)
}

fn cmd_serve(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let addr = match args {
        [] => ctx.config.bind_addr.clone(),
        [addr] => addr.to_string(),
        _ => return Err(usage_error(ctx, "serve")),
    };
    let state = AppState {
        services: ctx.services.clone(),
    };
    output::info(format!("Serving the HTTP API on {addr}. Press Ctrl+C to stop."));
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(&addr, state))?;
    Ok(())
}

fn cmd_exit(_ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Exiting shell.");
    Err(CommandError::ExitRequested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_flags_build_recurrence() {
        let input = parse_task_flags(
            "Report",
            &["--start", "2025-01-01", "--kind", "monthly", "--interval", "4"],
        )
        .unwrap();
        let spec = input.recurrence.unwrap();
        assert_eq!(spec.kind, RecurrenceKind::Monthly);
        assert_eq!(spec.interval, 4);
        assert_eq!(input.start_date.unwrap().to_string(), "2025-01-01");
    }

    #[test]
    fn dangling_flag_is_rejected() {
        assert!(parse_task_flags("Report", &["--end"]).is_err());
        assert!(parse_task_flags("Report", &["--colour", "red"]).is_err());
    }
}
