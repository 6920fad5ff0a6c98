use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandGroup, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    for group in CommandGroup::ALL {
        let mut entries = registry.in_group(group).peekable();
        if entries.peek().is_none() {
            continue;
        }
        output::section(group.title());
        for entry in entries {
            output::info(format!("  {:<10} {}", entry.name, entry.summary));
        }
    }
    output::hint("Use `help <command>` for details.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    output::info(format!("  {}", entry.summary));
    for form in entry.forms {
        output::info(format!("  Usage: {form}"));
    }
}
