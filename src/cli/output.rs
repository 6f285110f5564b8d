//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::model::Entry;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (ID, Name, Tags).
pub fn print_entries_table<'a, I>(entries: I)
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Tags"]);

    let mut rows = 0;
    for entry in entries {
        table.add_row(vec![
            entry.id().map(|id| id.to_string()).unwrap_or_default(),
            entry.name().unwrap_or_default().to_string(),
            entry.tags().join(", "),
        ]);
        rows += 1;
    }

    if rows == 0 {
        info("No entries in this vault yet.");
        tip("Run `s7n import` to bring in a GPass file.");
        return;
    }

    println!("{table}");
}

/// Print the attributes of one entry. Secret values are masked unless
/// `reveal` is set.
pub fn print_entry(entry: &Entry, reveal: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Attribute", "Value"]);

    for attr in entry.attributes() {
        let masked = attr.is_secret() && !reveal;
        table.add_row(vec![attr.name().to_string(), attr.display(masked)]);
    }

    println!("{table}");
    if !entry.tags().is_empty() {
        println!("{} {}", style("tags:").dim(), entry.tags().join(", "));
    }
}
