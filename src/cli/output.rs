//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.  Passwords never pass
//! through the table printers.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{Category, CredentialRecord};

/// What the password column shows instead of the value.
pub const MASK: &str = "********";

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

/// Print credentials as a table (Id, Service, Username, Password, Category, Created).
pub fn print_records_table(records: &[CredentialRecord]) {
    if records.is_empty() {
        info("No credentials here yet.");
        tip("Run `credvault add <SERVICE> <USERNAME>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Id", "Service", "Username", "Password", "Category", "Created",
    ]);

    for r in records {
        table.add_row(vec![
            r.id.clone(),
            r.service.clone(),
            r.username.clone(),
            MASK.to_string(),
            r.category.to_string(),
            r.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print per-category counts followed by the total.
pub fn print_summary(counts: &[(Category, usize)]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Credentials"]);

    for (category, count) in counts {
        table.add_row(vec![category.to_string(), count.to_string()]);
    }

    let total: usize = counts.iter().map(|(_, n)| n).sum();
    println!("{table}");
    println!("{} {total}", style("Total:").bold());
}
