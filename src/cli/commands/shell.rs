//! `credvault shell`: an interactive session over one unlocked vault.
//!
//! The vault stays decrypted between commands and locks itself once the
//! user has been idle longer than `idle_timeout_secs`.  The idle check
//! runs before every command, so a command typed after the threshold
//! asks for the master password again instead of running.

use std::io::{self, BufRead, Write};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{prepare_vault, Cli, VaultContext};
use crate::errors::{CredVaultError, Result};
use crate::vault::Category;

/// Unlock attempts allowed before the shell gives up.
const MAX_UNLOCK_ATTEMPTS: u32 = 3;

/// One line of shell input.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Add {
        service: String,
        username: String,
        category: Category,
    },
    List(Option<Category>),
    Get(String),
    Copy(String),
    Remove(String),
    Summary,
    Lock,
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    /// Parse a single input line.
    pub fn parse(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Ok(ShellCommand::Empty);
        };

        match (head.to_ascii_lowercase().as_str(), args) {
            ("add", [service, username]) => Ok(ShellCommand::Add {
                service: (*service).to_string(),
                username: (*username).to_string(),
                category: Category::default(),
            }),
            ("add", [service, username, category]) => Ok(ShellCommand::Add {
                service: (*service).to_string(),
                username: (*username).to_string(),
                category: category.parse()?,
            }),
            ("add", _) => Err(usage("add <service> <username> [category]")),
            ("list" | "ls", []) => Ok(ShellCommand::List(None)),
            ("list" | "ls", [category]) => Ok(ShellCommand::List(Some(category.parse()?))),
            ("list" | "ls", _) => Err(usage("list [category]")),
            ("get", [id]) => Ok(ShellCommand::Get((*id).to_string())),
            ("get", _) => Err(usage("get <id>")),
            ("copy" | "cp", [id]) => Ok(ShellCommand::Copy((*id).to_string())),
            ("copy" | "cp", _) => Err(usage("copy <id>")),
            ("remove" | "rm", [id]) => Ok(ShellCommand::Remove((*id).to_string())),
            ("remove" | "rm", _) => Err(usage("remove <id>")),
            ("summary", []) => Ok(ShellCommand::Summary),
            ("lock", []) => Ok(ShellCommand::Lock),
            ("help" | "?", _) => Ok(ShellCommand::Help),
            ("quit" | "exit" | "q", _) => Ok(ShellCommand::Quit),
            (other, _) => Err(CredVaultError::Validation(format!(
                "unknown command '{other}' (type `help` for a list)"
            ))),
        }
    }
}

fn usage(text: &str) -> CredVaultError {
    CredVaultError::Validation(format!("usage: {text}"))
}

/// Execute the `shell` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut ctx = prepare_vault(cli)?;
    unlock_with_retries(&mut ctx)?;

    output::info(&format!(
        "Vault unlocked. Locks after {}s idle. Type `help` for commands.",
        ctx.settings.idle_timeout_secs
    ));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("credvault> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = Zeroizing::new(line?);

        if ctx.vault.expire_if_idle() {
            ctx.audit("auto-lock", None, Some("idle"));
            output::warning("Session locked after inactivity.");
        }

        let command = match ShellCommand::parse(&line) {
            Ok(c) => c,
            Err(e) => {
                output::error(&e.to_string());
                continue;
            }
        };

        match command {
            ShellCommand::Empty => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                print_help();
                continue;
            }
            ShellCommand::Lock => {
                ctx.vault.lock();
                ctx.audit("lock", None, None);
                output::info("Locked.");
                continue;
            }
            _ => {}
        }

        if !ctx.vault.is_unlocked() {
            unlock_with_retries(&mut ctx)?;
        }
        ctx.vault.touch();

        if let Err(e) = run(&mut ctx, command) {
            output::error(&e.to_string());
        }
    }

    ctx.vault.lock();
    ctx.audit("lock", None, Some("shell exit"));
    Ok(())
}

fn unlock_with_retries(ctx: &mut VaultContext) -> Result<()> {
    for attempt in 1..=MAX_UNLOCK_ATTEMPTS {
        match ctx.unlock_interactive() {
            Ok(()) => return Ok(()),
            Err(CredVaultError::AuthenticationFailed) if attempt < MAX_UNLOCK_ATTEMPTS => {
                output::error("Wrong password, try again.");
            }
            Err(e) => return Err(e),
        }
    }
    Err(CredVaultError::AuthenticationFailed)
}

fn run(ctx: &mut VaultContext, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Add {
            service,
            username,
            category,
        } => {
            let secret = Zeroizing::new(
                dialoguer::Password::new()
                    .with_prompt(format!("Password for {service}"))
                    .interact()
                    .map_err(|e| CredVaultError::CommandFailed(format!("input prompt: {e}")))?,
            );
            let record = ctx.vault.add(&service, &username, &secret, category)?;
            ctx.audit("add", Some(&record.id), Some(category.as_str()));
            output::success(&format!("Added {} ({})", record.service, record.id));
        }
        ShellCommand::List(category) => {
            let records = match category {
                Some(c) => ctx.vault.by_category(c)?,
                None => ctx.vault.records()?,
            };
            output::print_records_table(&records);
        }
        ShellCommand::Get(id) => {
            let record = ctx
                .vault
                .get(&id)?
                .ok_or(CredVaultError::RecordNotFound(id.clone()))?;
            ctx.audit("get", Some(&id), None);
            println!("{}", record.secret);
        }
        ShellCommand::Copy(id) => {
            let record = ctx
                .vault
                .get(&id)?
                .ok_or(CredVaultError::RecordNotFound(id.clone()))?;
            super::copy::to_clipboard(&record.secret)?;
            ctx.audit("copy", Some(&id), Some("password"));
            output::success(&format!("Password for {} copied to clipboard", record.service));
        }
        ShellCommand::Remove(id) => {
            if ctx.vault.remove(&id)? {
                ctx.audit("remove", Some(&id), None);
                output::success("Removed.");
            } else {
                output::info(&format!("No credential with id '{id}'."));
            }
        }
        ShellCommand::Summary => {
            let counts = ctx.vault.category_counts()?;
            output::print_summary(&counts);
        }
        ShellCommand::Lock | ShellCommand::Help | ShellCommand::Quit | ShellCommand::Empty => {}
    }
    Ok(())
}

fn print_help() {
    println!("  add <service> <username> [category]   add a credential (prompts for password)");
    println!("  list [category]                        list credentials, passwords masked");
    println!("  get <id>                               print a password");
    println!("  copy <id>                              copy a password to the clipboard");
    println!("  remove <id>                            remove a credential");
    println!("  summary                                count credentials per category");
    println!("  lock                                   lock now");
    println!("  quit                                   lock and leave");
}
