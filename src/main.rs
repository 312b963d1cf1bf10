use clap::Parser;
use credvault::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    credvault::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::Add {
            ref service,
            ref username,
            ref category,
            ref secret,
        } => commands::add::execute(&cli, service, username, category, secret.as_deref()),
        Commands::List { ref category } => commands::list::execute(&cli, category.as_deref()),
        Commands::Get { ref id } => commands::get::execute(&cli, id),
        Commands::Copy { ref id, username } => commands::copy::execute(&cli, id, username),
        Commands::Remove { ref id, force } => commands::remove::execute(&cli, id, force),
        Commands::Summary => commands::summary::execute(&cli),
        Commands::Shell => commands::shell::execute(&cli),
        #[cfg(feature = "audit-log")]
        Commands::Audit { last, ref since } => {
            commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
