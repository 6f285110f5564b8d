use clap::Parser;
use s7n::cli::{Cli, Commands};

/// Environment variable holding the log filter (e.g. `debug`, `s7n=info`).
const LOG_ENV: &str = "S7N_LOG";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => s7n::cli::commands::init::execute(&cli),
        Commands::Import { ref file } => {
            s7n::cli::commands::import_cmd::execute(&cli, file.as_deref())
        }
        Commands::List { ref tag } => s7n::cli::commands::list::execute(&cli, tag.as_deref()),
        Commands::Show { id, reveal } => s7n::cli::commands::show::execute(&cli, id, reveal),
        Commands::Cipher { ref algorithm } => {
            s7n::cli::commands::cipher::execute(&cli, algorithm.as_deref())
        }
    };

    if let Err(e) = result {
        s7n::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
