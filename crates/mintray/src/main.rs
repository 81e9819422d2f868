mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mintray",
    version,
    about = "Minimize any window to the notification area or a popup menu"
)]
struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon in the foreground (Ctrl+C restores every window and exits)
    Run,
    /// List the current top-level windows
    List {
        /// Include hidden and tool windows
        #[arg(long)]
        all: bool,
    },
    /// Create the default settings file
    Init,
    /// Validate the settings file and print every problem found
    Check,
    /// Parse a hotkey and print its normalized form
    Hotkey {
        /// The hotkey, e.g. `ctrl alt m`
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Commands::Run => commands::run::execute(config),
        Commands::List { all } => commands::list::execute(all),
        Commands::Init => commands::init::execute(config),
        Commands::Check => commands::check::execute(config),
        Commands::Hotkey { text } => commands::hotkey::execute(&text.join(" ")),
    }
}
