use clap::{ArgAction, Parser, Subcommand};

mod commands;
mod logging;
mod render;

#[derive(Parser)]
#[command(name = "valentine", version, about = "Valentine proposal player")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the proposal interactively in the terminal
    Play(commands::play::PlayArgs),
    /// Run a scripted session on a virtual clock and print its events
    Simulate(commands::simulate::SimulateArgs),
    /// Inspect labels, emphasis, anchor geometry and confetti
    Inspect {
        #[command(subcommand)]
        action: commands::inspect::InspectAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Inspect { action } => commands::inspect::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
