use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "wellpulse-cli", version, about = "WellPulse CLI")]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the page a location fragment points to (e.g. "#/stress")
    Open {
        fragment: String,
    },
    /// Print the page a location fragment resolves to
    Route {
        fragment: String,
    },
    /// List the available modules
    Home {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Breathing and sleep relaxation exercises
    Stress(commands::stress::StressArgs),
    /// Pomodoro timer
    Pomodoro(commands::pomodoro::PomodoroArgs),
    /// Reflex / concentration game
    Concentration(commands::concentration::ConcentrationArgs),
    /// Live mental metrics
    Metrics(commands::metrics::MetricsArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Open { fragment } => commands::route::open(&fragment),
        Commands::Route { fragment } => commands::route::show(&fragment),
        Commands::Home { json } => commands::home::run(json),
        Commands::Stress(args) => commands::stress::run(args),
        Commands::Pomodoro(args) => commands::pomodoro::run(args),
        Commands::Concentration(args) => commands::concentration::run(args),
        Commands::Metrics(args) => commands::metrics::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            commands::completions::run::<Cli>(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
