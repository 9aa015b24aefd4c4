mod scenario;
mod viewer;

use clap::{Parser, Subcommand};
use partisim_core::run_headless;
use scenario::ScenarioArgs;

#[derive(Parser)]
#[command(name = "partisim")]
#[command(about = "Partisim - a 2-D circular particle collision simulator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario without a window and print a summary
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Number of fixed steps to simulate
        #[arg(short, long, default_value_t = 600)]
        steps: u64,

        /// Print the resolved scenario as JSON and exit
        #[arg(long)]
        print_config: bool,
    },
    /// Open an interactive window
    View {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG still takes precedence over the command-line level
    let env = env_logger::Env::default().default_filter_or(log_filter(&cli));
    env_logger::Builder::from_env(env).init();

    let result = match cli.command {
        Commands::Run {
            scenario,
            steps,
            print_config,
        } => run(&scenario, steps, print_config),
        Commands::View { scenario } => viewer::run_viewer(scenario),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn log_filter(cli: &Cli) -> &'static str {
    match (cli.verbose, cli.quiet) {
        (0, true) => "error",
        (0, false) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    }
}

fn run(
    scenario: &ScenarioArgs,
    steps: u64,
    print_config: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = scenario.resolve()?;
    if print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let result = run_headless(&config, steps)?;

    println!("particles      = {}", result.particle_count);
    println!("steps          = {}", result.steps);
    println!("momentum       = ({:.4}, {:.4})", result.momentum.x, result.momentum.y);
    println!("kinetic energy = {:.4}", result.kinetic_energy);
    println!("contacts       = {}", result.anomalies.contacts);
    println!("repaired       = {}", result.anomalies.repaired);
    println!("coincident     = {}", result.anomalies.coincident);

    Ok(())
}
