use std::process;

use clap::{Parser, Subcommand};

use devsim::models::{PeriodicGenerator, SampleRecorder, SampleSink};
use devsim::{
    AbstractSimulator, ConcurrencyMode, Coordinator, Coupled, Model, SimulationConfig,
};

#[derive(Parser)]
#[command(name = "devsim", about = "Hierarchical discrete-event simulation runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a built-in model until the given virtual end time
    Run {
        /// Built-in model name (currently only "periodic")
        model: String,
        /// Virtual end time; events strictly before this time are executed
        end_time: f64,
        /// Delay before the generator's first emission
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        /// Time between emissions
        #[arg(long, default_value_t = 1.0)]
        period: f64,
        /// Seed for the generator's random source
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Fan the lambda and transition phases out over worker threads
        #[arg(long)]
        parallel: bool,
        /// Print the collected samples as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli.command) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Run {
            model,
            end_time,
            start,
            period,
            seed,
            parallel,
            json,
        } => {
            if model != "periodic" {
                return Err(format!("unknown model '{model}', expected 'periodic'").into());
            }

            let sink = SampleSink::new();
            let mut root = Coupled::new("Example");
            root.add_component(Model::atomic(PeriodicGenerator::new(
                "Sensor", start, period, seed,
            )?))?;
            root.add_component(Model::atomic(SampleRecorder::new("Scope", sink.clone())?))?;
            root.add_coupling(
                "Sensor",
                PeriodicGenerator::PORT_OUT,
                "Scope",
                SampleRecorder::PORT_IN,
            )?;

            let mode = if parallel {
                ConcurrencyMode::Rayon
            } else {
                ConcurrencyMode::Sequential
            };
            let config = SimulationConfig::new().with_concurrency(mode);

            let mut coordinator = Coordinator::new(root, config);
            coordinator.initialize(0.0);
            coordinator.simulate(end_time)?;
            coordinator.exit();

            let samples = sink.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&samples)?);
            } else {
                for sample in &samples {
                    println!("t={:<10} value={}", sample.time, sample.value);
                }
                println!("{} samples recorded", samples.len());
            }
            Ok(())
        }
    }
}
