pub mod config;
pub mod history;
pub mod tasks;

use crate::config::Config;
use crate::history::History;
use crate::tasks::Task;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use neuroevo_core::random::seeded;
use neuroevo_core::{
    BinaryFileStore, GenomeRecord, GenomeStore, GeneticAlgorithm, JsonFileStore, NeuralNetwork,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "neuroevo")]
#[command(about = "Evolve or train fixed-topology networks on built-in tasks")]
struct Cli {
    /// Path to config.toml (defaults to ~/.neuroevo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log at DEBUG instead of INFO
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population with the genetic algorithm
    Evolve {
        #[arg(long, value_enum, default_value_t = Task::Xor)]
        task: Task,
        /// Overrides run.generations
        #[arg(long)]
        generations: Option<u64>,
        /// Overrides run.seed
        #[arg(long)]
        seed: Option<u64>,
        /// Where to save the best genotype (.bin for binary, anything else JSON)
        #[arg(long, default_value = "best_genome.json")]
        out: PathBuf,
        /// Optional CSV file for per-generation statistics
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Train a single network by back-propagation
    Train {
        #[arg(long, value_enum, default_value_t = Task::Xor)]
        task: Task,
        /// Overrides run.epochs
        #[arg(long)]
        epochs: Option<u64>,
        /// Overrides run.seed
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "trained_genome.json")]
        out: PathBuf,
    },
    /// Print a saved genotype's topology and optionally run it
    Inspect {
        /// Genotype file (.bin for binary, anything else JSON)
        genome: PathBuf,
        /// Comma-separated input values for one forward pass
        #[arg(long)]
        input: Option<String>,
    },
}

fn store_for(path: &Path) -> Box<dyn GenomeStore> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("bin") => Box::new(BinaryFileStore::new(path)),
        _ => Box::new(JsonFileStore::new(path)),
    }
}

fn save_record(path: &Path, record: &GenomeRecord) -> anyhow::Result<()> {
    store_for(path)
        .save(record)
        .with_context(|| format!("saving genome to {}", path.display()))
}

fn evolve(
    config: &Config,
    task: Task,
    generations: u64,
    seed: u64,
    out: &Path,
    history_path: Option<&Path>,
) -> anyhow::Result<()> {
    let mut evolution = config.evolution.clone();
    evolution.topology = task.topology(evolution.topology);

    let mut ga = GeneticAlgorithm::from_seed(evolution, seed)?;
    ga.initialize_population()?;

    let mut evaluator = |net: &mut NeuralNetwork| task.fitness(net);
    let mut history = History::new();
    let mut champion: Option<(f64, GenomeRecord)> = None;
    let log_every = config.run.log_every.max(1);

    for gen in 0..generations {
        ga.evaluate(&mut evaluator);

        if let Some(best) = ga.best_individual() {
            if champion.as_ref().map_or(true, |(f, _)| best.fitness > *f) {
                debug!(generation = gen, fitness = best.fitness, "New champion");
                champion = Some((best.fitness, best.network.to_record()));
            }
        }

        if let Some(target) = config.run.target_fitness {
            if ga.best_fitness() >= target {
                info!(generation = gen, best_fitness = ga.best_fitness(), target, "Target reached");
                break;
            }
        }

        let stats = ga.evolve()?;
        if gen % log_every == 0 {
            info!(
                generation = stats.generation,
                best_fitness = stats.best_fitness,
                mean_fitness = stats.mean_fitness,
                mutation_rate = stats.mutation_rate,
                stagnant = stats.generations_without_improvement,
                "Generation"
            );
        }
        history.push(stats);
    }

    let Some((fitness, record)) = champion else {
        bail!("no generation was evaluated; increase --generations");
    };
    save_record(out, &record)?;
    info!(
        task = ?task,
        fitness,
        generations = history.len(),
        best_generation_fitness = ?history.best_fitness(),
        out = %out.display(),
        "Evolution complete"
    );

    if let Some(path) = history_path {
        if history.is_empty() {
            warn!(path = %path.display(), "No generations recorded, history file will be empty");
        }
        history.export_csv(path)?;
        info!(path = %path.display(), rows = history.len(), "History written");
    }
    Ok(())
}

fn train(config: &Config, task: Task, epochs: u64, seed: u64, out: &Path) -> anyhow::Result<()> {
    let topology = task.topology(config.evolution.topology);
    let mut rng = seeded(seed);
    let mut net = NeuralNetwork::new(topology, &mut rng)?;
    let cases = task.cases();
    let log_every = config.run.log_every.max(1);

    let initial_mse = task.mean_squared_error(&mut net)?;
    info!(task = ?task, weights = net.weight_count(), initial_mse, "Training started");

    for epoch in 0..epochs {
        for case in &cases {
            net.train(&case.input, &case.target)?;
        }
        if epoch % log_every == 0 {
            let mse = task.mean_squared_error(&mut net)?;
            debug!(epoch, mse, "Epoch");
        }
    }

    let mse = task.mean_squared_error(&mut net)?;
    save_record(out, &net.to_record())?;
    info!(epochs, mse, out = %out.display(), "Training complete");
    Ok(())
}

fn inspect(path: &Path, input: Option<&str>) -> anyhow::Result<()> {
    let Some(record) = store_for(path)
        .load()
        .with_context(|| format!("loading genome from {}", path.display()))?
    else {
        bail!("{} does not exist", path.display());
    };
    let mut net = NeuralNetwork::from_record(&record)?;

    println!(
        "hidden_layers={} inputs={} hidden_width={} outputs={} weights={}",
        record.hidden_layer_count,
        record.input_count,
        record.hidden_width,
        record.output_count,
        net.weight_count()
    );

    if let Some(raw) = input {
        let values = raw
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("parsing input '{raw}'"))?;
        if values.len() != net.input_count() {
            bail!(
                "network expects {} inputs, got {}",
                net.input_count(),
                values.len()
            );
        }
        let outputs = net.forward(&values)?;
        println!("outputs={outputs:?}");
    }
    Ok(())
}

fn init_logging(json: bool, verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let result = if json {
        let subscriber = tracing_subscriber::fmt().json().with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    result.expect("setting default subscriber failed");
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Evolve {
            task,
            generations,
            seed,
            out,
            history,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            let generations = generations.unwrap_or(config.run.generations);
            let seed = seed.unwrap_or(config.run.seed);
            evolve(&config, task, generations, seed, &out, history.as_deref())
        }
        Commands::Train {
            task,
            epochs,
            seed,
            out,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            let epochs = epochs.unwrap_or(config.run.epochs);
            let seed = seed.unwrap_or(config.run.seed);
            train(&config, task, epochs, seed, &out)
        }
        Commands::Inspect { genome, input } => inspect(&genome, input.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.json_logs, cli.verbose);

    if let Err(e) = run(cli) {
        error!(error = %e, "Fatal Error");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("neuroevo_cli_{}_{}", std::process::id(), name));
        path
    }

    fn quick_config() -> Config {
        let mut config = Config::default();
        config.evolution.population_size = 20;
        config.evolution.elite_count = 4;
        config
    }

    #[test]
    fn test_evolve_writes_genome_and_history() {
        let out = scratch("evolved.bin");
        let csv = scratch("history.csv");

        evolve(&quick_config(), Task::Xor, 5, 1, &out, Some(&csv)).unwrap();

        let record = BinaryFileStore::new(&out).load().unwrap().unwrap();
        assert_eq!(record.input_count, Task::Xor.input_count());
        assert!(NeuralNetwork::from_record(&record).is_ok());
        let rows = std::fs::read_to_string(&csv).unwrap().lines().count();
        assert_eq!(rows, 1 + 5);

        let _ = std::fs::remove_file(out);
        let _ = std::fs::remove_file(csv);
    }

    #[test]
    fn test_evolve_needs_a_generation() {
        let out = scratch("never.json");
        assert!(evolve(&quick_config(), Task::Sine, 0, 1, &out, None).is_err());
    }

    #[test]
    fn test_train_then_inspect() {
        let out = scratch("trained.json");
        train(&quick_config(), Task::Xor, 50, 3, &out).unwrap();

        assert!(inspect(&out, Some("0, 1, 1")).is_ok());
        assert!(inspect(&out, Some("0,1")).is_err());
        assert!(inspect(&out, Some("a,b,c")).is_err());
        let _ = std::fs::remove_file(out);
    }

    #[test]
    fn test_inspect_missing_file() {
        assert!(inspect(&scratch("missing.json"), None).is_err());
    }
}
