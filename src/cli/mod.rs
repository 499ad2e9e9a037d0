//! Hevea ML CLI Module
//!
//! Command-line interface for training, regression, cross-validation and
//! the neural-network trainer.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::dataset::{
    align_markers_and_phenotype, leading_components, limit_columns, trait_correlations,
    trait_summary, Dataset, MAX_MARKER_COLUMNS,
};
use crate::server::{run_server, ServerConfig};
use crate::training::{
    LayerConfig, ModelResult, ModelType, NetworkConfig, NeuralNetwork, RegressionModelType,
    RegressionResult, TrainEngine, TrainingConfig,
};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "hevea")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate machine-learning models on SNP marker data")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train and compare classification models
    Train {
        /// JSON dataset with `features` and `labels` or `clones`
        #[arg(short, long)]
        data: PathBuf,

        /// Comma-separated model ids; all models when omitted
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,

        /// Fraction of samples held out for evaluation
        #[arg(long, default_value = "0.3")]
        test_size: f64,

        /// Keep only the leading N feature columns (principal-component scores)
        #[arg(long, num_args = 0..=1, default_missing_value = "3")]
        components: Option<usize>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Write the results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fit phenotype regression models
    Regress {
        /// JSON dataset with `features` and `target`
        #[arg(short, long)]
        data: PathBuf,

        /// Comma-separated model names; all models when omitted
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,

        #[arg(long, default_value = "0.3")]
        test_size: f64,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cross-validate a single classification model
    Cv {
        #[arg(short, long)]
        data: PathBuf,

        /// Model id
        #[arg(short, long, default_value = "rf")]
        model: String,

        /// Number of folds
        #[arg(short, long, default_value = "5")]
        folds: usize,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Train the neural network and export it as JSON
    Network {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(long, default_value = "30")]
        epochs: usize,

        #[arg(long, default_value = "32")]
        batch_size: usize,

        #[arg(long, default_value = "0.001")]
        learning_rate: f64,

        #[arg(long)]
        seed: Option<u64>,

        /// Export file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the training service
    Serve {
        /// Server port, defaults to API_PORT or 5000
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host, defaults to API_HOST or 0.0.0.0
        #[arg(long)]
        host: Option<String>,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    step_run("Loading data");
    let start = Instant::now();
    let dataset = Dataset::from_json_file(path)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        dataset.features.len(),
        dataset.features.first().map_or(0, Vec::len),
        start.elapsed()
    ));
    Ok(dataset)
}

fn training_config(test_size: f64, seed: Option<u64>) -> TrainingConfig {
    let config = TrainingConfig::new().with_test_size(test_size);
    match seed {
        Some(seed) => config.with_random_seed(seed),
        None => config,
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    println!("  {} {}", ok("saved"), path.display());
    Ok(())
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &Path,
    models: &[String],
    test_size: f64,
    components: Option<usize>,
    seed: Option<u64>,
    output: Option<&Path>,
) -> anyhow::Result<Vec<ModelResult>> {
    section("Train");

    let dataset = load_dataset(data_path)?;
    let mut x = dataset.feature_matrix()?;
    if let Some(k) = components {
        x = leading_components(&x, k);
    }
    let y = dataset.class_labels()?;

    let ids: Vec<String> = if models.is_empty() {
        ModelType::ALL.iter().map(|m| m.id().to_string()).collect()
    } else {
        models.to_vec()
    };

    let engine = TrainEngine::new(training_config(test_size, seed));
    let mut progress = |id: &str, pct: f64| {
        println!("  {} {:>5.1}% {}", accent("›"), pct, muted(id));
    };
    let results = engine.train_models(&ids, &x, &y, Some(&mut progress))?;

    println!();
    println!(
        "  {:<40} {:>9} {:>9} {:>9} {:>10}",
        muted("Model"),
        muted("Accuracy"),
        muted("Balanced"),
        muted("F1"),
        muted("Time")
    );
    println!("  {}", dim(&"─".repeat(81)));
    for r in &results {
        println!(
            "  {:<40} {:>9.4} {:>9.4} {:>9.4} {:>8.1}ms",
            r.name, r.accuracy, r.balanced_accuracy, r.f1_score, r.training_time_ms
        );
    }
    println!("  {}", dim(&"─".repeat(81)));

    if let Some(best) = results.first() {
        println!();
        println!("  {} {} {} {:.4}", ok("best"), best.name.white().bold(), muted("accuracy:"), best.accuracy);
    }
    if results.len() < ids.len() {
        println!("  {}", format!("{} model(s) skipped", ids.len() - results.len()).yellow());
    }

    if let Some(path) = output {
        write_json(path, &results)?;
    }
    println!();
    Ok(results)
}

pub fn cmd_regress(
    data_path: &Path,
    models: &[String],
    test_size: f64,
    seed: Option<u64>,
    output: Option<&Path>,
) -> anyhow::Result<Vec<RegressionResult>> {
    section("Regress");

    let dataset = load_dataset(data_path)?;
    let markers = limit_columns(&dataset.feature_matrix()?, MAX_MARKER_COLUMNS);
    let (x, y) = align_markers_and_phenotype(&markers, &dataset.target);

    print_trait_statistics(&dataset);

    let names: Vec<String> = if models.is_empty() {
        RegressionModelType::ALL.iter().map(|m| m.name().to_string()).collect()
    } else {
        models.to_vec()
    };

    step_run(&format!("Fitting {} model(s) on {} samples", names.len(), x.nrows()));
    let start = Instant::now();
    let engine = TrainEngine::new(training_config(test_size, seed));
    let results = engine.train_regression_models(&x, &y, &names)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("  {:<24} {:>10} {:>10} {:>10}", muted("Model"), muted("R²"), muted("RMSE"), muted("MAE"));
    println!("  {}", dim(&"─".repeat(57)));
    for r in &results {
        println!("  {:<24} {:>10.4} {:>10.4} {:>10.4}", r.name, r.r2_score, r.rmse, r.mae);
    }

    if let Some(path) = output {
        write_json(path, &results)?;
    }
    println!();
    Ok(results)
}

fn print_trait_statistics(dataset: &Dataset) {
    let columns = dataset.phenotype_columns();
    if columns.is_empty() {
        return;
    }

    println!();
    println!(
        "  {:<16} {:>10} {:>10} {:>10} {:>10} {:>6}",
        muted("Trait"),
        muted("Mean"),
        muted("Std"),
        muted("Min"),
        muted("Max"),
        muted("n")
    );
    println!("  {}", dim(&"─".repeat(67)));
    for (name, values) in &columns {
        match trait_summary(values) {
            Some(s) => println!(
                "  {:<16} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>6}",
                name, s.mean, s.std, s.min, s.max, s.count
            ),
            None => println!("  {:<16} {}", name, dim("no values")),
        }
    }

    if columns.len() > 1 {
        let matrix = trait_correlations(&columns);
        println!();
        print!("  {:<16}", muted("r"));
        for (name, _) in &columns {
            print!(" {:>10}", muted(name));
        }
        println!();
        for (i, (name, _)) in columns.iter().enumerate() {
            print!("  {:<16}", name);
            for r in matrix.row(i) {
                print!(" {:>10.3}", r);
            }
            println!();
        }
    }
}

pub fn cmd_cv(data_path: &Path, model: &str, folds: usize, seed: Option<u64>) -> anyhow::Result<()> {
    section("Cross-validate");

    let dataset = load_dataset(data_path)?;
    let x = dataset.feature_matrix()?;
    let y = dataset.class_labels()?;

    step_run(&format!("{} folds of {}", folds, model.cyan()));
    let engine = TrainEngine::new(training_config(0.3, seed));
    let cv = engine.cross_validate(model, &x, &y, folds, None)?;
    step_done(&cv.model_name);

    println!();
    for (i, score) in cv.scores.iter().enumerate() {
        println!("  {:<16} {:.4}", muted(&format!("fold {}", i + 1)), score);
    }
    println!("  {}", dim(&"─".repeat(24)));
    println!(
        "  {:<16} {} {}",
        muted("mean ± std"),
        format!("{:.4}", cv.mean_score).white().bold(),
        format!("± {:.4}", cv.std_score).white()
    );
    println!();
    Ok(())
}

pub fn cmd_network(
    data_path: &Path,
    config: NetworkConfig,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Neural network");

    let dataset = load_dataset(data_path)?;
    let x = dataset.feature_matrix()?;
    let y = dataset.class_labels()?;

    step_run(&format!("Training for up to {} epochs", config.epochs));
    let start = Instant::now();
    let mut network = NeuralNetwork::new(LayerConfig::default_stack(), config);
    let epochs_run = network.fit(&x, &y)?.len();
    step_done(&format!("{} epochs in {:?}", epochs_run, start.elapsed()));

    if let Some(last) = network.history().last() {
        println!();
        println!("  {:<16} {:.4}", muted("loss"), last.loss);
        println!("  {:<16} {:.4}", muted("val accuracy"), last.val_accuracy);
    }
    println!("  {:<16} {}", muted("best accuracy"), format!("{:.4}", network.best_accuracy()).white().bold());

    if let Some(path) = output {
        std::fs::write(path, network.export().to_json()?)?;
        println!("  {} {}", ok("saved"), path.display());
    }
    println!();
    Ok(())
}

pub async fn cmd_serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    run_server(config).await
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Train { data, models, test_size, components, seed, output } => {
            cmd_train(&data, &models, test_size, components, seed, output.as_deref())?;
        }
        Commands::Regress { data, models, test_size, seed, output } => {
            cmd_regress(&data, &models, test_size, seed, output.as_deref())?;
        }
        Commands::Cv { data, model, folds, seed } => {
            cmd_cv(&data, &model, folds, seed)?;
        }
        Commands::Network { data, epochs, batch_size, learning_rate, seed, output } => {
            let mut config = NetworkConfig::default()
                .with_epochs(epochs)
                .with_batch_size(batch_size)
                .with_learning_rate(learning_rate);
            if let Some(seed) = seed {
                config = config.with_random_seed(seed);
            }
            cmd_network(&data, config, output.as_deref())?;
        }
        Commands::Serve { port, host } => {
            cmd_serve(host, port).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_models_list() {
        let cli = Cli::try_parse_from(["hevea", "train", "-d", "data.json", "-m", "rf,knn", "--seed", "7"]).unwrap();
        match cli.command {
            Commands::Train { models, seed, test_size, components, .. } => {
                assert_eq!(models, vec!["rf".to_string(), "knn".to_string()]);
                assert_eq!(seed, Some(7));
                assert_eq!(test_size, 0.3);
                assert_eq!(components, None);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_components_flag_defaults_to_three() {
        let cli = Cli::try_parse_from(["hevea", "train", "-d", "d.json", "--components"]).unwrap();
        match cli.command {
            Commands::Train { components, .. } => assert_eq!(components, Some(3)),
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_cmd_train_writes_results() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.json");
        let rows: Vec<Vec<f64>> = (0..16)
            .map(|i| if i % 2 == 0 { vec![i as f64 * 0.1, 0.0] } else { vec![9.0 + i as f64 * 0.1, 9.0] })
            .collect();
        let labels: Vec<usize> = (0..16).map(|i| i % 2).collect();
        std::fs::write(&data, serde_json::json!({"features": rows, "labels": labels}).to_string()).unwrap();

        let out = dir.path().join("results.json");
        let results = cmd_train(&data, &["knn".to_string(), "nb".to_string()], 0.25, None, Some(1), Some(out.as_path())).unwrap();
        assert_eq!(results.len(), 2);

        let saved: Vec<ModelResult> = serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        let ids = |rs: &[ModelResult]| rs.iter().map(|r| (r.model_id.clone(), r.confusion_matrix.clone())).collect::<Vec<_>>();
        assert_eq!(ids(&saved), ids(&results));
    }

    #[test]
    fn test_cmd_regress_with_traits() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("phenotype.json");
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![(i % 3) as f64, (i % 5) as f64]).collect();
        let target: Vec<f64> = rows.iter().map(|r| r[0] * 2.0 + r[1]).collect();
        let girth: Vec<Option<f64>> = (0..20).map(|i| if i == 4 { None } else { Some(40.0 + i as f64) }).collect();
        std::fs::write(
            &data,
            serde_json::json!({"features": rows, "target": target, "traits": {"girth": girth}}).to_string(),
        )
        .unwrap();

        let results = cmd_regress(&data, &["Random Forest".to_string()], 0.3, Some(3), None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Random Forest");
    }
}
