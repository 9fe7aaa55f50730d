//! fitlab Command Line Interface
//!
//! Generate synthetic point sets, fit the model catalogue to them and report
//! goodness-of-fit metrics, as text or JSON.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use fitlab::api::{quick, Experiment, ExperimentReport, ModelFamily, ModelOptions};
use fitlab::classification::Voting;
use fitlab::core::{FitError, Result};
use fitlab::data::{Generator, GeneratorConfig, PointSet};
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "fitlab")]
#[command(about = "Fit small regression and classification models to synthetic 2-D points")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the model catalogue
    List(ListArgs),
    /// Generate points for a model and fit it
    Run(RunArgs),
    /// Run every model of the catalogue on freshly generated points
    Sweep(SweepArgs),
    /// Generate a point set and write it out
    Generate(GenerateArgs),
    /// Fit a model to points loaded from a file
    Fit(FitArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliFamily {
    Linear,
    Polynomial,
    Exponential,
    Logarithmic,
    Periodic,
    Logistic,
    Step,
    #[value(name = "naive-bayes")]
    NaiveBayes,
    Knn,
    Svm,
    Forest,
    #[value(name = "tree-regressor")]
    TreeRegressor,
}

impl From<CliFamily> for ModelFamily {
    fn from(cli_family: CliFamily) -> Self {
        match cli_family {
            CliFamily::Linear => ModelFamily::Linear,
            CliFamily::Polynomial => ModelFamily::Polynomial,
            CliFamily::Exponential => ModelFamily::Exponential,
            CliFamily::Logarithmic => ModelFamily::Logarithmic,
            CliFamily::Periodic => ModelFamily::Periodic,
            CliFamily::Logistic => ModelFamily::Logistic,
            CliFamily::Step => ModelFamily::Step,
            CliFamily::NaiveBayes => ModelFamily::NaiveBayes,
            CliFamily::Knn => ModelFamily::Knn,
            CliFamily::Svm => ModelFamily::Svm,
            CliFamily::Forest => ModelFamily::Forest,
            CliFamily::TreeRegressor => ModelFamily::TreeRegressor,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliVoting {
    /// Fraction of neighbours labeled 1
    #[value(name = "fraction")]
    Fraction,
    /// Majority vote, 0.5 on a tie
    #[value(name = "majority")]
    Majority,
}

impl From<CliVoting> for Voting {
    fn from(cli_voting: CliVoting) -> Self {
        match cli_voting {
            CliVoting::Fraction => Voting::Fraction,
            CliVoting::Majority => Voting::Majority,
        }
    }
}

#[derive(Args)]
struct ListArgs {
    /// Print the catalogue as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct GeneratorArgs {
    /// Number of points
    #[arg(short = 'n', long, default_value = "100")]
    points: usize,

    /// Noise amplitude (0.0-1.0)
    #[arg(long, default_value = "0.2")]
    spread: f64,

    /// Outlier / label-flip probability (0.0-1.0)
    #[arg(long, default_value = "0.05")]
    outliers: f64,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Clone)]
struct ModelArgs {
    /// Maximum tree depth (forest, tree regressor)
    #[arg(long, default_value = "4")]
    depth: usize,

    /// Number of neighbours (KNN)
    #[arg(short, long, default_value = "5")]
    k: usize,

    /// KNN voting rule
    #[arg(long, default_value = "fraction")]
    voting: CliVoting,

    /// Number of trees (forest)
    #[arg(long, default_value = "12")]
    trees: usize,
}

#[derive(Args)]
struct RunArgs {
    /// Model family
    #[arg(short, long)]
    model: CliFamily,

    #[command(flatten)]
    generator: GeneratorArgs,

    #[command(flatten)]
    options: ModelArgs,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Write the full JSON report to a file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    generator: GeneratorArgs,

    #[command(flatten)]
    options: ModelArgs,

    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct GenerateArgs {
    /// Model family whose data shape to generate
    #[arg(short, long)]
    model: CliFamily,

    #[command(flatten)]
    generator: GeneratorArgs,

    /// Output file (.csv or .json); CSV on stdout if not specified
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct FitArgs {
    /// Model family
    #[arg(short, long)]
    model: CliFamily,

    /// Point file (CSV or JSON)
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, csv, or json
    #[arg(short, long, default_value = "auto")]
    format: String,

    #[command(flatten)]
    options: ModelArgs,

    /// Random seed for randomized models
    #[arg(long)]
    seed: Option<u64>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

/// One catalogue entry as listed on the command line
#[derive(Serialize)]
struct FamilyEntry {
    id: &'static str,
    name: &'static str,
    formula: &'static str,
    classifier: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::List(args) => list_command(args),
        Commands::Run(args) => run_command(args),
        Commands::Sweep(args) => sweep_command(args),
        Commands::Generate(args) => generate_command(args),
        Commands::Fit(args) => fit_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn list_command(args: ListArgs) -> Result<()> {
    let entries: Vec<FamilyEntry> = ModelFamily::ALL
        .into_iter()
        .map(|family| FamilyEntry {
            id: family.id(),
            name: family.name(),
            formula: family.formula(),
            classifier: family.is_classifier(),
        })
        .collect();

    if args.json {
        println!("{}", to_json(&entries)?);
        return Ok(());
    }

    println!("{:<16} {:<24} {:<15} Formula", "ID", "Name", "Task");
    for entry in entries {
        let task = if entry.classifier { "classification" } else { "regression" };
        println!(
            "{:<16} {:<24} {:<15} {}",
            entry.id, entry.name, task, entry.formula
        );
    }
    Ok(())
}

fn run_command(args: RunArgs) -> Result<()> {
    let family = ModelFamily::from(args.model);
    let generator = generator_config(&args.generator)?;
    let options = model_options(&args.options, args.generator.seed)?;
    info!("Running {family} with {generator:?}");

    let report = Experiment::new(family)
        .with_generator(generator)
        .with_options(options)
        .run()?;

    if let Some(path) = &args.output {
        std::fs::write(path, report.to_json()?)?;
        info!("Report saved to: {path:?}");
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        report.print_summary();
    }
    Ok(())
}

fn sweep_command(args: SweepArgs) -> Result<()> {
    let generator = generator_config(&args.generator)?;
    let options = model_options(&args.options, args.generator.seed)?;
    info!("Sweeping the catalogue with {generator:?}");

    let reports = quick::run_all(generator, options)?;

    if args.json {
        println!("{}", to_json(&reports)?);
        return Ok(());
    }

    println!("=== Catalogue Sweep ===");
    println!(
        "Points: {}  Spread: {}  Outliers: {}",
        generator.n_points, generator.spread, generator.outlier_rate
    );
    for report in &reports {
        print_row(report);
    }
    Ok(())
}

fn generate_command(args: GenerateArgs) -> Result<()> {
    let family = ModelFamily::from(args.model);
    let config = generator_config(&args.generator)?;
    let points = Generator::with_config(config).generate(family);
    info!("Generated {} points for {family}", points.points().len());

    match &args.output {
        Some(path) => {
            match detect_format(path).as_str() {
                "json" => points.save_json(path)?,
                _ => points.save_csv(path)?,
            }
            info!("Points saved to: {path:?}");
        }
        None => points.write_csv(std::io::stdout().lock())?,
    }
    Ok(())
}

fn fit_command(args: FitArgs) -> Result<()> {
    let family = ModelFamily::from(args.model);
    info!("Loading points from: {:?}", args.data);

    let format = if args.format == "auto" {
        detect_format(&args.data)
    } else {
        args.format.clone()
    };

    let points = match format.as_str() {
        "csv" => PointSet::from_file(&args.data)?,
        "json" => PointSet::from_json_file(&args.data)?,
        _ => {
            return Err(FitError::InvalidParameter(format!(
                "Unsupported format: {format}. Use 'csv' or 'json'"
            )))
        }
    };

    if family.is_classifier() && !points.is_labeled() {
        return Err(FitError::InvalidParameter(format!(
            "{family} needs labeled points (x,y,label)"
        )));
    }

    let options = model_options(&args.options, args.seed)?;
    let report = Experiment::new(family).with_options(options).run_on(&points)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        report.print_summary();
    }
    Ok(())
}

fn generator_config(args: &GeneratorArgs) -> Result<GeneratorConfig> {
    if args.points == 0 {
        return Err(FitError::InvalidParameter(
            "Number of points must be positive".to_string(),
        ));
    }

    let config = GeneratorConfig {
        n_points: args.points,
        spread: args.spread,
        outlier_rate: args.outliers,
        seed: args.seed,
    };
    config.validate()?;
    Ok(config)
}

fn model_options(args: &ModelArgs, seed: Option<u64>) -> Result<ModelOptions> {
    let options = ModelOptions {
        depth: args.depth,
        k: args.k,
        voting: args.voting.into(),
        n_trees: args.trees,
        seed,
    };
    options.validate()?;
    Ok(options)
}

fn print_row(report: &ExperimentReport) {
    let [m1, m2, m3] = &report.summary;
    println!("{:<24} {:<16} {:<16} {}", report.model, m1, m2, m3);
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| FitError::SerializationError(e.to_string()))
}

fn detect_format(path: &Path) -> String {
    if let Some(ext) = path.extension() {
        match ext.to_str() {
            Some("csv") => "csv".to_string(),
            Some("json") => "json".to_string(),
            _ => {
                warn!("Unknown file extension, assuming CSV format");
                "csv".to_string()
            }
        }
    } else {
        warn!("No file extension, assuming CSV format");
        "csv".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(detect_format(&PathBuf::from("points.csv")), "csv");
        assert_eq!(detect_format(&PathBuf::from("points.json")), "json");
        assert_eq!(detect_format(&PathBuf::from("points.txt")), "csv");
        assert_eq!(detect_format(&PathBuf::from("points")), "csv");
    }

    #[test]
    fn test_every_cli_family_maps_to_the_catalogue() {
        let mapped: Vec<ModelFamily> = CliFamily::value_variants()
            .iter()
            .map(|&f| ModelFamily::from(f))
            .collect();
        assert_eq!(mapped, ModelFamily::ALL.to_vec());
    }

    #[test]
    fn test_generator_validation() {
        let args = GeneratorArgs {
            points: 10,
            spread: 1.5,
            outliers: 0.0,
            seed: None,
        };
        assert!(generator_config(&args).is_err());
    }

    #[test]
    fn test_model_option_validation() {
        let args = ModelArgs {
            depth: 4,
            k: 0,
            voting: CliVoting::Fraction,
            trees: 12,
        };
        assert!(matches!(
            model_options(&args, None),
            Err(FitError::InvalidParameter(_))
        ));
    }
}
