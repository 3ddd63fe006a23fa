//! HMM Sign Recognizer CLI
//!
//! Command-line interface for per-word model selection and recognition

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use hmm_sign_recognizer::{
    data::{TestSet, TrainingSet},
    models::{GaussianHmm, SegmentalTrainer},
    recognition::{recognize, WordErrorReport},
    selection::{select_all, CancelToken, SelectionRun, SelectionStrategy, SelectorConfig},
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hmm_sign_recognizer")]
#[command(about = "Per-word HMM model selection and sign recognition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a state count for each word
    Select {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Only select these words (repeatable)
        #[arg(short, long)]
        word: Vec<String>,
    },

    /// Select all word models and recognize a test set
    Recognize {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Test CSV file
        #[arg(long)]
        test: String,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Training CSV file
    #[arg(long)]
    train: String,

    /// Feature columns (comma separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    features: Vec<String>,

    /// Selection strategy (constant, bic, dic, cv)
    #[arg(short, long, default_value = "cv")]
    strategy: SelectionStrategy,

    /// Smallest state count tried
    #[arg(long)]
    min: Option<usize>,

    /// Largest state count tried
    #[arg(long)]
    max: Option<usize>,

    /// State count for the constant strategy
    #[arg(short = 'n', long)]
    n_constant: Option<usize>,

    /// Random seed passed to training
    #[arg(long)]
    seed: Option<u64>,

    /// JSON selector configuration; flags override its fields
    #[arg(short, long)]
    config: Option<String>,

    /// Abort selection after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log every candidate model
    #[arg(short, long)]
    verbose: bool,
}

impl SelectionArgs {
    fn selector_config(&self) -> Result<SelectorConfig> {
        let mut config = match &self.config {
            Some(path) => SelectorConfig::from_json_file(path)?,
            None => SelectorConfig::default(),
        };

        if let Some(min) = self.min {
            config.min_n_components = min;
        }
        if let Some(max) = self.max {
            config.max_n_components = max;
        }
        if let Some(n) = self.n_constant {
            config.n_constant = n;
        }
        if let Some(seed) = self.seed {
            config.random_seed = seed;
        }
        if self.verbose {
            config.verbose = true;
        }

        config.validate()?;
        Ok(config)
    }

    fn cancel_token(&self) -> CancelToken {
        match self.timeout_secs {
            Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
            None => CancelToken::new(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("hmm_sign_recognizer=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Select { selection, word } => {
            select_models(&selection, &word)?;
        }
        Commands::Recognize { selection, test } => {
            recognize_test_set(&selection, &test)?;
        }
    }

    Ok(())
}

fn load_training(args: &SelectionArgs) -> Result<TrainingSet> {
    println!("{}", "Loading training data...".cyan());
    let training = TrainingSet::from_csv(&args.train, &args.features)?;
    println!(
        "Loaded {} words, {} sequences, {} features",
        training.words().len(),
        training.num_items(),
        args.features.len()
    );
    Ok(training)
}

fn run_selection(
    args: &SelectionArgs,
    training: &TrainingSet,
    words: &[String],
) -> Result<SelectionRun<GaussianHmm>> {
    let config = args.selector_config()?;
    println!(
        "{}",
        format!(
            "Selecting {} models with {} over {}..={} states...",
            words.len(),
            args.strategy,
            config.min_n_components,
            config.max_n_components
        )
        .cyan()
    );

    let trainer = SegmentalTrainer::new();
    let run = select_all(
        &trainer,
        training,
        words,
        &config,
        args.strategy,
        &args.cancel_token(),
    )?;

    if !run.aborted.is_empty() {
        println!(
            "{}",
            format!("Timed out before finishing: {}", run.aborted.join(", ")).red()
        );
    }
    Ok(run)
}

fn select_models(args: &SelectionArgs, only: &[String]) -> Result<()> {
    let training = load_training(args)?;
    let words = if only.is_empty() {
        training.words()
    } else {
        only.to_vec()
    };

    let run = run_selection(args, &training, &words)?;

    println!("\n{}", "=== Selected Models ===".bold());
    for (word, model) in &run.models {
        match model {
            Some(candidate) => {
                let criterion = candidate
                    .criterion
                    .map(|c| format!("  (criterion {:.4})", c))
                    .unwrap_or_default();
                println!(
                    "  {:<16} {} states{}",
                    word,
                    candidate.n_states.to_string().green(),
                    criterion
                );
            }
            None => println!("  {:<16} {}", word, "none found".red()),
        }
    }

    Ok(())
}

fn recognize_test_set(args: &SelectionArgs, test_path: &str) -> Result<()> {
    let training = load_training(args)?;
    let run = run_selection(args, &training, &training.words())?;
    if run.models.is_empty() {
        bail!("no word finished selection; nothing to recognize with");
    }

    println!("{}", "Loading test data...".cyan());
    let test_set = TestSet::from_csv(test_path, &args.features)?;
    println!("Loaded {} test items", test_set.len());

    println!("{}", "Recognizing...".cyan());
    let recognition = recognize(&run.models, &test_set)?;

    WordErrorReport::evaluate(&recognition.guesses, &test_set).print_summary();

    let missing = run.missing();
    if !missing.is_empty() {
        println!(
            "\n{}",
            format!("No model for: {}", missing.join(", ")).yellow()
        );
    }

    Ok(())
}
