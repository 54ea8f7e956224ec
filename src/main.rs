use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use hashcrack::{Algorithm, Hasher, Logger, Pipeline, PipelineConfig, PipelineError};
use std::path::PathBuf;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "hashcrack")]
#[command(about = "hashcrack - Parallel Hash Cracking Engine")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// CLI hash algorithm selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliAlgorithm {
    /// SHA-256 (64 hex digits)
    Sha256,
    /// SHA-384 (96 hex digits)
    Sha384,
    /// SHA-512 (128 hex digits)
    Sha512,
    /// Salted PBKDF2-HMAC-SHA256 (salt hex followed by key hex)
    Pbkdf2,
}

impl From<CliAlgorithm> for Algorithm {
    fn from(cli: CliAlgorithm) -> Self {
        match cli {
            CliAlgorithm::Sha256 => Algorithm::Sha256,
            CliAlgorithm::Sha384 => Algorithm::Sha384,
            CliAlgorithm::Sha512 => Algorithm::Sha512,
            CliAlgorithm::Pbkdf2 => Algorithm::Pbkdf2,
        }
    }
}

/// Hashing parameters shared by `hash` and `verify`
#[derive(clap::Args, Debug)]
struct HashArgs {
    /// Hash algorithm
    #[arg(long, value_enum, default_value = "sha256")]
    algorithm: CliAlgorithm,
    /// PBKDF2 iteration count (at least 1)
    #[arg(
        long,
        default_value_t = hashcrack::hash::DEFAULT_PBKDF2_ITERATIONS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    iterations: u32,
    /// PBKDF2 salt length in bytes (at least 1)
    #[arg(
        long,
        default_value_t = hashcrack::hash::DEFAULT_PBKDF2_SALT_LENGTH,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    salt_length: usize,
}

impl HashArgs {
    fn hasher(&self) -> Hasher {
        Hasher::new(self.algorithm.into(), self.iterations, self.salt_length)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cracking pipeline described by a JSON configuration file
    Run {
        /// Path to the configuration file
        #[arg(default_value = "config.json")]
        config: PathBuf,
        /// Number of worker threads (overrides general.worker_count)
        #[arg(long, short = 'j')]
        workers: Option<usize>,
        /// Target digest (overrides target.hash_to_find)
        #[arg(long)]
        target: Option<String>,
        /// Show debug output on the console
        #[arg(long, short)]
        verbose: bool,
    },
    /// Print the digest of a plaintext
    Hash {
        /// Plaintext to hash
        text: String,
        #[command(flatten)]
        params: HashArgs,
    },
    /// Check a plaintext against a digest; exits 0 on match, 1 otherwise
    Verify {
        /// Plaintext candidate
        text: String,
        /// Digest to compare against
        hash: String,
        #[command(flatten)]
        params: HashArgs,
    },
}

fn run_pipeline(
    config_path: PathBuf,
    workers: Option<usize>,
    target: Option<String>,
    verbose: bool,
) -> Result<(), PipelineError> {
    let mut config = PipelineConfig::load(&config_path)?;
    if let Some(n) = workers {
        config = config.with_workers(n);
    }
    if target.is_some() {
        config = config.with_target_option(target);
    }
    let verbose = verbose || config.output.verbose;

    let logger = Logger::new(Some(&config.output.log_path), verbose)?;
    let pipeline = Pipeline::new(config, logger)?;

    let cancel = pipeline.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        eprintln!("Warning: cannot install Ctrl-C handler: {}", e);
    }

    let report = pipeline.run()?;
    for record in &report.matches {
        println!("Match: {} -> {}", record.original, record.hash);
    }
    print!("{}", report.format_summary());
    Ok(())
}

fn main() {
    let args = Args::parse();

    match args.command {
        Commands::Run {
            config,
            workers,
            target,
            verbose,
        } => {
            if let Err(e) = run_pipeline(config, workers, target, verbose) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Hash { text, params } => {
            println!("{}", params.hasher().hash(&text, None));
        }
        Commands::Verify { text, hash, params } => {
            if params.hasher().verify(&text, &hash) {
                println!("match");
            } else {
                println!("no match");
                std::process::exit(1);
            }
        }
    }
}
