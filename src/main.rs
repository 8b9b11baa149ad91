use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use fibcheck::{check_range, verify_case, CandidateKind, CandidateSpec, Harness};

#[derive(Parser)]
#[command(name = "fibcheck")]
#[command(about = "Differential testing harness for compiled Fibonacci implementations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one interactive comparison session (default command)
    #[command(alias = "r")]
    Run {
        #[command(flatten)]
        candidate: CandidateArgs,
    },

    /// Check the candidate against the reference over a range of indices
    #[command(alias = "c")]
    Check {
        /// Highest sequence index to verify
        #[arg(short, long, default_value_t = 20)]
        limit: i64,

        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        candidate: CandidateArgs,
    },

    /// Run a TOML suite file
    Suite { file: PathBuf },

    Info,
}

#[derive(Args)]
struct CandidateArgs {
    /// Shared object containing the compiled candidate
    #[arg(long)]
    dylib: Option<String>,

    /// Symbol to resolve from the shared object
    #[arg(long, default_value = "fib")]
    symbol: String,

    /// External program to drive as the candidate
    #[arg(long)]
    command: Option<String>,

    /// Extra argument passed to the candidate program (repeatable)
    #[arg(long = "arg")]
    args: Vec<String>,

    /// Label for the candidate in output
    #[arg(long)]
    label: Option<String>,
}

impl CandidateArgs {
    fn to_spec(&self) -> CandidateSpec {
        if let Some(path) = &self.dylib {
            CandidateSpec {
                kind: CandidateKind::Dylib,
                path: Some(path.clone()),
                symbol: self.symbol.clone(),
                args: Vec::new(),
                label: Some(self.label.clone().unwrap_or_else(|| "rcc".to_string())),
            }
        } else if let Some(program) = &self.command {
            CandidateSpec {
                kind: CandidateKind::Command,
                path: Some(program.clone()),
                symbol: self.symbol.clone(),
                args: self.args.clone(),
                label: self.label.clone(),
            }
        } else {
            let mut spec = CandidateSpec::builtin();
            spec.label = self.label.clone();
            spec
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{filter::LevelFilter, EnvFilter};

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::OFF.into())
                .from_env_lossy(),
        )
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    // Default to Run against the builtin candidate if no subcommand is given
    let command = cli.command.unwrap_or(Commands::Run {
        candidate: CandidateArgs {
            dylib: None,
            symbol: "fib".to_string(),
            command: None,
            args: Vec::new(),
            label: None,
        },
    });

    match command {
        Commands::Run { candidate } => {
            let candidate = match candidate.to_spec().build() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("❌ Failed to set up candidate: {e}");
                    process::exit(1);
                }
            };

            let harness = Harness::new();
            let stdin = io::stdin();
            match harness.run_session(stdin.lock(), io::stdout(), candidate.as_ref()) {
                // Judging the two lines is the caller's business; the
                // session exits 0 even when they disagree.
                Ok(_) => {}
                Err(e) => {
                    eprintln!("❌ Session failed: {e}");
                    process::exit(1);
                }
            }
        }

        Commands::Check {
            limit,
            verbose,
            candidate,
        } => {
            let candidate = match candidate.to_spec().build() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("❌ Failed to set up candidate: {e}");
                    process::exit(1);
                }
            };

            if verbose {
                for n in 1..=limit {
                    match verify_case(candidate.as_ref(), n) {
                        Ok(value) => println!("✅ Fib({n}) = {value}"),
                        Err(e) => {
                            eprintln!("❌ {e}");
                            process::exit(1);
                        }
                    }
                }
                println!(
                    "🎉 {} agreed with the reference on 1..={limit}",
                    candidate.label()
                );
            } else {
                match check_range(candidate.as_ref(), 1..=limit) {
                    Ok(report) => {
                        println!(
                            "✅ {} cases passed for {}",
                            report.cases,
                            candidate.label()
                        );
                    }
                    Err(e) => {
                        eprintln!("❌ {e}");
                        process::exit(1);
                    }
                }
            }
        }

        Commands::Suite { file } => match fibcheck::Suite::from_path(&file) {
            Ok(suite) => match suite.run() {
                Ok(report) => {
                    println!("📦 Suite: {}", report.label);
                    println!("✅ Passed: {}", report.passed);

                    if !report.is_success() {
                        println!("❌ Failed: {}", report.failures.len());
                        for failure in &report.failures {
                            println!(
                                "   Fib({}) reference = {}, candidate = {}",
                                failure.n, failure.reference, failure.candidate
                            );
                        }
                        process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("❌ Suite run failed: {e}");
                    process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("❌ Invalid suite file: {e}");
                process::exit(1);
            }
        },

        Commands::Info => {
            println!("fibcheck v{}", env!("CARGO_PKG_VERSION"));
            println!("Oracle comparison harness for compiled Fibonacci implementations");
            println!();
            println!("Commands:");
            println!("  run      Run one interactive comparison session (default)");
            println!("  check    Verify the candidate over a range of indices");
            println!("  suite    Run a TOML suite file");
            println!("  info     Show version and usage information");
        }
    }
}
