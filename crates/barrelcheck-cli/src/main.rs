//! barrelcheck CLI - contract tests for the barrels and measurements API

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use barrelcheck_core::config::DEFAULT_ENVIRONMENT;
use barrelcheck_core::{EndpointsConfig, VerdictStatus};
use barrelcheck_runner::suite;
use barrelcheck_runner::{Group, Selection, run_suite};

const CONFIG_FILE: &str = "endpoints.json";

#[derive(Parser)]
#[command(name = "barrelcheck")]
#[command(about = "Contract tests for the barrels and measurements API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Verbose output (debug logs unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the contract suite
    Run {
        /// Environment to test (case-insensitive)
        #[arg(long, default_value = DEFAULT_ENVIRONMENT)]
        host: String,

        /// Endpoints file (default: endpoints.json, config/endpoints.json, endpoints.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Only run cases whose name contains this substring
        #[arg(short, long)]
        filter: Option<String>,

        /// Only run cases of one resource group
        #[arg(short, long)]
        group: Option<GroupArg>,
    },

    /// List cases in run order
    List,

    /// Write an example endpoints file
    Init,

    /// Export JSON Schema for the report format
    Schema,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupArg {
    Barrels,
    Measurements,
}

impl From<GroupArg> for Group {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::Barrels => Group::Barrels,
            GroupArg::Measurements => Group::Measurements,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            host,
            config,
            filter,
            group,
        } => {
            let cfg = match config {
                Some(path) => EndpointsConfig::load(Path::new(&path))?,
                None => EndpointsConfig::load_default()?,
            };
            // Resolved before any request is sent.
            let endpoint = cfg.resolve(Some(&host))?;
            tracing::debug!(?endpoint, "resolved endpoint");

            if cli.output == OutputFormat::Terminal {
                eprintln!("Target:");
                eprintln!("  environment: {}", endpoint.environment);
                eprintln!("  base_url:    {}", endpoint.base_url);
                eprintln!(
                    "  time limit:  {:.2} s",
                    endpoint.response_time_limit.as_secs_f64()
                );
                eprintln!();
            }

            let selection = Selection {
                filter,
                group: group.map(Group::from),
            };
            let report = run_suite(&endpoint, &selection)?;
            let verdict = report.verdict();

            match cli.output {
                OutputFormat::Terminal => {
                    print!("{}", report.to_terminal());
                    let icon = if verdict.status == VerdictStatus::Pass {
                        "PASS"
                    } else {
                        "FAIL"
                    };
                    println!("\n{icon}: {}", verdict.reason);
                    println!("  Exit code: {}", verdict.exit_code);
                }
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "verdict": verdict,
                        "report": report,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            Ok(verdict.exit_code)
        }

        Commands::List => {
            let catalog = suite::catalog();
            match cli.output {
                OutputFormat::Json => {
                    let entries: Vec<_> = catalog
                        .iter()
                        .map(|(name, group, role)| {
                            serde_json::json!({
                                "name": name,
                                "group": group.as_str(),
                                "role": role,
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                OutputFormat::Terminal => {
                    for (name, group, role) in &catalog {
                        println!("  {group}::{name} ({role})");
                    }
                }
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                eprintln!("{CONFIG_FILE} already exists");
                return Ok(1);
            }

            std::fs::write(CONFIG_FILE, EndpointsConfig::example())?;
            println!("Created {CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - environment.response_time_limit: seconds allowed for GET /barrels/");
            println!("  - <name>.base_url: root URL of each environment");
            println!("\nSelect the environment with --host (default: {DEFAULT_ENVIRONMENT})");
            Ok(0)
        }

        Commands::Schema => {
            let schema = barrelcheck_core::report::generate_schema()?;
            println!("{schema}");
            Ok(0)
        }
    }
}
