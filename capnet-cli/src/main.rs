//! capnet CLI - capacitor network configuration from the command line.

use anyhow::Context;
use capnet::service::{ConfigProvider, LocalSolver, RemoteSolver};
use capnet::{CapnetCore, ConfigForm, ConfigReport, FindConfigResponse, SolverOptions};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "capnet")]
#[command(about = "Capacitor network configuration solver", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file with solver options
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the network closest to a target capacitance
    Solve(SolveArgs),

    /// Answer a raw /find_config JSON request body
    Request {
        /// Request file, or `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        file: String,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// Target capacitance (F)
    #[arg(long, default_value = "75", allow_hyphen_values = true)]
    target: String,

    /// Number of parallel branches
    #[arg(long, default_value = "3", allow_hyphen_values = true)]
    branches: String,

    /// Fixed capacitor in series on each branch (F)
    #[arg(long, default_value = "2.5", allow_hyphen_values = true)]
    fixed: String,

    /// Maximum parallel capacitors per branch
    #[arg(long, default_value = "20", allow_hyphen_values = true)]
    max_parallel: String,

    /// Comma-separated available capacitor values (F)
    #[arg(long, default_value = "5,10,50", allow_hyphen_values = true)]
    available: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Send the request to a /find_config service instead of solving locally
    #[arg(long, value_name = "URL")]
    remote: Option<String>,

    /// Search worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Search time budget in milliseconds (0 disables it)
    #[arg(long)]
    time_budget_ms: Option<u64>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON response payload
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Solve(args) => {
            let options = load_options(cli.config.as_deref(), args.threads, args.time_budget_ms)?;
            handle_solve(args, options).await
        }
        Commands::Request { file } => {
            let options = load_options(cli.config.as_deref(), None, None)?;
            handle_request(&file, &options)
        }
    }
}

fn load_options(
    config: Option<&Path>,
    threads: Option<usize>,
    time_budget_ms: Option<u64>,
) -> anyhow::Result<SolverOptions> {
    let options = match config {
        Some(path) => SolverOptions::from_file(path)
            .with_context(|| format!("Failed to load solver options from {}", path.display()))?,
        None => SolverOptions::default(),
    };
    let mut options = options.with_env_overrides()?;

    if let Some(threads) = threads {
        options.threads = threads;
    }
    if let Some(ms) = time_budget_ms {
        options.time_budget_ms = ms;
    }
    options.validate()?;
    Ok(options)
}

async fn handle_solve(args: SolveArgs, options: SolverOptions) -> anyhow::Result<i32> {
    let form = ConfigForm {
        target: args.target,
        branches: args.branches,
        fixed: args.fixed,
        max_parallel: args.max_parallel,
        available: args.available,
    };
    let request = match form.validate() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(1);
        }
    };

    let provider: Box<dyn ConfigProvider> = match args.remote {
        Some(url) => Box::new(RemoteSolver::new(url)?),
        None => Box::new(LocalSolver::new(options)),
    };
    let info = provider.info();
    tracing::info!(
        "Solving with {} provider at {} (local: {})",
        provider.name(),
        info.endpoint,
        info.is_local
    );

    match provider.find_config(&request).await {
        Ok(report) => {
            match args.format {
                OutputFormat::Human => output_human(&report),
                OutputFormat::Json => {
                    let payload = FindConfigResponse::Success(report);
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(1)
        }
    }
}

fn handle_request(file: &str, options: &SolverOptions) -> anyhow::Result<i32> {
    let body = if file == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read request from stdin")?;
        body
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?
    };

    let response = CapnetCore::respond_json(&body, options);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(if response.is_success() { 0 } else { 1 })
}

fn output_human(report: &ConfigReport) {
    println!("Target:     {}", report.target_capacitance);
    println!("Achieved:   {}", report.achieved_capacitance);
    println!("Difference: {}", report.absolute_difference);
    println!("{}", "─".repeat(60));

    for (i, branch) in report.branches.iter().enumerate() {
        println!(
            "\n  Branch {}: {} total ({}F fixed in series with {}F)",
            i + 1,
            branch.c_branch_total,
            branch.c_fixed,
            branch.c_parallel_group
        );
        if branch.total_parallel_caps_in_group == 0 {
            println!("    no parallel capacitors");
            continue;
        }
        for (value, count) in branch.parallel_group_counts.used() {
            println!("    {} x {}", count, value);
        }
    }
}
