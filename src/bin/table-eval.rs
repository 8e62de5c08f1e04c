use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use table_match_eval::{EvalOptions, Verdict, assert_table_bytes, evaluate_bytes};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "table-eval",
    version,
    about = "Score a markdown table against an expected table"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two table files.
    Compare(CompareArgs),
    /// Grade an output file using a harness context JSON file.
    Assert(AssertArgs),
}

#[derive(Debug, Args)]
struct ScoringArgs {
    /// Score at or above which a metric passes.
    #[arg(long, default_value_t = 0.8)]
    pass_threshold: f64,

    /// Similarity that fuzzy matches must exceed.
    #[arg(long, default_value_t = 0.8)]
    fuzzy_threshold: f64,

    /// Cells listed in a reason before summarizing the rest.
    #[arg(long, default_value_t = 5)]
    max_listed: usize,
}

impl ScoringArgs {
    fn to_options(&self) -> EvalOptions {
        EvalOptions {
            pass_threshold: self.pass_threshold,
            fuzzy_threshold: self.fuzzy_threshold,
            max_listed: self.max_listed,
            ..EvalOptions::default()
        }
    }
}

#[derive(Debug, Args)]
struct CompareArgs {
    /// File holding the table to grade.
    #[arg(short, long)]
    actual: PathBuf,

    /// File holding the expected table.
    #[arg(short, long)]
    expected: PathBuf,

    #[command(flatten)]
    scoring: ScoringArgs,

    /// Print the verdict as JSON.
    #[arg(long)]
    json: bool,

    /// Include per-metric reasons in the summary.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct AssertArgs {
    /// File holding the output to grade.
    #[arg(short, long)]
    output: PathBuf,

    /// JSON context carrying vars.expected_content.
    #[arg(short, long)]
    context: PathBuf,

    #[command(flatten)]
    scoring: ScoringArgs,
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn run_compare(args: &CompareArgs) -> Result<Verdict> {
    let actual = read_bytes(&args.actual)?;
    let expected = read_bytes(&args.expected)?;
    let verdict = evaluate_bytes(&actual, &expected, &args.scoring.to_options())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_summary(&verdict, args.verbose);
    }
    Ok(verdict)
}

fn run_assert(args: &AssertArgs) -> Result<Verdict> {
    let output = read_bytes(&args.output)?;
    let context = read_bytes(&args.context)?;
    let context = serde_json::from_slice::<serde_json::Value>(&context)
        .with_context(|| format!("invalid context JSON in '{}'", args.context.display()))?;

    let verdict = assert_table_bytes(&output, &context, &args.scoring.to_options())?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(verdict)
}

fn print_summary(verdict: &Verdict, verbose: bool) {
    let status = if verdict.passed() { "PASS" } else { "FAIL" };
    println!("{status} score={:.3} {}", verdict.score(), verdict.reason());

    let Some(report) = verdict.report() else {
        return;
    };
    for (name, metric) in ["content", "structure", "position"]
        .iter()
        .zip(report.components())
    {
        let status = if metric.passed { "pass" } else { "fail" };
        if verbose {
            println!("  {name:<9} {:.3} {status}: {}", metric.score, metric.reason);
        } else {
            println!("  {name:<9} {:.3} {status}", metric.score);
        }
    }
}

fn exit_code(result: Result<Verdict>) -> ExitCode {
    match result {
        Ok(verdict) if verdict.passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("table_match_eval=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compare(args) => exit_code(run_compare(&args)),
        Commands::Assert(args) => exit_code(run_assert(&args)),
    }
}
