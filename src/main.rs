//! ai-doctor - interactive AI code doctor for Java
//!
//! Sends a Java file (or pasted snippet) to Gemini, applies the suggested
//! line fixes, and recompiles to check them.

use ai_doctor::config::Config;
use ai_doctor::context::ContextLocator;
use ai_doctor::diagnose::{BalancedScan, ExtractStrategy, GeminiClient, NaiveBracketScan, TraceContext};
use ai_doctor::input::{read_pasted, LoadedSource};
use ai_doctor::trace::{self, ApplicationFirst, FirstFrame, FrameRanking};
use ai_doctor::verify::Javac;
use ai_doctor::{report, DoctorError, Pipeline, RepairOptions};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(
    name = "ai-doctor",
    about = "Interactive AI Code Doctor for Java",
    long_about = "Asks Gemini to find bugs in a Java file, applies the suggested\n\
                  line fixes, and recompiles the result.\n\n\
                  Without --file, paste the code and finish with a line reading END.",
    version
)]
struct Args {
    /// Path to the Java file (reads pasted code from stdin when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Optional description of the bug
    #[arg(short, long)]
    desc: Option<String>,

    /// Stack-trace log whose failing line is added to the prompt
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Directory searched for the file named in the stack trace
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Which stack frame to treat as the failure site
    #[arg(long, value_enum, default_value_t = FrameChoice::First)]
    frame: FrameChoice,

    /// How the fix list is located in the model's answer
    #[arg(long, value_enum, default_value_t = StrategyChoice::Naive)]
    strategy: StrategyChoice,

    /// Also compile each fix on its own to see which ones break the build
    #[arg(long)]
    isolated: bool,

    /// List the models available to the configured API key and exit
    #[arg(long)]
    list_models: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FrameChoice {
    /// Topmost frame in the trace
    First,
    /// Topmost frame outside the JDK
    App,
}

impl FrameChoice {
    fn ranking(self) -> Box<dyn FrameRanking> {
        match self {
            FrameChoice::First => Box::new(FirstFrame),
            FrameChoice::App => Box::new(ApplicationFirst),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyChoice {
    /// First `[` to last `]`
    Naive,
    /// First balanced array of objects
    Balanced,
}

impl StrategyChoice {
    fn strategy(self) -> Box<dyn ExtractStrategy> {
        match self {
            StrategyChoice::Naive => Box::new(NaiveBracketScan),
            StrategyChoice::Balanced => Box::new(BalancedScan),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", report::unexpected(&format!("{:#}", err)));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    println!("{}", report::banner());
    let config = Config::load();
    debug!(config = %Config::config_location(), model = config.model(), "Loaded config");

    if args.list_models {
        let client = GeminiClient::from_config(&config)?;
        let models = client.list_models().await?;
        println!("{}", report::models(&models));
        return Ok(ExitCode::SUCCESS);
    }

    let source = match load_source(args.file.as_deref()) {
        Ok(source) => source,
        Err(err @ (DoctorError::FileNotFound(_) | DoctorError::EmptyInput)) => {
            let line = report::error(&err.to_string());
            if shown_on_stdout(&err) {
                println!("{}", line);
            } else {
                eprintln!("{}", line);
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    let outcome = diagnose_and_repair(&args, &config, &source).await;
    if let Err(err) = source.cleanup() {
        warn!("Failed to remove temporary files for {}: {}", source.path.display(), err);
    }
    outcome
}

/// Empty pastes are reported on stdout, other input errors on stderr.
fn shown_on_stdout(err: &DoctorError) -> bool {
    matches!(err, DoctorError::EmptyInput)
}

fn load_source(file: Option<&Path>) -> Result<LoadedSource, DoctorError> {
    match file {
        Some(path) => {
            let source = LoadedSource::from_file(path)?;
            println!("{}", report::reading_file(&source.file_name()));
            Ok(source)
        }
        None => {
            println!("{}", report::paste_instructions());
            let code = read_pasted(io::stdin().lock())?;
            let source = LoadedSource::from_snippet(&code, &std::env::temp_dir())?;
            println!("{}", report::saved_snippet(&source.file_name()));
            Ok(source)
        }
    }
}

fn load_trace(args: &Args) -> Result<Option<TraceContext>> {
    let Some(log_path) = &args.log else {
        return Ok(None);
    };
    let log_text = std::fs::read_to_string(log_path)
        .with_context(|| format!("Failed to read log {}", log_path.display()))?;
    let locator = trace::parse_with(&log_text, args.frame.ranking().as_ref())?;
    let window = ContextLocator::new(&args.root).locate(&locator.file_name, locator.line_number)?;
    println!("{}", report::trace_located(&locator, &window));
    Ok(Some(TraceContext { locator, window }))
}

async fn diagnose_and_repair(
    args: &Args,
    config: &Config,
    source: &LoadedSource,
) -> Result<ExitCode> {
    let trace = load_trace(args)?;
    let client = GeminiClient::from_config(config)?;

    print!("{}", report::scanning());
    io::stdout().flush()?;
    let raw = client
        .analyze_bug(args.desc.as_deref(), &source.text, trace.as_ref())
        .await?;
    println!("{}", report::done());

    let compiler = Javac::new(config.javac()).with_args(config.javac_args.clone());
    let pipeline = Pipeline::new(compiler)
        .with_strategy(args.strategy.strategy())
        .with_options(RepairOptions {
            isolated: args.isolated,
        });

    match pipeline.repair(source, &raw) {
        Ok(repair) => {
            report::print_report(&repair);
            Ok(ExitCode::SUCCESS)
        }
        Err(DoctorError::NoFixList { raw }) => {
            println!("{}", report::no_fix_list(&raw));
            Ok(ExitCode::FAILURE)
        }
        Err(err @ DoctorError::MalformedFixList(_)) => {
            println!("{}", report::error(&err.to_string()));
            println!("Raw output: {}", raw);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}
