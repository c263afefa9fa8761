use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use js2py::config::{Config, RuntimeMode};
use js2py::syntax::Mode;
use js2py::Level;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "js2py", version, about = "Convert ES5 JavaScript (plus an ES6 subset) to Python")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single JavaScript file to Python
    Convert {
        /// Path to the JavaScript source file
        input: PathBuf,

        /// Output path (defaults to the input with a .py extension)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Parse the input as an ES module
        #[arg(long)]
        module: bool,

        /// Whether the output imports the runtime facade
        #[arg(long, value_enum, default_value = "include")]
        runtime: RuntimeArg,

        /// Treat warnings as errors and disable tolerant parsing
        #[arg(long)]
        strict: bool,

        /// Write the diagnostic report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// AST cache directory
        #[arg(long, default_value = ".cache/ast")]
        cache_dir: PathBuf,

        /// Disable the AST cache
        #[arg(long)]
        no_cache: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RuntimeArg {
    Include,
    Skip,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("js2py=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match dispatch(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn dispatch(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Convert {
            input,
            out,
            module,
            runtime,
            strict,
            report,
            cache_dir,
            no_cache,
        } => {
            let source = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let config = Config {
                file: input.display().to_string(),
                mode: if module { Mode::Module } else { Mode::Script },
                strict,
                runtime: match runtime {
                    RuntimeArg::Include => RuntimeMode::Include,
                    RuntimeArg::Skip => RuntimeMode::Skip,
                },
                cache_dir: if no_cache { None } else { Some(cache_dir) },
            };

            let outcome = js2py::convert(&source, &config)
                .with_context(|| format!("failed to convert {}", input.display()))?;

            let out_path = out.unwrap_or_else(|| input.with_extension("py"));
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
            }
            fs::write(&out_path, &outcome.output)
                .with_context(|| format!("failed to write {}", out_path.display()))?;

            for diagnostic in &outcome.diagnostics {
                eprintln!("{}", diagnostic);
            }

            if let Some(report_path) = report {
                let payload = serde_json::to_string_pretty(&outcome.diagnostics)
                    .context("failed to serialize the diagnostic report")?;
                fs::write(&report_path, payload)
                    .with_context(|| format!("failed to write {}", report_path.display()))?;
            }

            let failed = outcome
                .diagnostics
                .iter()
                .any(|diagnostic| diagnostic.level == Level::Error);
            Ok(if failed {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
