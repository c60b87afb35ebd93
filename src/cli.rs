//! Command-line entry points shared by the `codebox` binary.

use crate::config::config::SandboxConfig;
use crate::config::types::{ExecutionStatus, Language};
use crate::languages;
use crate::orchestrator::Orchestrator;
use crate::sandbox::runner;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and execute a submission in the sandbox
    Run {
        /// Source file to execute
        file: Option<PathBuf>,
        /// Inline source text instead of a file
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,
        /// Language name (python, javascript, java, cpp); inferred from
        /// the file extension when omitted
        #[arg(long)]
        language: Option<String>,
        /// Wall-clock limit in milliseconds
        #[arg(long)]
        time_ms: Option<u64>,
    },
    /// Produce a quality report without executing anything
    Analyze {
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Pre-check a submission against the denylist without running it
    Validate {
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Report which language toolchains are available on this host
    CheckDeps {
        #[arg(long)]
        verbose: bool,
    },
}

pub fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SandboxConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SandboxConfig::default(),
    };

    match cli.command {
        Commands::Run {
            file,
            code,
            language,
            time_ms,
        } => {
            if let Some(ms) = time_ms {
                config.wall_time_limit_ms = ms;
            }
            let (source, lang) = read_submission(file.as_deref(), code, language.as_deref())?;
            let orchestrator = Orchestrator::new(config)?;
            let outcome = orchestrator.submit(&source, lang);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            let success =
                outcome.status == ExecutionStatus::Completed && outcome.exit_code == Some(0);
            if !success {
                std::process::exit(1);
            }
        }
        Commands::Analyze {
            file,
            code,
            language,
        } => {
            let (source, lang) = read_submission(file.as_deref(), code, language.as_deref())?;
            let orchestrator = Orchestrator::new(config)?;
            let report = orchestrator.analyze(&source, lang);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Validate {
            file,
            code,
            language,
        } => {
            let (source, lang) = read_submission(file.as_deref(), code, language.as_deref())?;
            let orchestrator = Orchestrator::new(config)?;
            let verdict = orchestrator.validate(&source, lang);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            if !verdict.allowed {
                std::process::exit(1);
            }
        }
        Commands::CheckDeps { verbose } => check_dependencies(&config, verbose),
    }

    Ok(())
}

fn read_submission(
    file: Option<&Path>,
    code: Option<String>,
    language: Option<&str>,
) -> Result<(String, Language)> {
    let source = match (file, code) {
        (Some(path), None) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, Some(inline)) => inline,
        (None, None) => bail!("provide a source file or --code"),
        (Some(_), Some(_)) => unreachable!("clap rejects file together with --code"),
    };

    let lang = match language {
        Some(name) => Language::parse(name)?,
        None => match file.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
            Some("py") => Language::Python,
            Some("js") | Some("mjs") => Language::JavaScript,
            Some("java") => Language::Java,
            Some("cpp") | Some("cc") | Some("cxx") => Language::Cpp,
            _ => Language::Python,
        },
    };

    Ok((source, lang))
}

fn check_dependencies(config: &SandboxConfig, verbose: bool) {
    for &lang in Language::all() {
        let runner_override = config.runners.get(&lang).map(String::as_str);
        let adapter = languages::adapter_for(lang, runner_override);
        let mut missing = Vec::new();
        let mut resolved = Vec::new();
        for binary in adapter.required_binaries() {
            match runner::resolve_binary(&binary) {
                Some(path) => resolved.push(format!("{binary} -> {}", path.display())),
                None => missing.push(binary),
            }
        }
        if missing.is_empty() {
            println!("{lang}: ok");
            if verbose {
                for entry in resolved {
                    println!("  {entry}");
                }
            }
        } else {
            println!("{lang}: missing {}", missing.join(", "));
        }
    }
}
