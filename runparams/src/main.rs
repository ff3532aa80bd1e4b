//! Read and validate Illumina `runParameters.xml`.
//!
//! Every command accepts either the XML file itself or the run folder that
//! contains it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use runparams::core::compare::compare;
use runparams::io::config::load_config;
use runparams::io::expected::load_expected;
use runparams::io::run_dir::read_run_parameters;
use runparams::io::writer::render;
use runparams::scan::{ScanStatus, scan_run_root};
use runparams::summary::summarize;
use runparams::{RunParametersReader, exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "runparams",
    version,
    about = "Read and validate Illumina runParameters.xml"
)]
struct Cli {
    /// Reader configuration (TOML). Defaults apply when omitted or missing.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a summary of the run.
    Show {
        /// runParameters.xml or a run folder.
        path: PathBuf,
        /// Print the parsed record as JSON instead.
        #[arg(long)]
        json: bool,
    },
    /// Parse and validate; report every defect found.
    Validate {
        /// runParameters.xml or a run folder.
        path: PathBuf,
    },
    /// Compare the run against an expected-run record.
    Check {
        /// runParameters.xml or a run folder.
        path: PathBuf,
        /// Expected values (TOML).
        #[arg(long)]
        expect: PathBuf,
    },
    /// Re-serialize the parsed run parameters to stdout.
    Render {
        /// runParameters.xml or a run folder.
        path: PathBuf,
    },
    /// Validate every run folder under a run root.
    Scan {
        /// Directory holding run folders.
        root: PathBuf,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let reader = build_reader(cli.config.as_deref())?;
    match cli.command {
        Command::Show { path, json } => cmd_show(&reader, &path, json),
        Command::Validate { path } => cmd_validate(&reader, &path),
        Command::Check { path, expect } => cmd_check(&reader, &path, &expect),
        Command::Render { path } => cmd_render(&reader, &path),
        Command::Scan { root } => cmd_scan(&reader, &root),
    }
}

fn build_reader(config_path: Option<&Path>) -> Result<RunParametersReader> {
    let config = match config_path {
        Some(path) => load_config(path).context("load reader config")?,
        None => Default::default(),
    };
    Ok(RunParametersReader::new(config))
}

fn cmd_show(reader: &RunParametersReader, path: &Path, json: bool) -> Result<i32> {
    let config = read_run_parameters(path, reader)?;
    if json {
        let payload = serde_json::to_string_pretty(&config).context("serialize json")?;
        println!("{payload}");
    } else {
        print!("{}", summarize(&config));
    }
    Ok(exit_codes::OK)
}

fn cmd_validate(reader: &RunParametersReader, path: &Path) -> Result<i32> {
    let config = read_run_parameters(path, reader)?;
    println!("ok: {}", config.run_id);
    Ok(exit_codes::OK)
}

fn cmd_check(reader: &RunParametersReader, path: &Path, expect: &Path) -> Result<i32> {
    let config = read_run_parameters(path, reader)?;
    let expected = load_expected(expect)?;
    let mismatches = compare(&config, &expected);
    if mismatches.is_empty() {
        println!("ok: {}", config.run_id);
        return Ok(exit_codes::OK);
    }
    for mismatch in &mismatches {
        println!("{mismatch}");
    }
    Ok(exit_codes::MISMATCH)
}

fn cmd_render(reader: &RunParametersReader, path: &Path) -> Result<i32> {
    let config = read_run_parameters(path, reader)?;
    print!("{}", render(&config)?);
    Ok(exit_codes::OK)
}

fn cmd_scan(reader: &RunParametersReader, root: &Path) -> Result<i32> {
    let entries = scan_run_root(root, reader)?;
    let mut code = exit_codes::OK;
    for entry in &entries {
        match &entry.status {
            ScanStatus::Valid { run_id } => println!("ok      {run_id}"),
            ScanStatus::Invalid { reason } => {
                code = exit_codes::INVALID;
                println!("invalid {}: {reason}", entry.folder.display());
            }
        }
    }
    Ok(code)
}
