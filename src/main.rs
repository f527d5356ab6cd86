//! Command-line interface for the set-algebra front end.
//!
//! Reads one source file, runs the lexer and the three parse passes, and
//! writes four JSON artifacts into the output directory: the token list and
//! one tree per pass. A failed pass produces an empty `[]` artifact and an
//! error log line; the exit status is nonzero only when the tables or the
//! input cannot be read or an artifact cannot be written.

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use serde::Serialize;
use setalg::{Analysis, PassError, Pipeline, Tables};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Analyze a set-algebra program", long_about = None)]
struct Args {
    /// Source file with the program to analyze.
    input: PathBuf,

    /// Parse-table CSV; the bundled table when omitted.
    #[arg(short = 't', long)]
    table: Option<PathBuf>,

    /// Grammar listing; the bundled listing when omitted.
    #[arg(short = 'g', long)]
    grammar: Option<PathBuf>,

    /// Directory the JSON artifacts are written into.
    #[arg(short = 'o', long, default_value = ".")]
    out_dir: PathBuf,
}

const ARTIFACTS: [&str; 4] = [
    "lexer_out.json",
    "parser_out.json",
    "typing_out.json",
    "evaluation_out.json",
];

fn load_tables(args: &Args) -> Result<Tables> {
    let table = match &args.table {
        Some(path) => fs::read_to_string(path)?,
        None => include_str!("../tables/slr-table.csv").to_string(),
    };
    let listing = match &args.grammar {
        Some(path) => fs::read_to_string(path)?,
        None => include_str!("../tables/grammar.txt").to_string(),
    };
    Ok(Tables::load(&table, &listing)?)
}

fn render<T: Serialize>(pass: &str, result: &Result<T, PassError>) -> Result<String> {
    match result {
        Ok(tree) => Ok(serde_json::to_string_pretty(tree)?),
        Err(err) => {
            error!("{pass} pass failed: {err}");
            Ok("[]".into())
        }
    }
}

fn write_artifacts(dir: &Path, analysis: &Analysis) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(
        dir.join(ARTIFACTS[0]),
        serde_json::to_string_pretty(&analysis.tokens)?,
    )?;
    fs::write(dir.join(ARTIFACTS[1]), render("syntax", &analysis.syntax)?)?;
    fs::write(dir.join(ARTIFACTS[2]), render("typing", &analysis.types)?)?;
    fs::write(
        dir.join(ARTIFACTS[3]),
        render("evaluation", &analysis.eval)?,
    )?;
    Ok(())
}

fn write_empty_artifacts(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    for name in ARTIFACTS {
        fs::write(dir.join(name), "[]")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let tables = load_tables(&args)?;
    let source = fs::read_to_string(&args.input)?;

    match Pipeline::new(tables).run(&source) {
        Ok(analysis) => {
            info!(
                "{} tokens, writing artifacts to {}",
                analysis.tokens.len(),
                args.out_dir.display()
            );
            write_artifacts(&args.out_dir, &analysis)?;
        }
        Err(err) => {
            error!("lexical error: {err}");
            write_empty_artifacts(&args.out_dir)?;
        }
    }
    Ok(())
}
