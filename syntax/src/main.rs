use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use horn::{diagnostics, Entry, ParseError, ParseOptions};

#[derive(Parser)]
#[command(name = "hornc")]
#[command(about = "Parser for the horn logic programming language", long_about = None)]
struct Cli {
    /// Log parser activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a horn program and print its syntax tree
    Parse {
        /// Input .horn file
        #[arg(required_unless_present = "source")]
        input: Option<PathBuf>,

        /// Parse this text instead of a file
        #[arg(long, conflicts_with = "input")]
        source: Option<String>,

        /// Grammar rule to parse the input as
        #[arg(short, long, value_enum, default_value_t = EntryArg::Program)]
        entry: EntryArg,

        /// Write the tree here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Deepest allowed nesting of groups, lists and `,`/`;` chains
        #[arg(long, default_value_t = ParseOptions::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Check that a horn program parses
    Check {
        /// Input .horn file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EntryArg {
    Program,
    Atom,
    TypeSeq,
    TypeDef,
    Module,
    Relation,
    List,
}

impl From<EntryArg> for Entry {
    fn from(arg: EntryArg) -> Self {
        match arg {
            EntryArg::Program => Entry::Program,
            EntryArg::Atom => Entry::Atom,
            EntryArg::TypeSeq => Entry::TypeSeq,
            EntryArg::TypeDef => Entry::TypeDef,
            EntryArg::Module => Entry::Module,
            EntryArg::Relation => Entry::Relation,
            EntryArg::List => Entry::List,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Parse {
            input,
            source,
            entry,
            output,
            max_depth,
        } => {
            let (name, text) = match (input, source) {
                (_, Some(text)) => ("<source>".to_string(), text),
                (Some(path), None) => (path.display().to_string(), read_source(&path)?),
                (None, None) => anyhow::bail!("no input given"),
            };
            let options = ParseOptions { max_depth };
            parse_program(&name, &text, entry.into(), &options, output.as_deref())?;
        }
        Commands::Check { input } => {
            check_program(&input)?;
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read source file {:?}", path))
}

fn parse_program(
    name: &str,
    source: &str,
    entry: Entry,
    options: &ParseOptions,
    output: Option<&Path>,
) -> Result<()> {
    debug!("parsing {} as {:?}", name, entry);
    let syntax = horn::parse_with(entry, source, options).map_err(|e| report(&e, name, source))?;

    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", syntax))
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("wrote syntax tree to {:?}", path);
        }
        None => println!("{}", syntax),
    }
    Ok(())
}

fn check_program(input: &Path) -> Result<()> {
    let name = input.display().to_string();
    let source = read_source(input)?;
    let program = horn::parse_program(&source).map_err(|e| report(&e, &name, &source))?;

    println!(
        "{}: ok ({} types, {} relations)",
        name,
        program.types.len(),
        program.relations.len()
    );
    Ok(())
}

/// Print a rendered diagnostic and turn the error into a plain failure
fn report(error: &ParseError, name: &str, source: &str) -> anyhow::Error {
    eprint!("{}", diagnostics::render(error, name, source, true));
    anyhow::anyhow!(error.clone())
}
