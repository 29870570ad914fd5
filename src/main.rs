use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use fillcsp::{render_grid, solve_with_options, FillFailure, GridConfig, SolveOptions, ValueOrder, Vocabulary};

/// Fill a crossword structure with words from a word list.
#[derive(Parser, Debug)]
#[command(name = "fillcsp", version, about)]
struct Cli {
    /// Structure file: one row per line, `_` for an open cell, anything else for a block.
    #[arg(value_name = "STRUCTURE")]
    structure: PathBuf,

    /// Word list, one word per line.
    #[arg(value_name = "WORDS")]
    words: PathBuf,

    /// Where to write the filled grid, if anywhere.
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Order in which candidate words are tried.
    #[arg(long, value_enum, default_value_t = ValueOrderArg::Domain)]
    value_order: ValueOrderArg,

    /// Maintain arc consistency after every assignment.
    #[arg(long)]
    inference: bool,

    /// Give up after this many seconds of search.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ValueOrderArg {
    Domain,
    LeastConstraining,
}

impl From<ValueOrderArg> for ValueOrder {
    fn from(arg: ValueOrderArg) -> ValueOrder {
        match arg {
            ValueOrderArg::Domain => ValueOrder::Domain,
            ValueOrderArg::LeastConstraining => ValueOrder::LeastConstraining,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let structure = fs::read_to_string(&cli.structure)
        .with_context(|| format!("reading structure from {}", cli.structure.display()))?;
    let words = fs::read_to_string(&cli.words)
        .with_context(|| format!("reading word list from {}", cli.words.display()))?;

    let grid = GridConfig::from_template(&structure)
        .with_context(|| format!("parsing structure in {}", cli.structure.display()))?;
    let vocabulary = Vocabulary::from_word_list(&words);
    info!("{} slots, {} words", grid.slot_count(), vocabulary.len());

    let options = SolveOptions {
        value_order: cli.value_order.into(),
        inference: cli.inference,
        deadline: cli.timeout.map(Duration::from_secs),
    };

    match solve_with_options(&grid, &vocabulary, options) {
        Ok(result) => {
            let display_grid = render_grid(&grid, &vocabulary, &result.assignment);

            println!("{:?}", result.statistics);
            println!("{}", display_grid);

            if let Some(output) = &cli.output {
                fs::write(output, format!("{}\n", display_grid))
                    .with_context(|| format!("writing grid to {}", output.display()))?;
                println!("written grid to {}", output.display());
            }
        }
        Err(FillFailure::Unsatisfiable) => println!("No solution."),
        Err(failure @ FillFailure::DeadlineExceeded) => println!("No solution: {}.", failure),
    }

    Ok(())
}
