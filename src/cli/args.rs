// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute (convert or init)
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert a block tree file into flashcard decks
    Convert {
        /// Path to the JSON block tree
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Id of the root page or database
        #[arg(short, long, value_name = "ID")]
        root: String,

        /// Card option, repeatable (e.g. -o cloze=false)
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        options: Vec<(String, String)>,

        /// Block types that become flashcards, comma separated
        #[arg(long, value_name = "TYPES")]
        flashcards: Option<String>,

        /// Block types that become sub-decks, comma separated
        #[arg(long, value_name = "TYPES")]
        sub_decks: Option<String>,

        /// Where tags come from (strikethrough or heading)
        #[arg(long, value_name = "KIND")]
        tags_from: Option<String>,

        /// Deck name to nest the root deck under
        #[arg(long, value_name = "NAME")]
        parent: Option<String>,

        /// The root is a database rather than a page
        #[arg(long)]
        database: bool,

        /// Print decks as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init {
        /// Where to write the config
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

/// Parse `key=value`; the value may itself contain `=`
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
