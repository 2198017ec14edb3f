pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use application::{FlashcardFinder, ParentKind};
use domain::{ParserRules, TagSource};
use infrastructure::{Config, HtmlInlineRenderer, JsonBlockSource};
use ports::DeckPresenter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use crate::cli::args::{Args, Command};

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting notiondeck with arguments");

    match args.command {
        Command::Convert {
            tree,
            root,
            options,
            flashcards,
            sub_decks,
            tags_from,
            parent,
            database,
            json,
        } => {
            let config = load_config(args.config.as_deref())?;
            let settings = config.settings(&options)?;
            let rules = apply_rule_overrides(
                config.rules()?,
                flashcards.as_deref(),
                sub_decks.as_deref(),
                tags_from.as_deref(),
            )?;
            for conflict in rules.conflicts() {
                warn!(block_type = %conflict, "Type configured as flashcard and sub-deck, using sub-deck");
            }

            // Initialize infrastructure
            let source = JsonBlockSource::load(&tree)?;
            let renderer = HtmlInlineRenderer::new();
            let cancel = CancellationToken::new();
            spawn_ctrl_c_handler(cancel.clone());

            // Execute use case
            let parent_kind = if database {
                ParentKind::Database
            } else {
                ParentKind::Page
            };
            info!(root = %root, tree = %tree.display(), "Converting block tree");
            let decks = FlashcardFinder::new(&source, &renderer, &settings)
                .with_policy(config.fetch_policy())
                .with_cancellation(cancel)
                .find_flashcards(&root, parent_kind, parent.as_deref(), &rules)
                .await
                .with_context(|| format!("Failed to convert block tree {}", tree.display()))?;

            // Present
            let presenter = DeckPresenter::new();
            if json {
                println!("{}", presenter.render_json(&decks)?);
            } else {
                print!("{}", presenter.summary(&decks));
            }
            Ok(())
        }
        Command::Init { path } => {
            if path.exists() {
                anyhow::bail!("Config file already exists: {}", path.display());
            }
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory {}", dir.display()))?;
            }
            Config::create_default(&path)?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
    }
}

/// Explicit config path, else the user config file when it exists, else defaults
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        debug!(?path, "Using provided config path");
        return Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            debug!(?path, "Using user config");
            Config::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        _ => Ok(Config::default()),
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("notiondeck").join("config.toml"))
}

/// Command line rule flags replace the configured lists
pub fn apply_rule_overrides(
    mut rules: ParserRules,
    flashcards: Option<&str>,
    sub_decks: Option<&str>,
    tags_from: Option<&str>,
) -> Result<ParserRules> {
    if let Some(list) = flashcards {
        rules = rules.with_flashcard_types(list).context("Invalid --flashcards")?;
    }
    if let Some(list) = sub_decks {
        rules = rules.with_sub_deck_types(list).context("Invalid --sub-decks")?;
    }
    if let Some(kind) = tags_from {
        let kind: TagSource = kind.parse().context("Invalid --tags-from")?;
        rules = rules.with_tags_from(kind);
    }
    Ok(rules)
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling conversion");
            cancel.cancel();
        }
    });
}
