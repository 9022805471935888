pub mod cli;
pub mod correct;
pub mod edit;
pub mod export;
pub mod fields;
pub mod header_map;
pub mod import;
pub mod instruct;
pub mod io_utils;
pub mod normalize;
pub mod preview;
pub mod record;
pub mod store;
pub mod vocab;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands, Pathway, VocabArgs};
use crate::vocab::Vocabulary;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("labdesk", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Import(args) => import::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Edit(args) => edit::execute(&args),
        Commands::Export(args) => export::execute(&args),
        Commands::Vocab(args) => handle_vocab(&args),
    }
}

fn handle_vocab(args: &VocabArgs) -> Result<()> {
    let vocab = match args.pathway {
        Pathway::Import => Vocabulary::delivery_import(),
        Pathway::Edit => Vocabulary::edit_instruction(),
    };
    vocab
        .save(&args.output)
        .with_context(|| format!("Writing vocabulary to {:?}", args.output))?;
    info!(
        "Wrote {} alias entr(ies) to {:?}",
        vocab.aliases.len(),
        args.output
    );
    Ok(())
}
