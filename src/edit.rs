use anyhow::{Result, bail};
use log::info;

use crate::{
    cli::EditArgs,
    instruct::{
        CommandParser, InstructionContext, InstructionParser, PreparsedFile, apply_instruction,
    },
    store::{JsonStore, RequestStore},
    vocab::Vocabulary,
};

pub fn execute(args: &EditArgs) -> Result<()> {
    let vocab = match &args.vocab {
        Some(path) => Vocabulary::load(path)?,
        None => Vocabulary::edit_instruction(),
    };
    let parser: Box<dyn InstructionParser> = match (&args.parser, &args.parsed) {
        (Some(command_line), None) => Box::new(CommandParser::from_command_line(command_line)?),
        (None, Some(path)) => Box::new(PreparsedFile(path.clone())),
        _ => bail!("Provide either --parser or --parsed"),
    };

    let mut store = JsonStore::open(&args.store)?;
    let context = InstructionContext {
        table: args.table.clone(),
        total_count: store.count(&[])?,
    };
    info!(
        "Interpreting instruction against {} record(s) in {:?}",
        context.total_count, args.store
    );

    let outcome = apply_instruction(&*parser, &mut store, &vocab, &args.instruction, &context)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
