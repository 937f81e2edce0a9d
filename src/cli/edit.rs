//! `edit` command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use super::{prompt_retry, Context};
use crate::error::SealerResult;
use crate::models::OutputFormat;
use crate::services::{EditOptions, EditOutcome, EditSession};
use crate::storage::{read_file, write_atomic};

/// Arguments for `edit`
#[derive(Args, Debug)]
pub struct EditArgs {
    /// SealedSecret manifest to edit
    #[arg(short = 'f', long = "filename")]
    pub filename: PathBuf,

    /// Overwrite the input file with the updated SealedSecret
    #[arg(short = 'i', long)]
    pub in_place: bool,

    /// Re-encrypt every value, even unmodified ones
    #[arg(long)]
    pub force_update: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,
}

/// Handle the edit command
pub fn handle_edit_command(ctx: &Context, args: EditArgs) -> SealerResult<()> {
    let input = read_file(&args.filename)?;

    let kubeseal = ctx.kubeseal();
    let kubectl = ctx.kubectl();
    let editor = ctx.editor();
    let session = EditSession::new(&kubeseal, &kubectl, &editor, &ctx.settings);

    let options = EditOptions {
        force_update: args.force_update,
        format: args.output,
    };

    match session.edit(&input, options, prompt_retry)? {
        EditOutcome::NoChange => {
            println!("no change");
        }
        EditOutcome::Updated {
            output,
            reconciliation,
        } => {
            eprintln!("{}: {}", reconciliation.path, reconciliation.diff.summary());

            if args.in_place {
                write_atomic(&args.filename, output.as_bytes())?;
                info!(file = %args.filename.display(), "updated SealedSecret in place");
            } else {
                print!("{}", output);
            }
        }
    }

    Ok(())
}
