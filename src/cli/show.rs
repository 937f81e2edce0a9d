//! `show` command

use std::path::PathBuf;

use clap::Args;

use super::Context;
use crate::error::SealerResult;
use crate::services::EditSession;
use crate::storage::read_file;

/// Arguments for `show`
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// SealedSecret manifest to decrypt
    #[arg(short = 'f', long = "filename")]
    pub filename: PathBuf,
}

/// Handle the show command
pub fn handle_show_command(ctx: &Context, args: ShowArgs) -> SealerResult<()> {
    let input = read_file(&args.filename)?;

    let kubeseal = ctx.kubeseal();
    let kubectl = ctx.kubectl();
    let editor = ctx.editor();
    let session = EditSession::new(&kubeseal, &kubectl, &editor, &ctx.settings);

    print!("{}", session.show(&input)?);
    Ok(())
}
