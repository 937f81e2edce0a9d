//! `new` command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use super::{prompt_retry, Context};
use crate::error::SealerResult;
use crate::models::{OutputFormat, Scope, SecretType};
use crate::services::{EditSession, NewSecret};
use crate::storage::write_atomic;

/// Arguments for `new`
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Write the new SealedSecret to this file instead of stdout
    #[arg(short = 'f', long = "filename")]
    pub filename: Option<PathBuf>,

    /// Name of the Secret
    #[arg(long, default_value = "changeme")]
    pub name: String,

    /// Namespace of the Secret
    #[arg(long, default_value = "default")]
    pub namespace: String,

    /// Type of the Secret
    #[arg(long = "type", default_value = "Opaque", value_parser = parse_secret_type)]
    pub secret_type: SecretType,

    /// Sealing scope: strict, namespace-wide or cluster-wide
    #[arg(long, default_value = "strict", value_parser = parse_scope)]
    pub scope: Scope,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,
}

fn parse_secret_type(s: &str) -> Result<SecretType, String> {
    SecretType::parse_known(s).ok_or_else(|| format!("no such type exists for Secret: {:?}", s))
}

fn parse_scope(s: &str) -> Result<Scope, String> {
    Scope::parse(s).ok_or_else(|| format!("unknown scope {:?}", s))
}

/// Handle the new command
pub fn handle_new_command(ctx: &Context, args: NewArgs) -> SealerResult<()> {
    let new = NewSecret {
        name: args.name,
        namespace: args.namespace,
        secret_type: args.secret_type,
        scope: args.scope,
    };

    let kubeseal = ctx.kubeseal();
    let kubectl = ctx.kubectl();
    let editor = ctx.editor();
    let session = EditSession::new(&kubeseal, &kubectl, &editor, &ctx.settings);

    let output = session.create(&new, args.output, prompt_retry)?;

    match args.filename {
        Some(path) => {
            write_atomic(&path, output.as_bytes())?;
            info!(file = %path.display(), "wrote new SealedSecret");
        }
        None => print!("{}", output),
    }

    Ok(())
}
