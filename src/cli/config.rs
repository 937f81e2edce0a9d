//! `config` command

use super::Context;
use crate::error::SealerResult;

/// Print resolved paths and effective settings
pub fn handle_config_command(ctx: &Context) -> SealerResult<()> {
    println!("kubectl-sealer Configuration");
    println!("============================");
    println!("Config directory: {}", ctx.paths.base_dir().display());
    println!("Settings file:    {}", ctx.paths.settings_file().display());
    println!();
    println!("Settings:");
    println!("{}", ctx.settings.to_pretty_json()?);
    Ok(())
}
