//! Text editor launched on a temporary file

use std::io::Write;

use zeroize::Zeroizing;

use super::exec::CommandRunner;
use super::EditingSurface;
use crate::error::{SealerError, SealerResult};

const FALLBACK_EDITOR: &str = "vi";

/// Choose the editor command: `$VISUAL`, then `$EDITOR`, then the configured one
pub fn pick_editor(
    visual: Option<String>,
    editor: Option<String>,
    configured: Option<&str>,
) -> String {
    [visual, editor, configured.map(String::from)]
        .into_iter()
        .flatten()
        .find(|cmd| !cmd.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Opens content in the user's editor
pub struct Editor<R: CommandRunner> {
    runner: R,
    command: String,
    temp_prefix: String,
}

impl<R: CommandRunner> Editor<R> {
    /// `command` may carry arguments, e.g. `code --wait`
    pub fn new(runner: R, command: impl Into<String>) -> Self {
        Self {
            runner,
            command: command.into(),
            temp_prefix: "kubectl-sealer-".to_string(),
        }
    }

    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }
}

impl<R: CommandRunner> EditingSurface for Editor<R> {
    fn edit(&self, content: &[u8]) -> SealerResult<Vec<u8>> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| SealerError::Config("editor command is empty".into()))?;

        let mut file = tempfile::Builder::new()
            .prefix(&self.temp_prefix)
            .suffix(".yaml")
            .tempfile()
            .map_err(|e| SealerError::Io(format!("error creating temporary file: {}", e)))?;
        file.write_all(content)
            .and_then(|_| file.flush())
            .map_err(|e| SealerError::Io(format!("error writing temporary file: {}", e)))?;

        let mut args: Vec<String> = parts.map(String::from).collect();
        args.push(file.path().display().to_string());

        self.runner
            .run_interactive(program, &args)
            .map_err(|e| SealerError::EditAborted(format!("error invoking editor: {}", e)))?;

        // Editors often replace the file, so read it back by path
        let edited = Zeroizing::new(std::fs::read(file.path()).map_err(|e| {
            SealerError::Io(format!("error reading edited file: {}", e))
        })?);
        Ok(edited.to_vec())
    }
}
