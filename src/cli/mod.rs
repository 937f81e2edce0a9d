//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod config;
pub mod edit;
pub mod new;
pub mod show;
pub mod version;

use std::io::{BufRead, Write};

pub use config::handle_config_command;
pub use edit::{handle_edit_command, EditArgs};
pub use new::{handle_new_command, NewArgs};
pub use show::{handle_show_command, ShowArgs};
pub use version::handle_version_command;

use crate::config::{SealerPaths, Settings};
use crate::gateway::{pick_editor, Editor, Kubectl, Kubeseal, SystemRunner};
use crate::validation::FieldError;

/// Resolved configuration plus the real collaborators built from it
pub struct Context {
    pub paths: SealerPaths,
    pub settings: Settings,
}

impl Context {
    pub fn new(paths: SealerPaths, settings: Settings) -> Self {
        Self { paths, settings }
    }

    pub fn kubeseal(&self) -> Kubeseal<SystemRunner> {
        Kubeseal::new(SystemRunner, self.settings.kubeseal_path.clone())
            .with_cert(self.settings.cert.clone())
            .with_temp_prefix(self.settings.temp_prefix.clone())
    }

    pub fn kubectl(&self) -> Kubectl<SystemRunner> {
        Kubectl::new(SystemRunner, self.settings.kubectl_path.clone())
    }

    pub fn editor(&self) -> Editor<SystemRunner> {
        let command = pick_editor(
            std::env::var("VISUAL").ok(),
            std::env::var("EDITOR").ok(),
            self.settings.editor.as_deref(),
        );
        Editor::new(SystemRunner, command).with_temp_prefix(self.settings.temp_prefix.clone())
    }
}

/// Report validation errors and ask whether to edit again
///
/// Returns `false` when stdin is closed.
pub fn prompt_retry(errors: &[FieldError]) -> bool {
    let stdin = std::io::stdin();
    prompt_retry_with(errors, &mut stdin.lock(), &mut std::io::stderr())
}

fn prompt_retry_with(errors: &[FieldError], input: &mut impl BufRead, out: &mut impl Write) -> bool {
    let _ = writeln!(out, "validation failed:");
    for error in errors {
        let _ = writeln!(out, "  - {}", error);
    }
    let _ = writeln!(
        out,
        "Press Enter to return to the editor, or Ctrl+C to exit."
    );
    let _ = out.flush();

    let mut line = String::new();
    matches!(input.read_line(&mut line), Ok(n) if n > 0)
}
