//! Process execution
//!
//! Provides the `CommandRunner` seam used by every external collaborator.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{SealerError, SealerResult};

/// Runs external programs
pub trait CommandRunner {
    /// Run `program` with `args`, feeding `stdin`, and return its stdout
    ///
    /// A non-zero exit status is an error carrying the program's stderr.
    fn run(&self, program: &str, args: &[String], stdin: &[u8]) -> SealerResult<Vec<u8>>;

    /// Run `program` attached to the current terminal and wait for it
    fn run_interactive(&self, program: &str, args: &[String]) -> SealerResult<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[String], stdin: &[u8]) -> SealerResult<Vec<u8>> {
        (**self).run(program, args, stdin)
    }

    fn run_interactive(&self, program: &str, args: &[String]) -> SealerResult<()> {
        (**self).run_interactive(program, args)
    }
}

/// `CommandRunner` that spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], stdin: &[u8]) -> SealerResult<Vec<u8>> {
        debug!(program, ?args, "running command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SealerError::Io(format!("failed to start {}: {}", program, e)))?;

        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| SealerError::Io(format!("no stdin handle for {}", program)))?;

        // Feed stdin on a separate thread so a chatty child cannot deadlock us
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || child_stdin.write_all(stdin));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = match output {
            (Ok(output), _) if !output.status.success() => {
                return Err(SealerError::Io(format!(
                    "{} {} exited with {}: {}",
                    program,
                    args.join(" "),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
            (Ok(output), Ok(())) => output,
            (Ok(_), Err(e)) => {
                return Err(SealerError::Io(format!(
                    "failed writing input to {}: {}",
                    program, e
                )));
            }
            (Err(e), _) => {
                return Err(SealerError::Io(format!("failed waiting for {}: {}", program, e)));
            }
        };

        Ok(output.stdout)
    }

    fn run_interactive(&self, program: &str, args: &[String]) -> SealerResult<()> {
        debug!(program, ?args, "running interactive command");

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| SealerError::Io(format!("failed to start {}: {}", program, e)))?;

        if !status.success() {
            return Err(SealerError::Io(format!(
                "{} {} exited with {}",
                program,
                args.join(" "),
                status
            )));
        }

        Ok(())
    }
}
