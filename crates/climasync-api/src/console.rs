// Mautic administrative console, invoked as a subprocess.
//
// The console is a black box: we hand it a command name
// (`mautic:segments:update`, ...) and get back its text output and exit
// status. The launcher prefix is configurable so the same code drives a
// dockerised install (`docker exec mautic php bin/console`) or a local one.

use std::process::Stdio;

use tracing::debug;

use crate::error::Error;

/// Captured result of one console invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ConsoleOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Launcher for Mautic console commands.
#[derive(Debug, Clone)]
pub struct Console {
    program: String,
    prefix: Vec<String>,
}

impl Console {
    /// `program` plus fixed leading `prefix` args; the console command name
    /// is appended per call.
    pub fn new(program: impl Into<String>, prefix: Vec<String>) -> Self {
        Self {
            program: program.into(),
            prefix,
        }
    }

    /// The full command line for `command`, for logging.
    pub fn command_line(&self, command: &str) -> String {
        let mut parts = Vec::with_capacity(self.prefix.len() + 2);
        parts.push(self.program.as_str());
        parts.extend(self.prefix.iter().map(String::as_str));
        parts.push(command);
        parts.join(" ")
    }

    /// Run one console command to completion.
    ///
    /// A non-zero exit is reported as `Error::Console` carrying stderr;
    /// the caller decides whether that is fatal.
    pub async fn run(&self, command: &str) -> Result<ConsoleOutput, Error> {
        let line = self.command_line(command);
        debug!(command = %line, "running console command");

        let output = tokio::process::Command::new(&self.program)
            .args(&self.prefix)
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Console {
                command: line.clone(),
                message: e.to_string(),
            })?;

        let captured = ConsoleOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if captured.success() {
            Ok(captured)
        } else {
            Err(Error::Console {
                command: line,
                message: match captured.code {
                    Some(code) => format!("exit {code}: {}", captured.stderr.trim()),
                    None => format!("terminated by signal: {}", captured.stderr.trim()),
                },
            })
        }
    }
}
