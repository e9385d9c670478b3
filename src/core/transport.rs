use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use crate::core::alert::Alert;
use crate::core::error::MonitorError;

pub const PASSWORD_ENV: &str = "JOBWATCH_SMTP_PASSWORD";
pub const DEFAULT_MAIL_COMMAND: &str = "sendmail -t -i";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sender: String,
    pub recipient: String,
    pub credential: Option<String>,
}

pub trait AlertTransport {
    fn send(&self, envelope: &Envelope, alert: &Alert) -> Result<(), MonitorError>;
}

/// Pipes the message into a sendmail-compatible program.
#[derive(Debug, Clone)]
pub struct CommandTransport {
    program: String,
    args: Vec<String>,
}

impl CommandTransport {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a transport from a shell-style command line such as
    /// `msmtp --account=alerts -t`.
    pub fn from_command_line(line: &str) -> Result<Self, MonitorError> {
        let mut tokens = shell_words::split(line).map_err(|err| MonitorError::Config {
            message: format!("alert command '{line}': {err}"),
        })?;
        if tokens.is_empty() {
            return Err(MonitorError::Config {
                message: "alert command is empty".to_string(),
            });
        }
        let program = tokens.remove(0);
        Ok(Self::new(program, tokens))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl AlertTransport for CommandTransport {
    fn send(&self, envelope: &Envelope, alert: &Alert) -> Result<(), MonitorError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(credential) = &envelope.credential {
            cmd.env(PASSWORD_ENV, credential);
        }

        debug!(program = %self.program, args = ?self.args, "spawning alert transport");
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MonitorError::Transport {
                    message: format!("'{}' not found in PATH", self.program),
                }
            } else {
                MonitorError::Transport {
                    message: e.to_string(),
                }
            }
        })?;

        let message = format_message(envelope, alert);
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.as_bytes())
                .map_err(|e| MonitorError::Transport {
                    message: format!("failed to write message: {e}"),
                })?;
        }

        let output = child.wait_with_output().map_err(|e| MonitorError::Transport {
            message: e.to_string(),
        })?;

        if output.status.success() {
            info!(recipient = %envelope.recipient, subject = %alert.subject, "alert sent");
            Ok(())
        } else {
            Err(MonitorError::Transport {
                message: format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }
}

/// Logs the alert instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

impl AlertTransport for DryRunTransport {
    fn send(&self, envelope: &Envelope, alert: &Alert) -> Result<(), MonitorError> {
        info!(
            sender = %envelope.sender,
            recipient = %envelope.recipient,
            subject = %alert.subject,
            "dry run, alert not sent"
        );
        debug!("alert body:\n{}", alert.body);
        Ok(())
    }
}

/// Sends through `transport`, logging a failure instead of returning it.
pub fn deliver(transport: &dyn AlertTransport, envelope: &Envelope, alert: &Alert) -> bool {
    match transport.send(envelope, alert) {
        Ok(()) => true,
        Err(err) => {
            error!(recipient = %envelope.recipient, "{err}");
            false
        }
    }
}

/// Minimal RFC 5322 message: headers, blank line, body.
pub fn format_message(envelope: &Envelope, alert: &Alert) -> String {
    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
        envelope.sender,
        envelope.recipient,
        alert.subject,
        alert.body.replace("\r\n", "\n").replace('\n', "\r\n")
    )
}
