//! Line-oriented terminal I/O
//!
//! [`Terminal`] is the [`View`] of the interactive session and, through
//! [`TerminalCredentials`], the interactive half of sign-in. Input and output
//! are injectable so the session can be driven from tests.

use crate::adapters::identity::{CredentialSource, ProviderCredential};
use crate::config::secret_string;
use crate::core::view::{Notification, View};
use crate::domain::{IdentityError, Result};
use async_trait::async_trait;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::{Handle, RuntimeFlavor};

/// Terminal with line input and text output
pub struct Terminal {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl Terminal {
    /// Terminal over arbitrary input and output
    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Terminal over the process stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }

    /// Reads one line without its line ending, `None` at end of input
    ///
    /// The read blocks. On a multi-threaded runtime the worker is handed over
    /// to the blocking pool first so other tasks keep running meanwhile.
    pub fn read_line(&self) -> Option<String> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.read_line_blocking())
            }
            _ => self.read_line_blocking(),
        }
    }

    fn read_line_blocking(&self) -> Option<String> {
        let mut line = String::new();
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        match input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read terminal input");
                None
            }
        }
    }

    /// Prints `label` without a newline and reads the answer
    pub fn prompt(&self, label: &str) -> Option<String> {
        self.write(label);
        self.read_line()
    }

    /// Prints a line
    pub fn println(&self, line: &str) {
        self.write(&format!("{line}\n"));
    }

    fn write(&self, text: &str) {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        let written = output.write_all(text.as_bytes());
        if let Err(e) = written.and_then(|()| output.flush()) {
            tracing::error!(error = %e, "Failed to write terminal output");
        }
    }
}

impl View for Terminal {
    fn notify(&self, notification: Notification) {
        let marker = if notification.is_error() { "!" } else { "*" };
        self.println(&format!("{marker} {}", notification.message()));
    }

    fn confirm(&self, prompt: &str) -> bool {
        let answer = self.prompt(&format!("{prompt} [s/N] ")).unwrap_or_default();
        matches!(
            answer.trim().to_lowercase().as_str(),
            "s" | "si" | "sí" | "y" | "yes"
        )
    }

    fn scroll_to_top(&self) {
        self.println("-- formulario --");
    }
}

/// What the terminal asks for when signing in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// An account name for a local session
    LocalAccount,
    /// A Google OAuth ID token
    GoogleIdToken,
}

/// Credential source that asks on the terminal
pub struct TerminalCredentials {
    terminal: Arc<Terminal>,
    kind: CredentialKind,
}

impl TerminalCredentials {
    pub fn new(terminal: Arc<Terminal>, kind: CredentialKind) -> Self {
        Self { terminal, kind }
    }
}

#[async_trait]
impl CredentialSource for TerminalCredentials {
    async fn request_credential(&self) -> Result<ProviderCredential> {
        let label = match self.kind {
            CredentialKind::LocalAccount => "Cuenta: ",
            CredentialKind::GoogleIdToken => "Google ID token: ",
        };

        let answer = self
            .terminal
            .prompt(label)
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(IdentityError::Cancelled)?;

        Ok(match self.kind {
            CredentialKind::LocalAccount => ProviderCredential::Local { account: answer },
            CredentialKind::GoogleIdToken => {
                ProviderCredential::GoogleIdToken(secret_string(answer))
            }
        })
    }
}

/// Output buffer shared with a [`Terminal`], for tests and captures
#[derive(Clone, Default)]
pub struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    /// Everything written so far
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
