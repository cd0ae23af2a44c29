//! Run command implementation
//!
//! Starts the interactive session on stdin/stdout against the configured
//! backend.

use crate::adapters::create_backend;
use crate::config::{load_config, BackendTarget};
use crate::shell::{CredentialKind, Session, Terminal, TerminalCredentials};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured backend (memory or firebase)
    #[arg(long)]
    pub backend: Option<BackendTarget>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                eprintln!("Create one with: patient-registry init");
                return Ok(2);
            }
        };

        if let Some(target) = self.backend {
            tracing::info!(backend = %target, "Overriding backend from CLI");
            config.backend.target = target;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let terminal = Arc::new(Terminal::stdio());
        let kind = match config.backend.target {
            BackendTarget::Memory => CredentialKind::LocalAccount,
            BackendTarget::Firebase => CredentialKind::GoogleIdToken,
        };
        let credentials = Arc::new(TerminalCredentials::new(Arc::clone(&terminal), kind));

        let backend = match create_backend(&config, credentials) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create backend");
                eprintln!("Failed to connect to the backend: {e}");
                return Ok(4);
            }
        };

        tracing::info!(backend = %config.backend.target, "Session starting");

        // Terminal reads block their worker, so the session runs on its own
        // task. A pending read cannot be interrupted: on shutdown the command
        // returns and the task is abandoned until the process exits.
        let mut session = Session::new(backend, terminal);
        let mut running = tokio::spawn(async move {
            session.run().await;
        });

        tokio::select! {
            joined = &mut running => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "Session task failed");
                    return Ok(5);
                }
                tracing::info!("Session ended");
            }
            _ = shutdown_signal.changed() => {
                tracing::info!("Shutdown requested, ending session");
                running.abort();
            }
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        let (_tx, rx) = watch::channel(false);

        let args = RunArgs { backend: None };
        let code = args.execute(path.to_str().unwrap(), rx).await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_firebase_without_section_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.toml");
        std::fs::write(&path, "[backend]\ntarget = \"memory\"\n").unwrap();
        let (_tx, rx) = watch::channel(false);

        let args = RunArgs {
            backend: Some(BackendTarget::Firebase),
        };
        let code = args.execute(path.to_str().unwrap(), rx).await.unwrap();
        assert_eq!(code, 2);
    }
}
