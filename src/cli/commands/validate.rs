//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the registry configuration file.

use crate::config::{load_config, BackendTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Log Level: {}", config.application.log_level);
                println!("  Backend: {}", config.backend.target);

                if config.backend.target == BackendTarget::Firebase {
                    if let Some(ref firebase) = config.firebase {
                        println!("  Firebase Project: {}", firebase.project_id);
                        println!("  Firestore Database: {}", firebase.database_id);
                        println!("  Collection: {}", firebase.collection);
                        println!("  Poll Interval: {} ms", firebase.poll_interval_ms);
                    }
                }

                if config.logging.local_enabled {
                    println!(
                        "  File Logging: {} ({})",
                        config.logging.local_path, config.logging.local_rotation
                    );
                } else {
                    println!("  File Logging: disabled");
                }
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}
