//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "registry.toml")]
    pub output: String,

    /// Include the Firebase section with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing registry configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set backend.target to 'memory' or 'firebase'");
                println!("  3. For Firebase, create a .env file with:");
                println!("     - REGISTRY_FIREBASE_PROJECT_ID");
                println!("     - REGISTRY_FIREBASE_API_KEY");
                println!("  4. Validate configuration: patient-registry validate-config");
                println!("  5. Start a session: patient-registry run");
                println!();
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, output = %self.output, "Failed to write configuration file");
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Patient Registry Configuration File

[application]
log_level = "info"

[backend]
target = "memory"  # memory | firebase

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Patient Registry Configuration File
#
# Values of the form ${VAR} are replaced with environment variables.
# Every key can also be overridden with REGISTRY_<SECTION>_<KEY>,
# for example REGISTRY_BACKEND_TARGET=firebase.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Backend Selection
# ============================================================================
[backend]
# memory: in-process store, sign in with any account name
# firebase: Firebase Identity Toolkit and Cloud Firestore
target = "memory"

# ============================================================================
# Firebase (used when backend.target = "firebase")
# ============================================================================
[firebase]
project_id = "${REGISTRY_FIREBASE_PROJECT_ID}"
api_key = "${REGISTRY_FIREBASE_API_KEY}"

# Firestore database and patient collection
database_id = "(default)"
collection = "pacientes"

# Interval between list refreshes in milliseconds (>= 100)
poll_interval_ms = 2000

# HTTP request timeout in seconds
timeout_seconds = 30

# Endpoints, override for the local emulators
# identity_base_url = "http://localhost:9099/identitytoolkit.googleapis.com"
# firestore_base_url = "http://localhost:8080"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "./logs"

# Log rotation (daily, hourly or never)
local_rotation = "daily"
"#
        .to_string()
    }
}
