//! Navigation shell
//!
//! - [`router`] - route table (`/login`, `/pacientes`, root redirect) and navigator
//! - [`commands`] - prompt command parsing
//! - [`terminal`] - terminal view and credential prompt
//! - [`session`] - the interactive session hosting both screens

pub mod commands;
pub mod router;
pub mod session;
pub mod terminal;

pub use commands::{parse_command, ShellCommand};
pub use router::{Navigator, Route, RouteTable, ShellNavigator};
pub use session::Session;
pub use terminal::{CredentialKind, SharedOutput, Terminal, TerminalCredentials};
