//! Composition root: wires credential storage, token issuance, permissions,
//! sandboxing, and the execution orchestrator behind the JSON-RPC protocol
//! and its transports.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use warden_server::WardenServer;
//!
//! let config = warden_config::load(std::path::Path::new("warden.toml"))?;
//! let server = WardenServer::bootstrap(&config, warden_server::default_tools())?;
//! server.run(&config).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod assembly;
pub mod error;
pub mod methods;
pub mod prelude;
pub mod tools;

pub use assembly::WardenServer;
pub use error::ServerError;
pub use tools::default_tools;
