//! Pica toolkit: action discovery and passthrough execution against the
//! Pica API, exposed as MCP tools.

pub mod app;
pub mod config;
pub mod constants;
pub mod errors;
pub mod managers;
pub mod mcp;
pub mod services;
pub mod types;
pub mod utils;

pub use app::App;
pub use config::PicaConfig;
pub use errors::{ToolError, ToolErrorKind};
