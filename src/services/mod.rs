pub mod action_resolver;
pub mod catalog;
pub mod connections;
pub mod logger;
pub mod passthrough;
pub mod pica_client;
pub mod tool_executor;
pub mod validation;
