pub mod actions;
pub mod connections;
pub mod execute;
pub mod integrations;
