pub mod feature_flags;
pub mod headers;
pub mod identifiers;
pub mod pagination;
pub mod redact;
pub mod suggest;
pub mod template;
pub mod text;
pub mod tool_errors;
