pub mod config;
pub mod engine;
pub mod errors;
pub mod expression;
pub mod path;
pub mod scanner;
pub mod scripts; // plugin model
mod context;
mod parser;

use serde_json::Value;

pub use config::Config;
pub use engine::{get_error_str, Failure, TinyTemplate};
pub use errors::{ResolveError, Result, TemplateError};
pub use parser::ParseErr;
pub use scripts::{Registry, Script};

/// One-shot render with validation: fails if any placeholder is unresolved.
pub fn render(template: &str, data: &Value) -> Result<String> {
    TinyTemplate::new(template).render(data, true)
}

/// One-shot render that blanks unresolved placeholders.
pub fn render_lossy(template: &str, data: &Value) -> String {
    TinyTemplate::new(template).render_lossy(data)
}
