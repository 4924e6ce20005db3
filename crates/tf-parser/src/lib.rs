//! Source dialects for Treefold and the pipeline that drives them.
//!
//! Each dialect implements [`Dialect`]: tokenize, parse, validate, optimize
//! and generate. Dialects are looked up by name or by file extension.

mod cursor;
pub mod markup;
pub mod pipeline;
pub mod script;
pub mod stylesheet;
pub mod traits;
mod walk;

pub use markup::MarkupDialect;
pub use pipeline::{run, PipelineOptions, PipelineOutput};
pub use script::ScriptDialect;
pub use stylesheet::StylesheetDialect;
pub use traits::Dialect;

use tf_core::config::LimitsConfig;
use tf_core::{Result, TreefoldError};

/// Names of the built-in dialects.
pub const DIALECTS: &[&str] = &["markup", "stylesheet", "script"];

/// Look up a dialect by name. Common aliases (`html`, `css`, `js`) are
/// accepted.
pub fn dialect(name: &str, limits: &LimitsConfig) -> Result<Box<dyn Dialect>> {
    match name.to_ascii_lowercase().as_str() {
        "markup" | "html" => Ok(Box::new(MarkupDialect::from_limits(limits))),
        "stylesheet" | "css" => Ok(Box::new(StylesheetDialect::from_limits(limits))),
        "script" | "js" => Ok(Box::new(ScriptDialect::from_limits(limits))),
        _ => Err(TreefoldError::UnknownDialect(name.to_string())),
    }
}

/// Pick the dialect that handles a file's extension.
pub fn dialect_for_path(path: &str, limits: &LimitsConfig) -> Result<Box<dyn Dialect>> {
    for name in DIALECTS {
        let d = dialect(name, limits)?;
        if d.can_parse(path) {
            return Ok(d);
        }
    }
    Err(TreefoldError::UnknownDialect(format!("no dialect handles {path}")))
}
