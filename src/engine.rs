use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::context::Context;
use crate::errors::{ResolveError, Result, TemplateError};
use crate::expression::{parse_expr, Expr};
use crate::parser::is_identifier;
use crate::path::JsonFields;
use crate::scripts::Registry;
use crate::scanner::{scan, Segment};

/// A placeholder whose every alternative failed during the last render.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Text between the braces, whitespace-trimmed.
    pub expression: String,
    /// The literal `${...}` as written in the template.
    pub placeholder: String,
    /// One reason per alternative, in evaluation order.
    pub reasons: Vec<ResolveError>,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to replace var ${{{}}} in template", self.expression)
    }
}

/// Format a failure log the way validate mode reports it.
pub fn get_error_str(errors: &[Failure]) -> String {
    format!(
        "validate: Failed to replace all template variables. Got {} errors:\n{}",
        errors.len(),
        errors.iter().join("\n")
    )
}

enum Piece {
    Literal(Range<usize>),
    Placeholder {
        raw: Range<usize>,
        text: String,
        expr: Expr,
    },
}

/// `${...}` interpolation over JSON data.
///
/// The template is scanned and its expressions parsed once, at construction.
/// Aliases and scripts can be registered any time before `render`.
pub struct TinyTemplate {
    source: String,
    pieces: Vec<Piece>,
    json_fields: JsonFields,
    aliases: HashMap<String, String>,
    scripts: Registry,
    /// Unresolved placeholders become `""` when true, stay as written when false.
    pub interpolate_failure_as_blank: bool,
    errors: Vec<Failure>,
}

impl TinyTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_json_fields(template, std::iter::empty::<String>())
    }

    /// `json_fields` names string fields that hold encoded JSON; the path
    /// walk decodes them before descending further.
    pub fn with_json_fields<I>(template: impl Into<String>, json_fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let source = template.into();
        let pieces = compile(&source);
        Self {
            source,
            pieces,
            json_fields: json_fields.into_iter().map(Into::into).collect(),
            aliases: HashMap::new(),
            scripts: Registry::new(),
            interpolate_failure_as_blank: true,
            errors: Vec::new(),
        }
    }

    pub fn with_config(template: impl Into<String>, config: &Config) -> Result<Self> {
        let mut tpl = Self::with_json_fields(template, config.json_fields.iter().cloned());
        tpl.interpolate_failure_as_blank = config.interpolate_failure_as_blank;
        for (name, path) in &config.aliases {
            tpl.alias(name, path)?;
        }
        Ok(tpl)
    }

    /// Bind `${alias:name}` to a path. The path text is parsed when used, so
    /// a bad path shows up as a resolution failure, not here.
    pub fn alias(&mut self, name: &str, path: &str) -> Result<()> {
        if !is_identifier(name) {
            return Err(TemplateError::InvalidAlias(name.to_string()));
        }
        self.aliases.insert(name.to_string(), path.to_string());
        Ok(())
    }

    /// Bind `${script:name}` to a closure. It runs on every use.
    pub fn register_script<F, V>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.scripts.register_fn(name, f)
    }

    /// Replace the script table, e.g. to share one registry across templates.
    pub fn set_scripts(&mut self, scripts: Registry) {
        self.scripts = scripts;
    }

    /// Render against `data`. With `validate`, any unresolved placeholder
    /// turns the call into `TemplateError::Validation` after the full pass.
    pub fn render(&mut self, data: &Value, validate: bool) -> Result<String> {
        let out = self.render_lossy(data);
        if validate && !self.errors.is_empty() {
            warn!(errors = self.errors.len(), "template validation failed");
            return Err(TemplateError::Validation(get_error_str(&self.errors)));
        }
        Ok(out)
    }

    /// Render without validation. Never fails.
    pub fn render_lossy(&mut self, data: &Value) -> String {
        let ctx = Context {
            root: data,
            json_fields: &self.json_fields,
            aliases: &self.aliases,
            scripts: &self.scripts,
        };
        let mut out = String::with_capacity(self.source.len());
        let mut errors = Vec::new();
        let mut placeholders = 0usize;

        for piece in &self.pieces {
            match piece {
                Piece::Literal(range) => out.push_str(&self.source[range.clone()]),
                Piece::Placeholder { raw, text, expr } => {
                    placeholders += 1;
                    match ctx.eval(expr) {
                        Ok(value) => {
                            trace!(expression = %text, "placeholder resolved");
                            out.push_str(&stringify(&value));
                        }
                        Err(reasons) => {
                            let placeholder = &self.source[raw.clone()];
                            if !self.interpolate_failure_as_blank {
                                out.push_str(placeholder);
                            }
                            errors.push(Failure {
                                expression: text.clone(),
                                placeholder: placeholder.to_string(),
                                reasons,
                            });
                        }
                    }
                }
            }
        }

        debug!(placeholders, failures = errors.len(), "render finished");
        self.errors = errors;
        out
    }

    /// Failures recorded by the most recent render, in template order.
    pub fn last_errors(&self) -> &[Failure] {
        &self.errors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Expression texts of every placeholder, in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Placeholder { text, .. } => Some(text.as_str()),
            Piece::Literal(_) => None,
        })
    }
}

fn compile(source: &str) -> Vec<Piece> {
    let mut offset = 0;
    scan(source)
        .map(|seg| match seg {
            Segment::Literal(text) => {
                let range = offset..offset + text.len();
                offset = range.end;
                Piece::Literal(range)
            }
            Segment::Placeholder { expr, span, .. } => {
                offset = span.end;
                Piece::Placeholder {
                    raw: span,
                    text: expr.to_string(),
                    expr: parse_expr(expr),
                }
            }
        })
        .collect()
}

/// Strings verbatim, numbers and booleans in their JSON spelling, anything
/// else as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
