use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::errors::ResolveError;
use crate::expression::{Alternative, Expr};
use crate::path::{parse_path, resolve, JsonFields};
use crate::scripts::Registry;

/// Everything one render pass needs to evaluate a placeholder.
/// Borrows the engine's tables read-only.
pub(crate) struct Context<'a> {
    pub(crate) root: &'a Value,
    pub(crate) json_fields: &'a JsonFields,
    pub(crate) aliases: &'a HashMap<String, String>,
    pub(crate) scripts: &'a Registry,
}

impl<'a> Context<'a> {
    /// Evaluate alternatives in order and stop at the first success. Later
    /// alternatives are not touched, so their scripts never run.
    pub(crate) fn eval(&self, expr: &Expr) -> Result<Cow<'a, Value>, Vec<ResolveError>> {
        let mut reasons = Vec::new();
        for alt in &expr.alternatives {
            match self.eval_alternative(alt) {
                Ok(v) => return Ok(v),
                Err(e) => {
                    debug!(alternative = ?alt, reason = %e, "alternative failed");
                    reasons.push(e);
                }
            }
        }
        Err(reasons)
    }

    fn eval_alternative(&self, alt: &Alternative) -> Result<Cow<'a, Value>, ResolveError> {
        match alt {
            Alternative::Path(path) => resolve(self.root, path, self.json_fields),
            Alternative::Alias(name) => {
                let target = self
                    .aliases
                    .get(name)
                    .ok_or_else(|| ResolveError::UnknownAlias(name.clone()))?;
                trace!(alias = %name, path = %target, "expanding alias");
                let path = parse_path(target).map_err(|e| {
                    ResolveError::InvalidExpression(format!("alias `{name}` -> `{target}`: {e}"))
                })?;
                resolve(self.root, &path, self.json_fields)
            }
            Alternative::Script(name) => {
                let script = self
                    .scripts
                    .get(name)
                    .ok_or_else(|| ResolveError::UnknownScript(name.clone()))?;
                trace!(script = %name, "invoking script");
                match script.call() {
                    Value::Null => Err(ResolveError::NullValue),
                    v => Ok(Cow::Owned(v)),
                }
            }
            Alternative::Invalid { text, error } => Err(ResolveError::InvalidExpression(
                format!("`{text}`: {error}"),
            )),
        }
    }
}
