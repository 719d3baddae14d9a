use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{Result, TemplateError};
use crate::parser::is_identifier;

/// A zero-argument computed value referenced as `${script:name}`.
///
/// Invoked on every use; the registry never caches results.
pub trait Script: Send + Sync {
    fn call(&self) -> Value;
}

/// Adapter so plain closures can be registered.
struct FnScript<F>(F);

impl<F> Script for FnScript<F>
where
    F: Fn() -> Value + Send + Sync,
{
    fn call(&self) -> Value {
        (self.0)()
    }
}

/// Script table keyed by name. Cloning is cheap until the clone is mutated.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<String, Arc<dyn Script>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trait object. Fails when `name` can never be referenced
    /// from a template.
    pub fn register<S: Script + 'static>(&mut self, name: &str, script: S) -> Result<()> {
        if !is_identifier(name) {
            return Err(TemplateError::InvalidScript(name.to_string()));
        }
        let map = Arc::make_mut(&mut self.inner);
        map.insert(name.to_string(), Arc::new(script));
        Ok(())
    }

    /// Register a closure returning anything convertible into a JSON value.
    pub fn register_fn<F, V>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.register(name, FnScript(move || f().into()))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Script>> {
        self.inner.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn registers_and_calls_closures() {
        let mut reg = Registry::new();
        reg.register_fn("greet", || "hello").unwrap();
        reg.register_fn("answer", || json!(42)).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("greet").map(|s| s.call()), Some(json!("hello")));
        assert_eq!(reg.get("answer").map(|s| s.call()), Some(json!(42)));
        assert!(reg.get("missing").is_none());
    }

    #[test]
    fn rejects_unreferenceable_names() {
        let mut reg = Registry::new();
        for bad in ["", "has space", "a.b", "x??y"] {
            assert!(matches!(
                reg.register_fn(bad, || 1),
                Err(TemplateError::InvalidScript(_))
            ));
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn clones_do_not_share_later_registrations() {
        let mut a = Registry::new();
        a.register_fn("one", || 1).unwrap();
        let mut b = a.clone();
        b.register_fn("two", || 2).unwrap();
        assert!(!a.contains("two"));
        assert!(b.contains("one"));
    }
}
