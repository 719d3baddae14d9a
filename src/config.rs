use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{Result, TemplateError};

/// Engine settings loadable from JSON, e.g.
///
/// ```json
/// { "json_fields": ["children"],
///   "aliases": { "first_child_name": "user.children[0].name" },
///   "interpolate_failure_as_blank": false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub json_fields: Vec<String>,
    pub aliases: BTreeMap<String, String>,
    pub interpolate_failure_as_blank: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            json_fields: Vec::new(),
            aliases: BTreeMap::new(),
            interpolate_failure_as_blank: true,
        }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| TemplateError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_take_defaults() {
        let cfg = Config::from_json_str(r#"{"json_fields": ["children"]}"#).unwrap();
        assert_eq!(cfg.json_fields, vec!["children".to_string()]);
        assert!(cfg.aliases.is_empty());
        assert!(cfg.interpolate_failure_as_blank);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_json_str(r#"{"jsonFields": []}"#).unwrap_err();
        assert!(matches!(err, TemplateError::Config(_)));
    }
}
