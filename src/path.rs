use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::errors::ResolveError;
use crate::parser::{ParseErr, Parser};

/// Field names whose string values are decoded as JSON when the walk lands on them.
pub type JsonFields = HashSet<String>;

#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Field(String), // .foo
    Index(i64),    // [0]
}

/// Parse `user.children[0].name`. The whole input must be consumed.
pub fn parse_path(input: &str) -> Result<PathExpr, ParseErr> {
    let mut p = Parser::new(input.trim());
    let mut steps = vec![Step::Field(p.parse_identifier()?.to_string())];

    while !p.eof() {
        if p.consume_char('.') {
            steps.push(Step::Field(p.parse_identifier()?.to_string()));
            continue;
        }
        if p.consume_char('[') {
            let inner = p.capture_until(']')?;
            p.expect(']')?;
            let mut tmp = Parser::new(inner.trim());
            let idx = tmp.parse_int()?;
            if !tmp.eof() {
                return Err(ParseErr::InvalidSyntax(format!("bad index `{inner}`")));
            }
            steps.push(Step::Index(idx));
            continue;
        }
        return Err(ParseErr::InvalidSyntax(format!(
            "unexpected `{}` in path",
            p.rest()
        )));
    }
    Ok(PathExpr { steps })
}

/// Walk `path` from `root`. Borrowed all the way down unless a JSON field
/// was decoded, after which the walk continues over the owned document.
pub fn resolve<'a>(
    root: &'a Value,
    path: &PathExpr,
    json_fields: &JsonFields,
) -> Result<Cow<'a, Value>, ResolveError> {
    let mut current = Cow::Borrowed(root);
    // Set when the last step landed on a JSON field that did not decode.
    let mut bad_json: Option<(String, String)> = None;

    for step in &path.steps {
        let next = match &current {
            Cow::Borrowed(v) => select(*v, step).map(Cow::Borrowed),
            Cow::Owned(v) => select(v, step).map(|n| Cow::Owned(n.clone())),
        };
        current = match (next, bad_json.take()) {
            (Ok(v), _) => v,
            (Err(_), Some((field, message))) => {
                return Err(ResolveError::InvalidJson { field, message })
            }
            (Err(e), None) => return Err(e),
        };

        if let Step::Field(name) = step {
            if json_fields.contains(name) {
                if let Value::String(text) = &*current {
                    match serde_json::from_str::<Value>(text) {
                        Ok(decoded) => current = Cow::Owned(decoded),
                        Err(e) => {
                            debug!(field = %name, error = %e, "json field did not decode, keeping raw string");
                            bad_json = Some((name.clone(), e.to_string()));
                        }
                    }
                }
            }
        }
    }

    if current.is_null() {
        return Err(ResolveError::NullValue);
    }
    Ok(current)
}

fn select<'v>(v: &'v Value, step: &Step) -> Result<&'v Value, ResolveError> {
    match step {
        Step::Field(name) => match v {
            Value::Object(map) => map
                .get(name)
                .ok_or_else(|| ResolveError::MissingField(name.clone())),
            _ => Err(ResolveError::NotAnObject(name.clone())),
        },
        Step::Index(i) => match v {
            Value::Array(arr) => usize::try_from(*i)
                .ok()
                .and_then(|idx| arr.get(idx))
                .ok_or(ResolveError::IndexOutOfRange {
                    index: *i,
                    len: arr.len(),
                }),
            _ => Err(ResolveError::NotIndexable(*i)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(names: &[&str]) -> JsonFields {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn get(root: &Value, path: &str, json: &[&str]) -> Result<Value, ResolveError> {
        let path = parse_path(path).expect("path should parse");
        resolve(root, &path, &fields(json)).map(Cow::into_owned)
    }

    #[test]
    fn parses_fields_and_indices() {
        let p = parse_path("user.children[0].name").unwrap();
        assert_eq!(
            p.steps,
            vec![
                Step::Field("user".into()),
                Step::Field("children".into()),
                Step::Index(0),
                Step::Field("name".into()),
            ]
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_path("").is_err());
        assert!(parse_path("a..b").is_err());
        assert!(parse_path("a[x]").is_err());
        assert!(parse_path("a[1").is_err());
        assert!(parse_path("a b").is_err());
        assert!(parse_path("[0]").is_err());
    }

    #[test]
    fn resolves_nested_leaf() {
        let data = json!({"user": {"address": {"city": "New York"}, "hobbies": ["read", "hike"]}});
        assert_eq!(get(&data, "user.address.city", &[]), Ok(json!("New York")));
        assert_eq!(get(&data, "user.hobbies[1]", &[]), Ok(json!("hike")));
    }

    #[test]
    fn reports_each_failure_kind() {
        let data = json!({"a": {"b": 1}, "list": [1, 2], "n": null});
        assert_eq!(
            get(&data, "a.c", &[]),
            Err(ResolveError::MissingField("c".into()))
        );
        assert_eq!(
            get(&data, "a.b.c", &[]),
            Err(ResolveError::NotAnObject("c".into()))
        );
        assert_eq!(get(&data, "a[0]", &[]), Err(ResolveError::NotIndexable(0)));
        assert_eq!(
            get(&data, "list[2]", &[]),
            Err(ResolveError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            get(&data, "list[-1]", &[]),
            Err(ResolveError::IndexOutOfRange { index: -1, len: 2 })
        );
        assert_eq!(get(&data, "n", &[]), Err(ResolveError::NullValue));
    }

    #[test]
    fn decodes_listed_json_field() {
        let data = json!({"user": {"children": r#"[{"name": "Susan"}, {"name": "Bobby"}]"#}});
        assert_eq!(
            get(&data, "user.children[1].name", &["children"]),
            Ok(json!("Bobby"))
        );
    }

    #[test]
    fn unlisted_field_is_never_decoded() {
        let data = json!({"user": {"children": r#"[{"name": "Susan"}]"#}});
        assert_eq!(
            get(&data, "user.children[0]", &[]),
            Err(ResolveError::NotIndexable(0))
        );
        assert_eq!(
            get(&data, "user.children", &[]),
            Ok(json!(r#"[{"name": "Susan"}]"#))
        );
    }

    #[test]
    fn undecodable_json_field_is_a_string_leaf() {
        let data = json!({"meta": "not json"});
        assert_eq!(get(&data, "meta", &["meta"]), Ok(json!("not json")));
        assert!(matches!(
            get(&data, "meta.x", &["meta"]),
            Err(ResolveError::InvalidJson { ref field, .. }) if field == "meta"
        ));
    }

    #[test]
    fn unicode_field_names_match_by_codepoint() {
        let data = json!({"user": {"𝖓𝖆𝖒𝖊": "𝐁𝐨𝐛"}});
        assert_eq!(get(&data, "user.𝖓𝖆𝖒𝖊", &[]), Ok(json!("𝐁𝐨𝐛")));
    }

    #[test]
    fn decomposed_field_names_keep_their_marks() {
        let p = parse_path("user.Jose\u{301}").unwrap();
        assert_eq!(p.steps[1], Step::Field("Jose\u{301}".into()));
        let data = json!({"user": {"Jose\u{301}": "ok"}});
        assert_eq!(get(&data, "user.Jose\u{301}", &[]), Ok(json!("ok")));
    }
}
