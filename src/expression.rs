// src/expression.rs
use crate::parser::{is_identifier, ParseErr};
use crate::path::{parse_path, PathExpr};

const COALESCE: &str = "??";
const SCRIPT_PREFIX: &str = "script:";
const ALIAS_PREFIX: &str = "alias:";

/// One placeholder body: alternatives tried left to right, first success wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alternative {
    Path(PathExpr),
    Alias(String),
    Script(String),
    /// Did not parse. Evaluates to a failure instead of aborting the render.
    Invalid { text: String, error: ParseErr },
}

/// Parse the text between `${` and `}`. Total: malformed alternatives become
/// `Alternative::Invalid`.
pub fn parse_expr(input: &str) -> Expr {
    let alternatives = input.split(COALESCE).map(parse_alternative).collect();
    Expr { alternatives }
}

fn parse_alternative(raw: &str) -> Alternative {
    let text = raw.trim();
    if let Some(name) = text.strip_prefix(SCRIPT_PREFIX) {
        return named(text, name.trim(), Alternative::Script);
    }
    if let Some(name) = text.strip_prefix(ALIAS_PREFIX) {
        return named(text, name.trim(), Alternative::Alias);
    }
    match parse_path(text) {
        Ok(path) => Alternative::Path(path),
        Err(error) => Alternative::Invalid {
            text: text.to_string(),
            error,
        },
    }
}

fn named(text: &str, name: &str, make: fn(String) -> Alternative) -> Alternative {
    if is_identifier(name) {
        make(name.to_string())
    } else {
        Alternative::Invalid {
            text: text.to_string(),
            error: ParseErr::InvalidSyntax(format!("bad reference name `{name}`")),
        }
    }
}
