// src/parser.rs
use unicode_ident::{is_xid_continue, is_xid_start};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErr {
    InvalidSyntax(String),
}

impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErr::InvalidSyntax(msg) => f.write_str(msg),
        }
    }
}

/// First character of an identifier: `_`, a Unicode letter or a digit.
/// Works per `char`, so astral-plane letters count as one character.
pub fn is_ident_start(c: char) -> bool {
    c == '_' || is_xid_start(c) || c.is_alphanumeric()
}

/// Later characters also admit combining marks and connectors, so a
/// decomposed `e\u{301}` stays inside the name.
pub fn is_ident_continue(c: char) -> bool {
    is_xid_continue(c) || c.is_alphanumeric()
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue)
}

/// Char cursor over a borrowed input. `i` is always on a char boundary.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn parse_identifier(&mut self) -> Result<&'a str, ParseErr> {
        let start = self.i;
        match self.peek_char() {
            Some(c) if is_ident_start(c) => self.i += c.len_utf8(),
            _ => {
                return Err(ParseErr::InvalidSyntax(format!(
                    "identifier expected at offset {start}"
                )))
            }
        }
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
        Ok(&self.s[start..self.i])
    }

    pub fn parse_int(&mut self) -> Result<i64, ParseErr> {
        let start = self.i;
        if self.peek_char() == Some('-') {
            self.i += 1;
        }
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start || &self.s[start..self.i] == "-" {
            return Err(ParseErr::InvalidSyntax("expected integer".into()));
        }
        self.s[start..self.i]
            .parse::<i64>()
            .map_err(|_| ParseErr::InvalidSyntax("bad integer".into()))
    }

    pub fn capture_until(&mut self, end: char) -> Result<&'a str, ParseErr> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == end {
                break;
            }
            self.i += c.len_utf8();
        }
        if self.peek_char() != Some(end) {
            return Err(ParseErr::InvalidSyntax(format!("expected '{end}'")));
        }
        Ok(&self.s[start..self.i])
    }

    pub fn expect(&mut self, c: char) -> Result<(), ParseErr> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(ParseErr::InvalidSyntax(format!("expected '{}'", c)))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn rest(&self) -> &'a str {
        &self.s[self.i..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identifier_stops_at_punctuation() {
        let mut p = Parser::new("user.name");
        assert_eq!(p.parse_identifier(), Ok("user"));
        assert_eq!(p.rest(), ".name");
    }

    #[test]
    fn identifier_keeps_astral_letters_whole() {
        let mut p = Parser::new("𝖓𝖆𝖒𝖊[0]");
        assert_eq!(p.parse_identifier(), Ok("𝖓𝖆𝖒𝖊"));
        assert_eq!(p.peek_char(), Some('['));
    }

    #[test]
    fn identifier_keeps_combining_marks() {
        let mut p = Parser::new("Jose\u{301}.age");
        assert_eq!(p.parse_identifier(), Ok("Jose\u{301}"));
        assert_eq!(p.rest(), ".age");
        assert!(is_identifier("Jose\u{301}"));
        assert!(!is_identifier("\u{301}e"));
    }

    #[test]
    fn int_rejects_lone_minus() {
        assert!(Parser::new("-").parse_int().is_err());
        assert_eq!(Parser::new("-3").parse_int(), Ok(-3));
    }
}
