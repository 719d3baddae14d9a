//! Splits raw template text into literal runs and `${...}` placeholders.

use std::ops::Range;

const OPEN: &str = "${";
const CLOSE: char = '}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder {
        /// Full `${ ... }` text, untouched.
        raw: &'a str,
        /// Text between the braces with surrounding whitespace trimmed.
        expr: &'a str,
        /// Byte range of `raw` in the source.
        span: Range<usize>,
    },
}

/// Lazy left-to-right scan. Every byte of the input lands in exactly one
/// segment; an unterminated `${` is emitted as trailing literal text.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

pub fn scan(src: &str) -> Scanner<'_> {
    Scanner { src, pos: 0 }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.src.len() {
            return None;
        }
        let rest = &self.src[self.pos..];
        let start = self.pos;

        let Some(open) = rest.find(OPEN) else {
            self.pos = self.src.len();
            return Some(Segment::Literal(rest));
        };
        if open > 0 {
            self.pos += open;
            return Some(Segment::Literal(&rest[..open]));
        }

        let body = &rest[OPEN.len()..];
        match body.find(CLOSE) {
            Some(close) => {
                let end = start + OPEN.len() + close + CLOSE.len_utf8();
                self.pos = end;
                Some(Segment::Placeholder {
                    raw: &self.src[start..end],
                    expr: body[..close].trim(),
                    span: start..end,
                })
            }
            None => {
                self.pos = self.src.len();
                Some(Segment::Literal(rest))
            }
        }
    }
}
