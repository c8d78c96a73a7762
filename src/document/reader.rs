use std::borrow::Cow;

use structdoc_error::{CodecError, CodecResult};
use tracing::debug;

/// Token produced by a [`DocumentReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Object member name; payload via [`DocumentReader::key`].
    ValueKey,
    ArrayStart,
    ArrayEnd,
    ObjectStart,
    ObjectEnd,
    NullValue,
    BooleanValue,
    /// Number; payload text via [`DocumentReader::numeric_text`].
    NumericValue,
    /// String; unescaped payload via [`DocumentReader::string_value`].
    Value,
}

/// Pull-based token source for the JSON transcoder.
pub trait DocumentReader {
    /// `true` while input other than whitespace remains.
    fn has_next(&mut self) -> bool;

    fn next_token(&mut self) -> CodecResult<TokenKind>;

    fn key(&self) -> &str;

    fn string_value(&self) -> &str;

    fn numeric_text(&self) -> &str;

    fn boolean_value(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// After `{`: a key or `}`.
    ObjectOpen,
    /// After `:`: a member value.
    ObjectValue,
    /// After a member value: `,` or `}`.
    ObjectNext,
    /// After `[`: a value or `]`.
    ArrayOpen,
    /// After an element: `,` or `]`.
    ArrayNext,
}

/// Tokenizer over a JSON document held in memory.
///
/// Strings without escapes are borrowed from the input.
pub struct JsonDocumentReader<'a> {
    input: &'a str,
    pos: usize,
    scopes: Vec<Scope>,
    root_done: bool,
    text: Cow<'a, str>,
    boolean: bool,
}

impl<'a> JsonDocumentReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            scopes: Vec::new(),
            root_done: false,
            text: Cow::Borrowed(""),
            boolean: false,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn error(
        &self,
        msg: &str,
    ) -> CodecError {
        debug!(position = self.pos, msg, "malformed JSON document");
        CodecError::malformed(format!("{msg} at position {}", self.pos))
    }

    fn expect_byte(
        &mut self,
        b: u8,
    ) -> CodecResult<()> {
        self.skip_whitespace();
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", b as char)))
        }
    }

    fn read_key(&mut self) -> CodecResult<TokenKind> {
        self.skip_whitespace();
        if self.peek() != Some(b'"') {
            return Err(self.error("expected object key"));
        }
        self.text = self.parse_string()?;
        self.expect_byte(b':')?;
        if let Some(top) = self.scopes.last_mut() {
            *top = Scope::ObjectValue;
        }
        Ok(TokenKind::ValueKey)
    }

    fn close(
        &mut self,
        token: TokenKind,
    ) -> CodecResult<TokenKind> {
        self.pos += 1;
        self.scopes.pop();
        if self.scopes.is_empty() {
            self.root_done = true;
        }
        Ok(token)
    }

    fn read_value(&mut self) -> CodecResult<TokenKind> {
        self.skip_whitespace();
        // The enclosing container moves on before a nested one is pushed.
        let next = match self.scopes.last() {
            Some(Scope::ObjectValue) => Some(Scope::ObjectNext),
            Some(Scope::ArrayOpen | Scope::ArrayNext) => Some(Scope::ArrayNext),
            Some(_) => return Err(self.error("value not allowed here")),
            None => None,
        };
        if let (Some(top), Some(next)) = (self.scopes.last_mut(), next) {
            *top = next;
        }
        let Some(c) = self.peek() else {
            return Err(self.error("unexpected end of input"));
        };
        let token = match c {
            b'{' => {
                self.pos += 1;
                self.scopes.push(Scope::ObjectOpen);
                return Ok(TokenKind::ObjectStart);
            }
            b'[' => {
                self.pos += 1;
                self.scopes.push(Scope::ArrayOpen);
                return Ok(TokenKind::ArrayStart);
            }
            b'"' => {
                self.text = self.parse_string()?;
                TokenKind::Value
            }
            b't' => {
                self.consume_literal("true")?;
                self.boolean = true;
                TokenKind::BooleanValue
            }
            b'f' => {
                self.consume_literal("false")?;
                self.boolean = false;
                TokenKind::BooleanValue
            }
            b'n' => {
                self.consume_literal("null")?;
                TokenKind::NullValue
            }
            b'-' | b'0'..=b'9' => {
                self.parse_number()?;
                TokenKind::NumericValue
            }
            _ => return Err(self.error(&format!("unexpected character '{}'", c as char))),
        };
        if self.scopes.is_empty() {
            self.root_done = true;
        }
        Ok(token)
    }

    fn consume_literal(
        &mut self,
        literal: &str,
    ) -> CodecResult<()> {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{literal}'")))
        }
    }

    fn parse_number(&mut self) -> CodecResult<()> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        if bytes[self.pos] == b'-' {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-' => self.pos += 1,
                _ => break,
            }
        }
        if self.pos == digits_start || !bytes[digits_start].is_ascii_digit() {
            return Err(self.error("invalid number"));
        }
        self.text = Cow::Borrowed(&self.input[start..self.pos]);
        Ok(())
    }

    fn parse_string(&mut self) -> CodecResult<Cow<'a, str>> {
        let start = self.pos + 1;
        self.pos += 1;
        let bytes = self.input.as_bytes();

        let mut has_escapes = false;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'"' => {
                    let raw = &self.input[start..self.pos];
                    self.pos += 1;
                    return if has_escapes {
                        unescape_string(raw).map(Cow::Owned)
                    } else {
                        Ok(Cow::Borrowed(raw))
                    };
                }
                b'\\' => {
                    has_escapes = true;
                    self.pos += 2;
                }
                b if b < 0x20 => return Err(self.error("unescaped control character in string")),
                _ => self.pos += 1,
            }
        }

        self.pos = start - 1;
        Err(self.error("unterminated string"))
    }
}

impl DocumentReader for JsonDocumentReader<'_> {
    fn has_next(&mut self) -> bool {
        self.skip_whitespace();
        self.pos < self.input.len()
    }

    fn next_token(&mut self) -> CodecResult<TokenKind> {
        self.skip_whitespace();
        if self.root_done {
            return Err(self.error("trailing content after document"));
        }
        match self.scopes.last().copied() {
            None | Some(Scope::ObjectValue) => self.read_value(),
            Some(Scope::ObjectOpen) => {
                if self.peek() == Some(b'}') {
                    self.close(TokenKind::ObjectEnd)
                } else {
                    self.read_key()
                }
            }
            Some(Scope::ObjectNext) => match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.read_key()
                }
                Some(b'}') => self.close(TokenKind::ObjectEnd),
                _ => Err(self.error("expected ',' or '}'")),
            },
            Some(Scope::ArrayOpen) => {
                if self.peek() == Some(b']') {
                    self.close(TokenKind::ArrayEnd)
                } else {
                    self.read_value()
                }
            }
            Some(Scope::ArrayNext) => match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.read_value()
                }
                Some(b']') => self.close(TokenKind::ArrayEnd),
                _ => Err(self.error("expected ',' or ']'")),
            },
        }
    }

    fn key(&self) -> &str {
        &self.text
    }

    fn string_value(&self) -> &str {
        &self.text
    }

    fn numeric_text(&self) -> &str {
        &self.text
    }

    fn boolean_value(&self) -> bool {
        self.boolean
    }
}

/// Resolves JSON escape sequences in a string body.
pub fn unescape_string(s: &str) -> CodecResult<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('/') => result.push('/'),
            Some('b') => result.push('\x08'),
            Some('f') => result.push('\x0C'),
            Some('u') => {
                let high = read_hex4(&mut chars)?;
                let cp = if (0xD800..0xDC00).contains(&high) {
                    // Surrogate pair: a second \uXXXX must follow.
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(CodecError::malformed("unpaired surrogate in \\u escape"));
                    }
                    let low = read_hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(CodecError::malformed("invalid low surrogate in \\u escape"));
                    }
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                match char::from_u32(cp) {
                    Some(ch) => result.push(ch),
                    None => {
                        return Err(CodecError::malformed(format!(
                            "invalid unicode codepoint: U+{cp:04X}"
                        )))
                    }
                }
            }
            Some(other) => {
                return Err(CodecError::malformed(format!(
                    "invalid escape sequence: \\{other}"
                )))
            }
            None => return Err(CodecError::malformed("unexpected end of string after backslash")),
        }
    }

    Ok(result)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> CodecResult<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return Err(CodecError::malformed("incomplete \\u escape"));
    }
    u32::from_str_radix(&hex, 16)
        .map_err(|_| CodecError::malformed(format!("invalid unicode escape: \\u{hex}")))
}
