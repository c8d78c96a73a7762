/// Character sink for encoded documents.
///
/// Escaping is a mode: between [`start_escaping`](Self::start_escaping) and
/// [`end_escaping`](Self::end_escaping) every appended character is escaped
/// for the writer's dialect.
pub trait DocumentWriter {
    fn append_char(
        &mut self,
        c: char,
    );

    fn append_str(
        &mut self,
        s: &str,
    );

    fn start_escaping(&mut self);

    fn end_escaping(&mut self);

    /// Appends bytes as uppercase hex pairs, never escaped.
    fn append_hex(
        &mut self,
        bytes: &[u8],
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Json,
    Xml,
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// `String`-backed [`DocumentWriter`].
#[derive(Debug)]
pub struct DocumentAppender {
    out: String,
    dialect: Dialect,
    escaping: bool,
}

impl DocumentAppender {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_capacity(dialect, 64)
    }

    pub fn with_capacity(
        dialect: Dialect,
        capacity: usize,
    ) -> Self {
        Self {
            out: String::with_capacity(capacity),
            dialect,
            escaping: false,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn push_escaped(
        &mut self,
        c: char,
    ) {
        match self.dialect {
            Dialect::Xml => match c {
                '<' => self.out.push_str("&lt;"),
                '&' => self.out.push_str("&amp;"),
                _ => self.out.push(c),
            },
            Dialect::Json => match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\u{08}' => self.out.push_str("\\b"),
                '\t' => self.out.push_str("\\t"),
                '\n' => self.out.push_str("\\n"),
                '\u{0C}' => self.out.push_str("\\f"),
                '\r' => self.out.push_str("\\r"),
                c if (c as u32) < 0x20 => {
                    let v = c as u32;
                    self.out.push_str("\\u00");
                    self.out.push(HEX_DIGITS[(v >> 4) as usize] as char);
                    self.out.push(HEX_DIGITS[(v & 0x0F) as usize] as char);
                }
                _ => self.out.push(c),
            },
        }
    }
}

impl DocumentWriter for DocumentAppender {
    fn append_char(
        &mut self,
        c: char,
    ) {
        if self.escaping {
            self.push_escaped(c);
        } else {
            self.out.push(c);
        }
    }

    fn append_str(
        &mut self,
        s: &str,
    ) {
        if self.escaping {
            for c in s.chars() {
                self.push_escaped(c);
            }
        } else {
            self.out.push_str(s);
        }
    }

    fn start_escaping(&mut self) {
        debug_assert!(!self.escaping, "escaping already active");
        self.escaping = true;
    }

    fn end_escaping(&mut self) {
        debug_assert!(self.escaping, "escaping not active");
        self.escaping = false;
    }

    fn append_hex(
        &mut self,
        bytes: &[u8],
    ) {
        self.out.reserve(bytes.len() * 2);
        for b in bytes {
            self.out.push(HEX_DIGITS[(b >> 4) as usize] as char);
            self.out.push(HEX_DIGITS[(b & 0x0F) as usize] as char);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escapes_only_lt_and_amp() {
        let mut w = DocumentAppender::new(Dialect::Xml);
        w.start_escaping();
        w.append_str("<a&b>\"'");
        w.end_escaping();
        assert_eq!(w.as_str(), "&lt;a&amp;b>\"'");
    }

    #[test]
    fn test_json_escapes_controls() {
        let mut w = DocumentAppender::new(Dialect::Json);
        w.start_escaping();
        w.append_str("a\"b\\c\n\u{01}\u{1F}");
        w.end_escaping();
        assert_eq!(w.as_str(), "a\\\"b\\\\c\\n\\u0001\\u001F");
    }

    #[test]
    fn test_unescaped_mode_passes_through() {
        let mut w = DocumentAppender::new(Dialect::Json);
        w.append_char('"');
        w.append_str("<&");
        assert_eq!(w.into_string(), "\"<&");
    }

    #[test]
    fn test_hex_is_uppercase() {
        let mut w = DocumentAppender::new(Dialect::Xml);
        w.append_hex(&[0x00, 0xAB, 0x0F]);
        assert_eq!(w.as_str(), "00AB0F");
    }
}
