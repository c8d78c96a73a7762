use std::borrow::Cow;

use structdoc_error::{CodecError, CodecResult};

/// Resolves the entities of element text.
///
/// Accepts `&lt;` `&amp;` `&gt;` `&quot;` and `&apos;`. The encoder only
/// ever writes the first two.
pub fn unescape(text: &str) -> CodecResult<Cow<'_, str>> {
    if !text.contains('&') {
        return Ok(Cow::Borrowed(text));
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let end = tail
            .find(';')
            .ok_or_else(|| CodecError::malformed(format!("unterminated entity in `{text}`")))?;
        out.push(match &tail[..=end] {
            "&lt;" => '<',
            "&amp;" => '&',
            "&gt;" => '>',
            "&quot;" => '"',
            "&apos;" => '\'',
            other => {
                return Err(CodecError::malformed(format!(
                    "unsupported entity `{other}`"
                )))
            }
        });
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

/// Whether `name` can be written as a tag name.
///
/// Starts with a letter, `_` or `:`, continues with letters, digits and
/// `_ : - .`, and never starts with `xml` in any case.
pub fn is_valid_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_' || first == ':') {
        return false;
    }
    if name.len() >= 3 && name.as_bytes()[..3].eq_ignore_ascii_case(b"xml") {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}
