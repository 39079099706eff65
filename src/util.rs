use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::xmlchar::XmlChar;

/// Decodes the digits of a character reference (`&#N;` or `&#xH;`).
/// Returns `None` when the digits are malformed or name a non-XML character.
pub fn decode_char_ref(digits: &str) -> Option<char> {
    // CharRef ::= '&#' [0-9]+ ';' | '&#x' [0-9a-fA-F]+ ';'
    let (digits, radix) = match digits.strip_prefix('x') {
        Some(hex) => (hex, 16),
        None => (digits, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let code = u32::from_str_radix(digits, radix).ok()?;
    let c = char::from_u32(code)?;
    if !c.is_xml_char() {
        return None;
    }
    Some(c)
}

/// Reference ::= EntityRef | CharRef
/// [https://www.w3.org/TR/xml/#sec-references]
///
/// Only the five predefined entities are known; there is no DTD to declare others.
pub fn unescape(raw: &str) -> Result<Cow<'_, str>> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let semi = rest
            .find(';')
            .ok_or_else(|| Error::UnknownReference(rest.to_string()))?;
        let reference = &rest[..=semi];
        let body = &reference[1..reference.len() - 1];
        let decoded = match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => body
                .strip_prefix('#')
                .and_then(decode_char_ref)
                .ok_or_else(|| Error::UnknownReference(reference.to_string()))?,
        };
        out.push(decoded);
        rest = &rest[semi + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

/// Strips leading and trailing XML whitespace.
pub fn trim_xml(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_xml_whitespace())
}
