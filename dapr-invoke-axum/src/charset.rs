//! Media type and charset handling.
//!
//! Only the handful of charsets a sidecar is known to emit are recognized.
//! A byte order mark at the start of the body always wins over the declared
//! charset.

use std::fmt;

/// A recognized character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    /// Little endian unless a byte order mark says otherwise.
    Utf16Le,
    Utf16Be,
    UsAscii,
    Latin1,
}

impl Charset {
    /// Look up a charset by its IANA name or a common alias.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_matches('"').to_ascii_lowercase();
        match label.as_str() {
            "utf-8" | "utf8" => Some(Charset::Utf8),
            "utf-16" | "utf16" | "utf-16le" | "unicode" => Some(Charset::Utf16Le),
            "utf-16be" => Some(Charset::Utf16Be),
            "us-ascii" | "ascii" => Some(Charset::UsAscii),
            "iso-8859-1" | "latin1" | "latin-1" => Some(Charset::Latin1),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::UsAscii => "US-ASCII",
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    /// Decode `bytes` into a string.
    ///
    /// Returns the charset actually used on failure, which differs from
    /// `self` when a byte order mark overrode it.
    pub fn decode(self, bytes: &[u8]) -> Result<String, Charset> {
        let (charset, bytes) = match bytes {
            [0xEF, 0xBB, 0xBF, rest @ ..] => (Charset::Utf8, rest),
            [0xFF, 0xFE, rest @ ..] => (Charset::Utf16Le, rest),
            [0xFE, 0xFF, rest @ ..] => (Charset::Utf16Be, rest),
            _ => (self, bytes),
        };

        match charset {
            Charset::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| charset),
            Charset::Utf16Le => decode_utf16(bytes, u16::from_le_bytes).ok_or(charset),
            Charset::Utf16Be => decode_utf16(bytes, u16::from_be_bytes).ok_or(charset),
            Charset::UsAscii => {
                if bytes.is_ascii() {
                    Ok(bytes.iter().map(|&b| b as char).collect())
                } else {
                    Err(charset)
                }
            }
            Charset::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// A parsed `type/subtype; name=value` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType<'a> {
    essence: &'a str,
    params: Vec<(&'a str, &'a str)>,
}

impl<'a> MediaType<'a> {
    /// Parse a content type. Malformed parameters are dropped.
    pub fn parse(value: &'a str) -> Self {
        let mut parts = value.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        let params = parts
            .filter_map(|param| {
                let (name, value) = param.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name, value.trim().trim_matches('"')))
            })
            .collect();
        Self { essence, params }
    }

    /// The `type/subtype` portion.
    pub fn essence(&self) -> &'a str {
        self.essence
    }

    /// Case-insensitive comparison of the `type/subtype` portion.
    pub fn is(&self, essence: &str) -> bool {
        self.essence.eq_ignore_ascii_case(essence)
    }

    /// Value of a parameter, matched case-insensitively.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }

    /// The recognized charset, if any.
    pub fn charset(&self) -> Option<Charset> {
        self.param("charset").and_then(Charset::from_label)
    }

    /// `application/json` or any `+json` structured syntax suffix.
    pub fn is_json(&self) -> bool {
        let essence = self.essence.to_ascii_lowercase();
        essence == "application/json" || essence.ends_with("+json")
    }

    /// Render the media type with the charset parameter removed.
    pub fn without_charset(&self) -> String {
        let mut out = self.essence.to_string();
        for (name, value) in &self.params {
            if name.eq_ignore_ascii_case("charset") {
                continue;
            }
            out.push_str("; ");
            out.push_str(name);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}
