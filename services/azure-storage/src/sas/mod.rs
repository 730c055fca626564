//! Shared access signatures.

mod account;
pub use account::AccountSharedAccessSignature;

mod service;
pub use service::ServiceSharedAccessSignature;

use std::fmt;
use std::str::FromStr;

use azsign_core::{Error, Result};

/// Protocols a shared access signature may be restricted to (`spr`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    /// `https`
    Https,
    /// `https,http`
    HttpsHttp,
}

impl Protocol {
    /// Value as signed and emitted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Https => "https",
            Protocol::HttpsHttp => "https,http",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "https" => Ok(Protocol::Https),
            "https,http" => Ok(Protocol::HttpsHttp),
            _ => Err(Error::invalid_argument(
                "signedProtocol",
                format!("{s:?} must be \"https\" or \"https,http\""),
            )),
        }
    }
}

/// Join account SAS query pairs, percent-encoding only `sig`.
///
/// Account SAS values come from fixed alphabets or are validated
/// `Z`-suffixed timestamps, which are safe in a query as-is.
fn join_token(pairs: Vec<(String, String)>) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| {
            if k == "sig" {
                format!("{k}={}", urlencoded(&v))
            } else {
                format!("{k}={v}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Join query pairs, percent-encoding every value.
fn join_encoded(pairs: Vec<(String, String)>) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={}", urlencoded(&v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn urlencoded(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Read an optional field, returning `""` when unset.
fn opt(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_display() {
        assert_eq!(Protocol::Https.to_string(), "https");
        assert_eq!(Protocol::HttpsHttp.to_string(), "https,http");
    }

    #[test]
    fn test_urlencoded_signature() {
        assert_eq!(
            urlencoded("ZpEYbkT+9NJTYyMIuFnXQ9RzOehYF1mjnsk00B/X1nw="),
            "ZpEYbkT%2B9NJTYyMIuFnXQ9RzOehYF1mjnsk00B%2FX1nw%3D"
        );
    }

    #[test]
    fn test_join_token() {
        let pairs = vec![
            ("sv".to_string(), "2018-03-28".to_string()),
            ("se".to_string(), "2022-03-01T08:17:34Z".to_string()),
            ("sig".to_string(), "a+b/c=".to_string()),
        ];
        assert_eq!(
            join_token(pairs),
            "sv=2018-03-28&se=2022-03-01T08:17:34Z&sig=a%2Bb%2Fc%3D"
        );
    }

    #[test]
    fn test_join_encoded() {
        let pairs = vec![
            ("rscd".to_string(), "attachment; filename=a&b.txt".to_string()),
            ("sig".to_string(), "a+b/c=".to_string()),
        ];
        let token = join_encoded(pairs.clone());
        assert_eq!(
            token,
            "rscd=attachment%3B+filename%3Da%26b.txt&sig=a%2Bb%2Fc%3D"
        );

        let parsed: Vec<(String, String)> = form_urlencoded::parse(token.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(parsed, pairs);
    }
}
