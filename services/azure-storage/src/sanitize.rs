//! Validation and canonical ordering of SAS input fields.

use azsign_core::{time, Error, Result};

use crate::sas::Protocol;

/// Sanitize `input` against the ordered `alphabet`.
///
/// The input is lowercased, every alphabet character present in it is
/// emitted once in alphabet order, and any character outside the alphabet
/// is rejected with an error naming `field`.
///
/// ```
/// use azsign_azure_storage::sanitize;
///
/// assert_eq!(sanitize("pucaldwr", "rwdlacup", "signedPermissions").unwrap(), "rwdlacup");
/// assert!(sanitize("bqtfg", "bqtf", "signedService").is_err());
/// ```
pub fn sanitize(input: &str, alphabet: &str, field: &str) -> Result<String> {
    let mut rest = input.to_lowercase();
    let mut out = String::with_capacity(alphabet.len());

    for c in alphabet.chars() {
        if rest.contains(c) {
            out.push(c);
            rest.retain(|v| v != c);
        }
    }

    if !rest.is_empty() {
        let allowed = alphabet
            .chars()
            .map(String::from)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::invalid_argument(
            field,
            format!("must only be a combination of {allowed}"),
        ));
    }

    Ok(out)
}

/// Same as [`sanitize`] but the sanitized value must not be empty.
pub(crate) fn sanitize_required(input: &str, alphabet: &str, field: &str) -> Result<String> {
    let out = sanitize(input, alphabet, field)?;
    if out.is_empty() {
        return Err(Error::invalid_argument(field, "must not be empty"));
    }
    Ok(out)
}

/// Validate a signed protocol.
///
/// An empty input means the protocol is not restricted. Otherwise only
/// `https` and `https,http` are accepted, case-insensitively.
pub fn validate_protocol(input: &str) -> Result<Option<Protocol>> {
    if input.is_empty() {
        return Ok(None);
    }
    input.parse().map(Some)
}

/// Validate that `value` is an ISO 8601 date or `Z`-suffixed UTC timestamp.
pub fn validate_date(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_argument(field, "must not be empty"));
    }

    time::parse_iso8601(value).map(|_| ()).map_err(|e| {
        Error::invalid_argument(field, format!("{value:?} is not a valid ISO 8601 date"))
            .with_source(e)
    })
}

/// Validate a storage service version such as `2018-03-28`.
pub fn validate_version(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_argument(field, "must not be empty"));
    }

    time::parse_date(value).map(|_| ()).map_err(|e| {
        Error::invalid_argument(field, format!("{value:?} is not a valid version date"))
            .with_source(e)
    })
}
