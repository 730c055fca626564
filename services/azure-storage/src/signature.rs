use azsign_core::hash::{base64_decode, base64_hmac_sha256};
use azsign_core::{Error, Result};

/// Sign `string_to_sign` with a base64 encoded storage account key.
///
/// Returns the base64 encoded HMAC-SHA256 of the UTF-8 bytes of
/// `string_to_sign`. The result is not URL-encoded.
pub fn sign(string_to_sign: &str, account_key: &str) -> Result<String> {
    let key = base64_decode(account_key).map_err(|e| {
        Error::credential_invalid("account key is not valid base64").with_source(e)
    })?;

    Ok(base64_hmac_sha256(&key, string_to_sign.as_bytes()))
}
