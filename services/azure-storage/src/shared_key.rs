use azsign_core::{Result, SigningRequest};

use crate::canonical::{string_to_sign, CanonicalizationMode};
use crate::signature::sign;

/// Build the `Authorization` header value for a request.
///
/// The value is `SharedKey {account}:{signature}` in
/// [`CanonicalizationMode::Generic`] and `SharedKeyLite {account}:{signature}`
/// in [`CanonicalizationMode::TableLite`]. The request is not modified, so
/// any `x-ms-date` header must be in place before calling.
pub fn authorization(
    mode: CanonicalizationMode,
    req: &SigningRequest,
    account_name: &str,
    account_key: &str,
) -> Result<String> {
    let string_to_sign = string_to_sign(req, account_name, mode)?;
    let signature = sign(&string_to_sign, account_key)?;

    Ok(format!("{} {}:{}", mode.scheme(), account_name, signature))
}
