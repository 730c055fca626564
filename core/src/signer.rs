use crate::{Error, Result, SignRequest, SigningCredential};
use std::sync::Arc;
use std::time::Duration;

/// Signer is the main struct used to sign the request.
///
/// It holds an immutable credential handed over by the caller and the
/// service specific [`SignRequest`] implementation. Cloning is cheap and
/// the signer can be shared across threads freely.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    credential: K,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(credential: K, builder: impl SignRequest<Credential = K>) -> Self {
        Self {
            credential,
            builder: Arc::new(builder),
        }
    }

    /// Get the credential used by this signer.
    pub fn credential(&self) -> &K {
        &self.credential
    }

    /// Signing request.
    pub fn sign(&self, req: &mut http::request::Parts, expires_in: Option<Duration>) -> Result<()> {
        if !self.credential.is_valid() {
            return Err(Error::credential_invalid(
                "credential is not valid for signing",
            ));
        }

        self.builder
            .sign_request(req, Some(&self.credential), expires_in)
    }
}
