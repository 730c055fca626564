use std::time::Duration;

use azsign_core::time::{format_http_date, format_rfc3339, now, DateTime};
use azsign_core::{Error, Result, SignRequest, SigningMethod, SigningRequest};
use http::header::{self, HeaderValue};
use http::request::Parts;
use log::debug;
use percent_encoding::percent_encode;

use crate::constants::*;
use crate::sas::AccountSharedAccessSignature;
use crate::shared_key::authorization;
use crate::{Credential, Service};

/// RequestSigner that implement Azure Storage Shared Key Authorization.
///
/// - [Authorize with Shared Key](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
///
/// Requests for [`Service::Table`] are signed with Shared Key Lite, all
/// others with Shared Key. Presigning with a shared key generates an
/// account SAS instead.
#[derive(Debug)]
pub struct RequestSigner {
    service: Service,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the Blob service.
    pub fn new() -> Self {
        Self {
            service: Service::Blob,
            time: None,
        }
    }

    /// Set the service requests are signed for.
    pub fn with_service(mut self, service: Service) -> Self {
        self.service = service;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::request_invalid("credential is required"));
        };

        let method = match expires_in {
            Some(d) => SigningMethod::Query(d),
            None => SigningMethod::Header,
        };

        let mut ctx = SigningRequest::build(req)?;
        let now_time = self.time.unwrap_or_else(now);

        match cred {
            Credential::SasToken { token } => {
                debug!("signing request with sas token");
                ctx.query_append(token);
            }
            Credential::SharedKey {
                account_name,
                account_key,
            } => match method {
                SigningMethod::Query(d) => {
                    debug!("presigning request with account sas, expires in {d:?}");
                    let expiry = now_time
                        + chrono::TimeDelta::from_std(d).map_err(|e| {
                            Error::request_invalid("expires_in is out of range").with_source(e)
                        })?;
                    let sas = AccountSharedAccessSignature::new(
                        account_name.as_str(),
                        account_key.as_str(),
                        format_rfc3339(expiry),
                    );
                    ctx.query_append(&sas.token()?);
                }
                SigningMethod::Header => {
                    let mode = self.service.canonicalization_mode();
                    debug!("signing request with {}", mode.scheme());

                    ctx.headers
                        .insert(X_MS_DATE, format_http_date(now_time).parse()?);
                    let value = authorization(mode, &ctx, account_name, account_key)?;
                    ctx.headers.insert(header::AUTHORIZATION, {
                        let mut value: HeaderValue = value.parse()?;
                        value.set_sensitive(true);
                        value
                    });
                }
            },
        }

        // Query values are kept decoded while signing, encode them back.
        // Appended SAS tokens are stored as keys and left untouched.
        for (_, v) in ctx.query.iter_mut() {
            *v = percent_encode(v.as_bytes(), &AZURE_QUERY_ENCODE_SET).to_string();
        }

        ctx.apply(req)
    }
}
