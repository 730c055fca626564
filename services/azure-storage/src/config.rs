use std::collections::HashMap;
use std::env;
use std::fmt::{Debug, Formatter};

use azsign_core::utils::Redact;
use azsign_core::Result;
use log::debug;

use crate::constants::*;
use crate::{connection_string, Credential, Service};

/// Config carries all the configuration for Azure Storage services.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_NAME`]
    /// - connection string: `AccountName`
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_KEY`]
    /// - connection string: `AccountKey`
    pub account_key: Option<String>,
    /// `sas_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_SAS_TOKEN`]
    /// - connection string: `SharedAccessSignature`
    pub sas_token: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ENDPOINT`]
    /// - connection string: `BlobEndpoint` or the endpoint built from its parts
    pub endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("sas_token", &Redact::from(&self.sas_token))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Fields that are already set are kept. When
    /// [`AZURE_STORAGE_CONNECTION_STRING`] is set it is parsed for the Blob
    /// service and fills whatever is still unset.
    pub fn from_env(mut self) -> Result<Self> {
        let envs = env::vars().collect::<HashMap<_, _>>();

        for (key, field) in [
            (AZURE_STORAGE_ACCOUNT_NAME, &mut self.account_name),
            (AZURE_STORAGE_ACCOUNT_KEY, &mut self.account_key),
            (AZURE_STORAGE_SAS_TOKEN, &mut self.sas_token),
            (AZURE_STORAGE_ENDPOINT, &mut self.endpoint),
        ] {
            if field.is_none() {
                *field = envs.get(key).cloned();
            }
        }

        if let Some(conn_str) = envs.get(AZURE_STORAGE_CONNECTION_STRING) {
            debug!("loading config from {AZURE_STORAGE_CONNECTION_STRING}");
            let parsed = connection_string::parse(conn_str, &Service::Blob)?;
            self.account_name = self.account_name.or(parsed.account_name);
            self.account_key = self.account_key.or(parsed.account_key);
            self.sas_token = self.sas_token.or(parsed.sas_token);
            self.endpoint = self.endpoint.or(parsed.endpoint);
        }

        Ok(self)
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to specify all required parameters
    /// because the user is still allowed to set them later directly on the object.
    ///
    /// The function takes a Service parameter because it determines the fields used
    /// to parse the endpoint.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str, service: &Service) -> Result<Self> {
        connection_string::parse(conn_str, service)
    }

    /// Build the credential described by this config.
    ///
    /// A SAS token wins over a shared key. Returns `None` when neither is
    /// complete.
    pub fn credential(&self) -> Option<Credential> {
        if let Some(token) = self.sas_token.as_deref().filter(|v| !v.is_empty()) {
            return Some(Credential::with_sas_token(token));
        }

        match (self.account_name.as_deref(), self.account_key.as_deref()) {
            (Some(name), Some(key)) if !name.is_empty() && !key.is_empty() => {
                Some(Credential::with_shared_key(name, key))
            }
            _ => None,
        }
    }
}
