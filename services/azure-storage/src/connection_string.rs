use azsign_core::{Error, Result};

use crate::{Config, Credential, Service};

const AZURITE_ACCOUNT_NAME: &str = "devstoreaccount1";
const AZURITE_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const AZURITE_HOST: &str = "http://127.0.0.1";

/// Parse an [Azure Storage connection string][1] into a [`Config`] for
/// `service`.
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str, service: &Service) -> Result<Config> {
    ConnectionString::parse(conn_str)?.into_config(service)
}

/// `Key=Value` settings of a connection string, borrowed from the input.
///
/// Keys match case-insensitively and the first occurrence wins.
struct ConnectionString<'a> {
    settings: Vec<(&'a str, &'a str)>,
}

impl<'a> ConnectionString<'a> {
    fn parse(s: &'a str) -> Result<Self> {
        let settings = s
            .split(';')
            .map(str::trim)
            .filter(|setting| !setting.is_empty())
            .map(|setting| {
                setting
                    .split_once('=')
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .ok_or_else(|| {
                        Error::config_invalid(format!(
                            "connection string setting {setting:?} is not in Key=Value form"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { settings })
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.settings
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
    }

    fn into_config(self, service: &Service) -> Result<Config> {
        if self
            .get("UseDevelopmentStorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            if let Some(config) = self.development_config(service) {
                return Ok(config);
            }
        }

        let mut config = Config {
            account_name: self.get("AccountName").map(str::to_string),
            endpoint: self.endpoint(service)?,
            ..Default::default()
        };
        match self.credential() {
            Some(Credential::SasToken { token }) => config.sas_token = Some(token),
            Some(Credential::SharedKey {
                account_name,
                account_key,
            }) => {
                config.account_name = Some(account_name);
                config.account_key = Some(account_key);
            }
            // Credentials may still come from elsewhere.
            None => {}
        }

        Ok(config)
    }

    /// Azurite settings, `None` for services Azurite does not emulate.
    fn development_config(&self, service: &Service) -> Option<Config> {
        let port = match service {
            Service::Blob => 10000,
            Service::Queue => 10001,
            Service::Table => 10002,
            Service::File => return None,
        };

        let account_name = self.get("AccountName").unwrap_or(AZURITE_ACCOUNT_NAME);
        let account_key = self.get("AccountKey").unwrap_or(AZURITE_ACCOUNT_KEY);
        let endpoint = match self.get("DevelopmentStorageProxyUri") {
            Some(uri) => format!("{}/{account_name}", uri.trim_end_matches('/')),
            None => format!("{AZURITE_HOST}:{port}/{account_name}"),
        };

        Some(Config {
            account_name: Some(account_name.to_string()),
            account_key: Some(account_key.to_string()),
            endpoint: Some(endpoint),
            ..Default::default()
        })
    }

    /// The explicit `{Service}Endpoint`, else one derived from
    /// `AccountName` and `EndpointSuffix`.
    fn endpoint(&self, service: &Service) -> Result<Option<String>> {
        let explicit = match service {
            Service::Blob => "BlobEndpoint",
            Service::File => "FileEndpoint",
            Service::Queue => "QueueEndpoint",
            Service::Table => "TableEndpoint",
        };
        if let Some(endpoint) = self.get(explicit) {
            return Ok(Some(endpoint.to_string()));
        }

        let (Some(account_name), Some(suffix)) =
            (self.get("AccountName"), self.get("EndpointSuffix"))
        else {
            return Ok(None);
        };

        let protocol = self.get("DefaultEndpointsProtocol").unwrap_or("https");
        if !matches!(protocol, "http" | "https") {
            return Err(Error::config_invalid(format!(
                "DefaultEndpointsProtocol must be http or https, got {protocol:?}"
            )));
        }

        Ok(Some(format!(
            "{protocol}://{account_name}.{}.{suffix}",
            service.endpoint_name()
        )))
    }

    /// A SAS token takes precedence over an account key.
    fn credential(&self) -> Option<Credential> {
        if let Some(token) = self.get("SharedAccessSignature") {
            return Some(Credential::with_sas_token(token));
        }

        match (self.get("AccountName"), self.get("AccountKey")) {
            (Some(name), Some(key)) => Some(Credential::with_shared_key(name, key)),
            _ => None,
        }
    }
}
