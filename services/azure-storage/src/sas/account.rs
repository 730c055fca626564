use azsign_core::Result;
use log::debug;

use super::{join_token, opt, Protocol};
use crate::canonical::{sas_query_pairs, sas_string_to_sign, SasField, SasLayout};
use crate::constants::*;
use crate::sanitize::{sanitize_required, validate_date, validate_protocol, validate_version};
use crate::signature::sign;

/// Account shared access signature.
///
/// - [Create an account SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-account-sas)
///
/// ```
/// use azsign_azure_storage::AccountSharedAccessSignature;
///
/// let sas = AccountSharedAccessSignature::new("account", "a2V5", "2022-03-01T08:17:34Z")
///     .with_services("b")
///     .with_resource_types("co")
///     .with_permissions("rl");
/// let token = sas.token().unwrap();
/// assert!(token.starts_with("sv=2018-03-28&ss=b&srt=co&sp=rl&se=2022-03-01T08:17:34Z&sig="));
/// ```
#[derive(Clone)]
pub struct AccountSharedAccessSignature {
    account_name: String,
    account_key: String,
    version: String,
    services: String,
    resource_types: String,
    permissions: String,
    expiry: String,
    start: Option<String>,
    ip: Option<String>,
    protocol: Option<String>,
}

impl std::fmt::Debug for AccountSharedAccessSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSharedAccessSignature")
            .field("account_name", &self.account_name)
            .field("version", &self.version)
            .field("services", &self.services)
            .field("resource_types", &self.resource_types)
            .field("permissions", &self.permissions)
            .field("expiry", &self.expiry)
            .field("start", &self.start)
            .field("ip", &self.ip)
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}

/// Account SAS fields after sanitization.
struct Validated {
    services: String,
    resource_types: String,
    permissions: String,
    protocol: Option<Protocol>,
}

impl AccountSharedAccessSignature {
    /// Create an account SAS valid until `expiry`.
    ///
    /// All services, resource types and the `rwdlacu` permissions are
    /// granted until narrowed with the `with_*` methods.
    pub fn new(
        account_name: impl Into<String>,
        account_key: impl Into<String>,
        expiry: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
            version: SAS_VERSION.to_string(),
            services: ACCOUNT_SAS_SERVICES.to_string(),
            resource_types: ACCOUNT_SAS_RESOURCE_TYPES.to_string(),
            permissions: DEFAULT_ACCOUNT_SAS_PERMISSIONS.to_string(),
            expiry: expiry.into(),
            start: None,
            ip: None,
            protocol: None,
        }
    }

    /// Set the signed version (`sv`).
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the signed services (`ss`), any combination of `bqtf`.
    pub fn with_services(mut self, services: impl Into<String>) -> Self {
        self.services = services.into();
        self
    }

    /// Set the signed resource types (`srt`), any combination of `sco`.
    pub fn with_resource_types(mut self, resource_types: impl Into<String>) -> Self {
        self.resource_types = resource_types.into();
        self
    }

    /// Set the signed permissions (`sp`), any combination of `rwdlacup`.
    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = permissions.into();
        self
    }

    /// Set the signed start (`st`).
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Set the signed IP or IP range (`sip`).
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Set the signed protocol (`spr`), `https` or `https,http`.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    fn validate(&self) -> Result<Validated> {
        validate_version(&self.version, "signedVersion")?;
        let services = sanitize_required(&self.services, ACCOUNT_SAS_SERVICES, "signedServices")?;
        let resource_types = sanitize_required(
            &self.resource_types,
            ACCOUNT_SAS_RESOURCE_TYPES,
            "signedResourceTypes",
        )?;
        let permissions = sanitize_required(
            &self.permissions,
            ACCOUNT_SAS_PERMISSIONS,
            "signedPermissions",
        )?;
        validate_date(&self.expiry, "signedExpiry")?;
        if let Some(start) = self.start.as_deref().filter(|v| !v.is_empty()) {
            validate_date(start, "signedStart")?;
        }
        let protocol = validate_protocol(opt(&self.protocol))?;

        Ok(Validated {
            services,
            resource_types,
            permissions,
            protocol,
        })
    }

    fn value<'a>(&'a self, validated: &'a Validated, field: SasField) -> &'a str {
        match field {
            SasField::AccountName => &self.account_name,
            SasField::Permissions => &validated.permissions,
            SasField::Services => &validated.services,
            SasField::ResourceTypes => &validated.resource_types,
            SasField::Start => opt(&self.start),
            SasField::Expiry => &self.expiry,
            SasField::Ip => opt(&self.ip),
            SasField::Protocol => validated.protocol.map(|p| p.as_str()).unwrap_or_default(),
            SasField::Version => &self.version,
            _ => "",
        }
    }

    /// Validate all fields and build the string to sign.
    pub fn string_to_sign(&self) -> Result<String> {
        let validated = self.validate()?;
        Ok(sas_string_to_sign(SasLayout::Account, |field| {
            self.value(&validated, field)
        }))
    }

    /// Validate all fields and compute the base64 signature.
    pub fn signature(&self) -> Result<String> {
        sign(&self.string_to_sign()?, &self.account_key)
    }

    /// Query parameters of this SAS in wire order, ending with `sig`.
    ///
    /// Values are not percent-encoded.
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>> {
        let validated = self.validate()?;
        let string_to_sign =
            sas_string_to_sign(SasLayout::Account, |field| self.value(&validated, field));
        let signature = sign(&string_to_sign, &self.account_key)?;

        let mut pairs =
            sas_query_pairs(SasLayout::Account, |field| self.value(&validated, field));
        pairs.push(("sig".to_string(), signature));

        debug!(
            "account sas generated for services {} with permissions {}",
            validated.services, validated.permissions
        );
        Ok(pairs)
    }

    /// The assembled SAS query string, without leading `?`.
    ///
    /// Only the signature is percent-encoded.
    pub fn token(&self) -> Result<String> {
        self.query_pairs().map(join_token)
    }
}
