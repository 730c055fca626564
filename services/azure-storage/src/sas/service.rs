use azsign_core::{Error, Result};
use log::debug;

use super::{join_encoded, opt, Protocol};
use crate::canonical::{
    sas_canonicalized_resource, sas_query_pairs, sas_string_to_sign, SasField,
};
use crate::constants::*;
use crate::sanitize::{sanitize, validate_date, validate_protocol, validate_version};
use crate::signature::sign;
use crate::Service;

/// Service shared access signature for a single blob, container, file,
/// share, queue or table.
///
/// - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)
///
/// ```
/// use azsign_azure_storage::ServiceSharedAccessSignature;
///
/// let sas = ServiceSharedAccessSignature::new("account", "a2V5", "b", "container/blob")
///     .with_resource("b")
///     .with_permissions("racwdl")
///     .with_expiry("2022-03-01T08:17:34Z");
/// assert_eq!(
///     sas.signature().unwrap(),
///     "pNmPjkhg/WIdVFYBDkGkM1PEhmwfYy4eMgV69YtfWLE="
/// );
/// ```
#[derive(Clone, Default)]
pub struct ServiceSharedAccessSignature {
    account_name: String,
    account_key: String,
    service: String,
    resource_name: String,
    resource: Option<String>,
    permissions: Option<String>,
    expiry: Option<String>,
    start: Option<String>,
    identifier: Option<String>,
    ip: Option<String>,
    protocol: Option<String>,
    version: String,

    cache_control: Option<String>,
    content_disposition: Option<String>,
    content_encoding: Option<String>,
    content_language: Option<String>,
    content_type: Option<String>,

    start_partition_key: Option<String>,
    start_row_key: Option<String>,
    end_partition_key: Option<String>,
    end_row_key: Option<String>,
}

impl std::fmt::Debug for ServiceSharedAccessSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSharedAccessSignature")
            .field("account_name", &self.account_name)
            .field("service", &self.service)
            .field("resource_name", &self.resource_name)
            .field("resource", &self.resource)
            .field("permissions", &self.permissions)
            .field("expiry", &self.expiry)
            .field("identifier", &self.identifier)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

struct Validated {
    service: Service,
    canonicalized_resource: String,
    resource: String,
    permissions: String,
    protocol: Option<Protocol>,
}

impl ServiceSharedAccessSignature {
    /// Create a service SAS for `resource_name` in the service named by the
    /// SAS character `service` (`b`, `f`, `q` or `t`).
    ///
    /// `resource_name` is the path below the account, such as
    /// `container/blob`, `share/dir/file`, a queue name or a table name.
    pub fn new(
        account_name: impl Into<String>,
        account_key: impl Into<String>,
        service: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
            service: service.into(),
            resource_name: resource_name.into(),
            version: SAS_VERSION.to_string(),
            ..Default::default()
        }
    }

    /// Set the signed resource (`sr`): `b` or `c` for blob, `f` or `s` for file.
    ///
    /// Ignored for queue and table.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the signed permissions (`sp`).
    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = Some(permissions.into());
        self
    }

    /// Set the signed expiry (`se`).
    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    /// Set the signed start (`st`).
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Set the signed identifier (`si`) naming a stored access policy.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
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

    /// Set the signed version (`sv`).
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Override `Cache-Control` of the response (`rscc`), blob and file only.
    pub fn with_cache_control(mut self, v: impl Into<String>) -> Self {
        self.cache_control = Some(v.into());
        self
    }

    /// Override `Content-Disposition` of the response (`rscd`), blob and file only.
    pub fn with_content_disposition(mut self, v: impl Into<String>) -> Self {
        self.content_disposition = Some(v.into());
        self
    }

    /// Override `Content-Encoding` of the response (`rsce`), blob and file only.
    pub fn with_content_encoding(mut self, v: impl Into<String>) -> Self {
        self.content_encoding = Some(v.into());
        self
    }

    /// Override `Content-Language` of the response (`rscl`), blob and file only.
    pub fn with_content_language(mut self, v: impl Into<String>) -> Self {
        self.content_language = Some(v.into());
        self
    }

    /// Override `Content-Type` of the response (`rsct`), blob and file only.
    pub fn with_content_type(mut self, v: impl Into<String>) -> Self {
        self.content_type = Some(v.into());
        self
    }

    /// Set the starting partition key (`spk`), table only.
    pub fn with_start_partition_key(mut self, v: impl Into<String>) -> Self {
        self.start_partition_key = Some(v.into());
        self
    }

    /// Set the starting row key (`srk`), table only.
    pub fn with_start_row_key(mut self, v: impl Into<String>) -> Self {
        self.start_row_key = Some(v.into());
        self
    }

    /// Set the ending partition key (`epk`), table only.
    pub fn with_end_partition_key(mut self, v: impl Into<String>) -> Self {
        self.end_partition_key = Some(v.into());
        self
    }

    /// Set the ending row key (`erk`), table only.
    pub fn with_end_row_key(mut self, v: impl Into<String>) -> Self {
        self.end_row_key = Some(v.into());
        self
    }

    fn validate(&self) -> Result<Validated> {
        let signed_service = sanitize(&self.service, ACCOUNT_SAS_SERVICES, "signedService")?;
        let service = match signed_service.chars().next() {
            Some(c) if signed_service.len() == 1 => Service::from_sas_char(c),
            _ => None,
        }
        .ok_or_else(|| Error::invalid_argument("signedService", "must be length 1"))?;

        let resources = service.sas_resources();
        let resource = if resources.is_empty() {
            String::new()
        } else {
            let resource = opt(&self.resource).to_ascii_lowercase();
            if !resources.contains(&resource.as_str()) {
                return Err(Error::invalid_argument(
                    "signedResource",
                    format!("must be one of {}", resources.join(", ")),
                ));
            }
            resource
        };

        if self.resource_name.trim_start_matches('/').is_empty() {
            return Err(Error::invalid_argument("resourceName", "must not be empty"));
        }

        let has_identifier = !opt(&self.identifier).is_empty();
        let permissions = sanitize(
            opt(&self.permissions),
            service.sas_permissions(),
            "signedPermissions",
        )?;
        if permissions.is_empty() && !has_identifier {
            return Err(Error::invalid_argument(
                "signedPermissions",
                "must not be empty without a signed identifier",
            ));
        }

        match opt(&self.expiry) {
            "" if has_identifier => {}
            expiry => validate_date(expiry, "signedExpiry")?,
        }
        if let Some(start) = self.start.as_deref().filter(|v| !v.is_empty()) {
            validate_date(start, "signedStart")?;
        }
        if opt(&self.identifier).chars().count() > MAX_SIGNED_IDENTIFIER_LEN {
            return Err(Error::invalid_argument(
                "signedIdentifier",
                format!("must be at most {MAX_SIGNED_IDENTIFIER_LEN} characters"),
            ));
        }
        let protocol = validate_protocol(opt(&self.protocol))?;
        validate_version(&self.version, "signedVersion")?;

        Ok(Validated {
            service,
            canonicalized_resource: sas_canonicalized_resource(
                service,
                &self.account_name,
                &self.resource_name,
            ),
            resource,
            permissions,
            protocol,
        })
    }

    fn value<'a>(&'a self, validated: &'a Validated, field: SasField) -> &'a str {
        match field {
            SasField::Permissions => &validated.permissions,
            SasField::Start => opt(&self.start),
            SasField::Expiry => opt(&self.expiry),
            SasField::CanonicalizedResource => &validated.canonicalized_resource,
            SasField::Identifier => opt(&self.identifier),
            SasField::Ip => opt(&self.ip),
            SasField::Protocol => validated.protocol.map(|p| p.as_str()).unwrap_or_default(),
            SasField::Version => &self.version,
            SasField::Resource => &validated.resource,
            SasField::TableName => &self.resource_name,
            SasField::CacheControl => opt(&self.cache_control),
            SasField::ContentDisposition => opt(&self.content_disposition),
            SasField::ContentEncoding => opt(&self.content_encoding),
            SasField::ContentLanguage => opt(&self.content_language),
            SasField::ContentType => opt(&self.content_type),
            SasField::StartPartitionKey => opt(&self.start_partition_key),
            SasField::StartRowKey => opt(&self.start_row_key),
            SasField::EndPartitionKey => opt(&self.end_partition_key),
            SasField::EndRowKey => opt(&self.end_row_key),
            SasField::AccountName | SasField::Services | SasField::ResourceTypes => "",
        }
    }

    fn sign(&self, validated: &Validated) -> Result<String> {
        let layout = validated.service.sas_layout();
        let string_to_sign = sas_string_to_sign(layout, |field| self.value(validated, field));
        sign(&string_to_sign, &self.account_key)
    }

    /// Validate all fields and build the string to sign.
    pub fn string_to_sign(&self) -> Result<String> {
        let validated = self.validate()?;
        Ok(sas_string_to_sign(
            validated.service.sas_layout(),
            |field| self.value(&validated, field),
        ))
    }

    /// Validate all fields and compute the base64 signature.
    ///
    /// The result is not URL-encoded.
    pub fn signature(&self) -> Result<String> {
        let validated = self.validate()?;
        self.sign(&validated)
    }

    /// Query parameters of this SAS in wire order, ending with `sig`.
    ///
    /// Values are not percent-encoded.
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>> {
        let validated = self.validate()?;
        let signature = self.sign(&validated)?;

        let mut pairs = sas_query_pairs(validated.service.sas_layout(), |field| {
            self.value(&validated, field)
        });
        pairs.push(("sig".to_string(), signature));

        debug!(
            "service sas generated for {} with permissions {:?}",
            validated.canonicalized_resource, validated.permissions
        );
        Ok(pairs)
    }

    /// The assembled SAS query string, without leading `?`.
    ///
    /// Every value is percent-encoded, since response headers, identifiers
    /// and table keys are free text.
    pub fn token(&self) -> Result<String> {
        self.query_pairs().map(join_encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azsign_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    // base64("key")
    const KEY: &str = "a2V5";
    const EXPIRY: &str = "2022-03-01T08:17:34Z";

    fn blob(resource_name: &str) -> ServiceSharedAccessSignature {
        ServiceSharedAccessSignature::new("account", KEY, "b", resource_name)
            .with_resource("b")
            .with_permissions("racwdl")
            .with_expiry(EXPIRY)
    }

    #[test]
    fn test_blob_signature() {
        let sas = blob("container/blob");
        assert_eq!(
            sas.string_to_sign().unwrap(),
            "racwdl\n\n2022-03-01T08:17:34Z\n/blob/account/container/blob\n\n\n\n2018-03-28\n\n\n\n\n"
        );
        assert_eq!(
            sas.signature().unwrap(),
            "pNmPjkhg/WIdVFYBDkGkM1PEhmwfYy4eMgV69YtfWLE="
        );
        assert_eq!(sas.signature().unwrap(), sas.signature().unwrap());
        assert_eq!(
            blob("container/blob2").signature().unwrap(),
            "0aIopOTSQnC+LQbOE8FAWPfWYHwVA46+QaGNV+QhzIQ="
        );
    }

    #[test]
    fn test_blob_permissions_are_sanitized() {
        let sas = blob("container/blob").with_permissions("LDWCAR");
        assert_eq!(
            sas.signature().unwrap(),
            "pNmPjkhg/WIdVFYBDkGkM1PEhmwfYy4eMgV69YtfWLE="
        );
    }

    #[test]
    fn test_blob_token() {
        assert_eq!(
            blob("container/blob").token().unwrap(),
            "sv=2018-03-28&sr=b&sp=racwdl&se=2022-03-01T08%3A17%3A34Z&sig=pNmPjkhg%2FWIdVFYBDkGkM1PEhmwfYy4eMgV69YtfWLE%3D"
        );
    }

    #[test]
    fn test_token_decodes_to_signed_values() {
        let sas = blob("container/blob")
            .with_content_disposition("attachment; filename=a&b.txt")
            .with_content_type("text/plain; charset=utf-8");

        let token = sas.token().unwrap();
        let pairs: Vec<(String, String)> = form_urlencoded::parse(token.as_bytes())
            .into_owned()
            .collect();

        assert_eq!(pairs, sas.query_pairs().unwrap());
        assert!(pairs.contains(&(
            "rscd".to_string(),
            "attachment; filename=a&b.txt".to_string()
        )));
        assert_eq!(pairs.last().unwrap().1, sas.signature().unwrap());
    }

    #[test]
    fn test_file_signature_with_response_headers() {
        let sas = ServiceSharedAccessSignature::new("account", KEY, "f", "/share/dir/file.txt")
            .with_resource("f")
            .with_permissions("wcr")
            .with_start("2022-03-01T08:12:34Z")
            .with_expiry(EXPIRY)
            .with_ip("168.1.5.65")
            .with_protocol("https")
            .with_cache_control("no-cache")
            .with_content_type("text/plain")
            // Table only, never signed for files.
            .with_start_partition_key("ignored");

        assert_eq!(
            sas.signature().unwrap(),
            "REtOGtE4DceDLvcYAxi1Ic39Q0UjW0ZW/lBDZ1JUpDM="
        );
        assert_eq!(
            sas.token().unwrap(),
            "sv=2018-03-28&sr=f&sp=rcw&st=2022-03-01T08%3A12%3A34Z&se=2022-03-01T08%3A17%3A34Z&sip=168.1.5.65&spr=https&rscc=no-cache&rsct=text%2Fplain&sig=REtOGtE4DceDLvcYAxi1Ic39Q0UjW0ZW%2FlBDZ1JUpDM%3D"
        );
    }

    #[test]
    fn test_table_signature() {
        let sas = ServiceSharedAccessSignature::new("account", KEY, "t", "MyTable")
            .with_permissions("raud")
            .with_expiry(EXPIRY)
            .with_start_partition_key("p1")
            .with_end_row_key("r9")
            // Blob and file only, never signed for tables.
            .with_cache_control("ignored");

        assert_eq!(
            sas.string_to_sign().unwrap(),
            "raud\n\n2022-03-01T08:17:34Z\n/table/account/mytable\n\n\n\n2018-03-28\np1\n\n\nr9"
        );
        assert_eq!(
            sas.signature().unwrap(),
            "p/gRdajzNfVSUy8c8rI9t++tT6D2tgsteZkpeFDNwug="
        );
        assert_eq!(
            sas.token().unwrap(),
            "sv=2018-03-28&tn=MyTable&sp=raud&se=2022-03-01T08%3A17%3A34Z&spk=p1&erk=r9&sig=p%2FgRdajzNfVSUy8c8rI9t%2B%2BtT6D2tgsteZkpeFDNwug%3D"
        );
    }

    #[test]
    fn test_queue_signature_with_identifier() {
        let sas = ServiceSharedAccessSignature::new("account", KEY, "q", "myqueue")
            .with_identifier("policy1");

        assert_eq!(
            sas.string_to_sign().unwrap(),
            "\n\n\n/queue/account/myqueue\npolicy1\n\n\n2018-03-28"
        );
        assert_eq!(
            sas.signature().unwrap(),
            "rCopVialw0a3On4WTdWJRIsyAXTl+RhNXXCGX9ovATY="
        );
        assert_eq!(
            sas.token().unwrap(),
            "sv=2018-03-28&si=policy1&sig=rCopVialw0a3On4WTdWJRIsyAXTl%2BRhNXXCGX9ovATY%3D"
        );
    }

    #[test_case("bq"; "two services")]
    #[test_case(""; "empty")]
    fn test_service_must_be_length_one(service: &str) {
        let err = ServiceSharedAccessSignature::new("account", KEY, service, "container")
            .with_permissions("r")
            .with_expiry(EXPIRY)
            .signature()
            .unwrap_err();
        assert_eq!(err.field(), Some("signedService"));
        assert!(err.to_string().contains("must be length 1"), "{err}");
    }

    #[test]
    fn test_unknown_service_rejected() {
        let err = ServiceSharedAccessSignature::new("account", KEY, "x", "container")
            .signature()
            .unwrap_err();
        assert_eq!(err.field(), Some("signedService"));
    }

    #[test_case("b", Some("x"), "signedResource")]
    #[test_case("b", None, "signedResource")]
    #[test_case("f", Some("c"), "signedResource")]
    fn test_resource_rejected(service: &str, resource: Option<&str>, field: &str) {
        let mut sas = ServiceSharedAccessSignature::new("account", KEY, service, "c/b")
            .with_permissions("r")
            .with_expiry(EXPIRY);
        if let Some(resource) = resource {
            sas = sas.with_resource(resource);
        }
        assert_eq!(sas.signature().unwrap_err().field(), Some(field));
    }

    #[test]
    fn test_resource_name_required() {
        let err = ServiceSharedAccessSignature::new("account", KEY, "q", "/")
            .with_permissions("r")
            .with_expiry(EXPIRY)
            .signature()
            .unwrap_err();
        assert_eq!(err.field(), Some("resourceName"));
    }

    #[test_case("q", "rw"; "write is not a queue permission")]
    #[test_case("t", "l"; "list is not a table permission")]
    #[test_case("f", "a"; "add is not a file permission")]
    fn test_permissions_use_service_alphabet(service: &str, permissions: &str) {
        let err = ServiceSharedAccessSignature::new("account", KEY, service, "name")
            .with_resource(if service == "f" { "f" } else { "b" })
            .with_permissions(permissions)
            .with_expiry(EXPIRY)
            .signature()
            .unwrap_err();
        assert_eq!(err.field(), Some("signedPermissions"));
    }

    #[test]
    fn test_expiry_required_without_identifier() {
        let err = blob("container/blob")
            .with_expiry("")
            .signature()
            .unwrap_err();
        assert_eq!(err.field(), Some("signedExpiry"));
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);

        assert!(blob("container/blob")
            .with_expiry("")
            .with_identifier("policy")
            .signature()
            .is_ok());
    }

    #[test]
    fn test_identifier_length() {
        let ok = "a".repeat(MAX_SIGNED_IDENTIFIER_LEN);
        assert!(blob("container/blob").with_identifier(ok).signature().is_ok());

        let long = "a".repeat(MAX_SIGNED_IDENTIFIER_LEN + 1);
        let err = blob("container/blob")
            .with_identifier(long)
            .signature()
            .unwrap_err();
        assert_eq!(err.field(), Some("signedIdentifier"));
    }

    #[test]
    fn test_protocol_and_version_validated() {
        let err = blob("container/blob")
            .with_protocol("http")
            .signature()
            .unwrap_err();
        assert_eq!(err.field(), Some("signedProtocol"));

        let err = blob("container/blob")
            .with_version("latest")
            .signature()
            .unwrap_err();
        assert_eq!(err.field(), Some("signedVersion"));
    }

    #[test]
    fn test_invalid_key() {
        let err = ServiceSharedAccessSignature::new("account", "***", "b", "container")
            .with_resource("c")
            .with_permissions("rl")
            .with_expiry(EXPIRY)
            .signature()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }
}
