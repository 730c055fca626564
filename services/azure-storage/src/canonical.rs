//! Canonical strings consumed by Shared Key and SAS signing.
//!
//! - [Authorize with Shared Key](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
//! - [Create an account SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-account-sas)
//! - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)

use std::collections::BTreeMap;
use std::fmt::Write;

use azsign_core::{Result, SigningRequest};
use http::header::{self, HeaderName};
use log::debug;

use crate::constants::*;
use crate::Service;

/// How a request is canonicalized for Shared Key signing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CanonicalizationMode {
    /// Shared Key for Blob, Queue and File services.
    #[default]
    Generic,
    /// Shared Key Lite for the Table service.
    TableLite,
}

impl CanonicalizationMode {
    /// Name of the authorization scheme producing this canonical form.
    pub fn scheme(&self) -> &'static str {
        match self {
            CanonicalizationMode::Generic => SHARED_KEY,
            CanonicalizationMode::TableLite => SHARED_KEY_LITE,
        }
    }
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
pub fn canonicalize_headers(req: &SigningRequest) -> Result<String> {
    Ok(SigningRequest::header_to_string(
        req.header_to_vec_with_prefix(X_MS_HEADER_PREFIX)?,
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
pub fn canonicalize_resource(
    req: &SigningRequest,
    account_name: &str,
    mode: CanonicalizationMode,
) -> String {
    let mut s = format!("/{}{}", account_name, req.path);

    match mode {
        CanonicalizationMode::Generic => {
            if req.query.is_empty() {
                return s;
            }

            let mut grouped: BTreeMap<String, Vec<&str>> = BTreeMap::new();
            for (k, v) in req.query.iter() {
                grouped.entry(k.to_lowercase()).or_default().push(v);
            }
            let query = grouped
                .into_iter()
                .map(|(k, mut vs)| {
                    vs.sort_unstable();
                    (k, vs.join(","))
                })
                .collect();

            s.push('\n');
            s.push_str(&SigningRequest::query_to_string(query, ":", "\n"));
        }
        CanonicalizationMode::TableLite => {
            if let Some(comp) = req.query_get(QUERY_COMP) {
                s.push_str("?comp=");
                s.push_str(comp);
            }
        }
    }

    s
}

/// Construct the Shared Key string to sign.
///
/// ## Format
///
/// Generic:
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// Table Lite:
///
/// ```text
/// Date + "\n" +
/// CanonicalizedResource;
/// ```
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#blob-queue-and-file-services-shared-key-authorization)
/// - [Table service (Shared Key Lite authorization)](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#table-service-shared-key-lite-authorization)
pub fn string_to_sign(
    req: &SigningRequest,
    account_name: &str,
    mode: CanonicalizationMode,
) -> Result<String> {
    let mut s = String::with_capacity(256);

    match mode {
        CanonicalizationMode::Generic => {
            writeln!(&mut s, "{}", req.method.as_str())?;
            for name in [
                header::CONTENT_ENCODING,
                header::CONTENT_LANGUAGE,
                header::CONTENT_LENGTH,
                HeaderName::from_static(CONTENT_MD5),
                header::CONTENT_TYPE,
                header::DATE,
                header::IF_MODIFIED_SINCE,
                header::IF_MATCH,
                header::IF_NONE_MATCH,
                header::IF_UNMODIFIED_SINCE,
                header::RANGE,
            ] {
                let value = req.header_get_or_default(&name)?;
                // Since 2015-02-21 a zero content length must be signed as empty.
                if name == header::CONTENT_LENGTH && value == "0" {
                    writeln!(&mut s)?;
                } else {
                    writeln!(&mut s, "{value}")?;
                }
            }

            let headers = canonicalize_headers(req)?;
            if !headers.is_empty() {
                writeln!(&mut s, "{headers}")?;
            }
        }
        CanonicalizationMode::TableLite => {
            let date = match req.header_get_or_default(&HeaderName::from_static(X_MS_DATE))? {
                "" => req.header_get_or_default(&header::DATE)?,
                v => v,
            };
            writeln!(&mut s, "{date}")?;
        }
    }
    write!(&mut s, "{}", canonicalize_resource(req, account_name, mode))?;

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// A single field taking part in a shared access signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SasField {
    /// Storage account name, only signed by account SAS.
    AccountName,
    /// `sp`
    Permissions,
    /// `ss`
    Services,
    /// `srt`
    ResourceTypes,
    /// `st`
    Start,
    /// `se`
    Expiry,
    /// `/service/account/resource`, only signed by service SAS.
    CanonicalizedResource,
    /// `si`
    Identifier,
    /// `sip`
    Ip,
    /// `spr`
    Protocol,
    /// `sv`
    Version,
    /// `sr`
    Resource,
    /// `tn`
    TableName,
    /// `rscc`
    CacheControl,
    /// `rscd`
    ContentDisposition,
    /// `rsce`
    ContentEncoding,
    /// `rscl`
    ContentLanguage,
    /// `rsct`
    ContentType,
    /// `spk`
    StartPartitionKey,
    /// `srk`
    StartRowKey,
    /// `epk`
    EndPartitionKey,
    /// `erk`
    EndRowKey,
}

impl SasField {
    /// Query parameter carrying this field, if it is ever emitted.
    pub fn query_key(&self) -> Option<&'static str> {
        let key = match self {
            SasField::AccountName | SasField::CanonicalizedResource => return None,
            SasField::Permissions => "sp",
            SasField::Services => "ss",
            SasField::ResourceTypes => "srt",
            SasField::Start => "st",
            SasField::Expiry => "se",
            SasField::Identifier => "si",
            SasField::Ip => "sip",
            SasField::Protocol => "spr",
            SasField::Version => "sv",
            SasField::Resource => "sr",
            SasField::TableName => "tn",
            SasField::CacheControl => "rscc",
            SasField::ContentDisposition => "rscd",
            SasField::ContentEncoding => "rsce",
            SasField::ContentLanguage => "rscl",
            SasField::ContentType => "rsct",
            SasField::StartPartitionKey => "spk",
            SasField::StartRowKey => "srk",
            SasField::EndPartitionKey => "epk",
            SasField::EndRowKey => "erk",
        };
        Some(key)
    }
}

/// Descriptor of a field position in a SAS layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SasFieldSpec {
    /// The field at this position.
    pub field: SasField,
    /// Optional fields are signed as empty lines and left out of the query
    /// string when absent.
    pub optional: bool,
}

const fn required(field: SasField) -> SasFieldSpec {
    SasFieldSpec {
        field,
        optional: false,
    }
}

const fn optional(field: SasField) -> SasFieldSpec {
    SasFieldSpec {
        field,
        optional: true,
    }
}

use self::SasField::*;

const ACCOUNT_SIGNED: &[SasFieldSpec] = &[
    required(AccountName),
    required(Permissions),
    required(Services),
    required(ResourceTypes),
    optional(Start),
    required(Expiry),
    optional(Ip),
    optional(Protocol),
    required(Version),
];

const ACCOUNT_QUERY: &[SasFieldSpec] = &[
    required(Version),
    required(Services),
    required(ResourceTypes),
    required(Permissions),
    required(Expiry),
    optional(Start),
    optional(Ip),
    optional(Protocol),
];

// Permissions and expiry may come from a stored access policy named by `si`.
const BLOB_FILE_SIGNED: &[SasFieldSpec] = &[
    optional(Permissions),
    optional(Start),
    optional(Expiry),
    required(CanonicalizedResource),
    optional(Identifier),
    optional(Ip),
    optional(Protocol),
    required(Version),
    optional(CacheControl),
    optional(ContentDisposition),
    optional(ContentEncoding),
    optional(ContentLanguage),
    optional(ContentType),
];

const BLOB_FILE_QUERY: &[SasFieldSpec] = &[
    required(Version),
    required(Resource),
    optional(Permissions),
    optional(Start),
    optional(Expiry),
    optional(Identifier),
    optional(Ip),
    optional(Protocol),
    optional(CacheControl),
    optional(ContentDisposition),
    optional(ContentEncoding),
    optional(ContentLanguage),
    optional(ContentType),
];

const QUEUE_SIGNED: &[SasFieldSpec] = &[
    optional(Permissions),
    optional(Start),
    optional(Expiry),
    required(CanonicalizedResource),
    optional(Identifier),
    optional(Ip),
    optional(Protocol),
    required(Version),
];

const QUEUE_QUERY: &[SasFieldSpec] = &[
    required(Version),
    optional(Permissions),
    optional(Start),
    optional(Expiry),
    optional(Identifier),
    optional(Ip),
    optional(Protocol),
];

const TABLE_SIGNED: &[SasFieldSpec] = &[
    optional(Permissions),
    optional(Start),
    optional(Expiry),
    required(CanonicalizedResource),
    optional(Identifier),
    optional(Ip),
    optional(Protocol),
    required(Version),
    optional(StartPartitionKey),
    optional(StartRowKey),
    optional(EndPartitionKey),
    optional(EndRowKey),
];

const TABLE_QUERY: &[SasFieldSpec] = &[
    required(Version),
    required(TableName),
    optional(Permissions),
    optional(Start),
    optional(Expiry),
    optional(Identifier),
    optional(Ip),
    optional(Protocol),
    optional(StartPartitionKey),
    optional(StartRowKey),
    optional(EndPartitionKey),
    optional(EndRowKey),
];

/// String-to-sign layout of a shared access signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SasLayout {
    /// Account SAS.
    Account,
    /// Service SAS for blobs, containers, files and shares.
    BlobFile,
    /// Service SAS for queues.
    Queue,
    /// Service SAS for tables.
    Table,
}

impl SasLayout {
    /// Fields joined by `\n` to form the string to sign, in order.
    pub fn signed_fields(&self) -> &'static [SasFieldSpec] {
        match self {
            SasLayout::Account => ACCOUNT_SIGNED,
            SasLayout::BlobFile => BLOB_FILE_SIGNED,
            SasLayout::Queue => QUEUE_SIGNED,
            SasLayout::Table => TABLE_SIGNED,
        }
    }

    /// Fields emitted as query parameters, in order, before `sig`.
    pub fn query_fields(&self) -> &'static [SasFieldSpec] {
        match self {
            SasLayout::Account => ACCOUNT_QUERY,
            SasLayout::BlobFile => BLOB_FILE_QUERY,
            SasLayout::Queue => QUEUE_QUERY,
            SasLayout::Table => TABLE_QUERY,
        }
    }

    /// Account SAS string-to-sign ends with a newline, service SAS does not.
    pub fn trailing_newline(&self) -> bool {
        matches!(self, SasLayout::Account)
    }
}

/// Build the SAS string to sign for `layout`, reading every field from `value`.
///
/// Absent fields are empty strings. Values are used verbatim.
pub fn sas_string_to_sign<'a>(layout: SasLayout, value: impl Fn(SasField) -> &'a str) -> String {
    let mut s = layout
        .signed_fields()
        .iter()
        .map(|spec| value(spec.field))
        .collect::<Vec<_>>()
        .join("\n");
    if layout.trailing_newline() {
        s.push('\n');
    }

    debug!("sas string to sign: {}", &s);

    s
}

/// Build the SAS query pairs for `layout`, leaving out absent optional fields.
///
/// Values are not percent-encoded.
pub fn sas_query_pairs<'a>(
    layout: SasLayout,
    value: impl Fn(SasField) -> &'a str,
) -> Vec<(String, String)> {
    layout
        .query_fields()
        .iter()
        .filter_map(|spec| {
            let key = spec.field.query_key()?;
            let v = value(spec.field);
            if spec.optional && v.is_empty() {
                return None;
            }
            Some((key.to_string(), v.to_string()))
        })
        .collect()
}

/// Canonicalized resource of a service SAS: `/{service}/{account}/{resource}`.
///
/// `resource` is not embedded verbatim:
///
/// - One leading `/` is dropped, so `/container/blob` and `container/blob`
///   sign the same.
/// - Table names are lowercased, since the service verifies table SAS
///   against the lowercased name. The `tn` query value keeps its casing.
pub fn sas_canonicalized_resource(service: Service, account_name: &str, resource: &str) -> String {
    let resource = resource.strip_prefix('/').unwrap_or(resource);
    match service {
        Service::Table => format!(
            "/{}/{}/{}",
            service.name(),
            account_name,
            resource.to_lowercase()
        ),
        _ => format!("/{}/{}/{}", service.name(), account_name, resource),
    }
}
