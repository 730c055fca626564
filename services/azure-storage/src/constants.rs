use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_HEADER_PREFIX: &str = "x-ms-";
pub const CONTENT_MD5: &str = "content-md5";

// Query parameters with special meaning in canonicalization.
pub const QUERY_COMP: &str = "comp";

// Authorization scheme names.
pub const SHARED_KEY: &str = "SharedKey";
pub const SHARED_KEY_LITE: &str = "SharedKeyLite";

/// Latest SAS version whose string-to-sign layouts are the ones implemented
/// here: account SAS without encryption scope, service SAS without signed
/// resource and snapshot time.
pub const SAS_VERSION: &str = "2018-03-28";

// Alphabets used to sanitize SAS fields. Order matters.
pub const ACCOUNT_SAS_SERVICES: &str = "bqtf";
pub const ACCOUNT_SAS_RESOURCE_TYPES: &str = "sco";
pub const ACCOUNT_SAS_PERMISSIONS: &str = "rwdlacup";

// Defaults used when presigning requests with an account SAS.
pub const DEFAULT_ACCOUNT_SAS_PERMISSIONS: &str = "rwdlacu";

pub const MAX_SIGNED_IDENTIFIER_LEN: usize = 64;

// Env values used in azure services.
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const AZURE_STORAGE_SAS_TOKEN: &str = "AZURE_STORAGE_SAS_TOKEN";
pub const AZURE_STORAGE_ENDPOINT: &str = "AZURE_STORAGE_ENDPOINT";
pub const AZURE_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";

pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');
