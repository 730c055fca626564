use std::fmt;
use std::str::FromStr;

use azsign_core::{Error, Result};

use crate::canonical::{CanonicalizationMode, SasLayout};

/// Azure Storage services that can be signed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Service {
    /// Blob storage.
    Blob,
    /// File shares.
    File,
    /// Queue storage.
    Queue,
    /// Table storage.
    Table,
}

impl Service {
    /// Look up a service by its SAS character (`b`, `f`, `q`, `t`).
    pub fn from_sas_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'b' => Some(Service::Blob),
            'f' => Some(Service::File),
            'q' => Some(Service::Queue),
            't' => Some(Service::Table),
            _ => None,
        }
    }

    /// The character used for this service in `ss` and service SAS.
    pub fn sas_char(&self) -> char {
        match self {
            Service::Blob => 'b',
            Service::File => 'f',
            Service::Queue => 'q',
            Service::Table => 't',
        }
    }

    /// Full lowercase service name, as used in SAS canonicalized resources.
    pub fn name(&self) -> &'static str {
        match self {
            Service::Blob => "blob",
            Service::File => "file",
            Service::Queue => "queue",
            Service::Table => "table",
        }
    }

    /// Subdomain used in the service endpoint, e.g. `account.blob.core.windows.net`.
    pub fn endpoint_name(&self) -> &'static str {
        self.name()
    }

    /// Layout of the service SAS string-to-sign for this service.
    pub fn sas_layout(&self) -> SasLayout {
        match self {
            Service::Blob | Service::File => SasLayout::BlobFile,
            Service::Queue => SasLayout::Queue,
            Service::Table => SasLayout::Table,
        }
    }

    /// Shared Key canonicalization used by this service.
    ///
    /// Table requests are signed with Shared Key Lite.
    pub fn canonicalization_mode(&self) -> CanonicalizationMode {
        match self {
            Service::Table => CanonicalizationMode::TableLite,
            _ => CanonicalizationMode::Generic,
        }
    }

    /// Permissions a service SAS may grant on this service, in canonical order.
    pub fn sas_permissions(&self) -> &'static str {
        match self {
            Service::Blob => "racwdl",
            Service::File => "rcwdl",
            Service::Queue => "raup",
            Service::Table => "raud",
        }
    }

    /// Signed resource (`sr`) values accepted by this service.
    ///
    /// Queue and table SAS carry no signed resource.
    pub fn sas_resources(&self) -> &'static [&'static str] {
        match self {
            Service::Blob => &["b", "c"],
            Service::File => &["f", "s"],
            Service::Queue | Service::Table => &[],
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blob" | "b" => Ok(Service::Blob),
            "file" | "f" => Ok(Service::File),
            "queue" | "q" => Ok(Service::Queue),
            "table" | "t" => Ok(Service::Table),
            _ => Err(Error::config_invalid(format!("unknown storage service: {s}"))),
        }
    }
}
