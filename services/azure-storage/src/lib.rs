//! Azure Storage service signer
//!
//! This crate provides signing capabilities for Azure Storage services including:
//! - Shared Key and Shared Key Lite authorization headers
//! - Account SAS (Shared Access Signature) tokens
//! - Service SAS signatures and tokens for blobs, files, queues and tables
//!
//! # Example
//!
//! ```rust
//! use azsign_azure_storage::{Credential, RequestSigner};
//! use azsign_core::{Result, Signer};
//!
//! fn main() -> Result<()> {
//!     let signer = Signer::new(
//!         Credential::with_shared_key("account", "a2V5"),
//!         RequestSigner::new(),
//!     );
//!
//!     let mut parts = http::Request::get("https://account.blob.core.windows.net/container/blob")
//!         .body(())?
//!         .into_parts()
//!         .0;
//!
//!     // Sign with an `Authorization` header.
//!     signer.sign(&mut parts, None)?;
//!     assert!(parts.headers.contains_key(http::header::AUTHORIZATION));
//!
//!     Ok(())
//! }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;
pub use constants::SAS_VERSION;

mod service;
pub use service::Service;

mod sanitize;
pub use sanitize::{sanitize, validate_date, validate_protocol, validate_version};

pub mod canonical;
pub use canonical::CanonicalizationMode;

mod signature;
pub use signature::sign;

pub mod shared_key;

mod sas;
pub use sas::{AccountSharedAccessSignature, Protocol, ServiceSharedAccessSignature};

mod credential;
pub use credential::Credential;

mod config;
pub use config::Config;

mod connection_string;

mod sign_request;
pub use sign_request::RequestSigner;
