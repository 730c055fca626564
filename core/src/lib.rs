//! Core components for signing Azure Storage requests.
//!
//! This crate provides the service-agnostic building blocks used by
//! `azsign-azure-storage`: the error type, hashing and time helpers, the
//! [`SigningRequest`] view over [`http::request::Parts`], and the traits
//! that tie credentials and request signers together.
//!
//! ## Overview
//!
//! - **Credential**: any type implementing [`SigningCredential`].
//! - **SignRequest**: a pure, synchronous transformation of request parts
//!   that attaches authorization data (headers or query parameters).
//! - **Signer**: pairs a credential with a [`SignRequest`] implementation.
//!
//! ## Example
//!
//! ```no_run
//! use azsign_core::{Result, SignRequest, Signer, SigningCredential, SigningRequest};
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     token: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.token.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyRequestSigner;
//!
//! impl SignRequest for MyRequestSigner {
//!     type Credential = MyCredential;
//!
//!     fn sign_request(
//!         &self,
//!         req: &mut http::request::Parts,
//!         credential: Option<&Self::Credential>,
//!         _expires_in: Option<Duration>,
//!     ) -> Result<()> {
//!         let mut ctx = SigningRequest::build(req)?;
//!         if let Some(cred) = credential {
//!             ctx.query_push("token", cred.token.clone());
//!         }
//!         ctx.apply(req)
//!     }
//! }
//!
//! # fn example() -> Result<()> {
//! let signer = Signer::new(
//!     MyCredential {
//!         token: "secret".to_string(),
//!     },
//!     MyRequestSigner,
//! );
//!
//! let mut parts = http::Request::get("https://example.com")
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//!
//! signer.sign(&mut parts, None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: base64 and HMAC helpers
//! - [`time`]: time formatting and parsing
//! - [`utils`]: data redaction for `Debug` output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{SignRequest, SigningCredential};
mod request;
pub use request::{SigningMethod, SigningRequest};
mod signer;
pub use signer::Signer;
