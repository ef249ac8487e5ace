//! Verification of signed incoming requests, such as webhooks.
//!
//! # Overview
//!
//! - [`SignatureVerifier`]: the verification capability
//! - [`HmacSignatureVerifier`]: HMAC-SHA2 verification with a configurable
//!   canonical message, digest encoding and header template
//! - [`SignatureRequest`]: the parts of an incoming request a verifier reads
//! - [`SignatureVerificationResult`]: the outcome; verifiers never return
//!   errors, failures are reported in the result
//!
//! # Example
//!
//! ```rust
//! use apimatic_core::signature::{
//!     DigestEncoding, HmacSignatureVerifier, SignatureRequest, SignatureVerifier,
//! };
//!
//! let verifier = HmacSignatureVerifier::new("secret", "X-Signature")
//!     .encoding(DigestEncoding::Hex)
//!     .signature_template("sha256={digest}");
//!
//! let request = SignatureRequest::new(b"{\"id\":1}".to_vec())
//!     .header("X-Signature", "sha256=0000");
//!
//! let result = verifier.verify(&request);
//! assert!(!result.ok);
//! ```

mod hmac_verifier;

pub use hmac_verifier::{DigestEncoding, HashAlgorithm, HmacSignatureVerifier, MessageResolver};

use std::collections::HashMap;

/// Verifies the signature of an incoming request.
pub trait SignatureVerifier: Send + Sync {
    /// Verifies `request`.
    fn verify(&self, request: &SignatureRequest) -> SignatureVerificationResult;
}

/// An incoming request to verify.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureRequest {
    /// Request method, if known.
    pub method: Option<String>,
    /// Request path or URL, if known.
    pub url: Option<String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// The raw body, exactly as received.
    pub raw_body: Vec<u8>,
}

impl SignatureRequest {
    /// Creates a request with `raw_body` and no headers.
    #[must_use]
    pub fn new(raw_body: Vec<u8>) -> Self {
        Self {
            raw_body,
            ..Self::default()
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The outcome of a verification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureVerificationResult {
    /// `true` if the signature matched.
    pub ok: bool,
    /// Why verification failed. Empty on success.
    pub errors: Vec<String>,
}

impl SignatureVerificationResult {
    /// A successful verification.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    /// A failed verification.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            errors: vec![error.into()],
        }
    }
}
