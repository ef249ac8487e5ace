//! HMAC-SHA2 signature verification.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::error::{ApiError, Result};
use crate::signature::{SignatureRequest, SignatureVerificationResult, SignatureVerifier};

/// Builds the bytes to sign from a request.
pub type MessageResolver = Arc<dyn Fn(&SignatureRequest) -> Result<Vec<u8>> + Send + Sync>;

/// The hash function underlying the HMAC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// HMAC-SHA256.
    #[default]
    Sha256,
    /// HMAC-SHA384.
    Sha384,
    /// HMAC-SHA512.
    Sha512,
}

impl FromStr for HashAlgorithm {
    type Err = ApiError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(ApiError::invalid_argument(format!(
                "Unsupported hash algorithm '{name}'."
            ))),
        }
    }
}

/// How the digest is written in the signature header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DigestEncoding {
    /// Lowercase hexadecimal.
    #[default]
    Hex,
    /// Standard base64 with padding.
    Base64,
    /// URL-safe base64 without padding.
    Base64Url,
}

impl DigestEncoding {
    fn encode(self, digest: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(digest),
            Self::Base64 => BASE64_STANDARD.encode(digest),
            Self::Base64Url => BASE64_URL_SAFE_NO_PAD.encode(digest),
        }
    }
}

fn sign<M>(key: &[u8], message: &[u8]) -> Result<Vec<u8>>
where
    M: Mac + hmac::digest::KeyInit,
{
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|error| ApiError::invalid_argument(format!("Invalid HMAC key: {error}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verifies HMAC signatures carried in a request header.
///
/// The expected header value is `signature_template` with `{digest}`
/// replaced by the encoded HMAC of the canonical message, which defaults to
/// the raw body. Comparison is constant-time.
#[derive(Clone)]
pub struct HmacSignatureVerifier {
    secret_key: String,
    signature_header: String,
    algorithm: HashAlgorithm,
    encoding: DigestEncoding,
    signature_template: String,
    message_resolver: Option<MessageResolver>,
}

// Verify HmacSignatureVerifier is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HmacSignatureVerifier>();
};

impl fmt::Debug for HmacSignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSignatureVerifier")
            .field("secret_key", &"*****")
            .field("signature_header", &self.signature_header)
            .field("algorithm", &self.algorithm)
            .field("encoding", &self.encoding)
            .field("signature_template", &self.signature_template)
            .field("has_message_resolver", &self.message_resolver.is_some())
            .finish()
    }
}

impl HmacSignatureVerifier {
    /// Creates a SHA-256, hex-encoded verifier reading `signature_header`.
    #[must_use]
    pub fn new(secret_key: impl Into<String>, signature_header: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            signature_header: signature_header.into(),
            algorithm: HashAlgorithm::default(),
            encoding: DigestEncoding::default(),
            signature_template: "{digest}".to_string(),
            message_resolver: None,
        }
    }

    /// Sets the hash algorithm.
    #[must_use]
    pub const fn algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the digest encoding.
    #[must_use]
    pub const fn encoding(mut self, encoding: DigestEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the header template, for example `"sha256={digest}"`.
    #[must_use]
    pub fn signature_template(mut self, template: impl Into<String>) -> Self {
        self.signature_template = template.into();
        self
    }

    /// Sets how the signed message is built from the request.
    #[must_use]
    pub fn message_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&SignatureRequest) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.message_resolver = Some(Arc::new(resolver));
        self
    }

    /// Computes the header value expected for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] if the template lacks `{digest}`,
    /// and message-resolver errors unchanged.
    pub fn expected_signature(&self, request: &SignatureRequest) -> Result<String> {
        if !self.signature_template.contains("{digest}") {
            return Err(ApiError::invalid_argument(
                "Signature template must contain {digest}.",
            ));
        }

        let message = match &self.message_resolver {
            Some(resolver) => resolver(request)?,
            None => request.raw_body.clone(),
        };
        let key = self.secret_key.as_bytes();
        let digest = match self.algorithm {
            HashAlgorithm::Sha256 => sign::<Hmac<Sha256>>(key, &message)?,
            HashAlgorithm::Sha384 => sign::<Hmac<Sha384>>(key, &message)?,
            HashAlgorithm::Sha512 => sign::<Hmac<Sha512>>(key, &message)?,
        };
        Ok(self
            .signature_template
            .replace("{digest}", &self.encoding.encode(&digest)))
    }
}

impl SignatureVerifier for HmacSignatureVerifier {
    fn verify(&self, request: &SignatureRequest) -> SignatureVerificationResult {
        let Some(provided) = request.header_value(&self.signature_header) else {
            return SignatureVerificationResult::failure(format!(
                "Signature header '{}' is missing.",
                self.signature_header
            ));
        };

        let expected = match self.expected_signature(request) {
            Ok(expected) => expected,
            Err(error) => {
                tracing::warn!(error = %error, "Signature verification failed");
                return SignatureVerificationResult::failure(format!(
                    "Signature verification failed: {error}"
                ));
            }
        };

        if bool::from(expected.as_bytes().ct_eq(provided.trim().as_bytes())) {
            SignatureVerificationResult::success()
        } else {
            SignatureVerificationResult::failure("Signature mismatch.")
        }
    }
}
