//! Composable authentication requirements.
//!
//! An endpoint declares its requirement as an [`Authentication`] tree of
//! participant names combined with AND/OR groups. Before a request is sent
//! the tree is resolved against the configured [`AuthManagers`], validated,
//! and applied.
//!
//! Validation is a pure function of the mapped tree: every call to
//! [`MappedAuthentication::validate`] recomputes the result and returns a
//! fresh [`AuthValidation`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::clients::HttpRequest;
use crate::error::{ApiError, Result};

/// A configured credential that can authorize requests.
pub trait AuthManager: Send + Sync {
    /// Returns `true` if the credential is complete.
    fn is_valid(&self) -> bool;

    /// Describes why the credential is incomplete.
    fn error_message(&self) -> String;

    /// Adds the credential to `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be updated.
    fn apply(&self, request: &mut HttpRequest) -> Result<()>;
}

/// Auth managers by participant name. A `None` entry is a configured name
/// without a manager and fails validation.
pub type AuthManagers = HashMap<String, Option<Arc<dyn AuthManager>>>;

/// An authentication requirement tree.
///
/// # Example
///
/// ```rust
/// use apimatic_core::auth::Authentication;
///
/// // Either an API key, or both an app id and a bearer token.
/// let auth = Authentication::or([
///     Authentication::single("api_key"),
///     Authentication::and(["app_id", "bearer"]),
/// ]);
/// assert!(matches!(auth, Authentication::Or(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication {
    /// A single named participant.
    Single(String),
    /// Every child must be valid.
    And(Vec<Authentication>),
    /// At least one child must be valid.
    Or(Vec<Authentication>),
}

impl Authentication {
    /// A single participant.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self::Single(name.into())
    }

    /// An AND group. Strings are wrapped as [`Authentication::Single`].
    #[must_use]
    pub fn and<I, A>(children: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Self>,
    {
        Self::And(children.into_iter().map(Into::into).collect())
    }

    /// An OR group. Strings are wrapped as [`Authentication::Single`].
    #[must_use]
    pub fn or<I, A>(children: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Self>,
    {
        Self::Or(children.into_iter().map(Into::into).collect())
    }

    /// Resolves every participant against `managers`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] with `"Auth key is invalid."` if
    /// a participant name is not present in `managers`.
    pub fn with_auth_managers(&self, managers: &AuthManagers) -> Result<MappedAuthentication> {
        match self {
            Self::Single(name) => {
                let manager = managers
                    .get(name)
                    .ok_or_else(|| ApiError::invalid_argument("Auth key is invalid."))?;
                Ok(MappedAuthentication::Single {
                    name: name.clone(),
                    manager: manager.clone(),
                })
            }
            Self::And(children) => Ok(MappedAuthentication::And(
                children
                    .iter()
                    .map(|child| child.with_auth_managers(managers))
                    .collect::<Result<_>>()?,
            )),
            Self::Or(children) => Ok(MappedAuthentication::Or(
                children
                    .iter()
                    .map(|child| child.with_auth_managers(managers))
                    .collect::<Result<_>>()?,
            )),
        }
    }
}

impl From<&str> for Authentication {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for Authentication {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

/// The outcome of validating an authentication tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthValidation {
    /// Whether the tree is satisfied.
    pub is_valid: bool,
    /// The joined error message of the failing participants.
    pub error_message: Option<String>,
}

/// An [`Authentication`] tree with resolved managers.
#[derive(Clone)]
pub enum MappedAuthentication {
    /// A resolved participant.
    Single {
        /// The participant name.
        name: String,
        /// The configured manager, if any.
        manager: Option<Arc<dyn AuthManager>>,
    },
    /// A resolved AND group.
    And(Vec<MappedAuthentication>),
    /// A resolved OR group.
    Or(Vec<MappedAuthentication>),
}

impl MappedAuthentication {
    /// Validates the tree.
    ///
    /// A single participant reports its manager's message wrapped in
    /// brackets. AND evaluates every child and joins all failures with
    /// `" and "`. OR is valid when any child is; otherwise its failures are
    /// joined with `" or "`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] if a participant has no manager.
    pub fn validate(&self) -> Result<AuthValidation> {
        match self {
            Self::Single { manager, .. } => {
                let manager = manager.as_ref().ok_or_else(|| {
                    ApiError::invalid_argument("The auth manager entry must not have a nil value.")
                })?;
                if manager.is_valid() {
                    Ok(AuthValidation {
                        is_valid: true,
                        error_message: None,
                    })
                } else {
                    Ok(AuthValidation {
                        is_valid: false,
                        error_message: Some(format!("[{}]", manager.error_message())),
                    })
                }
            }
            Self::And(children) => {
                let mut is_valid = true;
                let mut messages = Vec::new();
                for child in children {
                    let validation = child.validate()?;
                    if !validation.is_valid {
                        is_valid = false;
                        messages.extend(validation.error_message);
                    }
                }
                Ok(AuthValidation {
                    is_valid,
                    error_message: join_messages(&messages, " and "),
                })
            }
            Self::Or(children) => {
                let mut is_valid = false;
                let mut messages = Vec::new();
                for child in children {
                    let validation = child.validate()?;
                    if validation.is_valid {
                        is_valid = true;
                    } else {
                        messages.extend(validation.error_message);
                    }
                }
                Ok(AuthValidation {
                    is_valid,
                    error_message: if is_valid {
                        None
                    } else {
                        join_messages(&messages, " or ")
                    },
                })
            }
        }
    }

    /// Applies every valid participant to `request`.
    ///
    /// Invalid participants and invalid sub-groups are skipped.
    ///
    /// # Errors
    ///
    /// Propagates errors raised by the managers.
    pub fn apply(&self, request: &mut HttpRequest) -> Result<()> {
        match self {
            Self::Single {
                manager: Some(manager),
                ..
            } if manager.is_valid() => manager.apply(request),
            Self::Single { .. } => Ok(()),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    if child.validate().map_or(false, |validation| validation.is_valid) {
                        child.apply(request)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for MappedAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { name, manager } => f
                .debug_struct("Single")
                .field("name", name)
                .field("has_manager", &manager.is_some())
                .finish(),
            Self::And(children) => f.debug_tuple("And").field(children).finish(),
            Self::Or(children) => f.debug_tuple("Or").field(children).finish(),
        }
    }
}

fn join_messages(messages: &[String], separator: &str) -> Option<String> {
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;

    struct StaticManager {
        valid: bool,
        message: &'static str,
        header: &'static str,
    }

    impl AuthManager for StaticManager {
        fn is_valid(&self) -> bool {
            self.valid
        }

        fn error_message(&self) -> String {
            self.message.to_string()
        }

        fn apply(&self, request: &mut HttpRequest) -> Result<()> {
            request.add_header(self.header, "applied");
            Ok(())
        }
    }

    fn managers() -> AuthManagers {
        let mut managers: AuthManagers = HashMap::new();
        managers.insert(
            "a".to_string(),
            Some(Arc::new(StaticManager {
                valid: true,
                message: "a is missing",
                header: "x-a",
            })),
        );
        managers.insert(
            "b".to_string(),
            Some(Arc::new(StaticManager {
                valid: false,
                message: "b is missing",
                header: "x-b",
            })),
        );
        managers.insert(
            "c".to_string(),
            Some(Arc::new(StaticManager {
                valid: false,
                message: "c is missing",
                header: "x-c",
            })),
        );
        managers.insert("nil".to_string(), None);
        managers
    }

    fn validate(auth: &Authentication) -> AuthValidation {
        auth.with_auth_managers(&managers()).unwrap().validate().unwrap()
    }

    #[test]
    fn test_unknown_participant_is_rejected() {
        let error = Authentication::single("missing_key")
            .with_auth_managers(&HashMap::new())
            .unwrap_err();
        assert!(matches!(error, ApiError::InvalidArgument { .. }));
        assert_eq!(error.to_string(), "Auth key is invalid.");
    }

    #[test]
    fn test_nil_manager_fails_validation() {
        let mapped = Authentication::single("nil")
            .with_auth_managers(&managers())
            .unwrap();
        let error = mapped.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "The auth manager entry must not have a nil value."
        );
    }

    #[test]
    fn test_and_requires_every_child() {
        let validation = validate(&Authentication::and(["a", "b"]));
        assert!(!validation.is_valid);
        assert_eq!(validation.error_message.as_deref(), Some("[b is missing]"));

        let validation = validate(&Authentication::and(["b", "c"]));
        assert_eq!(
            validation.error_message.as_deref(),
            Some("[b is missing] and [c is missing]")
        );
    }

    #[test]
    fn test_or_requires_any_child() {
        let validation = validate(&Authentication::or(["a", "b"]));
        assert!(validation.is_valid);
        assert!(validation.error_message.is_none());

        let validation = validate(&Authentication::or(["b", "c"]));
        assert!(!validation.is_valid);
        assert_eq!(
            validation.error_message.as_deref(),
            Some("[b is missing] or [c is missing]")
        );
    }

    #[test]
    fn test_nested_groups() {
        let auth = Authentication::or([
            Authentication::and(["a", "b"]),
            Authentication::single("c"),
        ]);
        let validation = validate(&auth);
        assert!(!validation.is_valid);
        assert_eq!(
            validation.error_message.as_deref(),
            Some("[b is missing] or [c is missing]")
        );

        let auth = Authentication::and([Authentication::or(["b", "a"]), "a".into()]);
        assert!(validate(&auth).is_valid);
    }

    #[test]
    fn test_validation_is_repeatable() {
        let mapped = Authentication::and(["a", "b"])
            .with_auth_managers(&managers())
            .unwrap();
        let first = mapped.validate().unwrap();
        let second = mapped.validate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_apply_skips_invalid_participants() {
        let mapped = Authentication::or([
            Authentication::single("a"),
            Authentication::and(["a", "b"]),
        ])
        .with_auth_managers(&managers())
        .unwrap();

        let mut request = HttpRequest::new(
            HttpMethod::Get,
            "https://example.com",
            HashMap::new(),
            None,
            HashMap::new(),
        );
        mapped.apply(&mut request).unwrap();

        assert_eq!(request.headers.get("x-a").map(String::as_str), Some("applied"));
        assert!(request.headers.get("x-b").is_none());
    }
}
