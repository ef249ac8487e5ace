//! Authentication.
//!
//! # Overview
//!
//! - [`Authentication`]: the requirement tree an endpoint declares
//!   (single participants combined with AND/OR groups)
//! - [`MappedAuthentication`]: the tree resolved against configured managers
//! - [`AuthManager`]: the trait every credential implements
//! - [`HeaderAuth`] / [`QueryAuth`]: credentials sent as headers or query
//!   parameters
//!
//! # Example
//!
//! ```rust
//! use apimatic_core::auth::{AuthManager, AuthManagers, Authentication, HeaderAuth};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let mut managers: AuthManagers = HashMap::new();
//! let bearer: Arc<dyn AuthManager> = Arc::new(HeaderAuth::bearer(Some("token")));
//! managers.insert("bearer".to_string(), Some(bearer));
//!
//! let validation = Authentication::single("bearer")
//!     .with_auth_managers(&managers)?
//!     .validate()?;
//! assert!(validation.is_valid);
//! # Ok::<(), apimatic_core::ApiError>(())
//! ```

mod authentication;
mod header_auth;
mod query_auth;

use std::collections::HashMap;

pub use authentication::{
    AuthManager, AuthManagers, AuthValidation, Authentication, MappedAuthentication,
};
pub use header_auth::HeaderAuth;
pub use query_auth::QueryAuth;

/// Returns `true` if there is at least one entry and none is missing or blank.
pub(crate) fn params_are_valid(params: &HashMap<String, Option<String>>) -> bool {
    !params.is_empty()
        && params
            .values()
            .all(|value| value.as_deref().is_some_and(|value| !value.trim().is_empty()))
}
