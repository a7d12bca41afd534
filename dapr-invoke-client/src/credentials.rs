//! API token providers.
//!
//! The client asks its [`ApiTokenProvider`] for a token on every call and, when
//! one is returned, sends it in the `dapr-api-token` header.
//!
//! # Example
//!
//! ```ignore
//! use dapr_invoke_client::{InvokeClient, StaticApiToken};
//!
//! let client = InvokeClient::builder(transport)
//!     .api_token(StaticApiToken::new("secret"))
//!     .build();
//! ```

use std::borrow::Cow;

use dapr_invoke_core::API_TOKEN_ENV;

/// Source of the sidecar API token.
pub trait ApiTokenProvider: Send + Sync + 'static {
    /// The token to send with the next call, if any.
    fn api_token(&self) -> Option<String>;
}

/// Reads the token from an environment variable on every call.
///
/// Defaults to `DAPR_API_TOKEN`. An unset or empty variable yields no token.
#[derive(Debug, Clone)]
pub struct EnvApiToken {
    var: Cow<'static, str>,
}

impl EnvApiToken {
    /// Read from `DAPR_API_TOKEN`.
    pub fn new() -> Self {
        Self {
            var: Cow::Borrowed(API_TOKEN_ENV),
        }
    }

    /// Read from a custom variable.
    pub fn from_var<S: Into<Cow<'static, str>>>(var: S) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable consulted.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvApiToken {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiTokenProvider for EnvApiToken {
    fn api_token(&self) -> Option<String> {
        std::env::var(self.var.as_ref())
            .ok()
            .filter(|token| !token.is_empty())
    }
}

/// A fixed token.
#[derive(Clone)]
pub struct StaticApiToken(String);

impl StaticApiToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticApiToken").field(&"<redacted>").finish()
    }
}

impl ApiTokenProvider for StaticApiToken {
    fn api_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Never sends a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoApiToken;

impl ApiTokenProvider for NoApiToken {
    fn api_token(&self) -> Option<String> {
        None
    }
}
