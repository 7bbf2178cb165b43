use serde::{Deserialize, Serialize};
use url::Url;

use super::AuthError;

/// Path of the callback address registered with the provider.
pub const CALLBACK_PATH: &str = "/auth0/callback";

/// Scopes requested on every authorization redirect.
const AUTHORIZE_SCOPE: &str = "openid profile email";

pub const DEFAULT_PROVIDER_DOMAIN: &str = "dev-vvpprnrqxtn7bxnb.jp.auth0.com";
pub const DEFAULT_PROVIDER_AUDIENCE: &str = "https://dev-vvpprnrqxtn7bxnb.jp.auth0.com/api/v2/";

/// Identity provider tenant settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub domain: String,
    pub client_id: String,
    pub audience: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_PROVIDER_DOMAIN.to_string(),
            client_id: String::new(),
            audience: DEFAULT_PROVIDER_AUDIENCE.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Authorization redirect that returns an access token in the fragment
    /// of `{origin}/auth0/callback`.
    pub fn authorize_url(&self, origin: &str) -> Result<Url, AuthError> {
        let redirect_uri = callback_address(origin)?;
        let base = format!("https://{}/authorize", self.domain);
        Ok(Url::parse_with_params(
            &base,
            &[
                ("response_type", "token"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("scope", AUTHORIZE_SCOPE),
                ("audience", self.audience.as_str()),
            ],
        )?)
    }

    /// Provider logout redirect, or `None` when the tenant is not fully
    /// configured.
    pub fn logout_url(&self, return_to: &str) -> Result<Option<Url>, AuthError> {
        if self.domain.is_empty() || self.client_id.is_empty() {
            return Ok(None);
        }
        let base = format!("https://{}/v2/logout", self.domain);
        let url = Url::parse_with_params(
            &base,
            &[("client_id", self.client_id.as_str()), ("returnTo", return_to)],
        )?;
        Ok(Some(url))
    }
}

/// The callback address for an application origin.
pub fn callback_address(origin: &str) -> Result<Url, AuthError> {
    Ok(Url::parse(origin)?.join(CALLBACK_PATH)?)
}
