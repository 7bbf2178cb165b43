use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::api::SessionBackend;
use crate::cache::CredentialCache;
use crate::guard::{ExternalRedirect, Navigation, Notice, RedirectPurpose, Route};
use crate::models::{Identity, LoginResponse};

use super::{AuthError, AuthResult, ProviderConfig};

const PROVIDER_LOGIN_FAILED: &str = "Auth0 login failed";
const PASSWORD_LOGIN_FAILED: &str = "Login failed";

/// Access token issued by the identity provider.
///
/// Only ever handed to the backend exchange. Not serializable and redacted
/// in `Debug`.
pub struct AccessToken(String);

impl AccessToken {
    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// The parsed fragment of a provider callback address.
#[derive(Debug, Default)]
pub struct CallbackFragment {
    access_token: Option<AccessToken>,
    error: Option<String>,
    error_description: Option<String>,
}

impl CallbackFragment {
    /// Parse a full callback address, a `#...` fragment or a bare fragment.
    ///
    /// Query strings are ignored; the provider only ever answers in the
    /// fragment.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let fragment = match Url::parse(input) {
            Ok(url) => url.fragment().unwrap_or_default().to_string(),
            Err(_) => input.trim_start_matches('#').to_string(),
        };

        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "access_token" => parsed.access_token = Some(AccessToken(value.into_owned())),
                "error" => parsed.error = Some(value.into_owned()),
                "error_description" => parsed.error_description = Some(value.into_owned()),
                _ => {}
            }
        }
        parsed
    }

    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    fn provider_error(&self) -> Option<String> {
        match (&self.error, &self.error_description) {
            (_, Some(description)) => Some(description.clone()),
            (Some(error), None) => Some(error.clone()),
            (None, None) => None,
        }
    }
}

/// How a sign-in attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn {
        identity: Identity,
        navigation: Navigation,
    },
    Rejected {
        notice: Option<Notice>,
        navigation: Navigation,
    },
}

impl SignInOutcome {
    fn signed_in(identity: Identity) -> Self {
        SignInOutcome::SignedIn {
            identity,
            navigation: Navigation::Replace(Route::SessionCheck),
        }
    }

    fn rejected(notice: Option<Notice>) -> Self {
        SignInOutcome::Rejected {
            notice,
            navigation: Navigation::Replace(Route::SignIn),
        }
    }

    pub fn navigation(&self) -> &Navigation {
        match self {
            SignInOutcome::SignedIn { navigation, .. } | SignInOutcome::Rejected { navigation, .. } => navigation,
        }
    }
}

/// Establishes a session for this tab.
#[derive(Clone)]
pub struct SignInFlow {
    backend: Arc<dyn SessionBackend>,
    cache: CredentialCache,
    provider: ProviderConfig,
    origin: String,
}

impl SignInFlow {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        cache: CredentialCache,
        provider: ProviderConfig,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            cache,
            provider,
            origin: origin.into(),
        }
    }

    /// Redirect to the provider's sign-in page.
    pub fn authorize_redirect(&self) -> AuthResult<ExternalRedirect> {
        Ok(ExternalRedirect {
            purpose: RedirectPurpose::Authorize,
            url: self.provider.authorize_url(&self.origin)?,
        })
    }

    /// Exchange the provider's access token for a backend session.
    pub async fn complete_provider_callback(&self, fragment: CallbackFragment) -> SignInOutcome {
        if let Some(reason) = fragment.provider_error() {
            warn!(reason = %reason, "Provider returned an error to the callback");
            return SignInOutcome::rejected(Some(Notice::error(format!("Auth0 sign-in failed: {reason}"))));
        }

        let Some(token) = fragment.access_token else {
            debug!("Callback carried no access token");
            return SignInOutcome::rejected(None);
        };

        match self.backend.exchange_provider_token(token.expose()).await {
            Ok(response) => self.establish(response),
            Err(e) => {
                let e = AuthError::from(e);
                warn!(error = %e, "Provider token exchange failed");
                SignInOutcome::rejected(Some(Notice::error(e.user_message(PROVIDER_LOGIN_FAILED))))
            }
        }
    }

    /// Sign in with an email and password.
    pub async fn login_with_password(&self, email: &str, password: &str) -> SignInOutcome {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return SignInOutcome::rejected(Some(Notice::error("Email and password are required")));
        }

        match self.backend.login_with_password(email, password).await {
            Ok(response) => self.establish(response),
            Err(e) => {
                let e = AuthError::from(e);
                warn!(error = %e, "Password login failed");
                SignInOutcome::rejected(Some(Notice::error(e.user_message(PASSWORD_LOGIN_FAILED))))
            }
        }
    }

    fn establish(&self, response: LoginResponse) -> SignInOutcome {
        if response.token.is_empty() {
            warn!("Backend issued an empty credential");
            return SignInOutcome::rejected(Some(Notice::error(PROVIDER_LOGIN_FAILED)));
        }
        self.cache.store_session(&response.token, &response.user);
        info!(identity_id = %response.user.id, "Signed in");
        SignInOutcome::signed_in(response.user)
    }
}
