use url::Url;

/// Places the client can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Entry point. Always forwards to sign-in.
    Home,
    SignIn,
    /// Where the provider hands back its access token.
    ProviderCallback,
    /// Intermediate "checking sessions" surface after sign-in.
    SessionCheck,
    /// Main protected destination.
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/sign-in",
            Route::ProviderCallback => crate::auth::provider::CALLBACK_PATH,
            Route::SessionCheck => "/auth-status",
            Route::Dashboard => "/dashboard",
        }
    }

    /// Routes that must pass the session guard before rendering.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::SessionCheck | Route::Dashboard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPurpose {
    /// Leave for the provider's sign-in page; resume at the callback route.
    Authorize,
    /// Leave for the provider's logout page; resume at `origin`.
    ProviderLogout,
}

/// A navigation that leaves the client.
///
/// Until the user comes back (a browser follows the redirect; the terminal
/// client shows the URL and waits) the flow is in a pending external
/// redirect state and nothing else is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRedirect {
    pub purpose: RedirectPurpose,
    pub url: Url,
}

/// Where an evaluation or action sends the user next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Replace the current route (no history entry).
    Replace(Route),
    External(ExternalRedirect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A message the user has to acknowledge before continuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_session_surfaces_are_protected() {
        assert!(Route::SessionCheck.is_protected());
        assert!(Route::Dashboard.is_protected());
        assert!(!Route::Home.is_protected());
        assert!(!Route::SignIn.is_protected());
        assert!(!Route::ProviderCallback.is_protected());
    }

    #[test]
    fn test_callback_route_matches_registered_address() {
        assert_eq!(Route::ProviderCallback.path(), "/auth0/callback");
    }
}
