//! Application state management for seatguard.
//!
//! This module contains the `App` struct that owns the credential cache, the
//! sign-in flow and the session guard, and drives which screen is shown.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use seatguard_core::api::{ApiClient, SessionBackend};
use seatguard_core::auth::{
    CallbackFragment, IdentityResolver, SessionActions, SessionCounter, SignInFlow, SignInOutcome,
};
use seatguard_core::cache::CredentialCache;
use seatguard_core::config::Config;
use seatguard_core::guard::{
    ExternalRedirect, GuardOutcome, GuardState, Liveness, Navigation, Notice, RedirectPurpose, Route,
    SessionGuard, Surface,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the guard result channel.
/// At most one evaluation is live at a time; the rest are stale and dropped.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for email input.
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Pasted callback addresses carry a full access token.
const MAX_CALLBACK_LENGTH: usize = 8192;

// ============================================================================
// UI State Types
// ============================================================================

/// What the terminal currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    SignIn,
    /// Waiting for the user to come back from the provider
    PendingRedirect(ExternalRedirect),
    /// Guard evaluation running for a protected surface
    Checking(Surface),
    /// Session limit reached on `surface`
    Chooser { surface: Surface, state: GuardState },
    Dashboard {
        state: GuardState,
        checked_at: DateTime<Utc>,
    },
    Quitting,
}

/// Sign-in form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    LoginButton,
    ProviderButton,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::LoginButton,
            LoginFocus::LoginButton => LoginFocus::ProviderButton,
            LoginFocus::ProviderButton => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::ProviderButton,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::LoginButton => LoginFocus::Password,
            LoginFocus::ProviderButton => LoginFocus::LoginButton,
        }
    }
}

/// A finished guard evaluation, sent back from its task.
struct GuardMessage {
    surface: Surface,
    outcome: GuardOutcome,
    liveness: Liveness,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    cache: CredentialCache,
    signin: SignInFlow,
    guard: SessionGuard,

    pub screen: Screen,

    // Sign-in form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,

    /// Callback address pasted back from the browser
    pub callback_input: String,

    /// Blocking message; input is swallowed until it is dismissed
    pub notice: Option<Notice>,

    pub status_message: Option<String>,

    /// Liveness of the surface currently mounted, if it is protected
    surface_liveness: Option<Liveness>,

    guard_rx: mpsc::Receiver<GuardMessage>,
    guard_tx: mpsc::Sender<GuardMessage>,
}

impl App {
    /// Create a new application instance talking to `config.api_url`
    pub fn new(config: Config) -> Result<Self> {
        let backend: Arc<dyn SessionBackend> = Arc::new(ApiClient::new(&config.api_url)?);
        debug!(api_url = %config.api_url, "Backend client configured");
        Ok(Self::with_backend(config, backend, CredentialCache::in_memory()))
    }

    pub fn with_backend(config: Config, backend: Arc<dyn SessionBackend>, cache: CredentialCache) -> Self {
        let signin = SignInFlow::new(backend.clone(), cache.clone(), config.provider.clone(), config.origin.clone());
        let actions = SessionActions::new(backend.clone(), cache.clone(), config.provider.clone(), config.origin.clone());
        let guard = SessionGuard::new(
            IdentityResolver::new(backend.clone(), cache.clone()),
            SessionCounter::new(backend),
            actions,
        )
        .with_verification(config.verify_after_force_logout);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Pre-fill from env for development convenience
        let login_email = std::env::var("SEATGUARD_EMAIL").unwrap_or_default();

        Self {
            config,
            cache,
            signin,
            guard,
            screen: Screen::SignIn,
            login_email,
            login_password: String::new(),
            login_focus: LoginFocus::Email,
            callback_input: String::new(),
            notice: None,
            status_message: None,
            surface_liveness: None,
            guard_rx: rx,
            guard_tx: tx,
        }
    }

    /// Enter the client at its home route
    pub fn start(&mut self) {
        self.navigate(Route::Home);
    }

    /// Tear down the tab. The credential cache is emptied.
    pub fn close(self) {
        if let Some(liveness) = &self.surface_liveness {
            liveness.tear_down();
        }
        self.cache.close();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn apply_navigation(&mut self, navigation: Navigation) {
        match navigation {
            Navigation::Replace(route) => self.navigate(route),
            Navigation::External(redirect) => {
                self.tear_down_surface();
                info!(purpose = ?redirect.purpose, "Waiting on external redirect");
                self.screen = Screen::PendingRedirect(redirect);
            }
        }
    }

    /// Replace the current route
    pub fn navigate(&mut self, route: Route) {
        self.tear_down_surface();
        debug!(path = route.path(), "Navigating");

        match route {
            Route::Home | Route::SignIn => self.show_sign_in(),
            // The callback is entered by pasting it while the authorize
            // redirect is pending
            Route::ProviderCallback => self.start_provider_sign_in(),
            Route::SessionCheck | Route::Dashboard => {
                if let Some(surface) = Surface::for_route(route) {
                    self.load_surface(surface);
                }
            }
        }
    }

    fn tear_down_surface(&mut self) {
        if let Some(liveness) = self.surface_liveness.take() {
            liveness.tear_down();
        }
    }

    fn show_sign_in(&mut self) {
        self.login_password.clear();
        self.callback_input.clear();
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.screen = Screen::SignIn;
    }

    /// Mount a protected surface and evaluate the guard for it in the
    /// background
    fn load_surface(&mut self, surface: Surface) {
        let liveness = Liveness::mounted();
        self.surface_liveness = Some(liveness.clone());
        self.screen = Screen::Checking(surface);

        let guard = self.guard.clone();
        let tx = self.guard_tx.clone();
        tokio::spawn(async move {
            if let Some(outcome) = guard.evaluate(surface, &liveness).await {
                let message = GuardMessage {
                    surface,
                    outcome,
                    liveness,
                };
                if tx.send(message).await.is_err() {
                    debug!("Guard result receiver dropped");
                }
            }
        });
    }

    /// Apply finished guard evaluations whose surface is still mounted
    pub fn check_background_tasks(&mut self) {
        while let Ok(message) = self.guard_rx.try_recv() {
            if !message.liveness.is_live() {
                debug!(surface = ?message.surface, "Dropping result for torn down surface");
                continue;
            }
            self.apply_outcome(message.surface, message.outcome);
        }
    }

    fn apply_outcome(&mut self, surface: Surface, outcome: GuardOutcome) {
        if let Some(navigation) = outcome.navigation {
            self.apply_navigation(navigation);
            return;
        }

        match outcome.state {
            GuardState::Unauthenticated => self.navigate(Route::SignIn),
            state @ GuardState::OverLimit { .. } => {
                self.screen = Screen::Chooser { surface, state };
            }
            state @ GuardState::WithinLimit { .. } => {
                self.screen = Screen::Dashboard {
                    state,
                    checked_at: outcome.evaluated_at,
                };
            }
        }
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    /// Show the provider's authorize address and wait for the callback
    pub fn start_provider_sign_in(&mut self) {
        if self.config.provider.client_id.is_empty() {
            self.notice = Some(Notice::error("Auth0 sign-in is not configured (set SEATGUARD_AUTH0_CLIENT_ID)"));
            self.show_sign_in();
            return;
        }
        match self.signin.authorize_redirect() {
            Ok(redirect) => {
                self.callback_input.clear();
                self.apply_navigation(Navigation::External(redirect));
            }
            Err(e) => {
                warn!(error = %e, "Could not build authorize address");
                self.notice = Some(Notice::error(e.user_message("Auth0 sign-in is misconfigured")));
            }
        }
    }

    /// Finish provider sign-in with the pasted callback address
    pub async fn complete_provider_callback(&mut self) {
        let fragment = CallbackFragment::parse(&std::mem::take(&mut self.callback_input));
        let outcome = self.signin.complete_provider_callback(fragment).await;
        self.apply_sign_in(outcome);
    }

    /// Attempt login with the credentials from the sign-in form
    pub async fn attempt_login(&mut self) {
        let email = self.login_email.clone();
        let password = std::mem::take(&mut self.login_password);
        let outcome = self.signin.login_with_password(&email, &password).await;
        self.apply_sign_in(outcome);
    }

    fn apply_sign_in(&mut self, outcome: SignInOutcome) {
        match outcome {
            SignInOutcome::SignedIn { identity, navigation } => {
                self.status_message = Some(format!("Signed in as {}", identity.display_name()));
                self.apply_navigation(navigation);
            }
            SignInOutcome::Rejected { notice, navigation } => {
                self.notice = notice;
                self.apply_navigation(navigation);
            }
        }
    }

    /// The user is back from the provider logout page
    pub fn finish_redirect(&mut self) {
        let purpose = match &self.screen {
            Screen::PendingRedirect(redirect) => redirect.purpose,
            _ => return,
        };
        match purpose {
            RedirectPurpose::ProviderLogout => self.navigate(Route::Home),
            RedirectPurpose::Authorize => self.navigate(Route::SignIn),
        }
    }

    // =========================================================================
    // Session actions
    // =========================================================================

    /// Force-logout the other sessions and continue on this device
    pub async fn continue_here(&mut self) {
        let Screen::Chooser { state, .. } = &self.screen else {
            return;
        };
        let continued = self.guard.continue_here(state.clone()).await;
        self.notice = continued.notice;

        if continued.state.allows_content() {
            self.status_message = Some("Other sessions logged out".to_string());
            self.screen = Screen::Dashboard {
                state: continued.state,
                checked_at: Utc::now(),
            };
        }
    }

    /// Sign this tab out, then follow the provider logout if there is one
    pub async fn sign_out(&mut self) {
        self.tear_down_surface();
        let redirect = self.guard.actions().logout_current().await;
        self.status_message = Some("Signed out".to_string());
        match redirect {
            Some(redirect) => self.apply_navigation(Navigation::External(redirect)),
            None => self.navigate(Route::SignIn),
        }
    }

    /// Re-run the guard for the dashboard
    pub fn recheck(&mut self) {
        self.status_message = None;
        self.navigate(Route::Dashboard);
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn quit(&mut self) {
        self.tear_down_surface();
        self.screen = Screen::Quitting;
    }
}

// ============================================================================
// Display helpers
// ============================================================================

/// Human-readable age of a guard evaluation
pub fn age_display(checked_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - checked_at).num_seconds();
    if seconds < 5 {
        "just now".to_string()
    } else if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else {
        format!("{}h ago", seconds / 3600)
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_callback_char(current_len: usize, c: char) -> bool {
    current_len < MAX_CALLBACK_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

// ============================================================================
// Tests
// ============================================================================
