//! Keyboard input handling for the TUI.
//!
//! This module handles keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use seatguard_core::guard::{ExternalRedirect, RedirectPurpose};

use crate::app::{can_add_callback_char, can_add_email_char, can_add_password_char, App, LoginFocus, Screen};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // A notice blocks everything until acknowledged
    if app.notice.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_notice();
        }
        return Ok(false);
    }

    match app.screen.clone() {
        Screen::SignIn => handle_sign_in_input(app, key).await,
        Screen::PendingRedirect(ExternalRedirect {
            purpose: RedirectPurpose::Authorize,
            ..
        }) => handle_callback_input(app, key).await,
        Screen::PendingRedirect(_) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                app.finish_redirect();
            }
            Ok(false)
        }
        Screen::Checking(_) => Ok(handle_quit_key(app, key)),
        Screen::Chooser { .. } => handle_chooser_input(app, key).await,
        Screen::Dashboard { .. } => handle_dashboard_input(app, key).await,
        Screen::Quitting => Ok(true),
    }
}

fn handle_quit_key(app: &mut App, key: KeyEvent) -> bool {
    if matches!(key.code, KeyCode::Char('q')) {
        app.quit();
        return true;
    }
    false
}

async fn handle_sign_in_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on sign-in screen
            app.quit();
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::LoginButton => app.attempt_login().await,
            LoginFocus::ProviderButton => app.start_provider_sign_in(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::LoginButton | LoginFocus::ProviderButton => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            // Ignore character input on buttons
            LoginFocus::LoginButton | LoginFocus::ProviderButton => {}
        },
        _ => {}
    }
    Ok(false)
}

async fn handle_callback_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.finish_redirect(),
        KeyCode::Enter => {
            if !app.callback_input.is_empty() {
                app.complete_provider_callback().await;
            }
        }
        KeyCode::Backspace => {
            app.callback_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_callback_char(app.callback_input.len(), c) {
                app.callback_input.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_chooser_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('f') | KeyCode::Char('F') => app.continue_here().await,
        KeyCode::Char('s') | KeyCode::Char('S') => app.sign_out().await,
        _ => return Ok(handle_quit_key(app, key)),
    }
    Ok(false)
}

async fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => app.recheck(),
        KeyCode::Char('l') | KeyCode::Char('L') => app.sign_out().await,
        _ => return Ok(handle_quit_key(app, key)),
    }
    Ok(false)
}
