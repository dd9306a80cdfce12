// UI layer: interactive prompts via `dialoguer` and a spinner via
// `indicatif` while the login round trip is in flight.

use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Auth, Credentials, Prompt};
use crate::error::MistError;
use crate::session::Session;

/// Prompts on the controlling terminal.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn email(&mut self) -> Result<String> {
        Input::new()
            .with_prompt("Email")
            .interact_text()
            .context("Reading email")
    }

    fn password(&mut self) -> Result<String> {
        // `Password` hides input in terminal.
        Password::new()
            .with_prompt("Password")
            .interact()
            .context("Reading password")
    }
}

/// Spinner on stderr. Hidden automatically when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Open a session for `creds`, logging in first when needed.
pub fn connect(creds: &Credentials) -> Result<Session, MistError> {
    match &creds.auth {
        Auth::Token(token) => Session::with_token(&creds.uri, token, creds.scheme.clone()),
        Auth::Login { email, password } => {
            let spinner = spinner("Logging in...");
            let session = Session::authenticate(&creds.uri, email, password, creds.scheme.clone());
            spinner.finish_and_clear();
            session
        }
    }
}
