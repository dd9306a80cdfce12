// Error type shared by the library and the binary. Every failure surfaces
// to the command layer unchanged; `main` only decides how to exit.

use thiserror::Error;

/// Exit code for a missing/invalid argument or an unknown resource name.
pub const EXIT_USAGE: i32 = 1;
/// Exit code when the server rejected a call or answered with garbage.
pub const EXIT_API_FAILURE: i32 = 3;
/// Exit code when the service could not be reached or refused our token.
pub const EXIT_TRANSPORT_OR_AUTH_FAILURE: i32 = 4;

#[derive(Debug, Error)]
pub enum MistError {
    /// Bad credentials or a token the server no longer accepts.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network or connection failure inside the HTTP transport.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// The response body was not the JSON we expected.
    #[error("could not parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),

    /// A name given on the command line is not in the fetched listing.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error("prompt failed: {0:#}")]
    Prompt(anyhow::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl MistError {
    pub fn usage(msg: impl Into<String>) -> Self {
        MistError::Usage(msg.into())
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        MistError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            MistError::Usage(_)
            | MistError::NotFound { .. }
            | MistError::Config(_)
            | MistError::Prompt(_)
            | MistError::Io(_) => EXIT_USAGE,
            MistError::Server { .. } | MistError::Parse(_) => EXIT_API_FAILURE,
            MistError::Auth(_) | MistError::Transport(_) => EXIT_TRANSPORT_OR_AUTH_FAILURE,
        }
    }
}
