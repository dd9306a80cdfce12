// Library root
// -----------
// This crate exposes the library surface behind the `mist` binary. The
// binary (`main.rs`) parses arguments, resolves credentials and hands the
// resulting session to `commands::dispatch`.
//
// Module responsibilities:
// - `api`: HTTP requests with the API token attached.
// - `cache`: lazily-filled caches with explicit invalidation.
// - `model`: backends, machines, keys and tunnels built from server JSON.
// - `session`: login, owned caches and collection-level calls.
// - `config`: config file, overrides and credential resolution.
// - `cli` / `commands` / `output`: argument parsing, action handlers and
//   table rendering.
// - `ui`: terminal prompts and the login spinner.
pub mod api;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod session;
pub mod ui;

pub use api::{ApiClient, ApiResponse, AuthScheme};
pub use error::MistError;
pub use session::Session;
