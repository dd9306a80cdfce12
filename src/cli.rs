//! Command-line argument parsing with clap.
//!
//! Commands read as `mist <verb> <noun> [flags]`. The verb/noun pair is
//! decoded once into [`Command`] and matched exhaustively by the dispatcher.
//! Flags the handlers insist on are optional here so a missing one is
//! reported as a usage error by the handler itself.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::api::AuthScheme;

/// Command-line client for the mist.io cloud management service.
#[derive(Parser, Debug)]
#[command(name = "mist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URI of the service [default: https://mist.io]
    #[arg(long, env = "MIST_URI", global = true)]
    pub uri: Option<String>,

    /// Account email used to log in
    #[arg(long, env = "MIST_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password used to log in
    #[arg(long, env = "MIST_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Existing API token; skips the login call
    #[arg(long, env = "MIST_API_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// How the token is sent: bearer, header:<name> or query:<param>
    #[arg(long, env = "MIST_AUTH_SCHEME", global = true)]
    pub auth_scheme: Option<AuthScheme>,

    /// Load config from this path [default: ~/.mist]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List resources
    #[command(visible_alias = "ls")]
    List {
        #[command(subcommand)]
        target: ListTarget,
    },

    /// Add a resource
    #[command(visible_alias = "create")]
    Add {
        #[command(subcommand)]
        target: AddTarget,
    },

    /// Delete a resource
    #[command(visible_aliases = ["remove", "rm", "del"])]
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },

    /// Rename a backend or key
    Rename {
        #[command(subcommand)]
        target: RenameTarget,
    },

    /// Enable a backend
    Enable {
        #[command(subcommand)]
        target: BackendTarget,
    },

    /// Disable a backend
    Disable {
        #[command(subcommand)]
        target: BackendTarget,
    },

    /// Replace a tunnel's settings
    Edit {
        #[command(subcommand)]
        target: EditTarget,
    },

    /// Make a key the default one
    Default {
        #[command(subcommand)]
        target: KeyTarget,
    },

    /// Print key material
    Show {
        #[command(subcommand)]
        target: ShowTarget,
    },

    /// Start a machine
    Start {
        #[command(subcommand)]
        target: MachineTarget,
    },

    /// Stop a machine
    Stop {
        #[command(subcommand)]
        target: MachineTarget,
    },

    /// Reboot a machine
    Reboot {
        #[command(subcommand)]
        target: MachineTarget,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct PrettyArg {
    /// Render a boxed table with a header
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BackendArg {
    /// Backend id or title
    #[arg(long, short = 'b')]
    pub backend: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListTarget {
    Backends(PrettyArg),
    Machines {
        #[command(flatten)]
        backend: BackendArg,
        #[command(flatten)]
        pretty: PrettyArg,
    },
    Keys(PrettyArg),
    Tunnels(PrettyArg),
    Sizes {
        #[command(flatten)]
        backend: BackendArg,
        #[command(flatten)]
        pretty: PrettyArg,
    },
    Locations {
        #[command(flatten)]
        backend: BackendArg,
        #[command(flatten)]
        pretty: PrettyArg,
    },
    Images {
        #[command(flatten)]
        backend: BackendArg,
        /// Only images matching this term
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        pretty: PrettyArg,
    },
    Providers(PrettyArg),
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddTarget {
    Backend(AddBackendArgs),
    Key(AddKeyArgs),
    Tunnel(AddTunnelArgs),
    Machine(AddMachineArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddBackendArgs {
    #[arg(long)]
    pub title: Option<String>,
    /// Provider id as listed by `mist list providers`
    #[arg(long)]
    pub provider: Option<String>,
    /// Provider API key / username
    #[arg(long)]
    pub key: Option<String>,
    /// Provider API secret / password
    #[arg(long)]
    pub secret: Option<String>,
    #[arg(long)]
    pub api_url: Option<String>,
    #[arg(long)]
    pub tenant: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddKeyArgs {
    /// Name of the new key
    #[arg(long)]
    pub name: Option<String>,
    /// Path to a private key file
    #[arg(long, conflicts_with = "auto")]
    pub key: Option<PathBuf>,
    /// Let the service generate the key
    #[arg(long)]
    pub auto: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddTunnelArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// Comma-separated CIDRs, e.g. "10.0.0.0/8, 192.168.0.0/16"
    #[arg(long)]
    pub cidrs: Option<String>,
    /// Address of the client end of the tunnel
    #[arg(long)]
    pub client_addr: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddMachineArgs {
    #[command(flatten)]
    pub backend: BackendArg,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Key to deploy on the machine
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeleteTarget {
    Backend(IdArg),
    Key(NameArg),
    Tunnel(IdArg),
    Machine(MachineArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct IdArg {
    /// Id (backends also accept their title)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct NameArg {
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RenameTarget {
    Backend {
        #[command(flatten)]
        id: IdArg,
        #[arg(long)]
        new_name: Option<String>,
    },
    Key {
        #[command(flatten)]
        name: NameArg,
        #[arg(long)]
        new_name: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BackendTarget {
    Backend(IdArg),
}

#[derive(Subcommand, Debug, Clone)]
pub enum KeyTarget {
    Key(NameArg),
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShowTarget {
    Key {
        #[command(flatten)]
        name: NameArg,
        /// Print the public half instead of the private key
        #[arg(long)]
        public: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum EditTarget {
    Tunnel(EditTunnelArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct EditTunnelArgs {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub cidrs: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MachineTarget {
    Machine(MachineArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct MachineArgs {
    #[command(flatten)]
    pub backend: BackendArg,
    /// Machine name
    #[arg(long)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_verb_noun_with_alias() {
        let cli = Cli::try_parse_from(["mist", "rm", "key", "--name", "deploy"]).expect("parse");
        match cli.command {
            Command::Delete {
                target: DeleteTarget::Key(NameArg { name }),
            } => assert_eq!(name.as_deref(), Some("deploy")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mist",
            "ls",
            "tunnels",
            "--pretty",
            "--uri",
            "http://localhost:8000",
            "--auth-scheme",
            "query:api_token",
        ])
        .expect("parse");
        assert_eq!(cli.uri.as_deref(), Some("http://localhost:8000"));
        assert_eq!(cli.auth_scheme, Some(AuthScheme::Query("api_token".into())));
        assert!(matches!(
            cli.command,
            Command::List {
                target: ListTarget::Tunnels(PrettyArg { pretty: true })
            }
        ));
    }

    #[test]
    fn key_file_and_auto_conflict() {
        let res = Cli::try_parse_from([
            "mist", "add", "key", "--name", "k", "--key", "/tmp/id_rsa", "--auto",
        ]);
        assert!(res.is_err());
    }
}
