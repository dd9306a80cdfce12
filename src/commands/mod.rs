//! Action handlers.
//!
//! `dispatch` matches the decoded [`Command`] and hands off to the
//! per-resource handlers, which call session/entity methods and print a
//! human-readable result to `out`.

pub mod backends;
pub mod keys;
pub mod machines;
pub mod tunnels;

use std::io::Write;

use crate::cli::{
    AddTarget, BackendTarget, Command, DeleteTarget, EditTarget, KeyTarget, ListTarget,
    MachineTarget, RenameTarget, ShowTarget,
};
use crate::error::MistError;
use crate::model::MachineAction;
use crate::session::Session;

pub fn dispatch<W: Write>(session: &mut Session, command: Command, out: &mut W) -> Result<(), MistError> {
    match command {
        Command::List { target } => match target {
            ListTarget::Backends(p) => backends::list(session, p.pretty, out),
            ListTarget::Machines { backend, pretty } => {
                machines::list(session, backend.backend, pretty.pretty, out)
            }
            ListTarget::Keys(p) => keys::list(session, p.pretty, out),
            ListTarget::Tunnels(p) => tunnels::list(session, p.pretty, out),
            ListTarget::Sizes { backend, pretty } => backends::catalog(
                session,
                backend.backend,
                backends::Catalog::Sizes,
                pretty.pretty,
                out,
            ),
            ListTarget::Locations { backend, pretty } => backends::catalog(
                session,
                backend.backend,
                backends::Catalog::Locations,
                pretty.pretty,
                out,
            ),
            ListTarget::Images {
                backend,
                search,
                pretty,
            } => backends::catalog(
                session,
                backend.backend,
                backends::Catalog::Images { search },
                pretty.pretty,
                out,
            ),
            ListTarget::Providers(p) => backends::providers(session, p.pretty, out),
        },
        Command::Add { target } => match target {
            AddTarget::Backend(args) => backends::add(session, args, out),
            AddTarget::Key(args) => keys::add(session, args, out),
            AddTarget::Tunnel(args) => tunnels::add(session, args, out),
            AddTarget::Machine(args) => machines::add(session, args, out),
        },
        Command::Delete { target } => match target {
            DeleteTarget::Backend(a) => backends::delete(session, a.id, out),
            DeleteTarget::Key(a) => keys::delete(session, a.name, out),
            DeleteTarget::Tunnel(a) => tunnels::delete(session, a.id, out),
            DeleteTarget::Machine(a) => {
                machines::act(session, a, MachineAction::Destroy, out)
            }
        },
        Command::Rename { target } => match target {
            RenameTarget::Backend { id, new_name } => backends::rename(session, id.id, new_name, out),
            RenameTarget::Key { name, new_name } => keys::rename(session, name.name, new_name, out),
        },
        Command::Enable {
            target: BackendTarget::Backend(a),
        } => backends::set_enabled(session, a.id, true, out),
        Command::Disable {
            target: BackendTarget::Backend(a),
        } => backends::set_enabled(session, a.id, false, out),
        Command::Edit {
            target: EditTarget::Tunnel(args),
        } => tunnels::edit(session, args, out),
        Command::Default {
            target: KeyTarget::Key(a),
        } => keys::set_default(session, a.name, out),
        Command::Show {
            target: ShowTarget::Key { name, public },
        } => keys::show(session, name.name, public, out),
        Command::Start {
            target: MachineTarget::Machine(a),
        } => machines::act(session, a, MachineAction::Start, out),
        Command::Stop {
            target: MachineTarget::Machine(a),
        } => machines::act(session, a, MachineAction::Stop, out),
        Command::Reboot {
            target: MachineTarget::Machine(a),
        } => machines::act(session, a, MachineAction::Reboot, out),
    }
}

/// Unwrap a flag the handler cannot do without.
pub(crate) fn require(value: Option<String>, what: &str) -> Result<String, MistError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(MistError::usage(format!("You have to provide {}", what))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_missing_and_blank() {
        assert_eq!(require(Some("k".into()), "key name").expect("present"), "k");
        let err = require(None, "key name").unwrap_err();
        assert_eq!(err.to_string(), "You have to provide key name");
        assert!(require(Some("  ".into()), "key name").is_err());
    }
}
