use std::io::Write;

use crate::cli::{AddMachineArgs, MachineArgs};
use crate::commands::require;
use crate::error::MistError;
use crate::model::{Backend, MachineAction, NewMachine};
use crate::output::Table;
use crate::session::Session;

fn backend_mut<'a>(
    session: &'a mut Session,
    backend: Option<String>,
) -> Result<&'a mut Backend, MistError> {
    let id = require(backend, "backend id")?;
    session
        .backend_mut(&id)?
        .ok_or_else(|| MistError::not_found("backend", id))
}

pub fn list<W: Write>(
    session: &mut Session,
    backend: Option<String>,
    pretty: bool,
    out: &mut W,
) -> Result<(), MistError> {
    let backend = backend_mut(session, backend)?;
    let machines = backend.machines()?;
    if machines.is_empty() {
        writeln!(out, "No machines found")?;
        return Ok(());
    }
    let mut table = Table::new(["Name", "ID", "State"]);
    for machine in machines.values() {
        table.add_row([
            machine.name.clone(),
            machine.id.clone(),
            machine.state().unwrap_or_default().to_string(),
        ]);
    }
    table.write(out, pretty)
}

pub fn add<W: Write>(session: &mut Session, args: AddMachineArgs, out: &mut W) -> Result<(), MistError> {
    let request = NewMachine {
        name: require(args.name, "machine name")?,
        image: require(args.image, "image id")?,
        size: require(args.size, "size id")?,
        location: require(args.location, "location id")?,
        key: args.key,
    };
    let backend = backend_mut(session, args.backend.backend)?;
    backend.create_machine(&request)?;
    writeln!(out, "Created machine {} on {}", request.name, backend.title)?;
    Ok(())
}

pub fn act<W: Write>(
    session: &mut Session,
    args: MachineArgs,
    action: MachineAction,
    out: &mut W,
) -> Result<(), MistError> {
    let name = require(args.name, "machine name")?;
    let backend = backend_mut(session, args.backend.backend)?;
    let machine = backend
        .machine(&name)?
        .cloned()
        .ok_or_else(|| MistError::not_found("machine", name.clone()))?;
    match action {
        MachineAction::Start => machine.start(backend)?,
        MachineAction::Stop => machine.stop(backend)?,
        MachineAction::Reboot => machine.reboot(backend)?,
        MachineAction::Destroy => machine.destroy(backend)?,
    }
    writeln!(out, "Machine {}: {} requested", name, action.as_str())?;
    Ok(())
}
