use std::io::Write;

use crate::cli::{AddTunnelArgs, EditTunnelArgs};
use crate::commands::require;
use crate::error::MistError;
use crate::model::{parse_cidrs, TunnelRequest};
use crate::output::Table;
use crate::session::Session;

fn cidrs(raw: Option<String>) -> Result<Vec<String>, MistError> {
    let cidrs = parse_cidrs(&require(raw, "CIDRs")?);
    if cidrs.is_empty() {
        return Err(MistError::usage("You have to provide at least one CIDR"));
    }
    Ok(cidrs)
}

pub fn list<W: Write>(session: &mut Session, pretty: bool, out: &mut W) -> Result<(), MistError> {
    let tunnels = session.list_tunnels()?;
    if tunnels.is_empty() {
        writeln!(out, "No VPN tunnels found")?;
        return Ok(());
    }
    let mut table = Table::new(["Name", "ID", "CIDRs", "Description"]);
    for tunnel in &tunnels {
        table.add_row([
            tunnel.name.clone(),
            tunnel.id.clone(),
            tunnel.cidrs.join(", "),
            tunnel.description.clone().unwrap_or_default(),
        ]);
    }
    table.write(out, pretty)
}

pub fn add<W: Write>(session: &mut Session, args: AddTunnelArgs, out: &mut W) -> Result<(), MistError> {
    let request = TunnelRequest {
        name: require(args.name, "tunnel name")?,
        cidrs: cidrs(args.cidrs)?,
        client_addr: args.client_addr,
        description: args.description,
    };
    session.add_tunnel(&request)?;
    writeln!(
        out,
        "Tunnel {} to {} added successfully",
        request.name,
        request.cidrs.join(", ")
    )?;
    Ok(())
}

pub fn edit<W: Write>(session: &mut Session, args: EditTunnelArgs, out: &mut W) -> Result<(), MistError> {
    let id = require(args.id, "tunnel id")?;
    let request = TunnelRequest {
        name: require(args.name, "tunnel name")?,
        cidrs: cidrs(args.cidrs)?,
        client_addr: None,
        description: Some(args.description.unwrap_or_default()),
    };
    session.edit_tunnel(&id, &request)?;
    writeln!(out, "Tunnel {} was edited successfully", id)?;
    Ok(())
}

pub fn delete<W: Write>(session: &mut Session, id: Option<String>, out: &mut W) -> Result<(), MistError> {
    let id = require(id, "tunnel id")?;
    session.delete_tunnel(&id)?;
    writeln!(out, "Tunnel {} removed", id)?;
    Ok(())
}
