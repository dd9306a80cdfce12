use std::fs;
use std::io::Write;

use crate::cli::AddKeyArgs;
use crate::commands::require;
use crate::error::MistError;
use crate::model::Key;
use crate::output::{write_json, Table};
use crate::session::Session;

fn find(session: &mut Session, name: Option<String>) -> Result<Key, MistError> {
    let name = require(name, "key name")?;
    session
        .key(&name)?
        .cloned()
        .ok_or_else(|| MistError::not_found("key", name))
}

pub fn list<W: Write>(session: &mut Session, pretty: bool, out: &mut W) -> Result<(), MistError> {
    let keys = session.keys()?;
    if keys.is_empty() {
        writeln!(out, "No keys found")?;
        return Ok(());
    }
    let mut table = Table::new(["Name", "Is Default"]);
    for key in keys.values() {
        table.add_row([key.id.clone(), key.is_default.to_string()]);
    }
    table.write(out, pretty)
}

pub fn add<W: Write>(session: &mut Session, args: AddKeyArgs, out: &mut W) -> Result<(), MistError> {
    let name = require(args.name, "key name")?;
    let private = if args.auto {
        session.generate_key()?
    } else {
        let path = args
            .key
            .ok_or_else(|| MistError::usage("You have to provide a private key file or --auto"))?;
        fs::read_to_string(&path)?.trim_matches('\n').to_string()
    };
    session.add_key(&name, &private)?;
    writeln!(out, "Added key {}", name)?;
    Ok(())
}

pub fn delete<W: Write>(session: &mut Session, name: Option<String>, out: &mut W) -> Result<(), MistError> {
    let key = find(session, name)?;
    let name = key.id.clone();
    key.delete(session)?;
    writeln!(out, "Deleted key {}", name)?;
    Ok(())
}

pub fn rename<W: Write>(
    session: &mut Session,
    name: Option<String>,
    new_name: Option<String>,
    out: &mut W,
) -> Result<(), MistError> {
    let mut key = find(session, name)?;
    let new_name = require(new_name, "new name for the key")?;
    let old = key.id.clone();
    key.rename(session, &new_name)?;
    writeln!(out, "Renamed {} to {}", old, key.id)?;
    Ok(())
}

pub fn set_default<W: Write>(session: &mut Session, name: Option<String>, out: &mut W) -> Result<(), MistError> {
    let mut key = find(session, name)?;
    key.set_default(session)?;
    writeln!(out, "Key {} is now the default", key.id)?;
    Ok(())
}

pub fn show<W: Write>(
    session: &mut Session,
    name: Option<String>,
    public: bool,
    out: &mut W,
) -> Result<(), MistError> {
    let key = find(session, name)?;
    let material = if public { key.public()? } else { key.private()? };
    write_json(out, &material)
}
