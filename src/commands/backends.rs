use std::io::Write;

use serde_json::Value;

use crate::cli::AddBackendArgs;
use crate::commands::require;
use crate::error::MistError;
use crate::model::{Backend, NewBackend};
use crate::output::{cell, write_json, Table};
use crate::session::Session;

/// Read-only catalogs a backend exposes.
#[derive(Debug, Clone)]
pub enum Catalog {
    Sizes,
    Locations,
    Images { search: Option<String> },
}

/// Snapshot of the backend named by `id_or_title`.
fn find(session: &mut Session, id_or_title: Option<String>) -> Result<Backend, MistError> {
    let id = require(id_or_title, "backend id")?;
    session
        .backend(&id)?
        .cloned()
        .ok_or_else(|| MistError::not_found("backend", id))
}

pub fn list<W: Write>(session: &mut Session, pretty: bool, out: &mut W) -> Result<(), MistError> {
    let backends = session.backends()?;
    if backends.is_empty() {
        writeln!(out, "No backends found")?;
        return Ok(());
    }
    let mut table = Table::new(["Name", "ID", "Provider", "Enabled"]);
    for backend in backends.values() {
        table.add_row([
            backend.title.clone(),
            backend.id.clone(),
            backend.provider.clone(),
            backend.enabled.to_string(),
        ]);
    }
    table.write(out, pretty)
}

pub fn add<W: Write>(session: &mut Session, args: AddBackendArgs, out: &mut W) -> Result<(), MistError> {
    let backend = NewBackend {
        title: require(args.title, "backend title")?,
        provider: require(args.provider, "provider")?,
        apikey: require(args.key, "provider API key")?,
        apisecret: require(args.secret, "provider API secret")?,
        apiurl: args.api_url,
        tenant_name: args.tenant,
        region: args.region,
    };
    session.add_backend(&backend)?;
    writeln!(out, "Added backend {}", backend.title)?;
    Ok(())
}

pub fn delete<W: Write>(session: &mut Session, id: Option<String>, out: &mut W) -> Result<(), MistError> {
    let backend = find(session, id)?;
    let title = backend.title.clone();
    backend.delete(session)?;
    writeln!(out, "Deleted backend {}", title)?;
    Ok(())
}

pub fn rename<W: Write>(
    session: &mut Session,
    id: Option<String>,
    new_name: Option<String>,
    out: &mut W,
) -> Result<(), MistError> {
    let mut backend = find(session, id)?;
    let new_name = require(new_name, "new name for the backend")?;
    let old = backend.title.clone();
    backend.rename(session, &new_name)?;
    writeln!(out, "Renamed {} to {}", old, backend.title)?;
    Ok(())
}

pub fn set_enabled<W: Write>(
    session: &mut Session,
    id: Option<String>,
    enabled: bool,
    out: &mut W,
) -> Result<(), MistError> {
    let mut backend = find(session, id)?;
    if enabled {
        backend.enable(session)?;
        writeln!(out, "Enabled backend {}", backend.title)?;
    } else {
        backend.disable(session)?;
        writeln!(out, "Disabled backend {}", backend.title)?;
    }
    Ok(())
}

pub fn catalog<W: Write>(
    session: &mut Session,
    id: Option<String>,
    which: Catalog,
    pretty: bool,
    out: &mut W,
) -> Result<(), MistError> {
    let backend = find(session, id)?;
    let items = match which {
        Catalog::Sizes => backend.sizes()?,
        Catalog::Locations => backend.locations()?,
        Catalog::Images { search: Some(term) } => backend.search_image(&term)?,
        Catalog::Images { search: None } => backend.images()?,
    };
    write_items(&items, &["id", "name"], pretty, out)
}

pub fn providers<W: Write>(session: &mut Session, pretty: bool, out: &mut W) -> Result<(), MistError> {
    let providers = Value::Array(session.supported_providers()?);
    write_items(&providers, &["provider", "title"], pretty, out)
}

/// One row per array element, pulling out `fields`. Anything that is not
/// an array of objects is printed as JSON.
fn write_items<W: Write>(
    items: &Value,
    fields: &[&str],
    pretty: bool,
    out: &mut W,
) -> Result<(), MistError> {
    let Some(list) = items.as_array().filter(|l| l.iter().all(Value::is_object)) else {
        return write_json(out, items);
    };
    let mut table = Table::new(fields.iter().map(|f| f.to_uppercase()));
    for item in list {
        table.add_row(
            fields
                .iter()
                .map(|f| item.get(*f).map(cell).unwrap_or_default()),
        );
    }
    table.write(out, pretty)
}
