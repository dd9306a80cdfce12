use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::api::{segment, ApiClient};
use crate::cache::Cache;
use crate::error::MistError;
use crate::model::machine::{Machine, NewMachine};
use crate::model::decode_list;
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct BackendRecord {
    id: String,
    title: String,
    #[serde(default, deserialize_with = "crate::model::null_as_default")]
    enabled: bool,
    #[serde(default, deserialize_with = "crate::model::null_as_default")]
    provider: String,
}

/// Payload for registering a new backend with the service.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewBackend {
    pub title: String,
    pub provider: String,
    pub apikey: String,
    pub apisecret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apiurl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// A compute backend (cloud account) registered with the service.
///
/// Backends handed out by [`Session`] are snapshots: the mutating methods
/// take the session explicitly so they can rebuild its backend cache once
/// the server has accepted the change.
#[derive(Debug, Clone)]
pub struct Backend {
    pub id: String,
    pub title: String,
    pub enabled: bool,
    pub provider: String,
    /// Raw server payload.
    pub info: Value,
    api: ApiClient,
    machines: Cache<String, Machine>,
}

impl Backend {
    pub(crate) fn from_json(info: Value, api: &ApiClient) -> Result<Self, MistError> {
        let record: BackendRecord = serde_json::from_value(info.clone())?;
        Ok(Backend {
            id: record.id,
            title: record.title,
            enabled: record.enabled,
            provider: record.provider,
            info,
            api: api.clone(),
            machines: Cache::new(),
        })
    }

    fn path(&self) -> String {
        format!("/backends/{}", segment(&self.id))
    }

    pub fn rename(&mut self, session: &mut Session, new_name: &str) -> Result<(), MistError> {
        self.api
            .put(&self.path(), Some(&json!({ "new_name": new_name })))?;
        self.title = new_name.to_string();
        session.update_backends()?;
        Ok(())
    }

    pub fn enable(&mut self, session: &mut Session) -> Result<(), MistError> {
        self.set_state(session, true)
    }

    pub fn disable(&mut self, session: &mut Session) -> Result<(), MistError> {
        self.set_state(session, false)
    }

    fn set_state(&mut self, session: &mut Session, enabled: bool) -> Result<(), MistError> {
        let new_state = if enabled { "1" } else { "0" };
        self.api
            .post(&self.path(), Some(&json!({ "new_state": new_state })))?;
        self.enabled = enabled;
        session.update_backends()?;
        Ok(())
    }

    /// Remove the backend from the service. The snapshot is consumed.
    pub fn delete(self, session: &mut Session) -> Result<(), MistError> {
        self.api.delete(&self.path())?;
        session.update_backends()?;
        Ok(())
    }

    pub fn sizes(&self) -> Result<Value, MistError> {
        self.catalog("sizes")
    }

    pub fn locations(&self) -> Result<Value, MistError> {
        self.catalog("locations")
    }

    pub fn images(&self) -> Result<Value, MistError> {
        self.catalog("images")
    }

    fn catalog(&self, what: &str) -> Result<Value, MistError> {
        self.api.get(&format!("{}/{}", self.path(), what))?.json()
    }

    pub fn search_image(&self, search_term: &str) -> Result<Value, MistError> {
        self.api
            .get_with(
                &format!("{}/images", self.path()),
                &json!({ "search_term": search_term }),
            )?
            .json()
    }

    /// Machines keyed by name, listed on first access.
    pub fn machines(&mut self) -> Result<&BTreeMap<String, Machine>, MistError> {
        let (api, id) = (&self.api, self.id.as_str());
        self.machines.get_or_fetch(|| list_machines(api, id))
    }

    /// Throw away the machine listing and fetch it again.
    pub fn update_machines(&mut self) -> Result<&BTreeMap<String, Machine>, MistError> {
        let (api, id) = (&self.api, self.id.as_str());
        self.machines.refresh(|| list_machines(api, id))
    }

    pub fn machine(&mut self, name: &str) -> Result<Option<&Machine>, MistError> {
        Ok(self.machines()?.get(name))
    }

    pub fn machines_fetched(&self) -> bool {
        self.machines.is_fetched()
    }

    /// Ask the backend to provision a machine, then relist machines.
    pub fn create_machine(&mut self, request: &NewMachine) -> Result<Value, MistError> {
        let body = serde_json::to_value(request)?;
        let res = self
            .api
            .post(&format!("{}/machines", self.path()), Some(&body))?;
        let created = if res.text().trim().is_empty() {
            Value::Null
        } else {
            res.json()?
        };
        self.update_machines()?;
        Ok(created)
    }
}

fn list_machines(api: &ApiClient, backend_id: &str) -> Result<Vec<(String, Machine)>, MistError> {
    debug!(backend = backend_id, "listing machines");
    let payload: Value = api
        .get(&format!("/backends/{}/machines", segment(backend_id)))?
        .json()?;
    decode_list(payload)?
        .into_iter()
        .map(|item| Machine::from_json(item, backend_id, api).map(|m| (m.name.clone(), m)))
        .collect()
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Backend => {}:{}", self.title, self.id)
    }
}
