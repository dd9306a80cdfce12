use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{segment, ApiClient};
use crate::error::MistError;
use crate::model::backend::Backend;

#[derive(Debug, Deserialize)]
struct MachineRecord {
    id: String,
    name: String,
}

/// Payload for provisioning a machine on a backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewMachine {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub image: String,
    pub size: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineAction {
    Start,
    Stop,
    Reboot,
    Destroy,
}

impl MachineAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MachineAction::Start => "start",
            MachineAction::Stop => "stop",
            MachineAction::Reboot => "reboot",
            MachineAction::Destroy => "destroy",
        }
    }
}

/// A virtual machine as listed by its backend. Machines are only ever
/// obtained from [`Backend::machines`].
#[derive(Debug, Clone)]
pub struct Machine {
    pub id: String,
    pub name: String,
    pub backend_id: String,
    pub info: Value,
    api: ApiClient,
}

impl Machine {
    pub(crate) fn from_json(info: Value, backend_id: &str, api: &ApiClient) -> Result<Self, MistError> {
        let record: MachineRecord = serde_json::from_value(info.clone())?;
        Ok(Machine {
            id: record.id,
            name: record.name,
            backend_id: backend_id.to_string(),
            info,
            api: api.clone(),
        })
    }

    /// Provider-reported state, when the listing carries one.
    pub fn state(&self) -> Option<&str> {
        self.info.get("state").and_then(Value::as_str)
    }

    pub fn start(&self, backend: &mut Backend) -> Result<(), MistError> {
        self.run(backend, MachineAction::Start)
    }

    pub fn stop(&self, backend: &mut Backend) -> Result<(), MistError> {
        self.run(backend, MachineAction::Stop)
    }

    pub fn reboot(&self, backend: &mut Backend) -> Result<(), MistError> {
        self.run(backend, MachineAction::Reboot)
    }

    pub fn destroy(self, backend: &mut Backend) -> Result<(), MistError> {
        self.run(backend, MachineAction::Destroy)
    }

    /// POST the action, then relist the owning backend's machines.
    pub fn run(&self, backend: &mut Backend, action: MachineAction) -> Result<(), MistError> {
        if backend.id != self.backend_id {
            return Err(MistError::usage(format!(
                "machine {} belongs to backend {}, not {}",
                self.name, self.backend_id, backend.id
            )));
        }
        self.api.post(
            &format!(
                "/backends/{}/machines/{}",
                segment(&self.backend_id),
                segment(&self.id)
            ),
            Some(&json!({ "action": action.as_str() })),
        )?;
        backend.update_machines()?;
        Ok(())
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Machine => {}:{}", self.name, self.id)
    }
}
