use std::fmt;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{segment, ApiClient};
use crate::error::MistError;
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct KeyRecord {
    id: String,
    #[serde(
        rename = "isDefault",
        default,
        deserialize_with = "crate::model::null_as_default"
    )]
    is_default: bool,
}

/// An SSH key stored by the service. The id doubles as the key's name.
#[derive(Debug, Clone)]
pub struct Key {
    pub id: String,
    pub is_default: bool,
    pub info: Value,
    api: ApiClient,
}

impl Key {
    pub(crate) fn from_json(info: Value, api: &ApiClient) -> Result<Self, MistError> {
        let record: KeyRecord = serde_json::from_value(info.clone())?;
        Ok(Key {
            id: record.id,
            is_default: record.is_default,
            info,
            api: api.clone(),
        })
    }

    fn path(&self) -> String {
        format!("/keys/{}", segment(&self.id))
    }

    /// Private key material. Fetched on every call, never kept.
    pub fn private(&self) -> Result<Value, MistError> {
        self.api.get(&format!("{}/private", self.path()))?.json()
    }

    /// Public key material. Fetched on every call, never kept.
    pub fn public(&self) -> Result<Value, MistError> {
        self.api.get(&format!("{}/public", self.path()))?.json()
    }

    /// Rename the key. Afterwards `self.id` is the new name, which is also
    /// the key the session cache files it under.
    pub fn rename(&mut self, session: &mut Session, new_name: &str) -> Result<(), MistError> {
        self.api
            .put(&self.path(), Some(&json!({ "new_id": new_name })))?;
        self.id = new_name.to_string();
        session.update_keys()?;
        Ok(())
    }

    /// Make this the default key. Other keys lose the flag only once the
    /// session cache is rebuilt from the server's answer.
    pub fn set_default(&mut self, session: &mut Session) -> Result<(), MistError> {
        self.api.post(&self.path(), None)?;
        self.is_default = true;
        session.update_keys()?;
        Ok(())
    }

    pub fn delete(self, session: &mut Session) -> Result<(), MistError> {
        self.api.delete(&self.path())?;
        session.update_keys()?;
        Ok(())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key => {}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AuthScheme;

    #[test]
    fn key_path_escapes_its_name() {
        let api = ApiClient::new("http://localhost", AuthScheme::Bearer).expect("client");
        let key = Key::from_json(json!({"id": "team/ci?v=2"}), &api).expect("key");
        assert_eq!(key.path(), "/keys/team%2Fci%3Fv=2");
    }
}
