// Session: the authenticated view of the service. It owns the token-carrying
// `ApiClient` and the lazily-filled caches of backends and keys.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::api::{segment, ApiClient, AuthScheme};
use crate::cache::Cache;
use crate::error::MistError;
use crate::model::{decode_list, Backend, Key, NewBackend, Tunnel, TunnelRequest};

/// Answer of the login endpoint. Deployments disagree on the field name.
#[derive(Deserialize, Debug)]
struct LoginResponse {
    #[serde(alias = "mist_api_token", alias = "api_token")]
    token: String,
}

#[derive(Deserialize, Debug)]
struct GeneratedKey {
    #[serde(rename = "priv")]
    private: String,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ProviderList {
    Wrapped { supported_providers: Vec<Value> },
    Bare(Vec<Value>),
}

pub struct Session {
    api: ApiClient,
    backends: Cache<String, Backend>,
    keys: Cache<String, Key>,
}

impl Session {
    /// Exchange email and password for an API token.
    pub fn authenticate(
        uri: &str,
        email: &str,
        password: &str,
        scheme: AuthScheme,
    ) -> Result<Self, MistError> {
        let api = ApiClient::new(uri, scheme)?;
        let body = json!({ "email": email, "password": password });
        let res = api.execute(Method::POST, "/auth", Some(&body))?;
        if !res.status().is_success() {
            return Err(MistError::Auth(format!("{} - {}", res.status(), res.text())));
        }
        let login: LoginResponse = res.json()?;
        info!(uri = api.base_url(), email, "logged in");
        Ok(Self::from_client(api.with_token(&login.token)))
    }

    /// Session for an already issued API token; no login round trip.
    pub fn with_token(uri: &str, token: &str, scheme: AuthScheme) -> Result<Self, MistError> {
        let api = ApiClient::new(uri, scheme)?.with_token(token);
        Ok(Self::from_client(api))
    }

    fn from_client(api: ApiClient) -> Self {
        Session {
            api,
            backends: Cache::new(),
            keys: Cache::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn backends(&mut self) -> Result<&BTreeMap<String, Backend>, MistError> {
        let api = &self.api;
        self.backends.get_or_fetch(|| list_backends(api))
    }

    pub fn update_backends(&mut self) -> Result<&BTreeMap<String, Backend>, MistError> {
        let api = &self.api;
        self.backends.refresh(|| list_backends(api))
    }

    pub fn backends_fetched(&self) -> bool {
        self.backends.is_fetched()
    }

    /// Look a backend up by id, falling back to its title.
    pub fn backend(&mut self, id_or_title: &str) -> Result<Option<&Backend>, MistError> {
        Ok(self.backend_mut(id_or_title)?.map(|b| &*b))
    }

    pub fn backend_mut(&mut self, id_or_title: &str) -> Result<Option<&mut Backend>, MistError> {
        let backends = self.backends()?;
        let id = if backends.contains_key(id_or_title) {
            id_or_title.to_string()
        } else {
            match backends.values().find(|b| b.title == id_or_title) {
                Some(b) => b.id.clone(),
                None => return Ok(None),
            }
        };
        Ok(self.backends.get_mut(&id))
    }

    pub fn supported_providers(&self) -> Result<Vec<Value>, MistError> {
        let list: ProviderList = self.api.get("/providers")?.json()?;
        Ok(match list {
            ProviderList::Wrapped {
                supported_providers,
            } => supported_providers,
            ProviderList::Bare(items) => items,
        })
    }

    /// Register a backend. The backend cache is invalidated so the next
    /// read picks it up.
    pub fn add_backend(&mut self, backend: &NewBackend) -> Result<(), MistError> {
        let body = serde_json::to_value(backend)?;
        self.api.post("/backends", Some(&body))?;
        self.backends.invalidate();
        Ok(())
    }

    pub fn keys(&mut self) -> Result<&BTreeMap<String, Key>, MistError> {
        let api = &self.api;
        self.keys.get_or_fetch(|| list_keys(api))
    }

    pub fn update_keys(&mut self) -> Result<&BTreeMap<String, Key>, MistError> {
        let api = &self.api;
        self.keys.refresh(|| list_keys(api))
    }

    pub fn keys_fetched(&self) -> bool {
        self.keys.is_fetched()
    }

    pub fn key(&mut self, id: &str) -> Result<Option<&Key>, MistError> {
        Ok(self.keys()?.get(id))
    }

    /// Upload a private key under `name`.
    pub fn add_key(&mut self, name: &str, private: &str) -> Result<(), MistError> {
        self.api
            .put("/keys", Some(&json!({ "id": name, "priv": private })))?;
        self.keys.invalidate();
        Ok(())
    }

    /// Have the server generate a fresh private key. Nothing is stored.
    pub fn generate_key(&self) -> Result<String, MistError> {
        let generated: GeneratedKey = self.api.post("/keys", None)?.json()?;
        Ok(generated.private)
    }

    pub fn list_tunnels(&self) -> Result<Vec<Tunnel>, MistError> {
        let payload: Value = self.api.get("/tunnels")?.json()?;
        decode_list(payload)?
            .into_iter()
            .map(|item| serde_json::from_value::<Tunnel>(item).map_err(MistError::from))
            .collect()
    }

    pub fn add_tunnel(&self, tunnel: &TunnelRequest) -> Result<(), MistError> {
        let body = serde_json::to_value(tunnel)?;
        self.api.post("/tunnels", Some(&body))?;
        Ok(())
    }

    /// Replace a tunnel's name, CIDRs and description.
    pub fn edit_tunnel(&self, tunnel_id: &str, tunnel: &TunnelRequest) -> Result<(), MistError> {
        let body = serde_json::to_value(tunnel)?;
        self.api
            .put(&format!("/tunnels/{}", segment(tunnel_id)), Some(&body))?;
        Ok(())
    }

    pub fn delete_tunnel(&self, tunnel_id: &str) -> Result<(), MistError> {
        self.api.delete(&format!("/tunnels/{}", segment(tunnel_id)))?;
        Ok(())
    }
}

fn list_backends(api: &ApiClient) -> Result<Vec<(String, Backend)>, MistError> {
    debug!("listing backends");
    let payload: Value = api.get("/backends")?.json()?;
    decode_list(payload)?
        .into_iter()
        .map(|item| Backend::from_json(item, api).map(|b| (b.id.clone(), b)))
        .collect()
}

fn list_keys(api: &ApiClient) -> Result<Vec<(String, Key)>, MistError> {
    debug!("listing keys");
    let payload: Value = api.get("/keys")?.json()?;
    decode_list(payload)?
        .into_iter()
        .map(|item| Key::from_json(item, api).map(|k| (k.id.clone(), k)))
        .collect()
}
