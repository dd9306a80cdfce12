use serde::{Deserialize, Serialize};

/// A VPN tunnel as listed by the service. Tunnels are not cached; every
/// listing is fetched fresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunnel {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "crate::model::null_as_default")]
    pub cidrs: Vec<String>,
    #[serde(default)]
    pub client_addr: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for creating or replacing a tunnel. `client_addr` is only sent on
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunnelRequest {
    pub name: String,
    pub cidrs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Split a comma-separated CIDR list, trimming whitespace around each entry.
/// Empty entries (e.g. from a trailing comma) are dropped; order is kept.
pub fn parse_cidrs(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|cidr| !cidr.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cidrs_are_trimmed_and_ordered() {
        assert_eq!(
            parse_cidrs("10.0.0.0/8, 192.168.0.0/16"),
            vec!["10.0.0.0/8", "192.168.0.0/16"]
        );
    }

    #[test]
    fn blank_cidr_entries_are_dropped() {
        assert_eq!(parse_cidrs(" 172.16.0.0/12 ,, "), vec!["172.16.0.0/12"]);
        assert!(parse_cidrs("").is_empty());
    }

    #[test]
    fn edit_request_omits_client_addr() {
        let req = TunnelRequest {
            name: "office".into(),
            cidrs: vec!["10.1.0.0/16".into()],
            client_addr: None,
            description: Some("hq".into()),
        };
        assert_eq!(
            serde_json::to_value(&req).expect("serialize"),
            json!({"name": "office", "cidrs": ["10.1.0.0/16"], "description": "hq"})
        );
    }

    #[test]
    fn tunnel_tolerates_missing_optional_fields() {
        let tunnel: Tunnel =
            serde_json::from_value(json!({"id": "t1", "name": "lab"})).expect("decode");
        assert!(tunnel.cidrs.is_empty());
        assert_eq!(tunnel.client_addr, None);
        assert_eq!(tunnel.description, None);
    }

    #[test]
    fn tunnel_tolerates_null_fields() {
        let tunnel: Tunnel = serde_json::from_value(json!({
            "id": "t1", "name": "lab", "cidrs": null, "client_addr": null, "description": null
        }))
        .expect("decode");
        assert!(tunnel.cidrs.is_empty());
        assert_eq!(tunnel.description, None);
    }
}
