use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};

/// Ports probed in order when `listen_port` is taken.
pub const DEFAULT_FALLBACK_PORTS: [u16; 10] =
    [3001, 3002, 3003, 3004, 3005, 8080, 8081, 8082, 9000, 9001];

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `4981`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Ports tried in order when `listen_port` cannot be bound.
    /// TOML: `basic.fallback_ports`.
    #[serde(default = "default_fallback_ports")]
    pub fallback_ports: Vec<u16>,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Optional key inbound requests must present. Unset leaves the gateway open.
    /// TOML: `basic.gateway_key`.
    #[serde(default, deserialize_with = "deserialize_optional_string_lax")]
    pub gateway_key: Option<String>,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            fallback_ports: default_fallback_ports(),
            loglevel: default_loglevel(),
            gateway_key: None,
        }
    }
}

impl BasicConfig {
    /// Configured key, ignoring blank values.
    pub fn gateway_key(&self) -> Option<&str> {
        self.gateway_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn deserialize_optional_string_lax<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(serde::de::Error::custom(
            "expected a string or a number for basic.gateway_key",
        )),
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    4981
}

fn default_fallback_ports() -> Vec<u16> {
    DEFAULT_FALLBACK_PORTS.to_vec()
}

fn default_loglevel() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_gateway_key_is_accepted() {
        let cfg: BasicConfig = serde_json::from_value(json!({"gateway_key": 1234})).unwrap();
        assert_eq!(cfg.gateway_key(), Some("1234"));
    }

    #[test]
    fn blank_gateway_key_is_disabled() {
        let cfg: BasicConfig = serde_json::from_value(json!({"gateway_key": "  "})).unwrap();
        assert_eq!(cfg.gateway_key(), None);
        let cfg: BasicConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg.gateway_key(), None);
    }
}
