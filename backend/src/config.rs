//! Environment-backed application configuration.
//!
//! `.env` is loaded by `main` before anything reads these; every setting
//! has a working default so a bare checkout runs.

use std::env;
use std::path::PathBuf;

use crate::message::Party;

/// Runtime settings for the pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Party id stamped on outgoing message headers.
    pub party_id: String,
    /// Party name stamped on outgoing message headers.
    pub party_name: String,
    /// Where release packages are staged before delivery.
    pub staging_dir: PathBuf,
    /// Root of the delivery gateway mount.
    pub gateway_root: PathBuf,
    /// Deployment store directory.
    pub store_dir: PathBuf,
    /// Credential store directory.
    pub credentials_dir: PathBuf,
    /// HTTP port for `serve`.
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            party_id: var_or("SONGCAST_PARTY_ID", "PADPIDSONGCAST"),
            party_name: var_or("SONGCAST_PARTY_NAME", "Songcast"),
            staging_dir: PathBuf::from(var_or("SONGCAST_STAGING_DIR", ".songcast/staging")),
            gateway_root: PathBuf::from(var_or("SONGCAST_GATEWAY_ROOT", ".songcast/gateway")),
            store_dir: PathBuf::from(var_or("SONGCAST_STORE_DIR", ".songcast/deployments")),
            credentials_dir: PathBuf::from(var_or(
                "SONGCAST_CREDENTIALS_DIR",
                ".songcast/credentials",
            )),
            port: var_or("SONGCAST_PORT", "3000").parse().unwrap_or(3000),
        }
    }

    /// Sender party for outgoing messages.
    pub fn sender_party(&self) -> Party {
        Party {
            party_id: self.party_id.clone(),
            party_name: self.party_name.clone(),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_env() {
        let config = AppConfig::from_env();
        assert!(!config.party_id.is_empty());
        assert!(config.port > 0);
        assert_eq!(config.sender_party().party_id, config.party_id);
    }
}
