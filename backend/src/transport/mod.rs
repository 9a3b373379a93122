//! Delivery transport: secure package transmission to a distributor
//! endpoint.
//!
//! The [`DeliveryTransport`] trait is the seam concrete wire protocols plug
//! into. The shipped implementation, [`DropFolderTransport`], delivers into
//! a remote-file-copy gateway mounted at a configured root: each configured
//! host maps to a directory under the root and uploads land beneath it,
//! following the `/upload/{releaseId}` convention.
//!
//! A transport instance handles one delivery at a time; concurrent fan-out
//! deliveries each construct their own instance. On any upload error the
//! transport disconnects before the error propagates, so a failed delivery
//! never leaks an open connection.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{TransportError, TransportResult};

// =============================================================================
// Configuration
// =============================================================================

/// Endpoint coordinates for one delivery.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub private_key: Option<String>,
}

impl TransportConfig {
    /// Port defaulted to the remote-copy standard when unset.
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            22
        } else {
            self.port
        }
    }
}

// =============================================================================
// Contract
// =============================================================================

/// Uniform delivery contract for file-based adapters.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// Establish a session against the configured endpoint.
    async fn connect(&self, config: TransportConfig) -> TransportResult<()>;

    /// Upload a local directory to the remote path, creating the target
    /// directory when absent. Returns the uploaded file names.
    async fn upload_directory(&self, local: &Path, remote: &str) -> TransportResult<Vec<String>>;

    /// Whether a session is currently open.
    async fn is_connected(&self) -> bool;

    /// Tear down the session. Safe to call repeatedly.
    async fn disconnect(&self);
}

// =============================================================================
// Drop-folder gateway implementation
// =============================================================================

struct Session {
    host: String,
}

/// Transport delivering into a gateway mount: `{root}/{host}/{remote path}`.
pub struct DropFolderTransport {
    gateway_root: PathBuf,
    session: Mutex<Option<Session>>,
}

impl DropFolderTransport {
    pub fn new(gateway_root: impl Into<PathBuf>) -> Self {
        Self {
            gateway_root: gateway_root.into(),
            session: Mutex::new(None),
        }
    }

    fn target_dir(&self, host: &str, remote: &str) -> PathBuf {
        self.gateway_root
            .join(host)
            .join(remote.trim_start_matches('/'))
    }

    fn copy_tree(local: &Path, target: &Path, uploaded: &mut Vec<String>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(local)? {
            let entry = entry?;
            let source = entry.path();
            let destination = target.join(entry.file_name());
            if source.is_dir() {
                std::fs::create_dir_all(&destination)?;
                Self::copy_tree(&source, &destination, uploaded)?;
            } else {
                std::fs::copy(&source, &destination)?;
                uploaded.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        Ok(())
    }

    async fn upload_inner(&self, local: &Path, remote: &str) -> TransportResult<Vec<String>> {
        let host = {
            let session = self.session.lock().await;
            match session.as_ref() {
                Some(s) => s.host.clone(),
                None => return Err(TransportError::NotConnected),
            }
        };

        let target = self.target_dir(&host, remote);
        std::fs::create_dir_all(&target).map_err(|e| TransportError::RemotePath {
            path: remote.to_string(),
            reason: e.to_string(),
        })?;

        if !local.is_dir() {
            return Err(TransportError::RemotePath {
                path: local.display().to_string(),
                reason: "local package directory not found".into(),
            });
        }

        let mut uploaded = Vec::new();
        Self::copy_tree(local, &target, &mut uploaded)?;
        uploaded.sort();
        Ok(uploaded)
    }
}

#[async_trait]
impl DeliveryTransport for DropFolderTransport {
    async fn connect(&self, config: TransportConfig) -> TransportResult<()> {
        if config.host.is_empty() {
            return Err(TransportError::ConnectionFailed {
                host: "<empty>".into(),
                reason: "no host configured".into(),
            });
        }
        if config.username.is_empty() {
            return Err(TransportError::Auth("username required".into()));
        }
        if config.password.is_none() && config.private_key.is_none() {
            return Err(TransportError::Auth(
                "password or private key required".into(),
            ));
        }

        let mut session = self.session.lock().await;
        *session = Some(Session { host: config.host });
        Ok(())
    }

    async fn upload_directory(&self, local: &Path, remote: &str) -> TransportResult<Vec<String>> {
        let result = self.upload_inner(local, remote).await;
        if result.is_err() {
            // Never leak an open connection past a failed delivery.
            self.disconnect().await;
        }
        result
    }

    async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }

    async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        *session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config() -> TransportConfig {
        TransportConfig {
            host: "gateway.cdbaby.com".into(),
            port: 0,
            username: "label".into(),
            password: Some("secret".into()),
            private_key: None,
        }
    }

    #[tokio::test]
    async fn test_connect_requires_host_and_auth() {
        let transport = DropFolderTransport::new(tempdir().unwrap().path());

        let no_host = TransportConfig {
            host: String::new(),
            ..config()
        };
        assert!(transport.connect(no_host).await.is_err());

        let no_auth = TransportConfig {
            password: None,
            private_key: None,
            ..config()
        };
        assert!(matches!(
            transport.connect(no_auth).await,
            Err(TransportError::Auth(_))
        ));

        assert!(!transport.is_connected().await);
        assert!(transport.connect(config()).await.is_ok());
        assert!(transport.is_connected().await);
    }

    #[tokio::test]
    async fn test_upload_before_connect_fails() {
        let transport = DropFolderTransport::new(tempdir().unwrap().path());
        let local = tempdir().unwrap();
        let result = transport.upload_directory(local.path(), "/upload/REL-1").await;
        assert!(matches!(result, Err(TransportError::NotConnected)));
    }

    #[tokio::test]
    async fn test_upload_creates_target_and_copies_files() {
        let gateway = tempdir().unwrap();
        let local = tempdir().unwrap();
        std::fs::write(local.path().join("release-message.json"), "{}").unwrap();
        std::fs::write(local.path().join("metadata.csv"), "a,b\n1,2").unwrap();

        let transport = DropFolderTransport::new(gateway.path());
        transport.connect(config()).await.unwrap();
        let uploaded = transport
            .upload_directory(local.path(), "/upload/REL-1")
            .await
            .unwrap();

        assert_eq!(uploaded, vec!["metadata.csv", "release-message.json"]);
        let delivered = gateway
            .path()
            .join("gateway.cdbaby.com")
            .join("upload/REL-1/metadata.csv");
        assert!(delivered.exists());
        // A clean upload keeps the session open for the caller to close.
        assert!(transport.is_connected().await);
    }

    #[tokio::test]
    async fn test_failed_upload_disconnects_before_propagating() {
        let gateway = tempdir().unwrap();
        let transport = DropFolderTransport::new(gateway.path());
        transport.connect(config()).await.unwrap();

        let missing = gateway.path().join("does-not-exist");
        let result = transport.upload_directory(&missing, "/upload/REL-2").await;

        assert!(result.is_err());
        assert!(!transport.is_connected().await);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let transport = DropFolderTransport::new(tempdir().unwrap().path());
        transport.connect(config()).await.unwrap();
        transport.disconnect().await;
        transport.disconnect().await;
        assert!(!transport.is_connected().await);
    }

    #[test]
    fn test_effective_port_defaults() {
        assert_eq!(config().effective_port(), 22);
        let custom = TransportConfig {
            port: 2222,
            ..config()
        };
        assert_eq!(custom.effective_port(), 2222);
    }
}
