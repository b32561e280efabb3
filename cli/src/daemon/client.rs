use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use droplet_protocol::{
    DaemonRequest, DaemonResponse, DaemonStatus, TabEvent, UsageData, MIN_SUPPORTED_VERSION,
    PROTOCOL_VERSION,
};

use crate::daemon::socket_path;

#[derive(Debug, Clone)]
pub struct VersionMismatchError {
    pub cli_protocol_version: u32,
    pub cli_min_supported: u32,
    pub daemon_protocol_version: u32,
    pub daemon_min_supported: u32,
    pub daemon_binary_version: String,
    pub kind: VersionMismatchKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMismatchKind {
    CliTooOld,
    DaemonTooOld,
}

impl std::fmt::Display for VersionMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            VersionMismatchKind::CliTooOld => {
                write!(
                    f,
                    "Protocol version mismatch: CLI uses protocol v{}, but daemon (v{}) requires v{}+.\n\n\
                    Please update droplet:\n  \
                    cargo install droplet",
                    self.cli_protocol_version,
                    self.daemon_binary_version,
                    self.daemon_min_supported
                )
            }
            VersionMismatchKind::DaemonTooOld => {
                write!(
                    f,
                    "Protocol version mismatch: daemon (v{}) uses protocol v{}, but this CLI requires v{}+.\n\n\
                    Please restart the daemon:\n  \
                    droplet daemon restart",
                    self.daemon_binary_version,
                    self.daemon_protocol_version,
                    self.cli_min_supported
                )
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Daemon error: {0}")]
    Daemon(String),

    #[error("{0}")]
    VersionMismatch(VersionMismatchError),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Checks if the CLI and daemon protocol versions are compatible.
pub fn check_version_compatibility(status: &DaemonStatus) -> Result<()> {
    // Can the daemon understand our requests?
    if PROTOCOL_VERSION < status.min_supported_version {
        return Err(ClientError::VersionMismatch(VersionMismatchError {
            cli_protocol_version: PROTOCOL_VERSION,
            cli_min_supported: MIN_SUPPORTED_VERSION,
            daemon_protocol_version: status.protocol_version,
            daemon_min_supported: status.min_supported_version,
            daemon_binary_version: status.version.clone(),
            kind: VersionMismatchKind::CliTooOld,
        }));
    }

    // Can we understand its responses?
    if status.protocol_version < MIN_SUPPORTED_VERSION {
        return Err(ClientError::VersionMismatch(VersionMismatchError {
            cli_protocol_version: PROTOCOL_VERSION,
            cli_min_supported: MIN_SUPPORTED_VERSION,
            daemon_protocol_version: status.protocol_version,
            daemon_min_supported: status.min_supported_version,
            daemon_binary_version: status.version.clone(),
            kind: VersionMismatchKind::DaemonTooOld,
        }));
    }

    Ok(())
}

pub struct DaemonClient {
    stream: UnixStream,
    read_buffer: Vec<u8>,
}

impl DaemonClient {
    pub fn connect() -> Result<Self> {
        let path = socket_path();
        let stream = UnixStream::connect(&path)?;
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        stream.set_write_timeout(Some(Duration::from_secs(5)))?;
        Ok(Self {
            stream,
            read_buffer: Vec::with_capacity(16 * 1024),
        })
    }

    /// Connects to the daemon and validates protocol version compatibility.
    pub fn connect_with_version_check() -> Result<Self> {
        let mut client = Self::connect()?;
        let status = client.get_status()?;
        check_version_compatibility(&status)?;
        Ok(client)
    }

    fn read_line_blocking(&mut self) -> Result<String> {
        let mut temp_buf = [0u8; 8192];
        loop {
            if let Some(pos) = self.read_buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = self.read_buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line_bytes).to_string();
                return Ok(line);
            }
            let n = self.stream.read(&mut temp_buf)?;
            if n == 0 {
                return Err(ClientError::Protocol("Connection closed".into()));
            }
            self.read_buffer.extend_from_slice(&temp_buf[..n]);
        }
    }

    fn send_request(&mut self, request: DaemonRequest) -> Result<DaemonResponse> {
        let json = request
            .to_json()
            .map_err(|e| ClientError::Protocol(e.to_string()))?;

        writeln!(self.stream, "{}", json)?;
        self.stream.flush()?;

        let line = self.read_line_blocking()?;
        tracing::debug!(line_len = line.len(), "send_request read response");

        DaemonResponse::from_json(&line).map_err(|e| ClientError::Protocol(e.to_string()))
    }

    pub fn get_status(&mut self) -> Result<DaemonStatus> {
        match self.send_request(DaemonRequest::GetStatus)? {
            DaemonResponse::Status(status) => Ok(status),
            DaemonResponse::Error(e) => Err(ClientError::Daemon(e)),
            _ => Err(ClientError::Protocol("Unexpected response".into())),
        }
    }

    pub fn get_data(&mut self) -> Result<UsageData> {
        match self.send_request(DaemonRequest::GetData)? {
            DaemonResponse::Data(data) => Ok(data),
            DaemonResponse::Error(e) => Err(ClientError::Daemon(e)),
            _ => Err(ClientError::Protocol("Unexpected response".into())),
        }
    }

    pub fn reset_data(&mut self) -> Result<bool> {
        match self.send_request(DaemonRequest::ResetData)? {
            DaemonResponse::Reset { success } => Ok(success),
            DaemonResponse::Error(e) => Err(ClientError::Daemon(e)),
            _ => Err(ClientError::Protocol("Unexpected response".into())),
        }
    }

    pub fn send_tab_event(&mut self, event: TabEvent) -> Result<()> {
        match self.send_request(DaemonRequest::Tab(event))? {
            DaemonResponse::Ok => Ok(()),
            DaemonResponse::Error(e) => Err(ClientError::Daemon(e)),
            _ => Err(ClientError::Protocol("Unexpected response".into())),
        }
    }

    pub fn record_usage(&mut self, domain: &str, duration: f64) -> Result<()> {
        let request = DaemonRequest::RecordUsage {
            domain: domain.to_string(),
            duration,
        };
        match self.send_request(request)? {
            DaemonResponse::Ok => Ok(()),
            DaemonResponse::Error(e) => Err(ClientError::Daemon(e)),
            _ => Err(ClientError::Protocol("Unexpected response".into())),
        }
    }

    pub fn shutdown(&mut self) -> Result<()> {
        match self.send_request(DaemonRequest::Shutdown)? {
            DaemonResponse::Ok => Ok(()),
            DaemonResponse::Error(e) => Err(ClientError::Daemon(e)),
            _ => Err(ClientError::Protocol("Unexpected response".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_status(
        protocol_version: u32,
        min_supported_version: u32,
        version: &str,
    ) -> DaemonStatus {
        DaemonStatus {
            running: true,
            version: version.to_string(),
            protocol_version,
            min_supported_version,
            ..DaemonStatus::default()
        }
    }

    #[test]
    fn test_version_compatible_same_version() {
        let status = make_status(PROTOCOL_VERSION, MIN_SUPPORTED_VERSION, "1.0.0");
        assert!(check_version_compatibility(&status).is_ok());
    }

    #[test]
    fn test_version_compatible_daemon_newer() {
        let status = make_status(PROTOCOL_VERSION + 1, MIN_SUPPORTED_VERSION, "2.0.0");
        assert!(check_version_compatibility(&status).is_ok());
    }

    #[test]
    fn test_version_cli_too_old() {
        let status = make_status(10, PROTOCOL_VERSION + 1, "3.0.0");
        let result = check_version_compatibility(&status);
        if let Err(ClientError::VersionMismatch(e)) = result {
            assert_eq!(e.kind, VersionMismatchKind::CliTooOld);
            assert_eq!(e.cli_protocol_version, PROTOCOL_VERSION);
            assert_eq!(e.daemon_min_supported, PROTOCOL_VERSION + 1);
            assert!(e.to_string().contains("update droplet"));
        } else {
            panic!("Expected VersionMismatch error");
        }
    }

    #[test]
    fn test_version_daemon_too_old() {
        let status = make_status(0, 0, "0.1.0");
        let result = check_version_compatibility(&status);
        if let Err(ClientError::VersionMismatch(e)) = result {
            assert_eq!(e.kind, VersionMismatchKind::DaemonTooOld);
            assert_eq!(e.daemon_protocol_version, 0);
            assert_eq!(e.cli_min_supported, MIN_SUPPORTED_VERSION);
            assert!(e.to_string().contains("restart the daemon"));
        } else {
            panic!("Expected VersionMismatch error");
        }
    }

    #[test]
    fn test_version_mismatch_display() {
        let error = VersionMismatchError {
            cli_protocol_version: 3,
            cli_min_supported: 2,
            daemon_protocol_version: 1,
            daemon_min_supported: 1,
            daemon_binary_version: "0.2.0".to_string(),
            kind: VersionMismatchKind::DaemonTooOld,
        };
        let msg = error.to_string();
        assert!(msg.contains("daemon (v0.2.0) uses protocol v1"));
        assert!(msg.contains("CLI requires v2+"));
        assert!(msg.contains("droplet daemon restart"));
    }
}
