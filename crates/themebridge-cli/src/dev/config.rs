//! Dev session settings derived from the project configuration.

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use themebridge_config::{ConfigError, ProjectConfig};
use themebridge_core::CONTROL_PREFIX;

use crate::error::Result;

/// Quiet period before a burst of file changes is acted on.
pub const DEBOUNCE: Duration = Duration::from_millis(400);

/// Directories under the theme whose changes are never relevant.
pub const WATCH_IGNORE: &[&str] = &["node_modules", "vendor", ".git", ".cache"];

#[derive(Debug, Clone)]
pub struct DevConfig {
    pub project: ProjectConfig,
    /// Bound control server address
    pub addr: SocketAddr,
    pub debounce: Duration,
    pub watch_ignore: Vec<String>,
}

impl DevConfig {
    /// Resolve the control server address, moving up to ten ports past a
    /// busy `CONTROL_PORT`.
    pub fn new(project: ProjectConfig) -> Result<Self> {
        let addr = Self::find_available_port(project.settings.control_port)?;
        Ok(Self {
            project,
            addr,
            debounce: DEBOUNCE,
            watch_ignore: WATCH_IGNORE.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Find an available port starting from the requested port.
    pub fn find_available_port(requested_port: u16) -> Result<SocketAddr> {
        if requested_port < 1024 {
            crate::ui::warning(&format!(
                "Port {requested_port} is in privileged range, may require root access"
            ));
        }

        let addr = SocketAddr::from(([127, 0, 0, 1], requested_port));
        if TcpListener::bind(addr).is_ok() {
            return Ok(addr);
        }

        for offset in 1..=10 {
            let port = requested_port.saturating_add(offset);
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            if TcpListener::bind(addr).is_ok() {
                crate::ui::warning(&format!(
                    "Port {requested_port} is busy, using port {port} instead"
                ));
                return Ok(addr);
            }
        }

        Err(ConfigError::InvalidValue {
            key: "CONTROL_PORT".to_string(),
            value: requested_port.to_string(),
            hint: Some(format!(
                "Ports {}-{} are all in use. Set CONTROL_PORT to a free port.",
                requested_port,
                requested_port.saturating_add(10)
            )),
        }
        .into())
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Origin of the control server as seen by the browser and by PHP.
    pub fn server_url(&self) -> String {
        self.project.settings.control_url(self.port())
    }

    /// Base of the control endpoints, including [`CONTROL_PREFIX`].
    pub fn control_url(&self) -> String {
        format!("{}{CONTROL_PREFIX}", self.server_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_port_at_or_after_the_requested_one() {
        let listener = match TcpListener::bind(("127.0.0.1", 0)) {
            Ok(listener) => listener,
            Err(err) => {
                eprintln!("skipping: unable to bind socket ({err})");
                return;
            }
        };
        let start_port = listener.local_addr().unwrap().port();

        // Still held, so the search has to move on.
        let addr = DevConfig::find_available_port(start_port).unwrap();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert!(addr.port() > start_port && addr.port() <= start_port.saturating_add(10));
    }
}
