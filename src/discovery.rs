use crate::error::{Result, RokuError};
use crate::types::{DeviceId, DEFAULT_PORT};
use std::collections::{HashMap, HashSet};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use url::Url;

const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
const SSDP_PORT: u16 = 1900;

/// Search target advertised by Roku devices
pub const ST_ECP: &str = "roku:ecp";

/// Settings for an SSDP search
///
/// # Example
///
/// ```
/// use roku_ecp::DiscoveryOptions;
/// use std::time::Duration;
///
/// let options = DiscoveryOptions::default()
///     .with_timeout(Duration::from_secs(5))
///     .with_retries(2);
/// assert_eq!(options.search_target, "roku:ecp");
/// ```
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// How long to listen for answers after each search
    pub timeout: Duration,
    /// Number of searches to send; treated as 1 when zero
    pub retries: u32,
    /// `ST` header of the search
    pub search_target: String,
    /// `MX` header of the search, in seconds
    pub mx: u32,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            retries: 1,
            search_target: ST_ECP.to_string(),
            mx: 3,
        }
    }
}

impl DiscoveryOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_search_target(mut self, search_target: impl Into<String>) -> Self {
        self.search_target = search_target.into();
        self
    }
}

/// A device that answered an SSDP search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// `LOCATION` header, the device's ECP base URL
    pub location: Url,
    /// `USN` header
    pub usn: Option<String>,
    /// `SERVER` header
    pub server: Option<String>,
    id: DeviceId,
}

impl DiscoveredDevice {
    /// Build a descriptor from a location URL
    pub fn from_location(location: &str) -> Result<Self> {
        let location = Url::parse(location)?;
        let host = location.host_str().ok_or_else(|| {
            RokuError::InvalidResponse(format!("Location {} has no host", location))
        })?;
        let id = DeviceId::new(host, location.port().unwrap_or(DEFAULT_PORT));
        Ok(Self {
            location,
            usn: None,
            server: None,
            id,
        })
    }

    /// Host and port taken from the location
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.id.host
    }

    pub fn port(&self) -> u16 {
        self.id.port
    }
}

/// Search the local network for devices
///
/// Sends `options.retries` searches and listens `options.timeout` after
/// each one. Answers are deduplicated by host and port; the first answer
/// from a device wins. No answer at all is an empty list, not an error.
pub async fn discover(options: &DiscoveryOptions) -> Result<Vec<DiscoveredDevice>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    let target = SocketAddr::from((SSDP_MULTICAST_ADDR, SSDP_PORT));
    let message = search_message(&options.search_target, options.mx);

    let mut seen = HashSet::new();
    let mut devices = Vec::new();
    let mut buf = [0u8; 8192];

    for attempt in 0..options.retries.max(1) {
        socket.send_to(message.as_bytes(), target).await?;
        tracing::info!(
            "M-SEARCH sent (ST={}, attempt {}/{})",
            options.search_target,
            attempt + 1,
            options.retries.max(1)
        );

        let deadline = Instant::now() + options.timeout;
        loop {
            let (n, from) = match timeout_at(deadline, socket.recv_from(&mut buf)).await {
                Ok(received) => received?,
                Err(_) => break,
            };

            let data = String::from_utf8_lossy(&buf[..n]);
            tracing::debug!("SSDP response from {}:\n{}", from, data);

            if !collect(&mut seen, &mut devices, &data) {
                tracing::warn!("Ignoring unparseable SSDP response from {}", from);
            }
        }
    }

    tracing::info!("Discovery found {} device(s)", devices.len());
    Ok(devices)
}

/// Add the device answering with `data` unless its host and port were already seen
///
/// Returns `false` when `data` is not a usable search answer.
fn collect(seen: &mut HashSet<DeviceId>, devices: &mut Vec<DiscoveredDevice>, data: &str) -> bool {
    let Some(device) = parse_response(data) else {
        return false;
    };
    if seen.insert(device.id().clone()) {
        tracing::info!("Found device at {}", device.location);
        devices.push(device);
    } else {
        tracing::debug!("Duplicate answer from {}", device.id());
    }
    true
}

fn search_message(search_target: &str, mx: u32) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}:{}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR,
        SSDP_PORT,
        mx.max(1),
        search_target
    )
}

/// Parse an SSDP search answer; anything but a 200 with a usable `LOCATION` is `None`
fn parse_response(data: &str) -> Option<DiscoveredDevice> {
    let mut lines = data.lines();
    let status_line = lines.next()?.trim().to_ascii_uppercase();
    if !status_line.starts_with("HTTP/") || status_line.split_whitespace().nth(1) != Some("200") {
        return None;
    }

    let headers: HashMap<String, String> = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_uppercase(), value.trim().to_string()))
        })
        .collect();

    let mut device = DiscoveredDevice::from_location(headers.get("LOCATION")?).ok()?;
    device.usn = headers.get("USN").cloned();
    device.server = headers.get("SERVER").cloned();
    Some(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
        Cache-Control: max-age=3600\r\n\
        ST: roku:ecp\r\n\
        Location: http://192.168.1.134:8060/\r\n\
        USN: uuid:roku:ecp:P0A070000007\r\n\
        \r\n";

    #[test]
    fn test_parse_response() {
        let device = parse_response(RESPONSE).unwrap();
        assert_eq!(device.host(), "192.168.1.134");
        assert_eq!(device.port(), 8060);
        assert_eq!(device.usn.as_deref(), Some("uuid:roku:ecp:P0A070000007"));
        assert_eq!(device.server, None);
    }

    #[test]
    fn test_parse_response_default_port() {
        let data = "HTTP/1.1 200 OK\r\nLOCATION: http://10.0.0.5/\r\n\r\n";
        let device = parse_response(data).unwrap();
        assert_eq!(device.id(), &DeviceId::new("10.0.0.5", DEFAULT_PORT));
    }

    #[test]
    fn test_parse_response_rejects() {
        assert!(parse_response("NOTIFY * HTTP/1.1\r\nLOCATION: http://a/\r\n\r\n").is_none());
        assert!(parse_response("HTTP/1.1 404 Not Found\r\nLOCATION: http://a/\r\n\r\n").is_none());
        assert!(parse_response("HTTP/1.1 200 OK\r\nST: roku:ecp\r\n\r\n").is_none());
        assert!(parse_response("HTTP/1.1 200 OK\r\nLOCATION: not a url\r\n\r\n").is_none());
        assert!(parse_response("").is_none());
    }

    #[test]
    fn test_collect_keeps_first_answer_per_device() {
        let mut seen = HashSet::new();
        let mut devices = Vec::new();

        let first = "HTTP/1.1 200 OK\r\nLOCATION: http://192.168.1.134:8060/\r\nUSN: uuid:first\r\n\r\n";
        let second = "HTTP/1.1 200 OK\r\nLOCATION: http://192.168.1.134:8060/\r\nUSN: uuid:second\r\n\r\n";
        let other_port = "HTTP/1.1 200 OK\r\nLOCATION: http://192.168.1.134:8061/\r\nUSN: uuid:third\r\n\r\n";

        assert!(collect(&mut seen, &mut devices, first));
        assert!(collect(&mut seen, &mut devices, second));
        assert!(collect(&mut seen, &mut devices, other_port));
        assert!(!collect(&mut seen, &mut devices, "garbage"));

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].usn.as_deref(), Some("uuid:first"));
        assert_eq!(devices[0].port(), 8060);
        assert_eq!(devices[1].usn.as_deref(), Some("uuid:third"));
        assert_eq!(devices[1].port(), 8061);
    }

    #[test]
    fn test_search_message() {
        let msg = search_message(ST_ECP, 0);
        assert!(msg.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(msg.contains("HOST: 239.255.255.250:1900\r\n"));
        assert!(msg.contains("MAN: \"ssdp:discover\"\r\n"));
        assert!(msg.contains("MX: 1\r\n"));
        assert!(msg.contains("ST: roku:ecp\r\n"));
        assert!(msg.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_options_default() {
        let options = DiscoveryOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(2));
        assert_eq!(options.retries, 1);
        assert_eq!(options.mx, 3);
    }
}
