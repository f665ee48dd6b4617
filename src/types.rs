use crate::error::{Result, RokuError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default ECP port
pub const DEFAULT_PORT: u16 = 8060;

/// Identity of a device on the network
///
/// Used as the back-reference from an [`Application`] to the device that
/// reported it. Two devices are the same device when host and port match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId {
    pub host: String,
    pub port: u16,
}

impl DeviceId {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Installed application (channel)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub version: String,
    pub name: String,

    /// Device that reported this application, if any
    #[serde(default)]
    pub device: Option<DeviceId>,
}

impl Application {
    /// Create an application not bound to any device
    pub fn new(id: impl Into<String>, version: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            name: name.into(),
            device: None,
        }
    }

    /// Bind the application to the device that reported it
    pub fn with_device(mut self, device: DeviceId) -> Self {
        self.device = Some(device);
        self
    }
}

impl PartialEq for Application {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.version == other.version
    }
}

impl Eq for Application {}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} v{}", self.id, self.name, self.version)
    }
}

/// Snapshot of `/query/device-info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub model_name: String,
    pub model_num: String,
    /// `software-version` and `software-build` joined by a dot
    pub software_version: String,
    pub serial_num: String,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}, SW v{}, Ser# {}",
            self.model_name, self.model_num, self.software_version, self.serial_num
        )
    }
}

// ========== XML documents ==========

/// `<device-info>` document. Only the fields this crate reads are kept.
#[derive(Debug, Deserialize)]
pub(crate) struct DeviceInfoXml {
    #[serde(rename = "model-name")]
    model_name: Option<String>,
    #[serde(rename = "model-number")]
    model_number: Option<String>,
    #[serde(rename = "software-version")]
    software_version: Option<String>,
    #[serde(rename = "software-build")]
    software_build: Option<String>,
    #[serde(rename = "serial-number")]
    serial_number: Option<String>,
    #[serde(rename = "is-tv")]
    is_tv: Option<String>,
    #[serde(rename = "power-mode")]
    power_mode: Option<String>,
}

impl DeviceInfoXml {
    pub(crate) fn parse(body: &[u8]) -> Result<Self> {
        Ok(quick_xml::de::from_str(&decode_body(body)?)?)
    }

    pub(crate) fn is_tv(&self) -> Result<bool> {
        required(&self.is_tv, "is-tv").map(|v| v.trim() == "true")
    }

    pub(crate) fn power_mode(&self) -> Result<String> {
        required(&self.power_mode, "power-mode").map(str::to_string)
    }

    pub(crate) fn into_device_info(self) -> Result<DeviceInfo> {
        let model_name = required(&self.model_name, "model-name")?.to_string();
        let model_num = required(&self.model_number, "model-number")?.to_string();
        let software_version = format!(
            "{}.{}",
            required(&self.software_version, "software-version")?,
            required(&self.software_build, "software-build")?
        );
        let serial_num = required(&self.serial_number, "serial-number")?.to_string();
        Ok(DeviceInfo {
            model_name,
            model_num,
            software_version,
            serial_num,
        })
    }
}

/// `<app>` or `<screensaver>` element
#[derive(Debug, Deserialize)]
pub(crate) struct AppXml {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(rename = "@version")]
    version: Option<String>,
    #[serde(rename = "$text", default)]
    name: String,
}

impl AppXml {
    fn into_application(self, device: &DeviceId) -> Result<Application> {
        let id = self
            .id
            .ok_or_else(|| RokuError::InvalidResponse("app element without id".to_string()))?;
        Ok(Application {
            id,
            version: self.version.unwrap_or_default(),
            name: self.name.trim().to_string(),
            device: Some(device.clone()),
        })
    }
}

/// `<apps>` document
#[derive(Debug, Deserialize)]
struct AppsXml {
    #[serde(rename = "app", default)]
    apps: Vec<AppXml>,
}

/// `<active-app>` document
#[derive(Debug, Deserialize)]
struct ActiveAppXml {
    app: Option<AppXml>,
    screensaver: Option<AppXml>,
}

/// Decode a `/query/apps` body, binding every application to `device`
pub(crate) fn parse_apps(body: &[u8], device: &DeviceId) -> Result<Vec<Application>> {
    let doc: AppsXml = quick_xml::de::from_str(&decode_body(body)?)?;
    doc.apps
        .into_iter()
        .map(|app| app.into_application(device))
        .collect()
}

/// Decode a `/query/active-app` body
///
/// A screensaver wins over the app underneath it. The home screen is
/// reported as an `<app>` without an id and decodes to `None`.
pub(crate) fn parse_active_app(body: &[u8], device: &DeviceId) -> Result<Option<Application>> {
    let doc: ActiveAppXml = quick_xml::de::from_str(&decode_body(body)?)?;
    match doc.screensaver.or(doc.app) {
        Some(node) if node.id.is_some() => node.into_application(device).map(Some),
        Some(node) => {
            tracing::debug!("Active app {:?} has no id, treating as none", node.name);
            Ok(None)
        }
        None => Ok(None),
    }
}

fn decode_body(body: &[u8]) -> Result<String> {
    String::from_utf8(body.to_vec())
        .map_err(|e| RokuError::InvalidResponse(format!("Body is not UTF-8: {}", e)))
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| RokuError::InvalidResponse(format!("Missing {} field", field)))
}
