use crate::connection::Connection;
use crate::discovery::{self, DiscoveredDevice, DiscoveryOptions};
use crate::error::{Result, RokuError};
use crate::protocol::{literal_paths, Command, Key, Sensor, TouchOp, LITERAL_COMMAND, STORE_APP_ID};
use crate::tv::{RokuTv, TvCapability};
use crate::types::{parse_active_app, parse_apps, Application, DeviceId, DeviceInfo, DeviceInfoXml, DEFAULT_PORT};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Interface for controlling one Roku device
///
/// A `Roku` sends key presses, text, sensor and touch input, queries the
/// installed and active applications, and launches applications. Devices
/// discovered as TVs also carry a [`TvCapability`], reachable via
/// [`Roku::tv`].
///
/// Cloning is cheap; clones share the same HTTP session.
#[derive(Clone)]
pub struct Roku {
    connection: Arc<Connection>,
    tv: Option<TvCapability>,
}

impl Roku {
    /// Address a device on the default port (8060)
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_port(host, DEFAULT_PORT)
    }

    /// Address a device on a specific port
    pub fn with_port(host: impl Into<String>, port: u16) -> Self {
        Self {
            connection: Arc::new(Connection::new(DeviceId::new(host, port))),
            tv: None,
        }
    }

    /// Address a device using a preconfigured HTTP client
    pub fn with_client(host: impl Into<String>, port: u16, client: reqwest::Client) -> Self {
        Self {
            connection: Arc::new(Connection::with_client(DeviceId::new(host, port), client)),
            tv: None,
        }
    }

    /// Address a device found by [`discovery::discover`]
    pub fn from_location(device: &DiscoveredDevice) -> Self {
        Self::with_port(device.host(), device.port())
    }

    /// Discover devices on the local network
    ///
    /// Every answering device is probed once via `/query/device-info`; those
    /// reporting `is-tv` as `true` come back with the TV capability. A device
    /// that cannot be probed fails the whole call.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use roku_ecp::{DiscoveryOptions, Roku};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     for roku in Roku::discover(&DiscoveryOptions::default()).await? {
    ///         println!("{:?}: {}", roku, roku.device_info().await?);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn discover(options: &DiscoveryOptions) -> Result<Vec<Roku>> {
        let mut rokus = Vec::new();
        for device in discovery::discover(options).await? {
            rokus.push(Roku::from_discovered(&device).await?);
        }
        Ok(rokus)
    }

    /// Address a discovered device, probing `/query/device-info` for `is-tv`
    pub async fn from_discovered(device: &DiscoveredDevice) -> Result<Roku> {
        let roku = Roku::from_location(device);
        let info = DeviceInfoXml::parse(&roku.connection.get("/query/device-info").await?)?;
        if info.is_tv()? {
            tracing::info!("{} is a Roku TV", roku.id());
            Ok(roku.into_tv())
        } else {
            tracing::info!("{} is a Roku player", roku.id());
            Ok(roku)
        }
    }

    /// Attach the TV capability
    pub fn into_tv(mut self) -> Self {
        self.tv = Some(TvCapability::default());
        self
    }

    pub fn id(&self) -> &DeviceId {
        self.connection.id()
    }

    pub fn host(&self) -> &str {
        &self.id().host
    }

    pub fn port(&self) -> u16 {
        self.id().port
    }

    pub fn is_tv(&self) -> bool {
        self.tv.is_some()
    }

    /// TV-only operations, if this device is a TV
    pub fn tv(&self) -> Option<RokuTv<'_>> {
        self.tv.as_ref().map(|capability| RokuTv::new(self, capability))
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    // ========== Commands ==========

    /// Keys this device accepts
    pub fn keys(&self) -> Vec<Key> {
        let mut keys = Key::BASE.to_vec();
        if let Some(tv) = &self.tv {
            keys.extend_from_slice(tv.keys());
        }
        keys
    }

    /// Sorted names of the key commands this device accepts, `literal` included
    pub fn commands(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.keys().into_iter().map(Key::name).collect();
        names.push(LITERAL_COMMAND);
        names.sort_unstable();
        names
    }

    /// Whether `name` is a key, `literal` or a sensor on this device
    pub fn supports(&self, name: &str) -> bool {
        name == LITERAL_COMMAND
            || Sensor::from_name(name).is_some()
            || Key::from_name(name).is_some_and(|key| self.keys().contains(&key))
    }

    /// Resolve `name` with `args` and run it
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use roku_ecp::Roku;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let roku = Roku::new("192.168.1.100");
    /// roku.command("home", &[]).await?;
    /// roku.command("literal", &["hello"]).await?;
    /// roku.command("acceleration", &["0", "9.8", "0"]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn command(&self, name: &str, args: &[&str]) -> Result<()> {
        let command = Command::parse(name, args)?;
        self.execute(&command).await
    }

    /// Run a resolved command
    ///
    /// Keys outside this device's table are rejected before anything is sent.
    pub async fn execute(&self, command: &Command) -> Result<()> {
        match command {
            Command::Key(key) => self.press(*key).await,
            Command::Literal(text) => self.literal(text).await,
            Command::Sensor { sensor, x, y, z } => self.sensor(*sensor, *x, *y, *z).await,
        }
    }

    /// Press a single key
    pub async fn press(&self, key: Key) -> Result<()> {
        if !self.keys().contains(&key) {
            return Err(RokuError::UnsupportedCommand(format!(
                "{} is not supported by {}",
                key,
                self.id()
            )));
        }
        self.connection.post(&key.path(), &[]).await?;
        Ok(())
    }

    /// Type `text`, one keypress per character
    pub async fn literal(&self, text: &str) -> Result<()> {
        for path in literal_paths(text) {
            self.connection.post(&path, &[]).await?;
        }
        Ok(())
    }

    /// Send one motion sensor reading
    pub async fn sensor(&self, sensor: Sensor, x: f64, y: f64, z: f64) -> Result<()> {
        let params = sensor.params(x, y, z);
        self.input(params.as_slice()).await
    }

    // ========== Queries ==========

    /// Installed applications, in the order the device lists them
    pub async fn apps(&self) -> Result<Vec<Application>> {
        let body = self.connection.get("/query/apps").await?;
        parse_apps(&body, self.id())
    }

    /// Find an installed application by name, then by id
    pub async fn app(&self, key: &str) -> Result<Option<Application>> {
        let apps = self.apps().await?;
        let by_name = apps.iter().position(|app| app.name == key);
        let index = by_name.or_else(|| apps.iter().position(|app| app.id == key));
        Ok(index.map(|i| apps[i].clone()))
    }

    /// Fresh device information
    pub async fn device_info(&self) -> Result<DeviceInfo> {
        let body = self.connection.get("/query/device-info").await?;
        DeviceInfoXml::parse(&body)?.into_device_info()
    }

    /// Application or screensaver in the foreground, if any
    pub async fn current_app(&self) -> Result<Option<Application>> {
        let body = self.connection.get("/query/active-app").await?;
        parse_active_app(&body, self.id())
    }

    /// Raw icon image of `app`
    pub async fn icon(&self, app: &Application) -> Result<Bytes> {
        self.connection
            .get(&format!("/query/icon/{}", app.id))
            .await
    }

    // ========== Actions ==========

    /// Launch `app`
    ///
    /// Fails with [`RokuError::CrossDevice`] without sending anything when
    /// `app` was reported by another device.
    pub async fn launch(&self, app: &Application) -> Result<()> {
        if let Some(owner) = &app.device {
            if owner != self.id() {
                return Err(RokuError::CrossDevice {
                    app: app.id.clone(),
                    owner: owner.clone(),
                    device: self.id().clone(),
                });
            }
        }
        self.connection
            .post(&format!("/launch/{}", app.id), &[("contentID", app.id.as_str())])
            .await?;
        Ok(())
    }

    /// Open the channel store page of `app`
    pub async fn store(&self, app: &Application) -> Result<()> {
        self.connection
            .post(
                &format!("/launch/{}", STORE_APP_ID),
                &[("contentID", app.id.as_str())],
            )
            .await?;
        Ok(())
    }

    /// Send raw `/input` parameters
    pub async fn input<K, V>(&self, params: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        self.connection.post("/input", &params).await?;
        Ok(())
    }

    /// Touch the screen at (`x`, `y`)
    pub async fn touch(&self, x: i32, y: i32, op: TouchOp) -> Result<()> {
        let x = x.to_string();
        let y = y.to_string();
        self.input(&[
            ("touch.0.x", x.as_str()),
            ("touch.0.y", y.as_str()),
            ("touch.0.op", op.as_str()),
        ])
        .await
    }

    /// Touch with the operation given by name
    pub async fn touch_by_name(&self, x: i32, y: i32, op: &str) -> Result<()> {
        let op: TouchOp = op.parse()?;
        self.touch(x, y, op).await
    }
}

impl From<&DeviceId> for Roku {
    fn from(id: &DeviceId) -> Self {
        Roku::with_port(id.host.clone(), id.port)
    }
}

// ========== Application routing ==========

impl Application {
    /// Device that reported this application
    ///
    /// Fails with [`RokuError::InvalidArgument`] for applications built with
    /// [`Application::new`] and never bound to a device.
    fn owner(&self) -> Result<Roku> {
        self.device.as_ref().map(Roku::from).ok_or_else(|| {
            RokuError::InvalidArgument(format!("{} is not bound to a device", self))
        })
    }

    /// Launch this application on the device that reported it
    pub async fn launch(&self) -> Result<()> {
        self.owner()?.launch(self).await
    }

    /// Icon of this application, fetched from the device that reported it
    pub async fn icon(&self) -> Result<Bytes> {
        self.owner()?.icon(self).await
    }

    /// Open the store page of this application on the device that reported it
    pub async fn store(&self) -> Result<()> {
        self.owner()?.store(self).await
    }
}

impl fmt::Debug for Roku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roku")
            .field("host", &self.host())
            .field("port", &self.port())
            .field("tv", &self.is_tv())
            .finish()
    }
}
