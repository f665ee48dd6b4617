use crate::error::{Result, RokuError};
use crate::protocol::{Key, TvInput};
use crate::roku::Roku;
use crate::types::DeviceInfoXml;

/// Extra abilities of a Roku TV
///
/// Attached to a [`Roku`] once, when the device reports `is-tv`. It lists the
/// keys added on top of the base set and the physical inputs that
/// [`RokuTv::set_input`] can switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvCapability {
    keys: &'static [Key],
    inputs: &'static [TvInput],
}

impl Default for TvCapability {
    fn default() -> Self {
        Self {
            keys: &Key::TV,
            inputs: &TvInput::ALL,
        }
    }
}

impl TvCapability {
    /// Keys added on top of the base set
    pub fn keys(&self) -> &'static [Key] {
        self.keys
    }

    /// Physical inputs that can be selected
    pub fn inputs(&self) -> &'static [TvInput] {
        self.inputs
    }
}

/// TV-only operations of a [`Roku`]
///
/// Obtained from [`Roku::tv`], which returns `None` for players.
///
/// # Example
///
/// ```no_run
/// # use roku_ecp::{Roku, TvInput};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let roku = Roku::new("192.168.1.100").into_tv();
/// if let Some(tv) = roku.tv() {
///     tv.set_input(TvInput::Hdmi2).await?;
///     println!("power mode: {}", tv.current_power_mode().await?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RokuTv<'a> {
    roku: &'a Roku,
    capability: &'a TvCapability,
}

impl<'a> RokuTv<'a> {
    pub(crate) fn new(roku: &'a Roku, capability: &'a TvCapability) -> Self {
        Self { roku, capability }
    }

    /// The device this view belongs to
    pub fn roku(&self) -> &'a Roku {
        self.roku
    }

    /// Keys and inputs this TV offers
    pub fn capability(&self) -> &'a TvCapability {
        self.capability
    }

    /// Switch to a physical input
    pub async fn set_input(&self, input: TvInput) -> Result<()> {
        if !self.capability.inputs().contains(&input) {
            return Err(RokuError::InvalidArgument(format!(
                "{} is not an input of {}",
                input,
                self.roku.id()
            )));
        }
        self.roku.connection().post(&input.path(), &[]).await?;
        Ok(())
    }

    /// Switch to a physical input given by name (`AV1`, `HDMI1`..`HDMI4`, `Tuner`)
    pub async fn set_input_by_name(&self, input: &str) -> Result<()> {
        let input: TvInput = input.parse()?;
        self.set_input(input).await
    }

    /// Current `power-mode` reported by the device, e.g. `PowerOn`
    pub async fn current_power_mode(&self) -> Result<String> {
        let body = self.roku.connection().get("/query/device-info").await?;
        DeviceInfoXml::parse(&body)?.power_mode()
    }
}
