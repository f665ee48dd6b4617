//! Rust library for remote-controlling Roku devices
//!
//! This library provides an async API over Roku's External Control Protocol
//! (ECP), the plain HTTP interface every Roku exposes on port 8060. It
//! supports:
//!
//! - Discovery via SSDP
//! - Key presses, text entry, motion sensor and touch input
//! - Installed and active application queries, application icons
//! - Launching applications and opening their store page
//! - Device information
//! - TV-only keys, input selection and power mode for Roku TVs
//!
//! # Quick Start
//!
//! ```no_run
//! use roku_ecp::{DiscoveryOptions, Key, Roku};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rokus = Roku::discover(&DiscoveryOptions::default()).await?;
//!
//!     if let Some(roku) = rokus.first() {
//!         println!("Found {}", roku.device_info().await?);
//!
//!         roku.press(Key::Home).await?;
//!
//!         if let Some(app) = roku.app("Netflix").await? {
//!             roku.launch(&app).await?;
//!         }
//!
//!         if let Some(tv) = roku.tv() {
//!             println!("Power mode: {}", tv.current_power_mode().await?);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Direct Connection
//!
//! If you know the IP address of a device, address it directly:
//!
//! ```no_run
//! use roku_ecp::Roku;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let roku = Roku::new("192.168.1.100");
//!     roku.command("literal", &["breaking bad"]).await?;
//!     roku.command("enter", &[]).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Discovery**: SSDP search for `roku:ecp` on the local network
//! - **Roku**: Command, query and launch API for one device
//! - **Tv**: Optional TV capability attached at discovery time
//! - **Connection**: HTTP session and status handling
//! - **Protocol**: Keys, sensors, touch operations and TV inputs
//! - **Types**: Domain types and XML decoding

mod connection;
mod discovery;
mod error;
mod protocol;
mod roku;
mod tv;
mod types;

// Public exports
pub use discovery::{discover, DiscoveredDevice, DiscoveryOptions, ST_ECP};
pub use error::{Result, RokuError};
pub use protocol::{Command, Key, Sensor, TouchOp, TvInput};
pub use roku::Roku;
pub use tv::{RokuTv, TvCapability};
pub use types::{Application, DeviceId, DeviceInfo, DEFAULT_PORT};
