//! # lifx_lan_rs
//!
//! A Rust library for discovering and controlling LIFX devices over the LAN
//! protocol.
//!
//! The core is a synchronous protocol engine, [`Controller`], that never
//! touches the network itself: it hands every encoded packet to a
//! [`PacketSink`] and expects the caller to feed it every received datagram.
//! [`Client`] wires it to a **runtime-agnostic** async UDP socket.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use lifx_lan_rs::{Client, Hsbk};
//!
//! async fn make_everything_red() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::bind().await?;
//!     client.discover().await?;
//!     client.listen(Duration::from_secs(2)).await?;
//!
//!     let red = Hsbk::new(0.0, 1.0, 1.0, 3500);
//!     for index in 0..client.controller().count() {
//!         if let Some(handle) = client.controller().device_by_index(index) {
//!             client.set_light_color(handle, &red, 500).await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Discovery
//!
//! A discovery broadcast makes every device answer with its service and
//! port. Each announcement creates a registry record and triggers version
//! and firmware queries; the version response decides whether the device
//! is a light, which in turn selects a color query (lights) or a label
//! query (everything else). Only responses carrying this session's source
//! value are accepted.
//!
//! ## Units
//!
//! Hue is expressed in degrees, saturation and brightness as fractions in
//! `[0, 1]`. See [`hue_to_wire`] and [`fraction_to_wire`] for the mapping to
//! the 16-bit wire values.
//!
//! ## Runtime Selection
//!
//! Select the runtime behind [`Client`] with feature flags:
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime
//!
//! The [`Controller`] itself works without any runtime.

mod client;
mod config;
mod controller;
mod device;
mod discovery;
mod errors;
mod history;
pub mod packet;
pub mod products;
mod registry;
pub mod runtime;
mod sink;
mod types;

// Re-export public API
pub use client::Client;
pub use config::ControllerConfig;
pub use controller::{Controller, SERVICE_UDP};
pub use device::{Device, DeviceState, LightState};
pub use discovery::discover_devices;
pub use errors::{DecodeError, Error};
pub use history::{Direction, HistoryEntry, HistorySummary, PacketHistory};
pub use registry::{DeviceHandle, Registry};
pub use sink::{Clock, DeviceObserver, OutboundPacket, Outbox, PacketSink, SystemClock};
pub use types::{
    FirmwareVersion, Hsbk, Label, MacAddress, PowerLevel, WireColor, fraction_from_wire,
    fraction_to_wire, hue_from_wire, hue_to_wire,
};
