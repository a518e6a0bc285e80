//! Per-device record and the discovery progression it goes through.

use std::net::{Ipv4Addr, SocketAddrV4};

use serde::Serialize;
use strum_macros::Display;

use crate::products;
use crate::types::{FirmwareVersion, Hsbk, Label, MacAddress, PowerLevel, WireColor};

/// How far the information-gathering sequence has progressed for a device.
///
/// Derived from which responses have arrived. There is no terminal state;
/// records keep receiving updates for as long as packets arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum DeviceState {
    /// Address and service known.
    Announced,
    /// Vendor and product known, light-ness derived.
    Versioned,
    /// A light whose color and power are known.
    LightReady,
    /// A non-light whose label is known.
    LabeledNonLight,
}

/// Last known color and power of a light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LightState {
    pub color: Hsbk,
    pub power: PowerLevel,
}

/// Everything known about one device, identified by its MAC address.
///
/// Fields are zero until the corresponding response arrives, so "no data
/// yet" and a genuine zero cannot be told apart.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    mac: MacAddress,
    address: SocketAddrV4,
    service: u8,
    vendor: u32,
    product: u32,
    is_light: bool,
    firmware: FirmwareVersion,
    label: Label,
    light: LightState,
    latency: i64,
    first_update: u64,
    last_update: u64,
    last_send: u64,
    state: DeviceState,
    #[serde(skip)]
    labeled: bool,
    #[serde(skip)]
    light_known: bool,
    #[serde(skip)]
    versioned: bool,
}

impl Device {
    pub(crate) fn new(mac: MacAddress) -> Self {
        Device {
            mac,
            address: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
            service: 0,
            vendor: 0,
            product: 0,
            is_light: false,
            firmware: FirmwareVersion::default(),
            label: Label::default(),
            light: LightState::default(),
            latency: 0,
            first_update: 0,
            last_update: 0,
            last_send: 0,
            state: DeviceState::Announced,
            labeled: false,
            light_known: false,
            versioned: false,
        }
    }

    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    pub fn address(&self) -> SocketAddrV4 {
        self.address
    }

    pub fn ipv4(&self) -> Ipv4Addr {
        *self.address.ip()
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }

    pub fn service(&self) -> u8 {
        self.service
    }

    pub fn vendor(&self) -> u32 {
        self.vendor
    }

    pub fn product(&self) -> u32 {
        self.product
    }

    pub fn product_name(&self) -> &'static str {
        products::name_for(self.product)
    }

    /// Meaningless until the version response has arrived.
    pub fn is_light(&self) -> bool {
        self.is_light
    }

    pub fn firmware(&self) -> FirmwareVersion {
        self.firmware
    }

    pub fn firmware_major(&self) -> u16 {
        self.firmware.major
    }

    pub fn firmware_minor(&self) -> u16 {
        self.firmware.minor
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Milliseconds between the latest discovery request and this device's
    /// announcement.
    pub fn latency(&self) -> i64 {
        self.latency
    }

    pub fn first_update(&self) -> u64 {
        self.first_update
    }

    pub fn last_update(&self) -> u64 {
        self.last_update
    }

    pub fn last_send(&self) -> u64 {
        self.last_send
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Current color, or `None` for devices that are not lights.
    pub fn light_color(&self) -> Option<Hsbk> {
        self.is_light.then_some(self.light.color)
    }

    /// Raw power level, or `None` for devices that are not lights.
    pub fn power(&self) -> Option<PowerLevel> {
        self.is_light.then_some(self.light.power)
    }

    /// True only for lights at exactly full power.
    pub fn is_powered(&self) -> bool {
        self.is_light && self.light.power.is_powered()
    }

    pub(crate) fn announce(
        &mut self,
        service: u8,
        address: SocketAddrV4,
        latency: i64,
        now: u64,
        is_new: bool,
    ) {
        if is_new {
            self.first_update = now;
        }
        self.service = service;
        self.address = address;
        self.latency = latency;
        self.last_update = now;
    }

    pub(crate) fn touch(&mut self, address: SocketAddrV4, now: u64) {
        self.address = address;
        self.last_update = now;
    }

    pub(crate) fn mark_sent(&mut self, now: u64) {
        self.last_send = now;
    }

    pub(crate) fn set_firmware(&mut self, firmware: FirmwareVersion) {
        self.firmware = firmware;
    }

    /// Returns whether the product is a light.
    pub(crate) fn set_version(&mut self, vendor: u32, product: u32) -> bool {
        self.vendor = vendor;
        self.product = product;
        self.is_light = products::is_light(product);
        self.versioned = true;
        self.refresh_state();
        self.is_light
    }

    pub(crate) fn set_label(&mut self, label: Label) {
        self.label = label;
        self.labeled = true;
        self.refresh_state();
    }

    pub(crate) fn set_light_state(&mut self, color: &WireColor, power: PowerLevel, label: Label) {
        self.light = LightState {
            color: Hsbk::from_wire(color),
            power,
        };
        self.label = label;
        self.labeled = true;
        self.light_known = true;
        self.refresh_state();
    }

    pub(crate) fn set_power(&mut self, power: PowerLevel) {
        self.light.power = power;
    }

    fn refresh_state(&mut self) {
        self.state = match (self.versioned, self.is_light) {
            (false, _) => DeviceState::Announced,
            (true, true) if self.light_known => DeviceState::LightReady,
            (true, false) if self.labeled => DeviceState::LabeledNonLight,
            (true, _) => DeviceState::Versioned,
        };
    }
}
