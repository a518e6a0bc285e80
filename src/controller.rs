//! The protocol engine: turns received datagrams into registry updates and
//! follow-up queries, and builds outbound commands.

use std::net::{Ipv4Addr, SocketAddrV4};

use log::{debug, error};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::config::ControllerConfig;
use crate::device::Device;
use crate::history::{Direction, PacketHistory};
use crate::packet::{self, Message, MessageType, Packet};
use crate::registry::{DeviceHandle, Registry};
use crate::sink::{Clock, DeviceObserver, PacketSink, SystemClock};
use crate::types::{Hsbk, MacAddress, PowerLevel};

/// Service code for UDP, the only service this crate talks to.
pub const SERVICE_UDP: u8 = 1;

/// Owns the device registry and the session's source value.
///
/// The controller is synchronous and does no I/O of its own: every outbound
/// packet is handed to the [`PacketSink`] it was built with, and the caller
/// feeds every received datagram to [`Controller::handle_incoming`]. Calls
/// must be serialized by the caller.
///
/// # Example
///
/// ```
/// use lifx_lan_rs::{Controller, Outbox};
///
/// let mut controller = Controller::new(Outbox::new());
/// controller.discover();
///
/// let sent = controller.sink().packets();
/// assert_eq!(sent.len(), 1);
/// assert_eq!(sent[0].destination.to_string(), "255.255.255.255:56700");
/// ```
pub struct Controller<S: PacketSink> {
    config: ControllerConfig,
    registry: Registry,
    source: u32,
    sequence: u8,
    last_discovery: u64,
    sink: S,
    observer: Option<Box<dyn DeviceObserver + Send>>,
    clock: Box<dyn Clock + Send>,
    history: PacketHistory,
}

impl<S: PacketSink> Controller<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(ControllerConfig::default(), sink)
    }

    pub fn with_config(config: ControllerConfig, sink: S) -> Self {
        Controller {
            registry: Registry::with_capacity(config.max_devices),
            history: PacketHistory::with_max_entries(config.history_size),
            config,
            source: random_source(),
            sequence: 0,
            last_discovery: 0,
            sink,
            observer: None,
            clock: Box::new(SystemClock),
        }
    }

    /// Register a callback for device creation and updates.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: DeviceObserver + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + Send + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Use a fixed source value instead of a random one.
    pub fn with_source(mut self, source: u32) -> Self {
        self.source = source;
        self
    }

    /// Correlation value stamped on every outbound header.
    pub fn source(&self) -> u32 {
        self.source
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn history(&self) -> &PacketHistory {
        &self.history
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Broadcast a service query to every device on the link.
    pub fn discover(&mut self) {
        self.last_discovery = self.clock.now_ms();
        let destination = self.config.broadcast_target();
        self.transmit(None, destination, &Message::GetService);
    }

    /// Send a service query to a single host.
    pub fn discover_device(&mut self, ip: Ipv4Addr) {
        self.last_discovery = self.clock.now_ms();
        let destination = SocketAddrV4::new(ip, self.config.port);
        self.transmit(None, destination, &Message::GetService);
    }

    /// Process one received datagram.
    ///
    /// Returns the handle of the device the packet was accepted for, or `None`
    /// when it was dropped. Drops are never reported as errors.
    pub fn handle_incoming(&mut self, bytes: &[u8], from: SocketAddrV4) -> Option<DeviceHandle> {
        let now = self.clock.now_ms();
        let packet = match Packet::decode(bytes) {
            Ok(packet) => packet,
            Err(e) => {
                self.drop_packet(from, &e.to_string());
                return None;
            }
        };

        if packet.message_type() == MessageType::StateService.code() {
            return self.handle_announcement(&packet, from, now);
        }

        if packet.source() != self.source {
            self.drop_packet(from, &format!("foreign source {:#010x}", packet.source()));
            return None;
        }
        let mac = packet.mac();
        let Some(handle) = self.registry.find(&mac) else {
            self.drop_packet(from, &format!("unknown device {mac}"));
            return None;
        };

        let device = self.registry.get_mut(handle)?;
        device.touch(from, now);

        let message = match packet.message() {
            Ok(message) => message,
            Err(e) => {
                self.drop_packet(from, &e.to_string());
                return None;
            }
        };
        self.history
            .record(Direction::Receive, packet.message_type(), Some(mac), from);

        let device = self.registry.get_mut(handle)?;
        let follow_up = match message {
            Message::StateHostFirmware(firmware) => {
                device.set_firmware(firmware);
                None
            }
            Message::StateVersion { vendor, product } => {
                // a light's state response carries its label, so only
                // non-lights need the separate label query
                if device.set_version(vendor, product) {
                    Some(Message::GetColor)
                } else {
                    Some(Message::GetLabel)
                }
            }
            Message::StateLabel(label) => {
                device.set_label(label);
                None
            }
            Message::LightState {
                color,
                power,
                label,
            } => {
                device.set_light_state(&color, power, label);
                None
            }
            Message::StateLightPower(power) => {
                device.set_power(power);
                None
            }
            other => {
                debug!("ignoring {:?} from {mac}", other.message_type());
                None
            }
        };

        self.notify(handle, false);
        if let Some(message) = follow_up {
            self.send(handle, &message);
        }
        Some(handle)
    }

    fn handle_announcement(
        &mut self,
        packet: &Packet<'_>,
        from: SocketAddrV4,
        now: u64,
    ) -> Option<DeviceHandle> {
        let (service, port) = match packet.message() {
            Ok(Message::StateService { service, port }) => (service, port),
            Ok(_) => return None,
            Err(e) => {
                self.drop_packet(from, &e.to_string());
                return None;
            }
        };
        if service != SERVICE_UDP {
            self.drop_packet(from, &format!("unsupported service {service}"));
            return None;
        }

        let mac = packet.mac();
        let is_new = self.registry.find(&mac).is_none();
        let Some(handle) = self.registry.find_or_create(mac, true) else {
            self.drop_packet(from, &format!("registry full, ignoring {mac}"));
            return None;
        };

        let port = u16::try_from(port).unwrap_or(from.port());
        let latency = now as i64 - self.last_discovery as i64;
        let device = self.registry.get_mut(handle)?;
        device.announce(service, SocketAddrV4::new(*from.ip(), port), latency, now, is_new);
        self.history
            .record(Direction::Receive, packet.message_type(), Some(mac), from);
        debug!("{mac} announced at {from} ({latency}ms)");

        self.notify(handle, is_new);
        self.poll_system(handle);
        Some(handle)
    }

    /// Query version and host firmware.
    pub fn poll_system(&mut self, handle: DeviceHandle) {
        self.send(handle, &Message::GetVersion);
        self.send(handle, &Message::GetHostFirmware);
    }

    /// Query a light's color, power and label.
    pub fn poll_light(&mut self, handle: DeviceHandle) {
        self.send(handle, &Message::GetColor);
    }

    pub fn poll_light_power(&mut self, handle: DeviceHandle) {
        self.send(handle, &Message::GetLightPower);
    }

    pub fn poll_label(&mut self, handle: DeviceHandle) {
        self.send(handle, &Message::GetLabel);
    }

    /// Change a light's color over `duration_ms` milliseconds.
    ///
    /// Does nothing for unknown handles and for devices that are not lights.
    /// Saturation and brightness outside `[0, 1]` are not clamped; see
    /// [`crate::fraction_to_wire`].
    pub fn set_light_color(&mut self, handle: DeviceHandle, color: &Hsbk, duration_ms: u32) {
        if !self.is_light(handle) {
            debug!("set_light_color: {handle:?} is not a known light");
            return;
        }
        let message = Message::SetColor {
            color: color.to_wire(),
            duration_ms,
        };
        self.send(handle, &message);
    }

    /// Power a light on or off over `duration_ms` milliseconds.
    ///
    /// Does nothing for unknown handles and for devices that are not lights.
    pub fn set_light_power(&mut self, handle: DeviceHandle, powered: bool, duration_ms: u32) {
        if !self.is_light(handle) {
            debug!("set_light_power: {handle:?} is not a known light");
            return;
        }
        let message = Message::SetLightPower {
            level: PowerLevel::from(powered),
            duration_ms,
        };
        self.send(handle, &message);
    }

    /// True only for a known light whose last reported power is exactly 0xFFFF.
    pub fn is_powered(&self, handle: DeviceHandle) -> bool {
        self.device(handle).is_some_and(Device::is_powered)
    }

    pub fn count(&self) -> usize {
        self.registry.count()
    }

    pub fn device_by_index(&self, index: usize) -> Option<DeviceHandle> {
        self.registry.by_index(index)
    }

    pub fn device_by_mac(&self, mac: &MacAddress) -> Option<DeviceHandle> {
        self.registry.find(mac)
    }

    pub fn device(&self, handle: DeviceHandle) -> Option<&Device> {
        self.registry.get(handle)
    }

    /// Devices in discovery order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.registry.iter()
    }

    /// Returns diagnostics including the session, every device and history.
    pub fn diagnostics(&self) -> Value {
        let devices: Vec<Value> = self
            .devices()
            .map(|d| serde_json::to_value(d).unwrap_or(Value::Null))
            .collect();
        json!({
            "source": format!("{:#010x}", self.source),
            "device_count": self.registry.count(),
            "capacity": self.registry.capacity(),
            "devices": devices,
            "history": serde_json::to_value(self.history.summary()).unwrap_or(Value::Null),
        })
    }

    fn is_light(&self, handle: DeviceHandle) -> bool {
        self.device(handle).is_some_and(Device::is_light)
    }

    fn send(&mut self, handle: DeviceHandle, message: &Message) {
        let now = self.clock.now_ms();
        let Some(device) = self.registry.get_mut(handle) else {
            debug!("not sending {:?}: unknown handle {handle:?}", message.message_type());
            return;
        };
        device.mark_sent(now);
        let (mac, destination) = (device.mac(), device.address());
        self.transmit(Some(mac), destination, message);
    }

    fn transmit(&mut self, target: Option<MacAddress>, destination: SocketAddrV4, message: &Message) {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        match packet::encode(target, self.source, sequence, message) {
            Ok(bytes) => {
                self.history
                    .record(Direction::Send, message.code(), target, destination);
                self.sink.send_packet(&bytes, destination);
            }
            Err(e) => error!("failed to encode {:?}: {e}", message.message_type()),
        }
    }

    fn notify(&mut self, handle: DeviceHandle, is_new: bool) {
        if let (Some(observer), Some(device)) = (self.observer.as_mut(), self.registry.get(handle)) {
            observer.device_updated(device, is_new);
        }
    }

    fn drop_packet(&mut self, from: SocketAddrV4, reason: &str) {
        debug!("dropping packet from {from}: {reason}");
        self.history.record_drop(reason);
    }
}

/// Random non-zero session source. Zero would ask devices to broadcast their
/// responses.
fn random_source() -> u32 {
    (Uuid::new_v4().as_u128() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{HEADER_SIZE, decode};
    use crate::sink::Outbox;
    use crate::types::{FirmwareVersion, Label, WireColor};
    use crate::device::DeviceState;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    const SOURCE: u32 = 0x1234_5678;
    const LIGHT_PRODUCT: u32 = 27;
    const SWITCH_PRODUCT: u32 = 70;

    fn mac() -> MacAddress {
        MacAddress::new([0xd0, 0x73, 0xd5, 0xaa, 0xbb, 0xcc])
    }

    fn from() -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 40), 56700)
    }

    struct Harness {
        controller: Controller<Outbox>,
        clock: Arc<AtomicU64>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = Arc::new(AtomicU64::new(10_000));
            let tick = Arc::clone(&clock);
            let controller = Controller::new(Outbox::new())
                .with_source(SOURCE)
                .with_clock(move || tick.load(Ordering::SeqCst));
            Harness { controller, clock }
        }

        fn advance(&self, ms: u64) {
            self.clock.fetch_add(ms, Ordering::SeqCst);
        }

        /// Build a response from the device as it would appear on the wire.
        fn response(&self, source: u32, message: &Message) -> Vec<u8> {
            packet::encode(Some(mac()), source, 0, message).unwrap()
        }

        fn receive(&mut self, message: &Message) -> Option<DeviceHandle> {
            let bytes = self.response(SOURCE, message);
            self.controller.handle_incoming(&bytes, from())
        }

        fn sent_types(&mut self) -> Vec<u16> {
            self.controller
                .sink_mut()
                .take()
                .iter()
                .map(|p| decode(&p.bytes).unwrap().message_type())
                .collect()
        }

        fn announce(&mut self) -> DeviceHandle {
            let handle = self
                .receive(&Message::StateService {
                    service: SERVICE_UDP,
                    port: 56700,
                })
                .unwrap();
            self.controller.sink_mut().take();
            handle
        }

        fn announce_light(&mut self) -> DeviceHandle {
            let handle = self.announce();
            self.receive(&Message::StateVersion {
                vendor: 1,
                product: LIGHT_PRODUCT,
            });
            self.controller.sink_mut().take();
            handle
        }
    }

    #[test]
    fn test_discover_broadcasts_tagged_get_service() {
        let mut h = Harness::new();
        h.controller.discover();
        let sent = h.controller.sink_mut().take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, SocketAddrV4::new(Ipv4Addr::BROADCAST, 56700));

        let packet = decode(&sent[0].bytes).unwrap();
        assert!(packet.header.tagged);
        assert_eq!(packet.source(), SOURCE);
        assert_eq!(packet.message_type(), MessageType::GetService.code());
        assert_eq!(sent[0].bytes.len(), HEADER_SIZE);
    }

    #[test]
    fn test_directed_discovery() {
        let mut h = Harness::new();
        h.controller.discover_device(Ipv4Addr::new(10, 0, 0, 9));
        let sent = h.controller.sink_mut().take();
        assert_eq!(sent[0].destination, SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 9), 56700));
    }

    #[test]
    fn test_announcement_creates_device_and_polls_system() {
        let mut h = Harness::new();
        h.controller.discover();
        h.controller.sink_mut().take();
        h.advance(42);

        let handle = h
            .receive(&Message::StateService {
                service: SERVICE_UDP,
                port: 56701,
            })
            .unwrap();

        let device = h.controller.device(handle).unwrap();
        assert_eq!(device.mac(), mac());
        assert_eq!(device.address(), SocketAddrV4::new(*from().ip(), 56701));
        assert_eq!(device.service(), SERVICE_UDP);
        assert_eq!(device.latency(), 42);
        assert_eq!(device.first_update(), 10_042);
        assert_eq!(device.last_update(), 10_042);
        assert_eq!(device.state(), DeviceState::Announced);

        let sent = h.controller.sink_mut().take();
        assert_eq!(sent.len(), 2);
        let types: Vec<_> = sent
            .iter()
            .map(|p| {
                assert_eq!(p.destination, SocketAddrV4::new(*from().ip(), 56701));
                let packet = decode(&p.bytes).unwrap();
                assert!(!packet.header.tagged);
                assert_eq!(packet.mac(), mac());
                packet.message_type()
            })
            .collect();
        assert_eq!(
            types,
            vec![MessageType::GetVersion.code(), MessageType::GetHostFirmware.code()]
        );
    }

    #[test]
    fn test_announcement_accepted_from_foreign_source() {
        let mut h = Harness::new();
        let bytes = h.response(
            0xFFFF_0000,
            &Message::StateService {
                service: SERVICE_UDP,
                port: 56700,
            },
        );
        assert!(h.controller.handle_incoming(&bytes, from()).is_some());
        assert_eq!(h.controller.count(), 1);
    }

    #[test]
    fn test_non_udp_service_ignored() {
        let mut h = Harness::new();
        let handle = h.receive(&Message::StateService { service: 5, port: 56700 });
        assert!(handle.is_none());
        assert_eq!(h.controller.count(), 0);
        assert!(h.controller.sink().is_empty());
    }

    #[test]
    fn test_light_version_queries_color_only() {
        let mut h = Harness::new();
        let handle = h.announce();
        h.receive(&Message::StateVersion {
            vendor: 1,
            product: LIGHT_PRODUCT,
        });

        let device = h.controller.device(handle).unwrap();
        assert!(device.is_light());
        assert_eq!(device.product(), LIGHT_PRODUCT);
        assert_eq!(device.state(), DeviceState::Versioned);
        assert_eq!(h.sent_types(), vec![MessageType::GetColor.code()]);
    }

    #[test]
    fn test_non_light_version_queries_label_only() {
        let mut h = Harness::new();
        let handle = h.announce();
        h.receive(&Message::StateVersion {
            vendor: 1,
            product: SWITCH_PRODUCT,
        });

        assert!(!h.controller.device(handle).unwrap().is_light());
        assert_eq!(h.sent_types(), vec![MessageType::GetLabel.code()]);

        h.receive(&Message::StateLabel(Label::from("Hallway switch")));
        let device = h.controller.device(handle).unwrap();
        assert_eq!(device.label().as_str(), "Hallway switch");
        assert_eq!(device.state(), DeviceState::LabeledNonLight);
    }

    #[test]
    fn test_light_state_conversion() {
        let mut h = Harness::new();
        let handle = h.announce_light();
        h.receive(&Message::LightState {
            color: WireColor {
                hue: 0x8000,
                saturation: 0xFFFF,
                brightness: 0x7FFF,
                kelvin: 3500,
            },
            power: PowerLevel::ON,
            label: Label::from("Desk"),
        });

        let device = h.controller.device(handle).unwrap();
        let color = device.light_color().unwrap();
        assert_eq!(color.hue, 180.0);
        assert_eq!(color.saturation, 1.0);
        assert!((color.brightness - 0.4999).abs() < 1e-4);
        assert_eq!(color.kelvin, 3500);
        assert_eq!(device.label().as_str(), "Desk");
        assert_eq!(device.state(), DeviceState::LightReady);
        assert!(h.controller.is_powered(handle));
    }

    #[test]
    fn test_firmware_and_power_responses() {
        let mut h = Harness::new();
        let handle = h.announce_light();
        h.receive(&Message::StateHostFirmware(FirmwareVersion {
            build: 1_500_000_000,
            major: 3,
            minor: 70,
        }));
        h.receive(&Message::StateLightPower(PowerLevel::new(0x1234)));

        let device = h.controller.device(handle).unwrap();
        assert_eq!(device.firmware_major(), 3);
        assert_eq!(device.firmware_minor(), 70);
        assert_eq!(device.firmware().build, 1_500_000_000);
        assert_eq!(device.power(), Some(PowerLevel::new(0x1234)));
        assert!(!h.controller.is_powered(handle));
    }

    #[test]
    fn test_foreign_source_dropped_without_mutation() {
        let mut h = Harness::new();
        let handle = h.announce();
        let before = h.controller.device(handle).unwrap().clone();
        h.advance(500);

        let bytes = h.response(
            SOURCE ^ 1,
            &Message::StateVersion {
                vendor: 1,
                product: LIGHT_PRODUCT,
            },
        );
        let other = SocketAddrV4::new(Ipv4Addr::new(10, 9, 9, 9), 1234);
        assert!(h.controller.handle_incoming(&bytes, other).is_none());

        let after = h.controller.device(handle).unwrap();
        assert_eq!(after.product(), before.product());
        assert_eq!(after.last_update(), before.last_update());
        assert_eq!(after.address(), before.address());
        assert!(h.controller.sink().is_empty());
        assert_eq!(h.controller.history().summary().drop_count, 1);
    }

    #[test]
    fn test_unknown_device_dropped() {
        let mut h = Harness::new();
        assert!(h.receive(&Message::StateLabel(Label::from("ghost"))).is_none());
        assert_eq!(h.controller.count(), 0);
    }

    #[test]
    fn test_wrong_payload_size_dropped() {
        let mut h = Harness::new();
        let handle = h.announce_light();
        let bytes = packet::encode_raw(
            Some(mac()),
            SOURCE,
            0,
            MessageType::StateLightPower.code(),
            &[0xFF, 0xFF, 0x00],
        )
        .unwrap();
        assert!(h.controller.handle_incoming(&bytes, from()).is_none());
        assert_eq!(h.controller.device(handle).unwrap().power(), Some(PowerLevel::OFF));
    }

    #[test]
    fn test_size_field_mismatch_dropped() {
        let mut h = Harness::new();
        let mut bytes = h.response(
            SOURCE,
            &Message::StateService {
                service: SERVICE_UDP,
                port: 56700,
            },
        );
        bytes.push(0);
        assert!(h.controller.handle_incoming(&bytes, from()).is_none());
        assert_eq!(h.controller.count(), 0);
    }

    #[test]
    fn test_unrecognized_type_ignored() {
        let mut h = Harness::new();
        let handle = h.announce();
        let bytes =
            packet::encode_raw(Some(mac()), SOURCE, 0, MessageType::EchoResponse.code(), &[7; 64])
                .unwrap();
        assert_eq!(h.controller.handle_incoming(&bytes, from()), Some(handle));
        assert!(h.controller.sink().is_empty());
    }

    #[test]
    fn test_replayed_response_is_idempotent() {
        let mut h = Harness::new();
        let handle = h.announce_light();
        let message = Message::LightState {
            color: WireColor {
                hue: 1000,
                saturation: 2000,
                brightness: 3000,
                kelvin: 4000,
            },
            power: PowerLevel::OFF,
            label: Label::from("Porch"),
        };

        h.receive(&message);
        let once = serde_json::to_value(h.controller.device(handle).unwrap()).unwrap();
        h.receive(&message);
        let twice = serde_json::to_value(h.controller.device(handle).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_address_refreshed_on_accepted_packet() {
        let mut h = Harness::new();
        let handle = h.announce();
        let moved = SocketAddrV4::new(Ipv4Addr::new(192, 168, 2, 7), 50000);
        let bytes = h.response(SOURCE, &Message::StateLabel(Label::from("x")));
        h.advance(5);
        h.controller.handle_incoming(&bytes, moved);

        let device = h.controller.device(handle).unwrap();
        assert_eq!(device.address(), moved);
        assert_eq!(device.last_update(), 10_005);
    }

    #[test]
    fn test_registry_full_drops_announcement() {
        let config = ControllerConfig {
            max_devices: 1,
            ..Default::default()
        };
        let mut controller = Controller::with_config(config, Outbox::new()).with_source(SOURCE);
        for last in [1u8, 2] {
            let bytes = packet::encode(
                Some(MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, last])),
                SOURCE,
                0,
                &Message::StateService {
                    service: SERVICE_UDP,
                    port: 56700,
                },
            )
            .unwrap();
            controller.handle_incoming(&bytes, from());
        }
        assert_eq!(controller.count(), 1);
        assert_eq!(controller.sink().len(), 2);
    }

    #[test]
    fn test_set_light_color_encodes_wire_units() {
        let mut h = Harness::new();
        let handle = h.announce_light();
        h.controller
            .set_light_color(handle, &Hsbk::new(180.0, 0.5, 1.0, 2700), 1500);

        let sent = h.controller.sink_mut().take();
        assert_eq!(sent.len(), 1);
        let packet = decode(&sent[0].bytes).unwrap();
        assert_eq!(packet.mac(), mac());
        assert_eq!(
            packet.message().unwrap(),
            Message::SetColor {
                color: WireColor {
                    hue: 0x8000,
                    saturation: 32768,
                    brightness: 0xFFFF,
                    kelvin: 2700,
                },
                duration_ms: 1500,
            }
        );
        assert_eq!(h.controller.device(handle).unwrap().last_send(), 10_000);
    }

    #[test]
    fn test_set_light_power() {
        let mut h = Harness::new();
        let handle = h.announce_light();
        h.controller.set_light_power(handle, true, 0);
        h.controller.set_light_power(handle, false, 250);

        let levels: Vec<_> = h
            .controller
            .sink_mut()
            .take()
            .iter()
            .map(|p| decode(&p.bytes).unwrap().message().unwrap())
            .collect();
        assert_eq!(
            levels,
            vec![
                Message::SetLightPower {
                    level: PowerLevel::ON,
                    duration_ms: 0,
                },
                Message::SetLightPower {
                    level: PowerLevel::OFF,
                    duration_ms: 250,
                },
            ]
        );
    }

    #[test]
    fn test_commands_to_non_lights_are_noops() {
        let mut h = Harness::new();
        let handle = h.announce();
        h.receive(&Message::StateVersion {
            vendor: 1,
            product: SWITCH_PRODUCT,
        });
        h.controller.sink_mut().take();

        h.controller.set_light_power(handle, true, 0);
        h.controller
            .set_light_color(handle, &Hsbk::new(0.0, 1.0, 1.0, 3500), 0);
        assert!(h.controller.sink().is_empty());
        assert!(!h.controller.is_powered(handle));
    }

    #[test]
    fn test_handle_from_other_controller_is_rejected() {
        let mut h = Harness::new();
        let ours = h.announce_light();
        let mut other = Harness::new();
        let foreign = other.announce_light();
        assert_eq!(foreign.index(), ours.index());
        h.advance(100);

        assert!(h.controller.device(foreign).is_none());
        h.controller.poll_light(foreign);
        h.controller.set_light_power(foreign, true, 0);
        h.controller
            .set_light_color(foreign, &Hsbk::new(0.0, 1.0, 1.0, 3500), 0);
        assert!(h.controller.sink().is_empty());
        assert!(!h.controller.is_powered(foreign));
        assert_eq!(h.controller.device(ours).unwrap().last_send(), 10_000);
    }

    #[test]
    fn test_out_of_range_handle_is_rejected() {
        let mut h = Harness::new();
        h.announce_light();

        let mut elsewhere = Registry::with_capacity(2);
        elsewhere.find_or_create(MacAddress::new([1; 6]), true);
        let beyond = elsewhere
            .find_or_create(MacAddress::new([2; 6]), true)
            .unwrap();

        assert!(h.controller.device(beyond).is_none());
        assert!(h.controller.device_by_index(1).is_none());
        h.controller.poll_light(beyond);
        assert!(h.controller.sink().is_empty());
    }

    #[test]
    fn test_observer_sees_new_then_updates() {
        let seen: Arc<Mutex<Vec<(MacAddress, bool)>>> = Arc::default();
        let log = Arc::clone(&seen);
        let mut controller = Controller::new(Outbox::new())
            .with_source(SOURCE)
            .with_observer(move |device: &Device, is_new: bool| {
                log.lock().unwrap().push((device.mac(), is_new));
            });

        let service = Message::StateService {
            service: SERVICE_UDP,
            port: 56700,
        };
        for message in [&service, &service, &Message::StateLabel(Label::from("a"))] {
            let bytes = packet::encode(Some(mac()), SOURCE, 0, message).unwrap();
            controller.handle_incoming(&bytes, from());
        }

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(mac(), true), (mac(), false), (mac(), false)]
        );
    }

    #[test]
    fn test_sequence_numbers_increment() {
        let mut h = Harness::new();
        h.controller.discover();
        h.controller.discover();
        let sequences: Vec<_> = h
            .controller
            .sink_mut()
            .take()
            .iter()
            .map(|p| decode(&p.bytes).unwrap().header.sequence)
            .collect();
        assert_eq!(sequences, vec![0, 1]);
    }

    #[test]
    fn test_random_source_is_nonzero() {
        let controller = Controller::new(Outbox::new());
        assert_ne!(controller.source(), 0);
    }

    #[test]
    fn test_diagnostics_snapshot() {
        let mut h = Harness::new();
        h.announce_light();
        let diag = h.controller.diagnostics();
        assert_eq!(diag["device_count"], 1);
        assert_eq!(diag["source"], "0x12345678");
        assert_eq!(diag["devices"][0]["mac"], "d0:73:d5:aa:bb:cc");
        assert_eq!(diag["devices"][0]["state"], "Versioned");
    }
}
