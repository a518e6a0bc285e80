//! Capabilities the controller is constructed with: an outbound packet sink,
//! an optional device observer and a clock.

use std::net::SocketAddrV4;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::device::Device;

/// Receives every encoded outbound packet, unicast or broadcast.
pub trait PacketSink {
    fn send_packet(&mut self, packet: &[u8], destination: SocketAddrV4);
}

impl<F> PacketSink for F
where
    F: FnMut(&[u8], SocketAddrV4),
{
    fn send_packet(&mut self, packet: &[u8], destination: SocketAddrV4) {
        self(packet, destination)
    }
}

/// Notified after a device record is created or updated.
pub trait DeviceObserver {
    /// `is_new` is set only when the record was just created.
    fn device_updated(&mut self, device: &Device, is_new: bool);
}

impl<F> DeviceObserver for F
where
    F: FnMut(&Device, bool),
{
    fn device_updated(&mut self, device: &Device, is_new: bool) {
        self(device, is_new)
    }
}

/// Source of wall-clock time in unix milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

impl<F> Clock for F
where
    F: Fn() -> u64,
{
    fn now_ms(&self) -> u64 {
        self()
    }
}

/// A packet waiting to be written to the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPacket {
    pub bytes: Vec<u8>,
    pub destination: SocketAddrV4,
}

/// [`PacketSink`] that queues packets until the owner drains them.
///
/// Used by [`crate::Client`] to bridge the synchronous engine to an async
/// socket, and handy in tests to inspect what the engine sent.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: Vec<OutboundPacket>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packets(&self) -> &[OutboundPacket] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Remove and return everything queued so far.
    pub fn take(&mut self) -> Vec<OutboundPacket> {
        std::mem::take(&mut self.queue)
    }
}

impl PacketSink for Outbox {
    fn send_packet(&mut self, packet: &[u8], destination: SocketAddrV4) {
        self.queue.push(OutboundPacket {
            bytes: packet.to_vec(),
            destination,
        });
    }
}
