//! Packet history tracking for debugging and diagnostics.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddrV4;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::packet::MessageType;
use crate::types::MacAddress;

/// Direction of a recorded packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Send,
    Receive,
}

/// A recorded packet in the history.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub direction: Direction,
    pub message_type: u16,
    pub name: Option<MessageType>,
    /// Absent for broadcast packets.
    pub mac: Option<MacAddress>,
    pub address: SocketAddrV4,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Bounded log of the packets a controller sent and accepted.
#[derive(Debug, Clone)]
pub struct PacketHistory {
    counts: HashMap<Direction, usize>,
    dropped: usize,
    last_error: Option<String>,
    start_time: Instant,
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
}

impl Default for PacketHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self::with_max_entries(Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            counts: HashMap::from([(Direction::Send, 0), (Direction::Receive, 0)]),
            dropped: 0,
            last_error: None,
            start_time: Instant::now(),
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    pub fn record(
        &mut self,
        direction: Direction,
        message_type: u16,
        mac: Option<MacAddress>,
        address: SocketAddrV4,
    ) {
        *self.counts.entry(direction).or_default() += 1;

        self.entries.push_back(HistoryEntry {
            direction,
            message_type,
            name: MessageType::from_code(message_type),
            mac,
            address,
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Count a dropped inbound packet and remember why.
    pub fn record_drop(&mut self, reason: &str) {
        self.dropped += 1;
        self.last_error = Some(reason.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.values_mut().for_each(|c| *c = 0);
        self.entries.clear();
        self.dropped = 0;
        self.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        let count = |d: Direction| self.counts.get(&d).copied().unwrap_or(0);
        HistorySummary {
            send_count: count(Direction::Send),
            receive_count: count(Direction::Receive),
            drop_count: self.dropped,
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Summary of packet history for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub send_count: usize,
    pub receive_count: usize,
    pub drop_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addr() -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 5), 56700)
    }

    #[test]
    fn test_record_packet() {
        let mut history = PacketHistory::new();
        history.record(Direction::Send, 2, None, addr());

        assert_eq!(history.len(), 1);
        let entry = history.entries().next().unwrap();
        assert_eq!(entry.name, Some(MessageType::GetService));
    }

    #[test]
    fn test_record_drop() {
        let mut history = PacketHistory::new();
        history.record_drop("foreign source");
        assert_eq!(history.last_error(), Some("foreign source"));
        assert_eq!(history.summary().drop_count, 1);
    }

    #[test]
    fn test_max_entries() {
        let mut history = PacketHistory::with_max_entries(2);
        for code in 0..5 {
            history.record(Direction::Receive, code, None, addr());
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.summary().receive_count, 5);
        assert_eq!(history.entries().next().unwrap().message_type, 3);
    }

    #[test]
    fn test_broadcast_entry_omits_mac() {
        let mut history = PacketHistory::new();
        history.record(Direction::Send, 2, None, addr());
        let json = serde_json::to_value(history.entries().next().unwrap()).unwrap();
        assert!(json.get("mac").is_none());
        assert_eq!(json["name"], "GetService");
    }
}
