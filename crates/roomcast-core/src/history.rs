//! Bounded per-room message history
//!
//! Not synchronised on its own; [`RoomHub`](crate::hub::RoomHub) holds it
//! behind the same lock as the membership registry.

use crate::error::{RelayError, RelayResult};
use crate::message::Message;
use crate::room::RoomId;
use std::collections::{HashMap, VecDeque};

/// What happened to an appended message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Stored, buffer had room
    Stored,
    /// Stored after dropping the room's oldest message
    StoredWithEviction,
    /// Not stored: the room is new and the room limit is reached
    RoomCapExceeded,
}

impl AppendOutcome {
    pub fn is_stored(self) -> bool {
        !matches!(self, AppendOutcome::RoomCapExceeded)
    }
}

/// Per-room FIFO history with a room-count cap
#[derive(Debug)]
pub struct HistoryStore {
    rooms: HashMap<RoomId, VecDeque<Message>>,
    max_messages: usize,
    max_rooms: usize,
}

impl HistoryStore {
    pub fn new(max_messages: usize, max_rooms: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            max_messages: max_messages.max(1),
            max_rooms,
        }
    }

    /// Append to a room, creating it if the room limit allows
    pub fn append(&mut self, room_id: &RoomId, message: Message) -> AppendOutcome {
        if let Some(buffer) = self.rooms.get_mut(room_id) {
            let evicted = if buffer.len() >= self.max_messages {
                buffer.pop_front();
                true
            } else {
                false
            };
            buffer.push_back(message);
            return if evicted {
                AppendOutcome::StoredWithEviction
            } else {
                AppendOutcome::Stored
            };
        }

        if self.rooms.len() >= self.max_rooms {
            return AppendOutcome::RoomCapExceeded;
        }

        let mut buffer = VecDeque::with_capacity(self.max_messages.min(16));
        buffer.push_back(message);
        self.rooms.insert(room_id.clone(), buffer);
        AppendOutcome::Stored
    }

    /// Messages of a room, oldest first
    pub fn list(&self, room_id: &RoomId) -> RelayResult<Vec<Message>> {
        self.rooms
            .get(room_id)
            .map(|buffer| buffer.iter().cloned().collect())
            .ok_or_else(|| RelayError::RoomNotFound(room_id.clone()))
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Drop every room's history
    pub fn clear(&mut self) {
        self.rooms.clear();
    }

    pub fn count_rooms(&self) -> usize {
        self.rooms.len()
    }

    /// Zero for rooms that never received a message
    pub fn count_messages(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, VecDeque::len)
    }

    /// `(room, message count)` pairs sorted by room id
    pub fn room_counts(&self) -> Vec<(RoomId, usize)> {
        let mut counts: Vec<_> = self
            .rooms
            .iter()
            .map(|(room_id, buffer)| (room_id.clone(), buffer.len()))
            .collect();
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageDraft;

    fn room(name: &str) -> RoomId {
        RoomId::parse(name).unwrap()
    }

    fn message(room_id: &RoomId, text: &str) -> Message {
        Message::stamp(room_id.clone(), MessageDraft::new("tester").with_text(text))
    }

    fn texts(store: &HistoryStore, room_id: &RoomId) -> Vec<String> {
        store
            .list(room_id)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect()
    }

    #[test]
    fn test_fifo_eviction() {
        let mut store = HistoryStore::new(2, 10);
        let r = room("r");

        assert_eq!(store.append(&r, message(&r, "A")), AppendOutcome::Stored);
        assert_eq!(store.append(&r, message(&r, "B")), AppendOutcome::Stored);
        assert_eq!(
            store.append(&r, message(&r, "C")),
            AppendOutcome::StoredWithEviction
        );

        assert_eq!(texts(&store, &r), vec!["B", "C"]);
        assert_eq!(store.count_messages(&r), 2);
    }

    #[test]
    fn test_room_cap_blocks_only_new_rooms() {
        let mut store = HistoryStore::new(10, 1);
        let r1 = room("r1");
        let r2 = room("r2");

        assert!(store.append(&r1, message(&r1, "first")).is_stored());
        assert_eq!(
            store.append(&r2, message(&r2, "nope")),
            AppendOutcome::RoomCapExceeded
        );
        assert!(store.append(&r1, message(&r1, "second")).is_stored());

        assert_eq!(store.count_rooms(), 1);
        assert!(!store.contains(&r2));
        assert_eq!(texts(&store, &r1), vec!["first", "second"]);
    }

    #[test]
    fn test_list_unknown_room() {
        let store = HistoryStore::new(10, 10);
        let err = store.list(&room("ghost")).unwrap_err();
        assert_eq!(err, RelayError::RoomNotFound(room("ghost")));
        assert_eq!(store.count_messages(&room("ghost")), 0);
    }

    #[test]
    fn test_clear_and_counts() {
        let mut store = HistoryStore::new(10, 10);
        let b = room("b");
        let a = room("a");
        store.append(&b, message(&b, "1"));
        store.append(&a, message(&a, "1"));
        store.append(&a, message(&a, "2"));

        assert_eq!(store.room_counts(), vec![(a, 2), (b, 1)]);

        store.clear();
        assert_eq!(store.count_rooms(), 0);
        assert!(store.room_counts().is_empty());
    }
}
