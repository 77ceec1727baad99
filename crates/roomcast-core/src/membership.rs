//! Room membership registry
//!
//! Authoritative mapping from room to attached connections. A connection is
//! placed in at most one room; every mutation goes through [`join`] and
//! [`leave`] so that invariant is enforced here and nowhere else.
//!
//! [`join`]: MembershipRegistry::join
//! [`leave`]: MembershipRegistry::leave

use crate::connection::{ConnectionHandle, ConnectionId};
use crate::room::RoomId;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MembershipRegistry {
    rooms: HashMap<RoomId, Vec<ConnectionHandle>>,
    placements: HashMap<ConnectionId, RoomId>,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a connection in `room_id`, leaving its previous room first.
    ///
    /// Returns the room that was left, if any. Re-joining the current room
    /// changes nothing.
    pub fn join(&mut self, handle: ConnectionHandle, room_id: &RoomId) -> Option<RoomId> {
        let id = handle.id();
        if self.placements.get(&id) == Some(room_id) {
            return None;
        }

        let previous = self.leave(id);
        self.rooms.entry(room_id.clone()).or_default().push(handle);
        self.placements.insert(id, room_id.clone());
        debug!(connection_id = %id, room_id = %room_id, "joined room");
        previous
    }

    /// Remove a connection from whatever room it occupies. No-op if none.
    pub fn leave(&mut self, connection_id: ConnectionId) -> Option<RoomId> {
        let room_id = self.placements.remove(&connection_id)?;
        self.remove_member(&room_id, connection_id);
        debug!(connection_id = %connection_id, room_id = %room_id, "left room");
        Some(room_id)
    }

    /// Remove a connection from `room_id` only if it is currently there
    pub fn leave_room(&mut self, connection_id: ConnectionId, room_id: &RoomId) -> bool {
        if self.placements.get(&connection_id) != Some(room_id) {
            return false;
        }
        self.leave(connection_id).is_some()
    }

    fn remove_member(&mut self, room_id: &RoomId, connection_id: ConnectionId) {
        if let Some(members) = self.rooms.get_mut(room_id) {
            if let Some(index) = members.iter().position(|m| m.id() == connection_id) {
                members.remove(index);
            }
            if members.is_empty() {
                self.rooms.remove(room_id);
            }
        }
    }

    /// Snapshot of a room's members, in join order
    pub fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionHandle> {
        self.rooms.get(room_id).cloned().unwrap_or_default()
    }

    pub fn room_of(&self, connection_id: ConnectionId) -> Option<&RoomId> {
        self.placements.get(&connection_id)
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, Vec::len)
    }

    /// Connections currently placed in some room
    pub fn connection_count(&self) -> usize {
        self.placements.len()
    }

    /// Rooms with at least one member
    pub fn occupied_rooms(&self) -> impl Iterator<Item = &RoomId> {
        self.rooms.keys()
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
        self.placements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> ConnectionHandle {
        ConnectionHandle::channel(ConnectionId::new(), 1).0
    }

    fn room(name: &str) -> RoomId {
        RoomId::parse(name).unwrap()
    }

    fn ids(members: &[ConnectionHandle]) -> Vec<ConnectionId> {
        members.iter().map(ConnectionHandle::id).collect()
    }

    #[test]
    fn test_join_then_leave() {
        let mut registry = MembershipRegistry::new();
        let c = handle();
        let r1 = room("r1");

        assert_eq!(registry.join(c.clone(), &r1), None);
        assert_eq!(ids(&registry.members_of(&r1)), vec![c.id()]);
        assert_eq!(registry.room_of(c.id()), Some(&r1));

        assert_eq!(registry.leave(c.id()), Some(r1.clone()));
        assert!(registry.members_of(&r1).is_empty());
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn test_join_moves_between_rooms() {
        let mut registry = MembershipRegistry::new();
        let c = handle();
        let r1 = room("r1");
        let r2 = room("r2");

        registry.join(c.clone(), &r1);
        assert_eq!(registry.join(c.clone(), &r2), Some(r1.clone()));

        assert!(registry.members_of(&r1).is_empty());
        assert_eq!(ids(&registry.members_of(&r2)), vec![c.id()]);
        assert_eq!(registry.connection_count(), 1);
    }

    #[test]
    fn test_rejoin_same_room_does_not_duplicate() {
        let mut registry = MembershipRegistry::new();
        let c = handle();
        let r = room("r");

        registry.join(c.clone(), &r);
        registry.join(c.clone(), &r);

        assert_eq!(registry.member_count(&r), 1);
    }

    #[test]
    fn test_leave_is_idempotent() {
        let mut registry = MembershipRegistry::new();
        let stranger = handle();
        let member = handle();
        let r = room("r");
        registry.join(member.clone(), &r);

        assert_eq!(registry.leave(stranger.id()), None);
        assert!(!registry.leave_room(stranger.id(), &r));
        assert_eq!(ids(&registry.members_of(&r)), vec![member.id()]);

        registry.leave(member.id());
        assert_eq!(registry.leave(member.id()), None);
    }

    #[test]
    fn test_leave_room_ignores_other_rooms() {
        let mut registry = MembershipRegistry::new();
        let c = handle();
        let r1 = room("r1");
        let r2 = room("r2");
        registry.join(c.clone(), &r1);

        assert!(!registry.leave_room(c.id(), &r2));
        assert_eq!(registry.room_of(c.id()), Some(&r1));
        assert!(registry.leave_room(c.id(), &r1));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = MembershipRegistry::new();
        let a = handle();
        let b = handle();
        let r = room("r");
        registry.join(a.clone(), &r);

        let snapshot = registry.members_of(&r);
        registry.join(b.clone(), &r);
        registry.leave(a.id());

        assert_eq!(ids(&snapshot), vec![a.id()]);
        assert_eq!(ids(&registry.members_of(&r)), vec![b.id()]);
    }
}
