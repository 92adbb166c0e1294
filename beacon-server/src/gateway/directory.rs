use beacon_core::ConnId;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Two-sided room membership bookkeeping.
///
/// Holds both the per-connection registry (connection -> joined room names)
/// and the room directory (room name -> member set). Every mutation goes
/// through this type, keeping the invariants: a connection is in a room's
/// member set exactly when the room is in the connection's membership set,
/// and a room exists only while it has at least one member.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<String, HashSet<ConnId>>,
    registry: HashMap<ConnId, HashSet<String>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty membership entry for a freshly accepted connection.
    pub fn register(&mut self, conn: ConnId) {
        self.registry.entry(conn).or_default();
    }

    /// Add `conn` to `room`, creating the room on first join. Joining a room
    /// twice is a no-op.
    pub fn join(&mut self, conn: ConnId, room: &str) {
        let members = self.rooms.entry(room.to_owned()).or_default();
        if members.insert(conn) {
            let total = members.len();
            self.registry
                .entry(conn)
                .or_default()
                .insert(room.to_owned());
            info!("client {} joined room \"{}\" (total: {})", conn, room, total);
        }
    }

    /// Remove `conn` from `room`, deleting the room once its member set
    /// empties. Leaving a room never joined is a no-op.
    pub fn leave(&mut self, conn: ConnId, room: &str) {
        if let Some(members) = self.rooms.get_mut(room)
            && members.remove(&conn)
        {
            if members.is_empty() {
                self.rooms.remove(room);
                info!("room \"{}\" deleted (empty)", room);
            } else {
                info!(
                    "client {} left room \"{}\" (remaining: {})",
                    conn,
                    room,
                    members.len()
                );
            }
        }

        if let Some(joined) = self.registry.get_mut(&conn) {
            joined.remove(room);
        }
    }

    /// Remove `conn` from every room it joined. Safe on a connection with an
    /// empty membership set.
    pub fn leave_all(&mut self, conn: ConnId) {
        let joined: Vec<String> = self
            .registry
            .get(&conn)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();

        for room in joined {
            self.leave(conn, &room);
        }
    }

    /// Tear a disconnected connection down: leave every room, then drop the
    /// registry entry itself.
    pub fn unregister(&mut self, conn: ConnId) {
        self.leave_all(conn);
        self.registry.remove(&conn);
    }

    /// Snapshot of a room's current members, or `None` if the room does not
    /// exist.
    pub fn members(&self, room: &str) -> Option<Vec<ConnId>> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
    }

    pub fn contains_room(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_registered(&self, conn: ConnId) -> bool {
        self.registry.contains_key(&conn)
    }

    /// Names of the rooms `conn` currently belongs to.
    pub fn rooms_of(&self, conn: ConnId) -> Vec<String> {
        self.registry
            .get(&conn)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }
}
