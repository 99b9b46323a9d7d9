use std::collections::HashMap;
use std::num::Wrapping;

use serde::Serialize;
use system::{ConnectionId, Pixel, RoomId, UserSnapshot};

use crate::room::Room;

pub const DEFAULT_CANVAS_SIZE: u16 = 32;

/// Everything a joiner needs to render the room.
#[derive(Debug)]
pub struct RoomSnapshot {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<Pixel>,
    pub users: Vec<UserSnapshot>,
}

/// Read-only room metadata for the HTTP query endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMetadata {
    pub room_id: RoomId,
    pub users: usize,
    pub width: u16,
    pub height: u16,
}

/// Owns every room and the explicit connection → room binding. Rooms are
/// created lazily on first join and destroyed only by an eviction timer
/// that re-validates emptiness; the registry itself never blocks.
pub struct RoomRegistry {
    connection_id_source: Wrapping<ConnectionId>,
    connection_rooms: HashMap<ConnectionId, RoomId>,
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connection_rooms: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    pub fn create_connection(&mut self) -> ConnectionId {
        self.connection_id_source += Wrapping(1);
        self.connection_id_source.0
    }

    /// Adds the connection to the room, creating it on first join with
    /// the requested dimensions (default 32×32, zero treated as absent).
    /// Later joiners never alter the dimensions. Any pending eviction is
    /// cancelled by bumping the epoch.
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        room_id: RoomId,
        username: String,
        width: Option<u16>,
        height: Option<u16>,
    ) -> RoomSnapshot {
        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            let width = width.filter(|&w| w > 0).unwrap_or(DEFAULT_CANVAS_SIZE);
            let height = height.filter(|&h| h > 0).unwrap_or(DEFAULT_CANVAS_SIZE);
            log::info!("Created room {} ({}x{})", room_id, width, height);
            Room::new(width, height)
        });
        room.eviction.armed = false;
        room.eviction.epoch += 1;
        room.presence.insert(connection_id, username);
        self.connection_rooms.insert(connection_id, room_id);
        RoomSnapshot {
            width: room.canvas.width(),
            height: room.canvas.height(),
            pixels: room.canvas.snapshot(),
            users: room.presence.snapshot(),
        }
    }

    /// Removes the connection from its room, if any. Returns the room id
    /// and the remaining member count; the caller decides whether to arm
    /// eviction. The room itself is kept so a rejoin within the grace
    /// period finds its pixels intact.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<(RoomId, usize)> {
        let room_id = self.connection_rooms.remove(connection_id)?;
        let room = self.rooms.get_mut(&room_id)?;
        room.presence.remove(connection_id);
        Some((room_id, room.presence.len()))
    }

    /// Arms the eviction timer for an empty room. Idempotent: `None`
    /// while already armed, or when the room is missing or populated.
    /// The returned epoch must accompany the expiry message.
    pub fn arm_eviction(&mut self, room_id: &str) -> Option<u64> {
        let room = self.rooms.get_mut(room_id)?;
        if room.eviction.armed || !room.presence.is_empty() {
            return None;
        }
        room.eviction.armed = true;
        room.eviction.epoch += 1;
        Some(room.eviction.epoch)
    }

    /// Destroys the room only if it is still armed with the same epoch
    /// and still empty — a join during the grace period must win.
    pub fn evict_if_empty(&mut self, room_id: &str, epoch: u64) -> bool {
        let due = match self.rooms.get(room_id) {
            Some(room) => {
                room.eviction.armed && room.eviction.epoch == epoch && room.presence.is_empty()
            }
            None => false,
        };
        if due {
            self.rooms.remove(room_id);
        }
        due
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.connection_rooms.get(connection_id)
    }

    pub fn room_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    pub fn member_ids(&self, room_id: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|room| room.presence.connection_ids())
            .unwrap_or_default()
    }

    pub fn metadata(&self, room_id: &str) -> Option<RoomMetadata> {
        self.rooms.get(room_id).map(|room| RoomMetadata {
            room_id: room_id.to_string(),
            users: room.presence.len(),
            width: room.canvas.width(),
            height: room.canvas.height(),
        })
    }
}
