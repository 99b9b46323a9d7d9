use serde::{Deserialize, Serialize};

use crate::{ConnectionId, Pixel, RoomId, Tool, UserSnapshot};

/// Commands a client may send over its WebSocket, tagged by `type` with
/// the wire names of the protocol (`join`, `draw-pixel`, ...). Everything
/// except `join` is interpreted against the room the connection has
/// already joined; a command from a room-less connection is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    Join {
        room_id: RoomId,
        username: String,
        width: Option<u16>,
        height: Option<u16>,
    },
    DrawPixel {
        x: u16,
        y: u16,
        color: String,
        #[serde(default)]
        timestamp: u64,
    },
    DrawPixels {
        pixels: Vec<Pixel>,
        #[serde(default)]
        timestamp: u64,
    },
    CursorMove {
        x: i32,
        y: i32,
    },
    #[serde(rename_all = "camelCase")]
    UpdateUserState {
        active_color: Option<String>,
        active_layer: Option<i32>,
        active_tool: Option<Tool>,
    },
    ClearCanvas,
    Undo,
}

/// Notifications fanned out to the members of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Reply to `join`, sent to the joiner only.
    RoomState {
        width: u16,
        height: u16,
        pixels: Vec<Pixel>,
        users: Vec<UserSnapshot>,
    },
    #[serde(rename_all = "camelCase")]
    UserJoined {
        user_id: ConnectionId,
        username: String,
        users: usize,
    },
    #[serde(rename_all = "camelCase")]
    PixelDrawn {
        user_id: ConnectionId,
        x: u16,
        y: u16,
        color: String,
        timestamp: u64,
    },
    #[serde(rename_all = "camelCase")]
    PixelsDrawn {
        user_id: ConnectionId,
        pixels: Vec<Pixel>,
        timestamp: u64,
    },
    #[serde(rename_all = "camelCase")]
    CursorMoved {
        user_id: ConnectionId,
        x: i32,
        y: i32,
    },
    #[serde(rename_all = "camelCase")]
    UserStateUpdated {
        user_id: ConnectionId,
        active_color: String,
        active_layer: i32,
        active_tool: Tool,
    },
    CanvasCleared,
    /// Full recomputed pixel set after an undo; an arbitrary number of
    /// cells may have changed, so no diff is attempted.
    CanvasUpdated {
        pixels: Vec<Pixel>,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft {
        user_id: ConnectionId,
        users: usize,
    },
}
