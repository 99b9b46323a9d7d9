use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ConnectionId;

pub const DEFAULT_COLOR: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Brush,
    Eraser,
    Eyedropper,
    Fill,
    Line,
    Rectangle,
}

impl Default for Tool {
    fn default() -> Self {
        Tool::Brush
    }
}

/// Advisory pointer position. Not canvas-bounded; the display clamps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub cursor: Cursor,
    pub active_color: String,
    pub active_layer: i32,
    pub active_tool: Tool,
}

impl User {
    pub fn new(username: String) -> Self {
        Self {
            username,
            cursor: Cursor { x: 0, y: 0 },
            active_color: DEFAULT_COLOR.into(),
            active_layer: 0,
            active_tool: Tool::default(),
        }
    }
}

/// Partial tool-state update. `None` means "leave the field alone";
/// `Some(0)` for the layer is a real assignment, never a skip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStateUpdate {
    pub active_color: Option<String>,
    pub active_layer: Option<i32>,
    pub active_tool: Option<Tool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: ConnectionId,
    #[serde(flatten)]
    pub user: User,
}

/// Per-room mapping of connection → ephemeral user attributes. A record
/// exists here iff the connection is currently a member of the room.
#[derive(Debug, Clone, Default)]
pub struct PresenceTable {
    users: HashMap<ConnectionId, User>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, connection_id: ConnectionId, username: String) {
        self.users.insert(connection_id, User::new(username));
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&User> {
        self.users.get(connection_id)
    }

    pub fn update_cursor(&mut self, connection_id: &ConnectionId, x: i32, y: i32) -> bool {
        match self.users.get_mut(connection_id) {
            Some(user) => {
                user.cursor = Cursor { x, y };
                true
            }
            None => false,
        }
    }

    /// Applies the present fields of `update`, returning the resulting
    /// record for broadcast.
    pub fn update_tool_state(
        &mut self,
        connection_id: &ConnectionId,
        update: ToolStateUpdate,
    ) -> Option<&User> {
        let user = self.users.get_mut(connection_id)?;
        if let Some(color) = update.active_color {
            user.active_color = color;
        }
        if let Some(layer) = update.active_layer {
            user.active_layer = layer;
        }
        if let Some(tool) = update.active_tool {
            user.active_tool = tool;
        }
        Some(user)
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<User> {
        self.users.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Member list ordered by connection id, for `room-state`.
    pub fn snapshot(&self) -> Vec<UserSnapshot> {
        let mut users: Vec<UserSnapshot> = self
            .users
            .iter()
            .map(|(&id, user)| UserSnapshot {
                id,
                user: user.clone(),
            })
            .collect();
        users.sort_unstable_by_key(|u| u.id);
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_initializes_users_with_defaults() {
        let mut presence = PresenceTable::new();
        presence.insert(1, "kim".into());

        let user = presence.get(&1).expect("must exist");
        assert_eq!(user.cursor, Cursor { x: 0, y: 0 });
        assert_eq!(user.active_color, DEFAULT_COLOR);
        assert_eq!(user.active_layer, 0);
        assert_eq!(user.active_tool, Tool::Brush);
    }

    #[test]
    fn it_applies_explicit_zero_layer() {
        let mut presence = PresenceTable::new();
        presence.insert(1, "kim".into());
        presence.update_tool_state(
            &1,
            ToolStateUpdate {
                active_layer: Some(3),
                ..Default::default()
            },
        );
        presence.update_tool_state(
            &1,
            ToolStateUpdate {
                active_layer: Some(0),
                ..Default::default()
            },
        );
        assert_eq!(presence.get(&1).expect("must exist").active_layer, 0);
    }

    #[test]
    fn it_keeps_omitted_fields() {
        let mut presence = PresenceTable::new();
        presence.insert(1, "kim".into());
        presence.update_tool_state(
            &1,
            ToolStateUpdate {
                active_color: Some("#ff0000".into()),
                active_tool: Some(Tool::Fill),
                ..Default::default()
            },
        );
        let user = presence
            .update_tool_state(
                &1,
                ToolStateUpdate {
                    active_layer: Some(2),
                    ..Default::default()
                },
            )
            .expect("must exist");
        assert_eq!(user.active_color, "#ff0000");
        assert_eq!(user.active_tool, Tool::Fill);
        assert_eq!(user.active_layer, 2);
    }

    #[test]
    fn it_tracks_membership() {
        let mut presence = PresenceTable::new();
        presence.insert(2, "b".into());
        presence.insert(1, "a".into());
        assert_eq!(presence.len(), 2);
        assert_eq!(presence.connection_ids(), vec![1, 2]);

        presence.remove(&1);
        assert!(!presence.update_cursor(&1, 5, 5));
        assert_eq!(presence.len(), 1);
    }

    #[test]
    fn cursor_accepts_out_of_canvas_positions() {
        let mut presence = PresenceTable::new();
        presence.insert(1, "kim".into());
        assert!(presence.update_cursor(&1, -20, 9999));
        assert_eq!(
            presence.get(&1).expect("must exist").cursor,
            Cursor { x: -20, y: 9999 }
        );
    }
}
