use std::time::Duration;

use tokio::sync::mpsc::{channel, Sender};
use tokio::sync::oneshot;

use system::{ClientCommand, ConnectionId, RoomId, ServerEvent, ToolStateUpdate};

use crate::connection::ConnectionEvent;
use crate::connection_tx_storage::{ConnectionTx, ConnectionTxStorage};
use crate::server_state::{RoomMetadata, RoomRegistry};

/// Grace period before a memberless room is destroyed.
const EVICTION_GRACE: Duration = Duration::from_secs(30 * 60);

pub type ServerTx = Sender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    FromClient {
        from: ConnectionId,
        command: ClientCommand,
    },
    /// Sent to the server task by an eviction timer when the grace
    /// period elapses. Ignored unless the room is still empty and the
    /// epoch still matches.
    EvictionDue {
        room_id: RoomId,
        epoch: u64,
    },
    GetRoomMetadata {
        room_id: RoomId,
        tx: oneshot::Sender<Option<RoomMetadata>>,
    },
}

/// The single task owning all rooms. Every command — mutations, expiry
/// checks, metadata queries — is handled to completion here, which
/// serializes room access without per-room locks. Egress never blocks:
/// fan-out goes through `ConnectionTxStorage::send`, which drops on a
/// congested connection instead of stalling the room.
struct Server {
    registry: RoomRegistry,
    connections: ConnectionTxStorage,
    srv_tx: ServerTx,
}

impl Server {
    fn new(srv_tx: ServerTx) -> Self {
        Self {
            registry: RoomRegistry::new(),
            connections: ConnectionTxStorage::new(),
            srv_tx,
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connect { tx } => {
                let connection_id = self.registry.create_connection();
                self.connections.insert(connection_id, tx);
                self.connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id });
                log::info!("User connected: {}", connection_id);
            }
            ServerCommand::Disconnect { from } => {
                self.leave_room(&from);
                self.connections.remove(&from);
                log::info!("User disconnected: {}", from);
            }
            ServerCommand::FromClient { from, command } => {
                self.handle_client_command(&from, command)
            }
            ServerCommand::EvictionDue { room_id, epoch } => {
                if self.registry.evict_if_empty(&room_id, epoch) {
                    log::info!("Deleted empty room: {}", room_id);
                }
            }
            ServerCommand::GetRoomMetadata { room_id, tx } => {
                let _ = tx.send(self.registry.metadata(&room_id));
            }
        }
    }

    fn handle_client_command(&mut self, from: &ConnectionId, command: ClientCommand) {
        match command {
            ClientCommand::Join {
                room_id,
                username,
                width,
                height,
            } => self.join_room(from, room_id, username, width, height),
            ClientCommand::DrawPixel {
                x,
                y,
                color,
                timestamp,
            } => {
                if let Some(room_id) = self.joined_room(from) {
                    let room = self.registry.room_mut(&room_id).expect("room must exist");
                    if room.draw_pixel(x, y, color.clone()) {
                        self.broadcast(
                            &room_id,
                            ServerEvent::PixelDrawn {
                                user_id: *from,
                                x,
                                y,
                                color,
                                timestamp,
                            },
                            Some(from),
                        );
                    }
                }
            }
            ClientCommand::DrawPixels { pixels, timestamp } => {
                if let Some(room_id) = self.joined_room(from) {
                    let room = self.registry.room_mut(&room_id).expect("room must exist");
                    let accepted = room.draw_pixels(pixels);
                    if !accepted.is_empty() {
                        self.broadcast(
                            &room_id,
                            ServerEvent::PixelsDrawn {
                                user_id: *from,
                                pixels: accepted,
                                timestamp,
                            },
                            Some(from),
                        );
                    }
                }
            }
            ClientCommand::CursorMove { x, y } => {
                if let Some(room_id) = self.joined_room(from) {
                    let room = self.registry.room_mut(&room_id).expect("room must exist");
                    if room.presence.update_cursor(from, x, y) {
                        self.broadcast(
                            &room_id,
                            ServerEvent::CursorMoved {
                                user_id: *from,
                                x,
                                y,
                            },
                            Some(from),
                        );
                    }
                }
            }
            ClientCommand::UpdateUserState {
                active_color,
                active_layer,
                active_tool,
            } => {
                if let Some(room_id) = self.joined_room(from) {
                    let update = ToolStateUpdate {
                        active_color,
                        active_layer,
                        active_tool,
                    };
                    let room = self.registry.room_mut(&room_id).expect("room must exist");
                    // broadcast the resulting state, not the delta
                    if let Some(user) = room.presence.update_tool_state(from, update) {
                        let event = ServerEvent::UserStateUpdated {
                            user_id: *from,
                            active_color: user.active_color.clone(),
                            active_layer: user.active_layer,
                            active_tool: user.active_tool,
                        };
                        self.broadcast(&room_id, event, Some(from));
                    }
                }
            }
            ClientCommand::ClearCanvas => {
                if let Some(room_id) = self.joined_room(from) {
                    let room = self.registry.room_mut(&room_id).expect("room must exist");
                    room.clear();
                    self.broadcast(&room_id, ServerEvent::CanvasCleared, None);
                }
            }
            ClientCommand::Undo => {
                if let Some(room_id) = self.joined_room(from) {
                    let room = self.registry.room_mut(&room_id).expect("room must exist");
                    if let Some(pixels) = room.undo() {
                        self.broadcast(&room_id, ServerEvent::CanvasUpdated { pixels }, None);
                    }
                }
            }
        }
    }

    fn join_room(
        &mut self,
        from: &ConnectionId,
        room_id: RoomId,
        username: String,
        width: Option<u16>,
        height: Option<u16>,
    ) {
        // a connection belongs to at most one room at a time
        self.leave_room(from);

        let snapshot = self
            .registry
            .join(*from, room_id.clone(), username.clone(), width, height);
        let users = snapshot.users.len();
        self.connections.send(
            from,
            ConnectionEvent::Event(ServerEvent::RoomState {
                width: snapshot.width,
                height: snapshot.height,
                pixels: snapshot.pixels,
                users: snapshot.users,
            }),
        );
        self.broadcast(
            &room_id,
            ServerEvent::UserJoined {
                user_id: *from,
                username: username.clone(),
                users,
            },
            None,
        );
        log::info!("{} joined room: {}", username, room_id);
    }

    fn leave_room(&mut self, from: &ConnectionId) {
        if let Some((room_id, remaining)) = self.registry.leave(from) {
            self.broadcast(
                &room_id,
                ServerEvent::UserLeft {
                    user_id: *from,
                    users: remaining,
                },
                None,
            );
            if remaining == 0 {
                self.arm_eviction(room_id);
            }
        }
    }

    fn arm_eviction(&mut self, room_id: RoomId) {
        if let Some(epoch) = self.registry.arm_eviction(&room_id) {
            let mut tx = self.srv_tx.clone();
            tokio::spawn(async move {
                tokio::time::delay_for(EVICTION_GRACE).await;
                let _ = tx
                    .send(ServerCommand::EvictionDue { room_id, epoch })
                    .await;
            });
        }
    }

    /// Room the connection has joined, if any. Commands from room-less
    /// connections are silently ignored.
    fn joined_room(&self, from: &ConnectionId) -> Option<RoomId> {
        let room_id = self.registry.room_of(from).cloned();
        if room_id.is_none() {
            log::debug!("Ignoring command from room-less connection {}", from);
        }
        room_id
    }

    fn broadcast(&mut self, room_id: &str, event: ServerEvent, without: Option<&ConnectionId>) {
        for connection_id in self.registry.member_ids(room_id) {
            if without.map_or(false, |c| *c == connection_id) {
                continue;
            }
            self.connections
                .send(&connection_id, ConnectionEvent::Event(event.clone()));
        }
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(64);
    let timer_tx = srv_tx.clone();

    tokio::spawn(async move {
        let mut server = Server::new(timer_tx);

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
    });

    srv_tx
}
