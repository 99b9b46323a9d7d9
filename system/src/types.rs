pub type ConnectionId = u16;
pub type RoomId = String;
