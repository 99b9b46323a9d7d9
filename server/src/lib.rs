pub mod connection;
pub mod connection_tx_storage;
pub mod handlers;
pub mod room;
pub mod server;
pub mod server_state;
