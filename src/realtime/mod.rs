// Realtime feed: per-connection broadcast rounds over WebSocket

pub mod manager;
pub mod protocol;

pub use manager::ConnectionManager;
pub use protocol::{ClientMessage, HistoryMessage, LocationMessage, ServerMessage};
