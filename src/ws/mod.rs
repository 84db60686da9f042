//! WebSocket transport for session observers

pub mod broadcast;
pub mod handler;
pub mod protocol;

pub use broadcast::Broadcaster;
