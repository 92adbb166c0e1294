pub mod gateway;
pub mod signaling;

pub use gateway::{Gateway, GatewayEvent, RoomDirectory};
pub use signaling::{SignalingService, ws_handler};
