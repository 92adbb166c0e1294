mod conn;
mod signaling;

pub use conn::ConnId;
pub use signaling::{ProtocolError, SignalMessage};
