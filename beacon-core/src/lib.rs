pub mod model;

pub use model::{ConnId, ProtocolError, SignalMessage};
