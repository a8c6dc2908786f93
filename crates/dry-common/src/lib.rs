pub mod errors;
pub mod id;

pub use errors::{ConfigError, DecodeError, DispatchError, DryError, EncodeError, TransportError};
pub use id::{new_id, SessionId};

pub type Result<T> = std::result::Result<T, DryError>;
