pub mod error;
pub mod hub;
pub mod subscriber;

pub use error::HubError;
pub use hub::{BroadcastHub, PublishReport};
pub use subscriber::Subscriber;
