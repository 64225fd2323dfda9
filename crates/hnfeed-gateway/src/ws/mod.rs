pub mod connection;
pub mod dispatch;
pub mod send;
pub mod subscriber;
