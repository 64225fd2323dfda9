//! Wire format of the `/updates` persistent connection.
//!
//! Every frame is a JSON object discriminated by `type`:
//!
//! | `type`  | Direction        | Purpose                               |
//! |---------|------------------|---------------------------------------|
//! | `req`   | client -> server | invoke a method (`JoinUpdates`, ...)  |
//! | `res`   | server -> client | answer to one `req`, matched by `id`  |
//! | `event` | server -> client | unsolicited push (`NewItemsAvailable`)|

pub mod frames;
pub mod hello;
pub mod methods;

pub use frames::{ErrorShape, EventFrame, Frame, FrameError, GroupParams, ReqFrame, ResFrame};
