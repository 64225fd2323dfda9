// Method and event names exchanged over `/updates`.

// client -> server
pub const JOIN_UPDATES: &str = "JoinUpdates";
pub const LEAVE_UPDATES: &str = "LeaveUpdates";
pub const PING: &str = "ping";

// server -> client
pub const HELLO: &str = "hello";
pub const NEW_ITEMS_AVAILABLE: &str = "NewItemsAvailable";

// res error codes
pub const BAD_PARAMS: &str = "BAD_PARAMS";
pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";
