pub mod error;
pub mod model;
pub mod test;
pub mod utility;
pub mod websocket;
