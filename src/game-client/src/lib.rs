pub mod command;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod identity;
pub mod projection;
pub mod reducer;
pub mod render;
pub mod session;
pub mod state;
pub mod store;
pub mod strategy;

#[cfg(test)]
mod scenario;
