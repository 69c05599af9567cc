//! Domain models shared across the client.

pub mod editor;
pub mod session;
pub mod usage;
