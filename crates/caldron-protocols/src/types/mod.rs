//! Common types shared across the Caldron workspace.

mod destination;
mod message;
mod state;

pub use destination::*;
pub use message::*;
pub use state::*;
