//! Error types for the Caldron protocol layer.

mod tool;
mod worker;

pub use tool::*;
pub use worker::*;
