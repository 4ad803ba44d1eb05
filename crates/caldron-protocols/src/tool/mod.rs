//! Tool protocol definitions.
//!
//! Tools are the only way task workers reach the stores or any external
//! collaborator.

mod context;
mod definition;
mod result;
mod traits;

pub use context::*;
pub use definition::*;
pub use result::*;
pub use traits::*;
