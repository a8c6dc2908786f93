//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod bridge;
mod content;
mod window;

pub use bridge::*;
pub use content::*;
pub use window::*;
