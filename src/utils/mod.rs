pub mod display;
pub mod notes;

pub use display::*;
pub use notes::{DebugLog, Notes};
