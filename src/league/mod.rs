pub mod roster;
pub mod runs;

pub use roster::{League, Team};
pub use runs::RunTable;
