pub mod page;
pub mod scoreboard;

pub use page::{render_page, Flash, FormView};
pub use scoreboard::Scoreboard;
