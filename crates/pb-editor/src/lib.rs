pub mod history;
pub mod input;
pub mod interaction;
pub mod session;

pub use history::{DEFAULT_HISTORY_DEPTH, History};
pub use input::{InputEvent, Viewport};
pub use interaction::{Controller, Interaction, MOVE_THRESHOLD, Release};
pub use session::Session;
