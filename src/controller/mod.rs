pub mod state;
pub mod upload;

pub use state::*;
pub use upload::*;
