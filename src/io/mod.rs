pub mod analysis;
pub mod input;
pub mod output;

pub use analysis::*;
pub use input::*;
pub use output::*;
