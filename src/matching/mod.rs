pub mod normalize;
pub mod remap;
pub mod similarity;

pub use normalize::*;
pub use remap::*;
pub use similarity::*;
