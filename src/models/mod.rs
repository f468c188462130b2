pub mod deepgram;
pub mod phrase;
pub mod segment;
pub mod vocab;
pub mod word;

pub use deepgram::*;
pub use phrase::*;
pub use segment::*;
pub use vocab::*;
pub use word::*;
