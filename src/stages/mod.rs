pub mod stage0_segment;
pub mod stage1_align;
pub mod stage2_vocab;
pub mod stage3_render;

pub use stage0_segment::*;
pub use stage1_align::*;
pub use stage2_vocab::*;
pub use stage3_render::*;
