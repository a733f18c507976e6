pub mod evaluator;
pub mod writer;

pub use evaluator::*;
pub use writer::*;
