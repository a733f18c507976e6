pub mod calculators;
pub mod aggregators;
pub mod registry;
pub mod tokenize;

pub use calculators::*;
pub use aggregators::*;
pub use registry::*;
pub use tokenize::*;
