pub mod domain;
pub mod error;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use traits::*;
pub use validation::*;
