pub mod ids;
pub mod config;
pub mod corpus;
pub mod score;

pub use ids::*;
pub use config::*;
pub use corpus::*;
pub use score::*;
