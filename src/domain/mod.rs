pub mod error;
pub mod failure;
pub mod mode;
pub mod model;
pub mod traits;
