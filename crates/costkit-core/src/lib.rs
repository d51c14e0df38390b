pub mod aggregate;
pub mod calc;
pub mod error;
pub mod pricing;
pub mod schema;

pub use aggregate::*;
pub use calc::*;
pub use error::*;
pub use pricing::*;
pub use schema::*;
