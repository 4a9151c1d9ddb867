pub mod assembler;
pub mod error;
pub mod models;
pub mod validate;
pub mod writer;

pub use error::StacError;
pub use validate::ValidationError;
