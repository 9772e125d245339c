//! IR Inspector - Common Types and Errors
//! 
//! This crate contains the identifier types and the error definitions
//! shared by the IR model, the inspector core and the driver.

pub mod error;
pub mod types;

pub use error::IrError;
pub use types::*;
