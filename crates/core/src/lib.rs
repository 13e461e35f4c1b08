// crates/core/src/lib.rs
pub mod clock;
pub mod error;
pub mod types;
pub mod upstream;

pub use clock::*;
pub use error::*;
pub use types::*;
