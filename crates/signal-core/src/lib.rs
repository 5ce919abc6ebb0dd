pub mod assets;
pub mod error;
pub mod types;

pub use assets::*;
pub use error::*;
pub use types::*;
