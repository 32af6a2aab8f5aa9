pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::*;
pub use config_loader::*;
pub use error::*;
pub use traits::*;
