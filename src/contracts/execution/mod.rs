pub mod traits;
pub mod http_provider;
#[cfg(test)]
pub mod mock;

pub use traits::*;
pub use http_provider::HttpProvider;
