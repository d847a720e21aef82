pub mod abi;
pub mod encoding;
pub mod execution;
pub mod operations;

pub use execution::{HttpProvider, WalletProvider};
pub use operations::SocialClient;
