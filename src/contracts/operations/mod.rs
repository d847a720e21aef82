pub mod session;
pub mod network;
pub mod receipt;
pub mod client;

pub use client::SocialClient;
pub use network::ChainRegistration;
pub use receipt::{PendingTransaction, ReceiptPolicy, TransactionReceipt};
pub use session::Session;
