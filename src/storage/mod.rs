pub mod memory;

pub use memory::FeedStore;
