pub mod descriptor;
pub mod post;

pub use descriptor::ContractDescriptor;
pub use post::{Post, PostView};
