pub mod traits;
pub mod codec;
pub mod encoder;
pub mod decoder;

pub use traits::*;
pub use encoder::encode_call;
pub use decoder::decode_result;
