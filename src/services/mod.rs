pub mod events;
pub mod feed;
pub mod social;

pub use events::DisplayEvent;
pub use social::SocialService;
