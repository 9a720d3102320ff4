pub mod channel;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod issue_url;
pub mod metadata;
pub mod theme;

pub use channel::{ask, Channel, ChannelEvent};
pub use error::{Result, SubmitError};
pub use extract::extract_metadata;
pub use metadata::ToolMetadata;
pub use theme::Theme;
