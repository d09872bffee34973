pub mod content;
pub mod profile;
pub mod redirects;
pub mod site_config;

pub use self::content::{Comment, FeedbackEntry, NewComment, NewFeedback, NewsItem, Place};
pub use self::profile::{Identity, Profile, SessionTokens};
pub use self::redirects::RedirectCode;
pub use self::site_config::{AppConfig, ConfigError};
