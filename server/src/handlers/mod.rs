pub mod admin;
pub mod comments;
pub mod feedback;
pub mod news;
pub mod places;
pub mod routes;
pub mod setup_username;
pub mod utils;
