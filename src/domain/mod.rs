pub mod comment;
pub mod post;
pub mod time_ago;
pub mod validation;
