pub mod comments;
pub mod gate;
pub mod posts;
