pub mod auth_cmd;
pub mod common;
pub mod image;
pub mod notes;
pub mod status;
