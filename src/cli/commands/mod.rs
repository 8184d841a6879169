pub mod admin;
pub mod auth;
pub mod courses;
pub mod learning;
pub mod server;
