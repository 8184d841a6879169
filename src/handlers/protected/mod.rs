// handlers/protected/mod.rs - Protected handlers (session required)
//
// Route prefix: /api/*. Every route here sits behind jwt_auth_middleware,
// authoring routes additionally behind require_instructor.
pub mod auth;
pub mod catalog;
pub mod enrollments;
pub mod progress;
pub mod reviews;
pub mod discussions;
