// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Route prefix: /, /health, /auth/* and the read-only catalog and community
// listings under /api/*.
pub mod system;
pub mod auth;
pub mod catalog;
pub mod community;
pub mod enrollment;
