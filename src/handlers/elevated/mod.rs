// handlers/elevated/mod.rs - Elevated handlers (ADMIN session required)
//
// Route prefix: /api/admin/*. Mounted behind jwt_auth_middleware and
// require_admin: no session is a 401, any other role a 403.
pub mod admin;
