// handlers/protected/mod.rs - endpoints behind jwt_auth_middleware
//
// Every handler here can rely on an `AuthUser` extension being present.
pub mod applications;
pub mod attachments;
pub mod messages;
pub mod notifications;
pub mod preferences;
pub mod skills;
pub mod users;
