// handlers/public/mod.rs - endpoints reachable without a session
pub mod attachments;
pub mod health;
