use crate::auth::{generate_jwt, Claims, Role};
use crate::config::config;

/// Prints an HS256 token signed with `JWT_SECRET`
pub fn handle(user_id: i64, role: String, hours: i64) -> anyhow::Result<()> {
    let claims = Claims::new(user_id, Role::from(role), hours);
    let token = generate_jwt(&claims, &config().security.jwt_secret)?;
    println!("{}", token);
    Ok(())
}
