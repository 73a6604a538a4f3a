use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::database::models::{NewUser, User, UserRegistration, UserUpdate};
use crate::database::UserStore;

fn required(value: Option<String>, field: &'static str) -> ServiceResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::invalid(field, format!("{} is required", field)))
}

fn check_email(email: &str) -> ServiceResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ServiceError::invalid("email", "email is not a valid address")),
    }
}

pub fn validate_registration(registration: UserRegistration) -> ServiceResult<NewUser> {
    let user_id = registration
        .user_id
        .ok_or_else(|| ServiceError::invalid("userId", "userId is required"))?;
    let full_name = required(registration.full_name, "fullName")?;
    let email = required(registration.email, "email")?;
    check_email(&email)?;

    Ok(NewUser {
        user_id,
        full_name,
        gender: registration.gender,
        email,
        phone: registration.phone,
        location: registration.location,
        birth_date: registration.birth_date,
        pincode: registration.pincode,
    })
}

/// Duplicate emails surface as `Conflict` from the store
pub async fn register<S>(store: &S, registration: UserRegistration) -> ServiceResult<User>
where
    S: UserStore + ?Sized,
{
    let new_user = validate_registration(registration)?;
    let user = store.create_user(new_user).await?;
    info!("Registered user {}", user.user_id);
    Ok(user)
}

pub async fn get<S>(store: &S, user_id: i64) -> ServiceResult<User>
where
    S: UserStore + ?Sized,
{
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

pub async fn update<S>(store: &S, user_id: i64, changes: UserUpdate) -> ServiceResult<User>
where
    S: UserStore + ?Sized,
{
    if let Some(email) = &changes.email {
        check_email(email)?;
    }
    store
        .update_user(user_id, changes)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

pub async fn delete<S>(store: &S, user_id: i64) -> ServiceResult<()>
where
    S: UserStore + ?Sized,
{
    if store.delete_user(user_id).await? {
        info!("Deleted user {}", user_id);
        Ok(())
    } else {
        Err(ServiceError::not_found("User not found"))
    }
}
