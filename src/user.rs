use crate::orm::users;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::prelude::Utc;
use rand::rngs::OsRng;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, FromQueryResult};

const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;

/// A mini struct for holding only what information we need about a client.
#[derive(Clone, Debug, FromQueryResult)]
pub struct ClientUser {
    pub id: i32,
    pub username: String,
}

pub async fn get_user_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Username.eq(name))
        .one(db)
        .await
}

/// Inserts a user with an already hashed password.
pub async fn insert_new_user(
    db: &DatabaseConnection,
    name: &str,
    password_hash: &str,
) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        username: Set(name.to_owned()),
        password: Set(password_hash.to_owned()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Hashes a password into a PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))?
        .to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(e) => {
            log::error!("verify_password: stored hash is unreadable: {}", e);
            false
        }
    }
}

/// Returns the user if the name and password match.
pub async fn authenticate(
    db: &DatabaseConnection,
    name: &str,
    password: &str,
) -> Result<Option<users::Model>, DbErr> {
    Ok(get_user_by_name(db, name)
        .await?
        .filter(|user| verify_password(password, &user.password)))
}

/// Checks sign-up input. Returns every problem found.
pub fn validate_new_user(name: &str, password: &str, confirmation: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if name.is_empty() || name.chars().count() > USERNAME_MAX_LEN {
        errors.push(format!(
            "Username must be between 1 and {} characters.",
            USERNAME_MAX_LEN
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push("Username may only contain letters, digits and @/./+/-/_.".to_owned());
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(format!(
            "Password must be at least {} characters.",
            PASSWORD_MIN_LEN
        ));
    }
    if password != confirmation {
        errors.push("Passwords do not match.".to_owned());
    }

    errors
}
