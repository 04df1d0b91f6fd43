use crate::orm::{sessions, users};
use crate::user::ClientUser;
use actix_session::Session;
use chrono::prelude::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

/// Key of the session token inside the cookie session.
const TOKEN_KEY: &str = "token";

/// Creates a session row for the user and returns its token.
pub async fn new_session(
    db: &DatabaseConnection,
    user_id: i32,
    session_time: chrono::Duration,
) -> Result<Uuid, DbErr> {
    let uuid = Uuid::new_v4();

    sessions::Entity::insert(sessions::ActiveModel {
        id: Set(uuid.to_string()),
        user_id: Set(user_id),
        expires_at: Set(Utc::now().naive_utc() + session_time),
    })
    .exec(db)
    .await?;

    Ok(uuid)
}

pub async fn remove_session(db: &DatabaseConnection, uuid: Uuid) -> Result<(), DbErr> {
    sessions::Entity::delete_by_id(uuid.to_string())
        .exec(db)
        .await?;
    Ok(())
}

/// Returns the token stored in the cookie session, if any.
pub fn get_session_token(cookies: &Session) -> Option<Uuid> {
    match cookies.get::<String>(TOKEN_KEY) {
        Ok(Some(token)) => Uuid::parse_str(&token)
            .map_err(|e| log::warn!("get_session_token: parse_str() {}", e))
            .ok(),
        Ok(None) => None,
        Err(e) => {
            log::error!("get_session_token: cookies.get() {}", e);
            None
        }
    }
}

pub fn set_session_token(cookies: &Session, uuid: Uuid) -> Result<(), actix_web::Error> {
    cookies.renew();
    cookies.insert(TOKEN_KEY, uuid.to_string())?;
    Ok(())
}

/// Resolves the cookie session to a user. Expired or unknown tokens are guests.
pub async fn authenticate_client_by_session(
    db: &DatabaseConnection,
    cookies: &Session,
) -> Option<ClientUser> {
    let uuid = get_session_token(cookies)?;

    users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Username)
        .inner_join(sessions::Entity)
        .filter(sessions::Column::Id.eq(uuid.to_string()))
        .filter(sessions::Column::ExpiresAt.gt(Utc::now().naive_utc()))
        .into_model::<ClientUser>()
        .one(db)
        .await
        .map_err(|e| log::error!("authenticate_client_by_session: {}", e))
        .ok()
        .flatten()
}

/// Deletes sessions that can no longer authenticate anyone.
pub async fn remove_expired_sessions(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let res = sessions::Entity::delete_many()
        .filter(sessions::Column::ExpiresAt.lte(Utc::now().naive_utc()))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
