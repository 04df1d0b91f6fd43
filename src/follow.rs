use crate::orm::follows;
use chrono::prelude::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};

/// Subscribes `user_id` to `author_id`. Returns false if nothing changed,
/// either because the edge already exists or because it would be a self-follow.
pub async fn follow(db: &DatabaseConnection, user_id: i32, author_id: i32) -> Result<bool, DbErr> {
    if user_id == author_id || is_following(db, user_id, author_id).await? {
        return Ok(false);
    }

    follows::Entity::insert(follows::ActiveModel {
        user_id: Set(user_id),
        author_id: Set(author_id),
        created_at: Set(Utc::now().naive_utc()),
    })
    .exec(db)
    .await?;

    Ok(true)
}

/// Removes the edge. Returns false if there was none.
pub async fn unfollow(
    db: &DatabaseConnection,
    user_id: i32,
    author_id: i32,
) -> Result<bool, DbErr> {
    let res = follows::Entity::delete_many()
        .filter(follows::Column::UserId.eq(user_id))
        .filter(follows::Column::AuthorId.eq(author_id))
        .exec(db)
        .await?;

    Ok(res.rows_affected > 0)
}

pub async fn is_following(
    db: &DatabaseConnection,
    user_id: i32,
    author_id: i32,
) -> Result<bool, DbErr> {
    Ok(follows::Entity::find_by_id((user_id, author_id))
        .one(db)
        .await?
        .is_some())
}
