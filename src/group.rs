use crate::orm::groups;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};

impl std::fmt::Display for groups::Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

pub async fn get_group_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<groups::Model>, DbErr> {
    groups::Entity::find()
        .filter(groups::Column::Slug.eq(slug))
        .one(db)
        .await
}

pub async fn get_group_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<groups::Model>, DbErr> {
    groups::Entity::find_by_id(id).one(db).await
}

/// Every group, for the post form's group selector.
pub async fn get_groups(db: &DatabaseConnection) -> Result<Vec<groups::Model>, DbErr> {
    groups::Entity::find()
        .order_by_asc(groups::Column::Title)
        .all(db)
        .await
}

/// Groups are reference data; there is no web form for them.
pub async fn insert_group(
    db: &DatabaseConnection,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<groups::Model, DbErr> {
    groups::ActiveModel {
        title: Set(title.to_owned()),
        slug: Set(slug.to_owned()),
        description: Set(description.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
}

#[cfg(test)]
mod tests {
    use crate::orm::groups;

    #[test]
    fn displays_title() {
        let group = groups::Model {
            id: 1,
            title: "The title".to_owned(),
            slug: "test-slug".to_owned(),
            description: "Some definitions".to_owned(),
        };
        assert_eq!(group.to_string(), "The title");
    }
}
