use crate::orm::{comments, follows, groups, posts, users};
use crate::template::Paginator;
use chrono::prelude::Utc;
use sea_orm::sea_query::{Condition, Query};
use sea_orm::{
    entity::*, query::*, DatabaseConnection, DbErr, FromQueryResult, PaginatorTrait,
    TransactionTrait,
};

pub const POSTS_PER_PAGE: usize = 10;

/// Length of a post's short form.
const SUMMARY_CHARS: usize = 15;

/// A fully joined struct representing the post model and its relational data.
#[derive(Clone, Debug, FromQueryResult)]
pub struct PostForTemplate {
    pub id: i32,
    pub text: String,
    pub created_at: chrono::NaiveDateTime,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
    // join users
    pub username: String,
    // join groups
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

impl PostForTemplate {
    /// The first characters of the post, used wherever a post is named.
    pub fn summary(&self) -> String {
        summarize(&self.text)
    }

    pub fn group_title_or_empty(&self) -> &str {
        self.group_title.as_deref().unwrap_or("")
    }
}

impl std::fmt::Display for posts::Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&summarize(&self.text))
    }
}

fn summarize(text: &str) -> String {
    text.chars().take(SUMMARY_CHARS).collect()
}

/// Which posts a listing shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i32),
    Author(i32),
    /// Posts by every author this user follows.
    FeedOf(i32),
}

impl PostFilter {
    fn condition(&self) -> Condition {
        match *self {
            PostFilter::All => Condition::all(),
            PostFilter::Group(id) => Condition::all().add(posts::Column::GroupId.eq(id)),
            PostFilter::Author(id) => Condition::all().add(posts::Column::AuthorId.eq(id)),
            PostFilter::FeedOf(id) => Condition::all().add(
                posts::Column::AuthorId.in_subquery(
                    Query::select()
                        .column(follows::Column::AuthorId)
                        .from(follows::Entity)
                        .and_where(follows::Column::UserId.eq(id))
                        .to_owned(),
                ),
            ),
        }
    }
}

/// One page of a post listing.
#[derive(Debug)]
pub struct PostPage {
    pub posts: Vec<PostForTemplate>,
    pub this_page: i32,
    pub page_count: i32,
    pub item_count: usize,
}

impl PostPage {
    pub fn paginator(&self, base_url: &str) -> Paginator {
        Paginator {
            base_url: base_url.to_owned(),
            this_page: self.this_page,
            page_count: self.page_count,
        }
    }
}

pub struct NewPost {
    pub author_id: i32,
    pub text: String,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

/// Fields a post edit may change. The author is never among them.
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i32>,
    /// Replaces the image only when a new one was uploaded.
    pub image: Option<String>,
}

fn select_posts_for_template() -> Select<posts::Entity> {
    posts::Entity::find()
        .left_join(users::Entity)
        .column_as(users::Column::Username, "username")
        .left_join(groups::Entity)
        .column_as(groups::Column::Title, "group_title")
        .column_as(groups::Column::Slug, "group_slug")
}

/// Returns a page of posts newest-first. Pages past the end are empty.
pub async fn get_post_page(
    db: &DatabaseConnection,
    filter: PostFilter,
    page: i32,
) -> Result<PostPage, DbErr> {
    let page = page.max(1);
    let paginator = select_posts_for_template()
        .filter(filter.condition())
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_desc(posts::Column::Id)
        .into_model::<PostForTemplate>()
        .paginate(db, POSTS_PER_PAGE);

    let item_count = paginator.num_items().await?;
    let page_count = ((item_count + POSTS_PER_PAGE - 1) / POSTS_PER_PAGE) as i32;
    let posts = if page > page_count {
        Vec::new()
    } else {
        paginator.fetch_page((page - 1) as usize).await?
    };

    Ok(PostPage {
        posts,
        this_page: page,
        page_count,
        item_count,
    })
}

/// Returns the result of a query selecting for a post by id with adjoined templating data.
pub async fn get_post_for_template(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<PostForTemplate>, DbErr> {
    select_posts_for_template()
        .filter(posts::Column::Id.eq(id))
        .into_model::<PostForTemplate>()
        .one(db)
        .await
}

pub async fn count_posts_by_author(db: &DatabaseConnection, author_id: i32) -> Result<usize, DbErr> {
    posts::Entity::find()
        .filter(posts::Column::AuthorId.eq(author_id))
        .count(db)
        .await
}

pub async fn insert_post(db: &DatabaseConnection, post: NewPost) -> Result<posts::Model, DbErr> {
    posts::ActiveModel {
        text: Set(post.text),
        created_at: Set(Utc::now().naive_utc()),
        author_id: Set(post.author_id),
        group_id: Set(post.group_id),
        image: Set(post.image),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn update_post(
    db: &DatabaseConnection,
    id: i32,
    changes: PostChanges,
) -> Result<posts::Model, DbErr> {
    let mut post = posts::ActiveModel {
        id: Set(id),
        text: Set(changes.text),
        group_id: Set(changes.group_id),
        ..Default::default()
    };
    if let Some(image) = changes.image {
        post.image = Set(Some(image));
    }
    post.update(db).await
}

/// Deletes a post and its comments. There is no soft delete.
pub async fn delete_post(db: &DatabaseConnection, id: i32) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    comments::Entity::delete_many()
        .filter(comments::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    posts::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await
}
