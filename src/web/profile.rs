use super::profile_url;
use crate::follow::is_following;
use crate::middleware::ClientCtx;
use crate::orm::users;
use crate::post::{get_post_page, PostFilter, PostForTemplate};
use crate::template::{PageQuery, Paginator, PaginatorToHtml};
use crate::user::get_user_by_name;
use actix_web::{error, get, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_profile);
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate<'a> {
    pub client: ClientCtx,
    pub author: &'a users::Model,
    pub post_count: usize,
    /// Whether the viewer follows this author.
    pub following: bool,
    /// Whether the viewer may follow this author at all.
    pub can_follow: bool,
    pub posts: &'a [PostForTemplate],
    pub paginator: Paginator,
}

#[get("/profile/{username}/")]
async fn view_profile(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let author = get_user_by_name(&db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("User not found."))?;

    let page = get_post_page(&db, PostFilter::Author(author.id), query.page())
        .await
        .map_err(error::ErrorInternalServerError)?;

    let (following, can_follow) = match client.get_id() {
        Some(id) if id != author.id => (
            is_following(&db, id, author.id)
                .await
                .map_err(error::ErrorInternalServerError)?,
            true,
        ),
        _ => (false, false),
    };

    Ok(ProfileTemplate {
        client,
        author: &author,
        post_count: page.item_count,
        following,
        can_follow,
        posts: &page.posts,
        paginator: page.paginator(&profile_url(&author.username)),
    }
    .to_response())
}
