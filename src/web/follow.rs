use super::{login_redirect, profile_url, redirect};
use crate::follow::{follow, unfollow};
use crate::middleware::ClientCtx;
use crate::post::{get_post_page, PostFilter, PostForTemplate};
use crate::template::{PageQuery, Paginator, PaginatorToHtml};
use crate::user::get_user_by_name;
use actix_web::{error, get, route, web, Error, HttpRequest, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_feed)
        .service(follow_author)
        .service(unfollow_author);
}

#[derive(Template)]
#[template(path = "follow.html")]
pub struct FeedTemplate<'a> {
    pub client: ClientCtx,
    pub posts: &'a [PostForTemplate],
    pub paginator: Paginator,
}

/// Posts by the authors the client follows.
#[get("/follow/")]
async fn view_feed(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(req.path())),
    };

    let page = get_post_page(&db, PostFilter::FeedOf(user_id), query.page())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(FeedTemplate {
        client,
        posts: &page.posts,
        paginator: page.paginator("/follow/"),
    }
    .to_response())
}

#[route("/profile/{username}/follow/", method = "GET", method = "POST")]
async fn follow_author(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(req.path())),
    };

    let author = get_user_by_name(&db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("User not found."))?;

    if follow(&db, user_id, author.id)
        .await
        .map_err(error::ErrorInternalServerError)?
    {
        log::debug!("user {} followed {}", user_id, author.id);
    }

    Ok(redirect(&profile_url(&author.username)))
}

#[route("/profile/{username}/unfollow/", method = "GET", method = "POST")]
async fn unfollow_author(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(req.path())),
    };

    let author = get_user_by_name(&db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("User not found."))?;

    if unfollow(&db, user_id, author.id)
        .await
        .map_err(error::ErrorInternalServerError)?
    {
        log::debug!("user {} unfollowed {}", user_id, author.id);
    }

    Ok(redirect(&profile_url(&author.username)))
}
