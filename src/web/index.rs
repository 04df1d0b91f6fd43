use super::html;
use crate::cache::{PageCache, PageKey};
use crate::middleware::ClientCtx;
use crate::post::{get_post_page, PostFilter, PostForTemplate};
use crate::template::{PageQuery, Paginator, PaginatorToHtml};
use actix_web::{error, get, web, Error, HttpRequest, HttpResponse};
use askama_actix::Template;
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index);
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub client: ClientCtx,
    pub posts: &'a [PostForTemplate],
    pub paginator: Paginator,
}

/// Latest posts from everyone. The rendered page is memoized and is not
/// refreshed by new posts until it expires or the cache is cleared.
#[get("/")]
async fn view_index(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<PageCache>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    // Unrelated query parameters share the page's entry.
    let key = PageKey::new(
        format!("{}?page={}", req.path(), query.page()),
        client.get_id(),
    );
    if let Some(body) = cache.get(&key) {
        return Ok(html(body));
    }

    let page = get_post_page(&db, PostFilter::All, query.page())
        .await
        .map_err(error::ErrorInternalServerError)?;

    let body = IndexTemplate {
        client,
        posts: &page.posts,
        paginator: page.paginator("/"),
    }
    .render()
    .map_err(error::ErrorInternalServerError)?;

    cache.insert(key, body.clone());
    Ok(html(body))
}
