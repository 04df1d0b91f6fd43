use crate::group::get_group_by_slug;
use crate::middleware::ClientCtx;
use crate::orm::groups;
use crate::post::{get_post_page, PostFilter, PostForTemplate};
use crate::template::{PageQuery, Paginator, PaginatorToHtml};
use actix_web::{error, get, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_group);
}

#[derive(Template)]
#[template(path = "group_list.html")]
pub struct GroupTemplate<'a> {
    pub client: ClientCtx,
    pub group: &'a groups::Model,
    pub posts: &'a [PostForTemplate],
    pub paginator: Paginator,
}

#[get("/group/{slug}/")]
async fn view_group(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let group = get_group_by_slug(&db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Group not found."))?;

    let page = get_post_page(&db, PostFilter::Group(group.id), query.page())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(GroupTemplate {
        client,
        group: &group,
        posts: &page.posts,
        paginator: page.paginator(&format!("/group/{}/", group.slug)),
    }
    .to_response())
}
