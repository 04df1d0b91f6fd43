pub mod account;
pub mod asset;
pub mod error;
pub mod follow;
pub mod group;
pub mod index;
pub mod post;
pub mod profile;

use actix_web::http::header;
use actix_web::HttpResponse;

/// Configures the web app
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Higher traffic routes should be placed higher.
    index::configure(conf);
    post::configure(conf);
    group::configure(conf);
    follow::configure(conf);
    profile::configure(conf);
    account::configure(conf);
    asset::configure(conf);
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}

/// Sends a guest to the login page, returning them to `next` afterwards.
pub fn login_redirect(next: &str) -> HttpResponse {
    let next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    redirect(&format!("/auth/login/?next={}", next))
}

pub fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", username)
}

pub fn post_url(post_id: i32) -> String {
    format!("/posts/{}/", post_id)
}
