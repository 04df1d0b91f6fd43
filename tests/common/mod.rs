#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::PathBuf;
use yatube::config::Config;
use yatube::group::insert_group;
use yatube::orm::{groups, posts, users};
use yatube::post::{insert_post, NewPost};
use yatube::user::{hash_password, insert_new_user};

pub const PASSWORD: &str = "correct horse battery";

/// A fresh in-memory database with every table created.
/// One connection, because each SQLite memory connection is its own database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("sqlite connects");
    yatube::db::create_tables(&db)
        .await
        .expect("tables are created");
    db
}

pub fn test_config() -> Config {
    let media_dir = std::env::temp_dir().join(format!("yatube-test-{}", uuid::Uuid::new_v4()));
    let media = media_dir.to_string_lossy().into_owned();
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_owned()),
        "MEDIA_DIR" => Some(media.clone()),
        _ => None,
    })
    .expect("test config is valid");
    config.ensure_media_dir().expect("media dir is created");
    config
}

pub fn media_file(config: &Config, filename: &str) -> PathBuf {
    config.media_dir.join(filename)
}

/// Builds the application service the way the binary does, around the given state.
macro_rules! init_app {
    ($db:expr, $cache:expr, $config:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($db.clone()))
                .app_data($cache.clone())
                .app_data(actix_web::web::Data::new($config.clone()))
                .wrap(yatube::web::error::error_handlers())
                .wrap(yatube::middleware::ClientCtx::default())
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::generate(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(yatube::web::configure),
        )
        .await
    };
}

/// Logs in through the login form and returns the session cookie.
macro_rules! log_in {
    ($app:expr, $username:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/auth/login/")
            .set_form(&[
                ("username", $username),
                ("password", $crate::common::PASSWORD),
            ])
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FOUND);
        $crate::common::session_cookie(&resp)
    }};
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .expect("login sets the session cookie")
        .into_owned()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .expect("response redirects")
        .to_str()
        .expect("location is ascii")
        .to_owned()
}

pub fn count_posts_in(body: &[u8]) -> usize {
    String::from_utf8_lossy(body)
        .matches("<article class=\"post\">")
        .count()
}

pub async fn seed_user(db: &DatabaseConnection, username: &str) -> users::Model {
    let hash = hash_password(PASSWORD).expect("password hashes");
    insert_new_user(db, username, &hash)
        .await
        .expect("user is inserted")
}

pub async fn seed_group(db: &DatabaseConnection, slug: &str) -> groups::Model {
    insert_group(db, &format!("Group {}", slug), slug, "A test group")
        .await
        .expect("group is inserted")
}

pub async fn seed_post(
    db: &DatabaseConnection,
    author: &users::Model,
    group: Option<&groups::Model>,
    text: &str,
) -> posts::Model {
    insert_post(
        db,
        NewPost {
            author_id: author.id,
            text: text.to_owned(),
            group_id: group.map(|g| g.id),
            image: None,
        },
    )
    .await
    .expect("post is inserted")
}

pub const BOUNDARY: &str = "yatube-test-boundary";

/// Encodes a `multipart/form-data` body. Returns the content type header and the body.
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, filename, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body,
    )
}

/// The smallest valid GIF.
pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04,
    0x01, 0x0a, 0x00, 0x01, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02,
    0x02, 0x4c, 0x01, 0x00, 0x3b,
];
