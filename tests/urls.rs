#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web::Data};
use common::*;
use std::time::Duration;
use yatube::cache::PageCache;

#[actix_rt::test]
async fn public_pages_are_available() {
    let db = setup_db().await;
    let config = test_config();
    let cache = Data::new(PageCache::new(Duration::ZERO));
    let app = init_app!(db, cache, config);

    let author = seed_user(&db, "author").await;
    let group = seed_group(&db, "cats").await;
    let post = seed_post(&db, &author, Some(&group), "Public post").await;

    for uri in [
        "/".to_owned(),
        "/group/cats/".to_owned(),
        "/profile/author/".to_owned(),
        format!("/posts/{}/", post.id),
        "/auth/login/".to_owned(),
        "/auth/signup/".to_owned(),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
    }
}

#[actix_rt::test]
async fn unknown_pages_are_not_found() {
    let db = setup_db().await;
    let config = test_config();
    let cache = Data::new(PageCache::new(Duration::ZERO));
    let app = init_app!(db, cache, config);

    for uri in [
        "/unexisting_page/",
        "/group/nobody/",
        "/profile/nobody/",
        "/posts/404/",
        "/media/not-a-hash.gif",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }
}

#[actix_rt::test]
async fn guests_are_redirected_from_author_pages() {
    let db = setup_db().await;
    let config = test_config();
    let cache = Data::new(PageCache::new(Duration::ZERO));
    let app = init_app!(db, cache, config);

    let author = seed_user(&db, "author").await;
    let post = seed_post(&db, &author, None, "Guarded post").await;

    let req = test::TestRequest::get().uri("/create/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fcreate%2F");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/auth/login/?next="));
}

#[actix_rt::test]
async fn uploaded_images_are_served() {
    let db = setup_db().await;
    let config = test_config();
    let cache = Data::new(PageCache::new(Duration::ZERO));
    let app = init_app!(db, cache, config);

    let filename = format!("{}.gif", blake3::hash(SMALL_GIF).to_hex());
    std::fs::write(media_file(&config, &filename), SMALL_GIF).unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/media/{}", filename))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await.as_ref(), SMALL_GIF);
}
