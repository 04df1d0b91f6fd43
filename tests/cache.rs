#[macro_use]
mod common;

use actix_web::{test, web::Data};
use common::*;
use sea_orm::entity::*;
use std::time::Duration;
use yatube::cache::PageCache;
use yatube::orm::posts;

#[actix_rt::test]
async fn index_is_served_from_cache_until_cleared() {
    let db = setup_db().await;
    let config = test_config();
    let cache = Data::new(PageCache::new(Duration::from_secs(20)));
    let app = init_app!(db, cache, config);

    let author = seed_user(&db, "author").await;
    seed_post(&db, &author, None, "Cached content").await;

    let req = test::TestRequest::get().uri("/").to_request();
    let first = test::read_body(test::call_service(&app, req).await).await;
    assert_eq!(count_posts_in(&first), 1);

    posts::Entity::delete_many().exec(&db).await.unwrap();

    let req = test::TestRequest::get().uri("/").to_request();
    let second = test::read_body(test::call_service(&app, req).await).await;
    assert_eq!(first, second);

    cache.clear();

    let req = test::TestRequest::get().uri("/").to_request();
    let third = test::read_body(test::call_service(&app, req).await).await;
    assert_ne!(first, third);
    assert_eq!(count_posts_in(&third), 0);
}

#[actix_rt::test]
async fn viewers_get_their_own_copy() {
    let db = setup_db().await;
    let config = test_config();
    let cache = Data::new(PageCache::new(Duration::from_secs(20)));
    let app = init_app!(db, cache, config);

    seed_user(&db, "author").await;

    let req = test::TestRequest::get().uri("/").to_request();
    let guest = test::read_body(test::call_service(&app, req).await).await;
    assert!(String::from_utf8_lossy(&guest).contains("Log in"));

    let cookie = log_in!(app, "author");
    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let user = test::read_body(test::call_service(&app, req).await).await;
    assert!(String::from_utf8_lossy(&user).contains("Log out"));
    assert_eq!(cache.len(), 2);
}

#[actix_rt::test]
async fn unrelated_query_parameters_share_an_entry() {
    let db = setup_db().await;
    let config = test_config();
    let cache = Data::new(PageCache::new(Duration::from_secs(20)));
    let app = init_app!(db, cache, config);

    for uri in ["/", "/?junk=1", "/?junk=2", "/?page=1&junk=3"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        test::call_service(&app, req).await;
    }
    assert_eq!(cache.len(), 1);

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    test::call_service(&app, req).await;
    assert_eq!(cache.len(), 2);
}
