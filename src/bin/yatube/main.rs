use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use yatube::cache::PageCache;
use yatube::config::Config;
use yatube::db::{create_tables, init_db};
use yatube::middleware::ClientCtx;
use yatube::session::remove_expired_sessions;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();

    let config = Config::from_env()?;
    config.ensure_media_dir()?;

    let db = init_db(config.database_url.to_owned())
        .await
        .context("Database connection failed.")?;
    create_tables(&db)
        .await
        .context("Database tables could not be created.")?;
    match remove_expired_sessions(&db).await {
        Ok(count) => log::info!("Removed {} expired sessions.", count),
        Err(e) => log::error!("remove_expired_sessions: {}", e),
    }

    let secret_key = config.cookie_key();
    let bind_address = config.bind_address.to_owned();
    let db = Data::new(db);
    let cache = Data::new(PageCache::new(config.page_cache_ttl));
    let config = Data::new(config);

    log::info!("Listening on {}", bind_address);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        // However, services are read top->down, higher traffic routes should be
        // placed higher
        App::new()
            .app_data(db.clone())
            .app_data(cache.clone())
            .app_data(config.clone())
            .wrap(yatube::web::error::error_handlers())
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(config.cookie_secure)
                    .build(),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(yatube::web::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    // A missing .env file is fine; the environment may already be set.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
