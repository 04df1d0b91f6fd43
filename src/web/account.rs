use super::redirect;
use crate::config::Config;
use crate::middleware::ClientCtx;
use crate::session::{get_session_token, new_session, remove_session, set_session_token};
use crate::user::{authenticate, get_user_by_name, hash_password, insert_new_user, validate_new_user};
use actix_session::Session;
use actix_web::{error, get, post, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_login)
        .service(post_login)
        .service(view_logout)
        .service(view_signup)
        .service(create_user);
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate<'a> {
    pub client: ClientCtx,
    pub username: &'a str,
    pub next: &'a str,
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate<'a> {
    pub client: ClientCtx,
    pub username: &'a str,
    pub errors: &'a [String],
}

#[derive(Template)]
#[template(path = "logout.html")]
pub struct LogoutTemplate {
    pub client: ClientCtx,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct SignupFormData {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

/// Only local paths are followed after login.
/// Browsers read `/\host` as `//host` and drop tabs and newlines, so those never pass.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next)
            if next.starts_with('/')
                && !next.starts_with("//")
                && !next.contains(|c: char| c == '\\' || c.is_control()) =>
        {
            next
        }
        _ => "/",
    }
}

/// Starts a session for the user and stores its token in the cookie.
async fn log_in(
    db: &DatabaseConnection,
    config: &Config,
    cookies: &Session,
    user_id: i32,
) -> Result<(), Error> {
    let uuid = new_session(db, user_id, config.session_time)
        .await
        .map_err(error::ErrorInternalServerError)?;
    set_session_token(cookies, uuid)
}

#[get("/auth/login/")]
async fn view_login(client: ClientCtx, query: web::Query<LoginQuery>) -> HttpResponse {
    LoginTemplate {
        client,
        username: "",
        next: safe_next(query.next.as_deref()),
        error: None,
    }
    .to_response()
}

#[post("/auth/login/")]
async fn post_login(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    cookies: Session,
    form: web::Form<LoginFormData>,
) -> Result<HttpResponse, Error> {
    let next = safe_next(form.next.as_deref());

    let user = authenticate(&db, form.username.trim(), &form.password)
        .await
        .map_err(error::ErrorInternalServerError)?;

    match user {
        Some(user) => {
            log_in(&db, &config, &cookies, user.id).await?;
            log::info!("user {} logged in", user.id);
            Ok(redirect(next))
        }
        None => Ok(LoginTemplate {
            client,
            username: form.username.trim(),
            next,
            error: Some("Please enter a correct username and password."),
        }
        .to_response()),
    }
}

#[get("/auth/logout/")]
async fn view_logout(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    cookies: Session,
) -> Result<HttpResponse, Error> {
    if let Some(uuid) = get_session_token(&cookies) {
        if let Err(e) = remove_session(&db, uuid).await {
            log::error!("view_logout: remove_session() {}", e);
        }
    }
    cookies.purge();
    client.sign_out();

    Ok(LogoutTemplate { client }.to_response())
}

#[get("/auth/signup/")]
async fn view_signup(client: ClientCtx) -> HttpResponse {
    if client.is_user() {
        return redirect("/");
    }

    SignupTemplate {
        client,
        username: "",
        errors: &[],
    }
    .to_response()
}

#[post("/auth/signup/")]
async fn create_user(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    cookies: Session,
    form: web::Form<SignupFormData>,
) -> Result<HttpResponse, Error> {
    let username = form.username.trim();
    let mut errors = validate_new_user(username, &form.password1, &form.password2);

    if errors.is_empty()
        && get_user_by_name(&db, username)
            .await
            .map_err(error::ErrorInternalServerError)?
            .is_some()
    {
        errors.push("A user with that username already exists.".to_owned());
    }

    if !errors.is_empty() {
        return Ok(SignupTemplate {
            client,
            username,
            errors: &errors,
        }
        .to_response());
    }

    let password_hash = hash_password(&form.password1).map_err(|e| {
        log::error!("create_user: hash_password() {}", e);
        error::ErrorInternalServerError("Could not create account.")
    })?;
    let user = insert_new_user(&db, username, &password_hash)
        .await
        .map_err(error::ErrorInternalServerError)?;
    log::info!("user {} signed up as {}", user.id, user.username);

    log_in(&db, &config, &cookies, user.id).await?;
    Ok(redirect("/"))
}

#[cfg(test)]
mod tests {
    use super::safe_next;

    #[test]
    fn next_must_stay_local() {
        assert_eq!(safe_next(Some("/follow/")), "/follow/");
        assert_eq!(safe_next(Some("/posts/1/?page=2")), "/posts/1/?page=2");
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("/\t/evil.example")), "/");
    }
}
