use crate::middleware::ClientCtx;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, header::HeaderValue, StatusCode};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::Result;
use askama_actix::Template;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    client: ClientCtx,
    status: StatusCode,
    message: &'a str,
}

/// Middleware rendering 400, 404 and 500 responses as HTML pages.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::BAD_REQUEST, error_document)
        .handler(StatusCode::NOT_FOUND, error_document)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, error_document)
}

/// Wording shown for a status when the handler gave no reason of its own.
fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "The request could not be understood.",
        StatusCode::NOT_FOUND => "The page you were looking for does not exist.",
        _ => "Something went wrong on our end.",
    }
}

fn error_document<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    let reason = res.response().error().map(|e| e.to_string());

    // Internal failures are logged, never shown.
    let message = if status.is_server_error() {
        if let Some(reason) = &reason {
            log::error!("{} {}: {}", status, res.request().path(), reason);
        }
        default_message(status)
    } else {
        reason.as_deref().unwrap_or_else(|| default_message(status))
    };

    let body = BoxBody::new(
        ErrorTemplate {
            client: ClientCtx::from_request_extensions(res.request()),
            status,
            message,
        }
        .to_string(),
    );
    let mut res: ServiceResponse<EitherBody<B>> =
        res.map_body(|_, _| EitherBody::<B, BoxBody>::right(body));

    // Handlers that fail render no content of their own.
    let headers = res.response_mut().headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    // Error pages must never land in a shared cache.
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(ErrorHandlerResponse::Response(res))
}
