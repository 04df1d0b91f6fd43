use super::{login_redirect, post_url, profile_url, redirect};
use crate::comment::{get_comments_for_post, insert_comment, CommentForTemplate, NewCommentFormData};
use crate::config::Config;
use crate::filesystem::{read_field, read_image_field, save_payload, ImageField, MAX_UPLOAD_SIZE};
use crate::group::{get_group_by_id, get_groups};
use crate::middleware::ClientCtx;
use crate::orm::{groups, posts};
use crate::post::{
    count_posts_by_author, delete_post, get_post_for_template, insert_post, update_post,
    NewPost, PostChanges, PostForTemplate,
};
use actix_multipart::Multipart;
use actix_web::{error, get, post, web, Error, HttpRequest, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use futures::TryStreamExt;
use sea_orm::{entity::*, DatabaseConnection};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_post)
        .service(create_post_form)
        .service(create_post)
        .service(edit_post)
        .service(update_post_form)
        .service(destroy_post)
        .service(view_comment_form)
        .service(create_comment);
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate<'a> {
    pub client: ClientCtx,
    pub post: &'a PostForTemplate,
    pub author_post_count: usize,
    pub comments: &'a [CommentForTemplate],
}

/// Shared by post creation and editing.
#[derive(Template)]
#[template(path = "create_post.html")]
pub struct PostFormTemplate<'a> {
    pub client: ClientCtx,
    pub action: String,
    pub is_edit: bool,
    pub text: &'a str,
    pub image: Option<&'a str>,
    pub groups: Vec<GroupChoice<'a>>,
    pub errors: &'a [String],
}

/// An option of the form's group selector.
pub struct GroupChoice<'a> {
    pub id: i32,
    pub title: &'a str,
    pub selected: bool,
}

impl<'a> GroupChoice<'a> {
    fn list(groups: &'a [groups::Model], selected: Option<i32>) -> Vec<Self> {
        groups
            .iter()
            .map(|group| GroupChoice {
                id: group.id,
                title: &group.title,
                selected: selected == Some(group.id),
            })
            .collect()
    }
}

/// A submitted post form, as read from `multipart/form-data`.
pub struct PostFormData {
    pub text: String,
    pub group: String,
    pub image: ImageField,
}

impl PostFormData {
    /// Checks the form. Returns the selected group or the messages to show.
    async fn validate(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Result<Option<i32>, Vec<String>>, Error> {
        let mut errors = Vec::new();

        if self.text.trim().is_empty() {
            errors.push("Text: this field is required.".to_owned());
        }

        let group = self.group.trim();
        let group_id = if group.is_empty() {
            None
        } else {
            let group = match group.parse::<i32>() {
                Ok(id) => get_group_by_id(db, id)
                    .await
                    .map_err(error::ErrorInternalServerError)?,
                Err(_) => None,
            };
            if group.is_none() {
                errors.push("Group: select a valid choice.".to_owned());
            }
            group.map(|g| g.id)
        };

        if let ImageField::NotAnImage = self.image {
            errors.push("Image: upload a valid image.".to_owned());
        }

        Ok(if errors.is_empty() {
            Ok(group_id)
        } else {
            Err(errors)
        })
    }

    /// Group id as submitted, for re-rendering the form.
    fn submitted_group(&self) -> Option<i32> {
        self.group.trim().parse().ok()
    }
}

async fn read_text_field(field: &mut actix_multipart::Field) -> Result<String, Error> {
    let data = read_field(field, MAX_UPLOAD_SIZE).await?;
    String::from_utf8(data).map_err(|_| error::ErrorBadRequest("Form text is not valid UTF-8."))
}

async fn read_post_form(mut multipart: Multipart) -> Result<PostFormData, Error> {
    let mut form = PostFormData {
        text: String::new(),
        group: String::new(),
        image: ImageField::Empty,
    };

    while let Some(mut field) = multipart.try_next().await.map_err(|e| {
        log::warn!("read_post_form: {}", e);
        error::ErrorBadRequest("Malformed form submission.")
    })? {
        let name = field.content_disposition().get_name().map(str::to_owned);
        match name.as_deref() {
            Some("text") => form.text = read_text_field(&mut field).await?,
            Some("group") => form.group = read_text_field(&mut field).await?,
            Some("image") => form.image = read_image_field(&mut field).await?,
            // Fields the form does not declare, such as an author, are ignored.
            _ => {
                read_field(&mut field, MAX_UPLOAD_SIZE).await?;
            }
        }
    }

    Ok(form)
}

#[allow(clippy::too_many_arguments)]
async fn render_post_form(
    client: ClientCtx,
    db: &DatabaseConnection,
    action: String,
    is_edit: bool,
    text: &str,
    group_id: Option<i32>,
    image: Option<&str>,
    errors: &[String],
) -> Result<HttpResponse, Error> {
    let groups = get_groups(db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(PostFormTemplate {
        client,
        action,
        is_edit,
        text,
        image,
        groups: GroupChoice::list(&groups, group_id),
        errors,
    }
    .to_response())
}

async fn get_post_or_404(db: &DatabaseConnection, id: i32) -> Result<PostForTemplate, Error> {
    get_post_for_template(db, id)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))
}

#[get("/posts/{post_id}/")]
async fn view_post(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let post = get_post_or_404(&db, path.into_inner()).await?;
    let author_post_count = count_posts_by_author(&db, post.author_id)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let comments = get_comments_for_post(&db, post.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(PostDetailTemplate {
        client,
        post: &post,
        author_post_count,
        comments: &comments,
    }
    .to_response())
}

#[get("/create/")]
async fn create_post_form(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(login_redirect(req.path()));
    }

    render_post_form(client, &db, "/create/".to_owned(), false, "", None, None, &[]).await
}

#[post("/create/")]
async fn create_post(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    multipart: Multipart,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(req.path())),
    };

    let form = read_post_form(multipart).await?;
    let group_id = match form.validate(&db).await? {
        Ok(group_id) => group_id,
        Err(errors) => {
            let group_id = form.submitted_group();
            return render_post_form(
                client,
                &db,
                "/create/".to_owned(),
                false,
                &form.text,
                group_id,
                None,
                &errors,
            )
            .await;
        }
    };

    let image = match form.image {
        ImageField::Image(payload) => Some(save_payload(&config.media_dir, payload).await?),
        ImageField::Empty | ImageField::NotAnImage => None,
    };

    let new_post = insert_post(
        &db,
        NewPost {
            author_id: user_id,
            text: form.text.trim().to_owned(),
            group_id,
            image,
        },
    )
    .await
    .map_err(error::ErrorInternalServerError)?;
    log::debug!("user {} created post {}", user_id, new_post.id);

    Ok(redirect(&profile_url(&client.get_name())))
}

#[get("/posts/{post_id}/edit/")]
async fn edit_post(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(login_redirect(req.path()));
    }

    let post = get_post_or_404(&db, path.into_inner()).await?;
    if !client.can_update_post(&post) {
        return Ok(redirect(&post_url(post.id)));
    }

    render_post_form(
        client,
        &db,
        format!("/posts/{}/edit/", post.id),
        true,
        &post.text,
        post.group_id,
        post.image.as_deref(),
        &[],
    )
    .await
}

#[post("/posts/{post_id}/edit/")]
async fn update_post_form(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    path: web::Path<i32>,
    multipart: Multipart,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(login_redirect(req.path()));
    }

    let post = get_post_or_404(&db, path.into_inner()).await?;
    if !client.can_update_post(&post) {
        return Ok(redirect(&post_url(post.id)));
    }

    let form = read_post_form(multipart).await?;
    let group_id = match form.validate(&db).await? {
        Ok(group_id) => group_id,
        Err(errors) => {
            let group_id = form.submitted_group();
            return render_post_form(
                client,
                &db,
                format!("/posts/{}/edit/", post.id),
                true,
                &form.text,
                group_id,
                post.image.as_deref(),
                &errors,
            )
            .await;
        }
    };

    let image = match form.image {
        ImageField::Image(payload) => Some(save_payload(&config.media_dir, payload).await?),
        ImageField::Empty | ImageField::NotAnImage => None,
    };

    update_post(
        &db,
        post.id,
        PostChanges {
            text: form.text.trim().to_owned(),
            group_id,
            image,
        },
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    Ok(redirect(&post_url(post.id)))
}

#[post("/posts/{post_id}/delete/")]
async fn destroy_post(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(login_redirect(req.path()));
    }

    let post = get_post_or_404(&db, path.into_inner()).await?;
    if !client.can_delete_post(&post) {
        return Ok(redirect(&post_url(post.id)));
    }

    delete_post(&db, post.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(redirect(&profile_url(&post.username)))
}

/// The comment form lives on the post page; this route only accepts submissions.
#[get("/posts/{post_id}/comment/")]
async fn view_comment_form(
    req: HttpRequest,
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(login_redirect(req.path()));
    }

    Ok(redirect(&post_url(path.into_inner())))
}

#[post("/posts/{post_id}/comment/")]
async fn create_comment(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Result<web::Form<NewCommentFormData>, Error>,
) -> Result<HttpResponse, Error> {
    // Guests are turned away whatever they sent.
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(req.path())),
    };
    let form = form?;

    let post = posts::Entity::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

    match form.validate() {
        Some(text) => {
            insert_comment(&db, post.id, user_id, text)
                .await
                .map_err(error::ErrorInternalServerError)?;
        }
        None => log::debug!("create_comment: ignoring empty comment on post {}", post.id),
    }

    Ok(redirect(&post_url(post.id)))
}
