use crate::config::Config;
use crate::filesystem::{get_media_path, is_media_filename};
use actix_files as fs;
use actix_web::{error, get, web, Error};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_media);
}

/// Serves uploaded post images.
#[get("/media/{filename}")]
async fn view_media(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<fs::NamedFile, Error> {
    let filename = path.into_inner();
    if !is_media_filename(&filename) {
        return Err(error::ErrorNotFound("File not found."));
    }

    let file = fs::NamedFile::open(get_media_path(&config.media_dir, &filename))
        .map_err(|_| error::ErrorNotFound("File not found."))?;

    Ok(file.use_last_modified(true))
}
