use actix_multipart::Field;
use actix_web::{error, web, Error};
use futures::StreamExt;
use mime::Mime;
use std::path::{Path, PathBuf};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// An uploaded image held in memory until the form it came with validates.
pub struct UploadPayload {
    pub data: Vec<u8>,
    pub extension: &'static str,
    pub hash: blake3::Hash,
}

impl UploadPayload {
    /// Files are named by content, so identical uploads share one file.
    pub fn filename(&self) -> String {
        format!("{}.{}", self.hash.to_hex(), self.extension)
    }
}

/// Returns the file extension for supported image types.
pub fn image_extension(mime: &Mime) -> Option<&'static str> {
    if mime.type_() != mime::IMAGE {
        return None;
    }

    match mime.subtype().as_str() {
        "gif" => Some("gif"),
        "png" => Some("png"),
        "jpeg" | "pjpeg" => Some("jpg"),
        "webp" => Some("webp"),
        "bmp" => Some("bmp"),
        _ => None,
    }
}

/// Media filenames are generated by `UploadPayload::filename`; anything else is rejected.
pub fn is_media_filename(filename: &str) -> bool {
    match filename.split_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && stem.chars().all(|c| c.is_ascii_hexdigit())
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

pub fn get_media_path(media_dir: &Path, filename: &str) -> PathBuf {
    media_dir.join(filename)
}

/// Reads a multipart field into memory, refusing anything over `limit` bytes.
pub async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| {
            log::error!("read_field: multipart read error: {}", e);
            error::ErrorBadRequest("Error reading upload data.")
        })?;
        if buf.len() + bytes.len() > limit {
            return Err(error::ErrorPayloadTooLarge("Upload is too large."));
        }
        buf.extend_from_slice(&bytes);
    }
    Ok(buf)
}

/// What a file input of an image form held.
pub enum ImageField {
    /// The input was left blank.
    Empty,
    Image(UploadPayload),
    /// Something was uploaded, but not an image we accept.
    NotAnImage,
}

pub async fn read_image_field(field: &mut Field) -> Result<ImageField, Error> {
    let content_type = field.content_type().clone();
    let data = read_field(field, MAX_UPLOAD_SIZE).await?;
    if data.is_empty() {
        return Ok(ImageField::Empty);
    }

    Ok(match image_extension(&content_type) {
        Some(extension) => {
            let hash = blake3::hash(&data);
            ImageField::Image(UploadPayload {
                data,
                extension,
                hash,
            })
        }
        None => ImageField::NotAnImage,
    })
}

/// Writes the payload into the media directory unless an identical file is already there.
/// Returns the stored filename.
pub async fn save_payload(media_dir: &Path, payload: UploadPayload) -> Result<String, Error> {
    let filename = payload.filename();
    let path = get_media_path(media_dir, &filename);

    if path.exists() {
        log::info!("save_payload: duplicate upload {}, skipping write", filename);
        return Ok(filename);
    }

    web::block(move || std::fs::write(path, payload.data))
        .await
        .map_err(error::ErrorInternalServerError)?
        .map_err(|e| {
            log::error!("save_payload: failed to write file: {}", e);
            error::ErrorInternalServerError("Failed to store upload.")
        })?;

    Ok(filename)
}
