//! Body parsing for deal mutations.
//!
//! `POST` and `PUT` accept either `multipart/form-data` (text fields by name,
//! the file under `image`) or a JSON object. Both become a [`DealForm`]. Only
//! the allow-listed fields are read; anything else is ignored.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::error::PayloadError;
use actix_web::web::{self, Bytes, BytesMut};
use actix_web::{HttpMessage, HttpRequest};
use futures_util::{Stream, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::{DealDraft, Error, ImageUpload, MAX_IMAGE_BYTES};

/// Largest accepted text field or JSON body, in bytes.
pub const MAX_TEXT_BYTES: usize = 64 * 1024;

const IMAGE_FIELD: &str = "image";

/// Parsed deal mutation body.
#[derive(Debug, Default)]
pub struct DealForm {
    /// Supplied text fields.
    pub draft: DealDraft,
    /// Attached image, when a non-empty file was sent.
    pub image: Option<ImageUpload>,
}

/// JSON body for deal mutations; unknown keys are ignored.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealJsonBody {
    /// Headline.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Discount as a number or numeric string.
    #[schema(value_type = Option<f64>)]
    pub discount: Option<Value>,
    /// Location.
    pub location: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

fn discount_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

impl From<DealJsonBody> for DealDraft {
    fn from(body: DealJsonBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            discount: body.discount.and_then(discount_text),
            location: body.location,
            start_date: body.start_date,
            end_date: body.end_date,
        }
    }
}

fn malformed_multipart(err: &MultipartError) -> Error {
    Error::invalid_request(format!("Malformed multipart body: {err}"))
}

fn slot<'a>(draft: &'a mut DealDraft, name: &str) -> Option<&'a mut Option<String>> {
    match name {
        "title" => Some(&mut draft.title),
        "description" => Some(&mut draft.description),
        "discount" => Some(&mut draft.discount),
        "location" => Some(&mut draft.location),
        "startDate" => Some(&mut draft.start_date),
        "endDate" => Some(&mut draft.end_date),
        _ => None,
    }
}

/// Collect a stream into memory, failing with `overflow` past `limit` bytes.
async fn read_capped<S, E>(
    mut stream: S,
    limit: usize,
    on_error: impl Fn(&E) -> Error,
    overflow: impl FnOnce(usize) -> Error,
) -> Result<Bytes, Error>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.try_next().await.map_err(|err| on_error(&err))? {
        let size = buffer.len() + chunk.len();
        if size > limit {
            return Err(overflow(size));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, Error> {
    let bytes = read_capped(field, MAX_TEXT_BYTES, malformed_multipart, |_| {
        Error::invalid_request(format!("Field {name} is too long"))
    })
    .await?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::invalid_request(format!("Field {name} must be UTF-8 text")))
}

/// Outcome of reading the `image` part.
enum ImagePart {
    /// No file was chosen.
    Absent,
    /// Body read in full.
    Complete(ImageUpload),
    /// Reading stopped early; the upload cannot pass the rules.
    Abandoned(ImageUpload),
}

async fn read_image(field: &mut Field) -> Result<ImagePart, Error> {
    let file_name = field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .unwrap_or_default()
        .to_owned();
    let content_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_owned())
        .unwrap_or_default();

    // Browsers send an empty part when no file was chosen.
    if file_name.is_empty() {
        drain(field).await?;
        return Ok(ImagePart::Absent);
    }

    // A disallowed type is known from the part headers; skip the body.
    let headers_only = ImageUpload::new(file_name.as_str(), content_type.as_str(), Vec::new());
    if headers_only.clone().validate().is_err() {
        return Ok(ImagePart::Abandoned(headers_only));
    }

    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(|err| malformed_multipart(&err))? {
        let size = buffer.len() + chunk.len();
        if size > MAX_IMAGE_BYTES {
            return Ok(ImagePart::Abandoned(ImageUpload::truncated(
                file_name,
                content_type,
                size,
            )));
        }
        buffer.extend_from_slice(&chunk);
    }
    if buffer.is_empty() {
        return Ok(ImagePart::Absent);
    }
    Ok(ImagePart::Complete(ImageUpload::new(
        file_name,
        content_type,
        buffer.to_vec(),
    )))
}

async fn drain(field: &mut Field) -> Result<(), Error> {
    while field
        .try_next()
        .await
        .map_err(|err| malformed_multipart(&err))?
        .is_some()
    {}
    Ok(())
}

async fn parse_multipart(req: &HttpRequest, payload: web::Payload) -> Result<DealForm, Error> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut form = DealForm::default();
    let mut image_seen = false;

    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|err| malformed_multipart(&err))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == IMAGE_FIELD {
            if image_seen {
                return Err(Error::invalid_request("Only one image may be uploaded"));
            }
            image_seen = true;
            match read_image(&mut field).await? {
                ImagePart::Absent => {}
                ImagePart::Complete(upload) => form.image = Some(upload),
                // The rest of the body is left unread; the deal service
                // reports the rejection once ownership is settled.
                ImagePart::Abandoned(upload) => {
                    form.image = Some(upload);
                    break;
                }
            }
        } else if let Some(target) = slot(&mut form.draft, &name) {
            *target = Some(read_text(&mut field, &name).await?);
        } else {
            debug!(field = %name, "ignoring unknown multipart field");
            drain(&mut field).await?;
        }
    }
    Ok(form)
}

async fn parse_json(payload: web::Payload) -> Result<DealForm, Error> {
    let body = read_capped(
        payload,
        MAX_TEXT_BYTES,
        |err: &PayloadError| Error::invalid_request(format!("Could not read body: {err}")),
        |_| Error::invalid_request("Request body is too large"),
    )
    .await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DealForm::default());
    }
    let parsed: DealJsonBody = serde_json::from_slice(&body)
        .map_err(|err| Error::invalid_request(format!("Invalid JSON body: {err}")))?;
    Ok(DealForm {
        draft: parsed.into(),
        image: None,
    })
}

/// Parse a deal mutation body according to its `Content-Type`.
///
/// An image that breaks the upload rules is returned as-is (truncated when
/// it ran past the size cap) so the deal service can judge it after the
/// existence and ownership checks.
///
/// # Errors
/// `invalid_request` for malformed bodies or unsupported content types.
pub async fn parse_deal_form(req: &HttpRequest, payload: web::Payload) -> Result<DealForm, Error> {
    let mime = req
        .mime_type()
        .map_err(|_| Error::invalid_request("Content-Type header is malformed"))?;
    match mime {
        Some(mime) if mime.essence_str() == "multipart/form-data" => {
            parse_multipart(req, payload).await
        }
        Some(mime)
            if mime.subtype().as_str() == "json"
                || mime.suffix().is_some_and(|suffix| suffix.as_str() == "json") =>
        {
            parse_json(payload).await
        }
        None => parse_json(payload).await,
        Some(other) => Err(Error::invalid_request(format!(
            "Unsupported content type {other}; send JSON or multipart/form-data"
        ))),
    }
}

#[cfg(test)]
mod tests;
