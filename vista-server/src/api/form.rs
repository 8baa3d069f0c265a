//! Multipart form parsing shared by the session and analyze endpoints.

use axum::extract::Multipart;
use axum::http::StatusCode;
use tracing::debug;

use vista_core::session::{FormUpdate, UploadedImage, Warning};

/// A parsed submission plus warnings raised while reading it.
#[derive(Debug, Default)]
pub struct ParsedForm {
    pub update: FormUpdate,
    pub warnings: Vec<Warning>,
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes")
}

/// Read the page's form fields. Unknown fields are ignored.
///
/// An empty file part (no file chosen) leaves the current upload alone; a
/// rejected file raises a warning and also leaves it alone.
pub async fn parse_form(mut multipart: Multipart) -> Result<ParsedForm, (StatusCode, String)> {
    let mut parsed = ParsedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, format!("Image read error: {}", e)))?;
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                match UploadedImage::new(filename, data) {
                    Ok(image) => {
                        debug!(
                            "Received upload {} ({} bytes)",
                            image.filename(),
                            image.bytes().len()
                        );
                        parsed.update.image = Some(image);
                    },
                    Err(e) => parsed.warnings.push(Warning::from(e)),
                }
            },
            "credential" | "clear_image" | "show_details" | "details" => {
                let value = field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Field '{}' read error: {}", name, e))
                })?;
                match name.as_str() {
                    "credential" => parsed.update.credential = Some(value),
                    "clear_image" => parsed.update.clear_image = parse_flag(&value),
                    "show_details" => parsed.update.show_details = Some(parse_flag(&value)),
                    _ => parsed.update.details = Some(value),
                }
            },
            _ => {},
        }
    }

    Ok(parsed)
}
