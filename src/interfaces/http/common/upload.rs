//! JSON-or-multipart extractor for vehicle create/update
//!
//! Vehicle endpoints accept either a plain JSON body or a
//! `multipart/form-data` request where scalar fields arrive as text
//! parts and document photos as file parts. Text parts are folded into
//! a JSON object (numbers and booleans parse as scalars, everything
//! else stays a string) and deserialized into the target DTO; file
//! parts are surfaced separately so the handler can push them to the
//! blob store after enforcing size and MIME policy.

use axum::extract::multipart::Multipart;
use axum::extract::FromRequest;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// One uploaded file part
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Multipart field name, e.g. `soat_photo`
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Extracted body plus any uploaded files (empty for JSON requests)
pub struct JsonOrMultipart<T> {
    pub payload: T,
    pub files: Vec<UploadedFile>,
}

pub struct JsonOrMultipartRejection(String);

impl IntoResponse for JsonOrMultipartRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.0 }))).into_response()
    }
}

fn scalar_from_text(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => v,
        _ => Value::String(text.to_string()),
    }
}

impl<S, T> FromRequest<S> for JsonOrMultipart<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonOrMultipartRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| JsonOrMultipartRejection(format!("Invalid multipart body: {e}")))?;

            let mut fields = Map::new();
            let mut files = Vec::new();
            while let Some(part) = multipart
                .next_field()
                .await
                .map_err(|e| JsonOrMultipartRejection(format!("Invalid multipart part: {e}")))?
            {
                let name = part.name().unwrap_or("").to_string();
                if let Some(filename) = part.file_name().map(str::to_string) {
                    let content_type = part.content_type().unwrap_or("").to_string();
                    let bytes = part
                        .bytes()
                        .await
                        .map_err(|e| JsonOrMultipartRejection(format!("Upload failed: {e}")))?;
                    files.push(UploadedFile {
                        field: name,
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                } else {
                    let text = part
                        .text()
                        .await
                        .map_err(|e| JsonOrMultipartRejection(format!("Invalid field: {e}")))?;
                    fields.insert(name, scalar_from_text(&text));
                }
            }

            let payload = serde_json::from_value(Value::Object(fields))
                .map_err(|e| JsonOrMultipartRejection(format!("Invalid form fields: {e}")))?;
            Ok(Self { payload, files })
        } else {
            let Json(payload) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| JsonOrMultipartRejection(format!("Invalid JSON: {e}")))?;
            Ok(Self {
                payload,
                files: Vec::new(),
            })
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_booleans_parse_as_scalars() {
        assert_eq!(scalar_from_text("4"), json!(4));
        assert_eq!(scalar_from_text("4.5"), json!(4.5));
        assert_eq!(scalar_from_text("true"), json!(true));
    }

    #[test]
    fn plain_text_stays_a_string() {
        assert_eq!(scalar_from_text("ABC123"), json!("ABC123"));
        assert_eq!(
            scalar_from_text("2026-06-01T00:00:00Z"),
            json!("2026-06-01T00:00:00Z")
        );
        // JSON containers from text fields are not trusted as structure
        assert_eq!(scalar_from_text("[1,2]"), json!("[1,2]"));
    }
}
