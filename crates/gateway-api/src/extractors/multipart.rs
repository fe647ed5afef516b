//! Multipart form collection for catalog writes.
//!
//! Text fields are gathered into a JSON object; the optional `image` part is
//! forwarded as `{ originalname, mimetype, size, buffer }` with a base64 body.

use axum::extract::{FromRequest, Multipart, Request};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use validator::Validate;

use gateway_core::error::AppError;

use crate::error::ApiError;

/// Name of the file part accepted by catalog forms.
pub const IMAGE_FIELD: &str = "image";

/// Text fields and optional image of a multipart body.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    /// Text fields by name.
    pub fields: Map<String, Value>,
    /// Encoded image part, if one was uploaded.
    pub image: Option<Value>,
}

impl FormData {
    /// Deserializes and validates the text fields as `T`.
    pub fn parse<T: DeserializeOwned + Validate>(&self) -> Result<T, AppError> {
        let value: T = serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| AppError::validation(format!("Invalid form: {e}")))?;
        value
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(value)
    }
}

impl<S: Send + Sync> FromRequest<S> for FormData {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == IMAGE_FIELD {
                let original_name = field.file_name().map(String::from);
                let mime_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                form.image = Some(json!({
                    "originalname": original_name,
                    "mimetype": mime_type,
                    "size": data.len(),
                    "buffer": STANDARD.encode(&data),
                }));
            } else if !name.is_empty() {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                form.fields.insert(name, Value::String(text));
            }
        }

        Ok(form)
    }
}
