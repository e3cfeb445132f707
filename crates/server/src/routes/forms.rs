use axum::extract::Multipart;
use service_client::{FilePart, FormBody};

use crate::errors::JsonApiError;

/// Collect a multipart request into a [`FormBody`]. Parts with a filename
/// become files; everything else is a text field.
pub async fn read_multipart(mut multipart: Multipart) -> Result<FormBody, JsonApiError> {
    let mut form = FormBody::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("cannot read file part {name}: {e}")))?;
                form = form.file(FilePart { field: name, filename, content_type, bytes: bytes.to_vec() });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("cannot read field {name}: {e}")))?;
                form = form.field(name, value);
            }
        }
    }
    Ok(form)
}
