use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;

use crate::error::ApiError;

/// UploadFile
///
/// One decoded file part, fully buffered. Uploads are small gallery images,
/// so streaming them through would buy nothing.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Attachment
///
/// Normalized shape of "one file or many" decided once at the request
/// boundary. Handlers never re-inspect part counts.
#[derive(Debug, Clone)]
pub enum Attachment {
    Single(UploadFile),
    Multiple(Vec<UploadFile>),
}

impl Attachment {
    /// Collapses the decoded file list: zero files is no attachment at all.
    pub fn from_files(mut files: Vec<UploadFile>) -> Option<Self> {
        match files.len() {
            0 => None,
            1 => Some(Attachment::Single(files.remove(0))),
            _ => Some(Attachment::Multiple(files)),
        }
    }

    pub fn into_files(self) -> Vec<UploadFile> {
        match self {
            Attachment::Single(file) => vec![file],
            Attachment::Multiple(files) => files,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Attachment::Single(_) => 1,
            Attachment::Multiple(files) => files.len(),
        }
    }
}

/// FormData
///
/// A fully read multipart request: text fields keyed by part name, plus the
/// normalized attachment. Parts with a filename are files, everything else is
/// text; an empty or whitespace text value counts as missing.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    attachment: Option<Attachment>,
}

impl FormData {
    /// read
    ///
    /// Drains the multipart stream. Any malformed part rejects the whole
    /// request; there is no partial form.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();
        let mut files = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(bad_part)? {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(|f| f.to_string());

            match filename {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field.bytes().await.map_err(bad_part)?;
                    files.push(UploadFile {
                        filename,
                        content_type,
                        data,
                    });
                }
                None => {
                    let value = field.text().await.map_err(bad_part)?;
                    fields.insert(name, value);
                }
            }
        }

        Ok(Self {
            fields,
            attachment: Attachment::from_files(files),
        })
    }

    /// Fetches a mandatory text field. Missing and empty are the same failure.
    pub fn require(&self, name: &str) -> Result<String, ApiError> {
        match self.fields.get(name).map(|value| value.trim()) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(ApiError::InvalidInput(format!(
                "Missing required field: {name}."
            ))),
        }
    }

    /// Fetches an optional text field, folding empty strings into `None`.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// True when the request carried neither text fields nor files.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.attachment.is_none()
    }

    pub fn take_attachment(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }
}

fn bad_part(err: MultipartError) -> ApiError {
    ApiError::InvalidInput(format!("Malformed multipart request: {err}."))
}
