//! `multipart/form-data` encoding.
//!
//! ureq does not bundle multipart support, so the body is built by hand:
//! text parts first, in field order, then one file part per attachment.

use std::collections::BTreeMap;

use ranch_forms::MediaAttachment;

use crate::ApiError;

const BOUNDARY: &str = "ranch-form-boundary-7f3a9c1e";

/// An encoded body and the `Content-Type` header that goes with it.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Read each attachment from disk and encode the full form.
pub fn encode(
    fields: &BTreeMap<String, String>,
    files: &[MediaAttachment],
) -> Result<MultipartForm, ApiError> {
    let mut loaded = Vec::with_capacity(files.len());
    for file in files {
        let path = file.path();
        let bytes = std::fs::read(&path).map_err(|e| ApiError::Attachment {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        loaded.push((file, bytes));
    }
    Ok(encode_parts(fields, &loaded))
}

/// The base boundary, suffixed with a counter until no part contains it.
fn choose_boundary(
    fields: &BTreeMap<String, String>,
    files: &[(&MediaAttachment, Vec<u8>)],
) -> String {
    let collides = |candidate: &str| {
        let needle = candidate.as_bytes();
        fields.values().any(|v| contains(v.as_bytes(), needle))
            || files.iter().any(|(_, bytes)| contains(bytes, needle))
    };
    let mut boundary = BOUNDARY.to_string();
    let mut n = 0u32;
    while collides(&boundary) {
        n += 1;
        boundary = format!("{BOUNDARY}-{n}");
    }
    boundary
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn encode_parts(
    fields: &BTreeMap<String, String>,
    files: &[(&MediaAttachment, Vec<u8>)],
) -> MultipartForm {
    let boundary = choose_boundary(fields, files);
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
                quote(name)
            )
            .as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (file, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                quote(&file.field),
                quote(&file.file_name),
                file.mime_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    MultipartForm {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body,
    }
}

fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace(['\r', '\n'], " ")
}
