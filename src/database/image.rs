use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::constants::{IMAGE_DIR, IMAGE_EXTENSIONS};

use super::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Decodes `data:image/<ext>;base64,<payload>`.
pub fn decode_data_uri(value: &str) -> Result<DecodedImage, ApiError> {
    let invalid = || ApiError::validation("image: Expected a base64 encoded data URI");

    let rest = value.trim().strip_prefix("data:").ok_or_else(invalid)?;
    let (media_type, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let media_type = media_type.strip_suffix(";base64").ok_or_else(invalid)?;
    let extension = media_type
        .strip_prefix("image/")
        .ok_or_else(|| ApiError::validation("image: Only images are accepted"))?
        .to_ascii_lowercase();

    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::Validation(format!(
            "image: Unsupported image type {extension}"
        )));
    }

    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    if bytes.is_empty() {
        return Err(ApiError::validation("image: Image is empty"));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Writes the image below `media_root` and returns the path relative to it.
pub async fn store_image(media_root: &Path, image: &DecodedImage) -> Result<String, ApiError> {
    let directory = media_root.join(IMAGE_DIR);
    tokio::fs::create_dir_all(&directory)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create {directory:?}: {e}")))?;

    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), image.extension);
    tokio::fs::write(directory.join(&file_name), &image.bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to write image: {e}")))?;

    log::trace!("> Stored image {file_name}");
    Ok(format!("{IMAGE_DIR}/{file_name}"))
}

pub async fn remove_image(media_root: &Path, relative: &str) {
    let path: PathBuf = media_root.join(relative);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        log::warn!("> Failed to remove image {path:?}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_payload() {
        let image = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.bytes, b"hello");
    }

    #[test]
    fn rejects_other_shapes() {
        for value in [
            "aGVsbG8=",
            "data:image/png,aGVsbG8=",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/tiff;base64,aGVsbG8=",
            "data:image/png;base64,***",
            "data:image/png;base64,",
        ] {
            assert!(
                matches!(decode_data_uri(value), Err(ApiError::Validation(_))),
                "{value} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn stores_and_removes_files() {
        let root = tempfile::tempdir().unwrap();
        let image = decode_data_uri("data:image/JPEG;base64,aGVsbG8=").unwrap();

        let relative = store_image(root.path(), &image).await.unwrap();
        assert!(relative.starts_with(IMAGE_DIR));
        assert!(relative.ends_with(".jpeg"));

        let stored = std::fs::read(root.path().join(&relative)).unwrap();
        assert_eq!(stored, b"hello");

        remove_image(root.path(), &relative).await;
        assert!(!root.path().join(&relative).exists());
    }
}
