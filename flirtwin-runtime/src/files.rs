use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flirtwin_core::types::{ImageAttachment, ImageMime};
use futures_util::future::try_join_all;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Most images a multi-image picker accepts.
pub const MAX_IMAGES: usize = 6;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("You can upload a maximum of {max} photos.")]
    TooMany { max: usize, actual: usize },
    #[error("unsupported image type (expected png, jpeg or webp): {}", path.display())]
    UnsupportedType { path: PathBuf },
    #[error("image file is empty: {}", path.display())]
    Empty { path: PathBuf },
    #[error("read image {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An image read from disk: bytes for sending plus a preview URL.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub name: String,
    pub attachment: ImageAttachment,
}

impl LoadedImage {
    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.attachment.mime().as_str(),
            STANDARD.encode(self.attachment.bytes())
        )
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<ImageMime> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some(ImageMime::Png)
    } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        Some(ImageMime::Jpeg)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageMime::Webp)
    } else {
        None
    }
}

pub async fn load_image(path: &Path) -> Result<LoadedImage, ImageLoadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ImageLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if bytes.is_empty() {
        return Err(ImageLoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageMime::from_extension)
        .or_else(|| sniff_mime(&bytes))
        .ok_or_else(|| ImageLoadError::UnsupportedType {
            path: path.to_path_buf(),
        })?;

    let attachment = ImageAttachment::new(mime, bytes).map_err(|_| ImageLoadError::Empty {
        path: path.to_path_buf(),
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    log::debug!(
        "loaded image {name}: mime={} bytes={}",
        mime.as_str(),
        attachment.bytes().len()
    );
    Ok(LoadedImage { name, attachment })
}

/// Reads every file concurrently; the result keeps the order of `paths`.
pub async fn load_images(paths: &[PathBuf]) -> Result<Vec<LoadedImage>, ImageLoadError> {
    if paths.len() > MAX_IMAGES {
        return Err(ImageLoadError::TooMany {
            max: MAX_IMAGES,
            actual: paths.len(),
        });
    }
    try_join_all(paths.iter().map(|p| load_image(p))).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[tokio::test]
    async fn loads_by_extension_and_builds_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.PNG");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let img = load_image(&path).await.unwrap();
        assert_eq!(img.name, "me.PNG");
        assert_eq!(img.attachment.mime(), ImageMime::Png);
        assert_eq!(img.data_url(), "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn sniffs_when_extension_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, PNG_MAGIC).unwrap();
        assert_eq!(load_image(&path).await.unwrap().attachment.mime(), ImageMime::Png);

        let gif = dir.path().join("anim.gif");
        std::fs::write(&gif, b"GIF89a").unwrap();
        assert!(matches!(
            load_image(&gif).await.unwrap_err(),
            ImageLoadError::UnsupportedType { .. }
        ));
    }

    #[tokio::test]
    async fn empty_and_missing_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.jpg");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(
            load_image(&empty).await.unwrap_err(),
            ImageLoadError::Empty { .. }
        ));
        assert!(matches!(
            load_image(&dir.path().join("nope.jpg")).await.unwrap_err(),
            ImageLoadError::Read { .. }
        ));
    }

    #[tokio::test]
    async fn many_images_keep_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = ["a.jpg", "b.webp", "c.png"]
            .iter()
            .map(|n| {
                let p = dir.path().join(n);
                std::fs::write(&p, n.as_bytes()).unwrap();
                p
            })
            .collect();

        let imgs = load_images(&paths).await.unwrap();
        let names: Vec<_> = imgs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.webp", "c.png"]);
        assert_eq!(imgs[1].attachment.mime(), ImageMime::Webp);
    }

    #[tokio::test]
    async fn more_than_six_is_rejected_before_reading() {
        let paths: Vec<PathBuf> = (0..7).map(|i| PathBuf::from(format!("/nope/{i}.png"))).collect();
        let err = load_images(&paths).await.unwrap_err();
        assert!(matches!(err, ImageLoadError::TooMany { max: 6, actual: 7 }));
        assert_eq!(err.to_string(), "You can upload a maximum of 6 photos.");
    }
}
