use crate::error::ServiceResult;
use image::codecs::jpeg::JpegEncoder;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const JPEG_QUALITY: u8 = 80;
pub const JPEG_MIME: &str = "image/jpeg";

/// A photo ready for upload: always JPEG, re-encoded at [`JPEG_QUALITY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Decodes any supported image format and compresses it to JPEG.
    pub fn from_bytes(data: &[u8]) -> ServiceResult<Self> {
        let decoded = image::load_from_memory(data)?;
        let rgb = decoded.to_rgb8();

        let mut bytes = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
            encoder.encode_image(&rgb)?;
        }

        debug!(
            original = data.len(),
            compressed = bytes.len(),
            width = rgb.width(),
            height = rgb.height(),
            "compressed image"
        );
        Ok(ImageUpload { bytes })
    }

    pub fn from_path(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let data = fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ServiceError;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// A small PNG with an alpha channel, as a photo library might hand over.
    pub(crate) fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(8, 6, |x, y| Rgba([x as u8 * 30, y as u8 * 40, 90, 200]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    pub(crate) fn sample_upload() -> ImageUpload {
        ImageUpload::from_bytes(&sample_png()).unwrap()
    }

    #[test]
    fn png_is_reencoded_as_jpeg() {
        let upload = sample_upload();
        assert!(upload.len() > 2);
        assert_eq!(&upload.bytes()[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(upload.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = ImageUpload::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ServiceError::Image(_)));
    }

    #[test]
    fn missing_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageUpload::from_path(dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, sample_png()).unwrap();
        let upload = ImageUpload::from_path(&path).unwrap();
        assert_eq!(&upload.bytes()[..2], &[0xFF, 0xD8]);
    }
}
