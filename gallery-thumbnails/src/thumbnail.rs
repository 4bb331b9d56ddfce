use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use std::io::Cursor;

/// Error type for thumbnail operations
#[derive(Debug)]
pub enum ThumbnailError {
    /// Source bytes are empty, corrupt or in an unsupported format
    ImageDecode(String),
    ImageEncode(String),
}

impl std::fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThumbnailError::ImageDecode(msg) => write!(f, "Image decode error: {}", msg),
            ThumbnailError::ImageEncode(msg) => write!(f, "Image encode error: {}", msg),
        }
    }
}

impl std::error::Error for ThumbnailError {}

/// An encoded thumbnail ready to be written to blob storage
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedThumbnail {
    pub name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decides whether a save must re-derive the thumbnail.
///
/// A missing prior record counts as a changed source.
pub fn should_regenerate(
    is_new_record: bool,
    has_existing_thumbnail: bool,
    source_changed: bool,
) -> bool {
    is_new_record || !has_existing_thumbnail || source_changed
}

/// Name of the thumbnail blob for a source key: `thumb_` plus the last path
/// segment. The extension is kept as-is even though the content is JPEG.
pub fn thumbnail_name(source_key: &str) -> String {
    let base_name = source_key.rsplit('/').next().unwrap_or(source_key);
    format!("thumb_{}", base_name)
}

/// Produces bounded, orientation-corrected JPEG thumbnails
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailDeriver {
    max_width: u32,
    max_height: u32,
    quality: u8,
}

impl Default for ThumbnailDeriver {
    fn default() -> Self {
        Self::new(400, 400, 100)
    }
}

impl ThumbnailDeriver {
    pub fn new(max_width: u32, max_height: u32, quality: u8) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    pub fn max_size(&self) -> (u32, u32) {
        (self.max_width, self.max_height)
    }

    /// Decodes `source`, corrects its EXIF orientation, flattens it to RGB,
    /// shrinks it to fit the bounds and re-encodes it as JPEG.
    pub fn derive(
        &self,
        source_key: &str,
        source: &[u8],
    ) -> Result<DerivedThumbnail, ThumbnailError> {
        log::debug!("Deriving thumbnail for {} ({} bytes)", source_key, source.len());

        let (img, orientation_tag) = decode_with_orientation(source)?;
        let img = apply_orientation(img, orientation_tag);
        let rgb = img.to_rgb8();

        let (width, height) = calculate_resize_dimensions(
            rgb.width(),
            rgb.height(),
            self.max_width,
            self.max_height,
        );
        let rgb = if (width, height) == rgb.dimensions() {
            rgb
        } else {
            imageops::resize(&rgb, width, height, FilterType::Lanczos3)
        };

        let bytes = encode_jpeg(&rgb, self.quality)?;
        log::debug!(
            "Thumbnail for {}: {}x{}, {} bytes",
            source_key,
            width,
            height,
            bytes.len()
        );

        Ok(DerivedThumbnail {
            name: thumbnail_name(source_key),
            bytes,
            width,
            height,
        })
    }
}

/// Decodes an image and reads its EXIF orientation tag, if any
fn decode_with_orientation(source: &[u8]) -> Result<(DynamicImage, Option<u8>), ThumbnailError> {
    if source.is_empty() {
        return Err(ThumbnailError::ImageDecode("empty image data".to_string()));
    }

    let reader = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| ThumbnailError::ImageDecode(format!("Failed to read image: {}", e)))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| ThumbnailError::ImageDecode(format!("Failed to load image: {}", e)))?;

    let orientation_tag = read_orientation_tag(&mut decoder);

    let img = DynamicImage::from_decoder(decoder)
        .map_err(|e| ThumbnailError::ImageDecode(format!("Failed to decode image: {}", e)))?;

    Ok((img, orientation_tag))
}

/// Raw EXIF orientation value (1-8). Missing or unreadable metadata is `None`.
fn read_orientation_tag(decoder: &mut impl ImageDecoder) -> Option<u8> {
    match decoder.exif_metadata() {
        Ok(Some(_)) => {}
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Ignoring unreadable EXIF metadata: {}", e);
            return None;
        }
    }

    let orientation = decoder.orientation().ok()?;
    #[allow(unreachable_patterns)]
    let tag = match orientation {
        Orientation::NoTransforms => 1,
        Orientation::FlipHorizontal => 2,
        Orientation::Rotate180 => 3,
        Orientation::FlipVertical => 4,
        Orientation::Rotate90FlipH => 5,
        Orientation::Rotate90 => 6,
        Orientation::Rotate270FlipH => 7,
        Orientation::Rotate270 => 8,
        _ => return None,
    };
    Some(tag)
}

/// Rotates according to the orientation tag. Only the pure rotations (3, 6, 8)
/// are corrected; mirrored orientations are left untouched.
///
/// `image` rotates clockwise, so tag 6 (270 degrees counter-clockwise) is
/// `rotate90` and tag 8 (90 degrees counter-clockwise) is `rotate270`.
fn apply_orientation(img: DynamicImage, orientation_tag: Option<u8>) -> DynamicImage {
    match orientation_tag {
        Some(3) => img.rotate180(),
        Some(6) => img.rotate90(),
        Some(8) => img.rotate270(),
        _ => img,
    }
}

/// Fit within the bounds preserving aspect ratio. Never upscales.
fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    let ratio = (original_width as f64 / max_width as f64)
        .max(original_height as f64 / max_height as f64);

    if ratio > 1.0 {
        let new_width = ((original_width as f64 / ratio).round() as u32).clamp(1, max_width);
        let new_height = ((original_height as f64 / ratio).round() as u32).clamp(1, max_height);
        (new_width, new_height)
    } else {
        (original_width, original_height)
    }
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, ThumbnailError> {
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(img)
        .map_err(|e| ThumbnailError::ImageEncode(format!("Failed to write thumbnail: {}", e)))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    pub(crate) fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
        });
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
            _ => DynamicImage::ImageRgba8(img),
        };
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    /// Splices a minimal little-endian EXIF APP1 segment with an orientation
    /// tag right after the JPEG SOI marker.
    pub(crate) fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);
        with_app1(jpeg, &payload)
    }

    fn with_app1(jpeg: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    fn decoded_dimensions(bytes: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_should_regenerate() {
        assert!(should_regenerate(true, true, false));
        assert!(should_regenerate(false, false, false));
        assert!(should_regenerate(false, true, true));
        assert!(!should_regenerate(false, true, false));
    }

    #[test]
    fn test_thumbnail_name_keeps_extension() {
        assert_eq!(thumbnail_name("gallery_images/photo.png"), "thumb_photo.png");
        assert_eq!(thumbnail_name("photo.jpg"), "thumb_photo.jpg");
    }

    #[test]
    fn test_resize_dimensions() {
        let (w, h) = calculate_resize_dimensions(1000, 2000, 400, 400);
        assert_eq!((w, h), (200, 400));

        let (w, h) = calculate_resize_dimensions(2000, 1500, 400, 400);
        assert_eq!((w, h), (400, 300));

        // Smaller than bounds stays untouched
        assert_eq!(calculate_resize_dimensions(120, 80, 400, 400), (120, 80));

        // Extreme ratios keep at least one pixel
        assert_eq!(calculate_resize_dimensions(4000, 2, 400, 400), (400, 1));
    }

    #[test]
    fn test_large_jpeg_is_bounded() {
        let source = encoded(1000, 2000, ImageFormat::Jpeg);
        let thumb = ThumbnailDeriver::default()
            .derive("gallery_images/tall.jpg", &source)
            .unwrap();

        assert!(!thumb.bytes.is_empty());
        assert_eq!(image::guess_format(&thumb.bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(decoded_dimensions(&thumb.bytes), (200, 400));
        assert_eq!(thumb.name, "thumb_tall.jpg");
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let source = encoded(50, 30, ImageFormat::Png);
        let thumb = ThumbnailDeriver::default().derive("a/small.png", &source).unwrap();
        assert_eq!((thumb.width, thumb.height), (50, 30));
        assert_eq!(decoded_dimensions(&thumb.bytes), (50, 30));
    }

    #[test]
    fn test_png_with_alpha_becomes_jpeg() {
        let source = encoded(800, 600, ImageFormat::Png);
        let thumb = ThumbnailDeriver::default().derive("a/photo.png", &source).unwrap();
        assert_eq!(image::guess_format(&thumb.bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(thumb.name, "thumb_photo.png");
        assert_eq!(decoded_dimensions(&thumb.bytes), (400, 300));
    }

    #[test]
    fn test_orientation_six_swaps_aspect() {
        let source = with_exif_orientation(&encoded(100, 200, ImageFormat::Jpeg), 6);
        let thumb = ThumbnailDeriver::default().derive("a/rotated.jpg", &source).unwrap();
        assert_eq!(decoded_dimensions(&thumb.bytes), (200, 100));
    }

    #[test]
    fn test_orientation_three_keeps_aspect() {
        let source = with_exif_orientation(&encoded(100, 200, ImageFormat::Jpeg), 3);
        let thumb = ThumbnailDeriver::default().derive("a/flipped.jpg", &source).unwrap();
        assert_eq!(decoded_dimensions(&thumb.bytes), (100, 200));
    }

    #[test]
    fn test_orientation_three_turns_upside_down() {
        // Red top half, blue bottom half
        let img = RgbImage::from_fn(100, 200, |_, y| {
            if y < 100 {
                image::Rgb([230, 20, 20])
            } else {
                image::Rgb([20, 20, 230])
            }
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .unwrap();
        let source = with_exif_orientation(&buffer.into_inner(), 3);

        let thumb = ThumbnailDeriver::default().derive("a/upside.jpg", &source).unwrap();
        let out = image::load_from_memory(&thumb.bytes).unwrap().to_rgb8();

        let top = out.get_pixel(50, 20);
        let bottom = out.get_pixel(50, 180);
        assert!(top[2] > 180 && top[0] < 80, "top is {:?}", top);
        assert!(bottom[0] > 180 && bottom[2] < 80, "bottom is {:?}", bottom);
    }

    #[test]
    fn test_malformed_exif_is_left_unrotated() {
        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(b"\x13\x37 not a tiff header at all");
        let source = with_app1(&encoded(100, 200, ImageFormat::Jpeg), &payload);

        let thumb = ThumbnailDeriver::default().derive("a/odd.jpg", &source).unwrap();
        assert_eq!(decoded_dimensions(&thumb.bytes), (100, 200));
    }

    #[test]
    fn test_orientation_eight_then_bounded() {
        let source = with_exif_orientation(&encoded(600, 1200, ImageFormat::Jpeg), 8);
        let thumb = ThumbnailDeriver::default().derive("a/big.jpg", &source).unwrap();
        assert_eq!(decoded_dimensions(&thumb.bytes), (400, 200));
    }

    #[test]
    fn test_apply_orientation_ignores_mirrored_tags() {
        let img = DynamicImage::new_rgb8(10, 20);
        assert_eq!(apply_orientation(img.clone(), Some(5)).width(), 10);
        assert_eq!(apply_orientation(img.clone(), None).width(), 10);
        assert_eq!(apply_orientation(img, Some(6)).width(), 20);
    }

    #[test]
    fn test_empty_blob_is_decode_error() {
        let result = ThumbnailDeriver::default().derive("a/empty.jpg", &[]);
        assert!(matches!(result, Err(ThumbnailError::ImageDecode(_))));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = ThumbnailDeriver::default().derive("a/junk.jpg", b"definitely not an image");
        assert!(matches!(result, Err(ThumbnailError::ImageDecode(_))));
    }
}
