//! Paginated PDF assembly with lopdf.
//!
//! The captured image is scaled to the page width and cut into one slice
//! per page height. Each page embeds only its own slice, so no single JPEG
//! grows with the length of the document.

use std::io::Cursor;
use std::ops::Range;

use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use lopdf::{Document, Object, Stream, dictionary};

use super::ExportError;

/// A4 portrait, in points.
pub const A4_WIDTH_PT: f64 = 595.28;
pub const A4_HEIGHT_PT: f64 = 841.89;

/// Vertical image offsets, one per page.
///
/// The first page draws the image at 0; each further page is one page
/// height higher, and pages are added while image height remains.
pub fn page_offsets(image_height: f64, page_height: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    if page_height <= 0.0 {
        return offsets;
    }
    let mut position = 0.0;
    let mut height_left = image_height - page_height;
    while height_left > 0.0 {
        position -= page_height;
        offsets.push(position);
        height_left -= page_height;
    }
    offsets
}

/// Wraps a captured image into a downloadable document.
pub trait DocumentAssembly: Send + Sync {
    /// Build the document bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded or the document
    /// cannot be serialised.
    fn assemble(&self, image: &RgbaImage) -> Result<Vec<u8>, ExportError>;
}

/// Fixed-size pages with the image placed full width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfAssembler {
    pub page_width: f64,
    pub page_height: f64,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
        }
    }
}

impl PdfAssembler {
    /// Pixel rows of an image `pixel_width` wide shown on each page.
    ///
    /// Rows are taken from the [`page_offsets`] of the image once scaled to
    /// page width. Consecutive slices are contiguous and cover every row.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn page_slices(&self, pixel_width: u32, pixel_height: u32) -> Vec<Range<u32>> {
        if pixel_width == 0 || pixel_height == 0 {
            return Vec::new();
        }
        let pixels_per_point = f64::from(pixel_width) / self.page_width;
        let image_height = f64::from(pixel_height) / pixels_per_point;
        let to_row = |points: f64| {
            ((points * pixels_per_point).round().max(0.0) as u32).min(pixel_height)
        };

        let mut slices: Vec<Range<u32>> = Vec::new();
        for position in page_offsets(image_height, self.page_height) {
            let top = slices.last().map_or(0, |slice| slice.end);
            if top >= pixel_height {
                break;
            }
            let bottom = to_row(self.page_height - position).max(top + 1);
            slices.push(top..bottom);
        }
        if let Some(last) = slices.last_mut() {
            last.end = pixel_height;
        }
        slices
    }
}

impl DocumentAssembly for PdfAssembler {
    fn assemble(&self, image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
        let (pixel_width, pixel_height) = image.dimensions();
        if pixel_width == 0 || pixel_height == 0 {
            return Err(ExportError::Assemble("captured image is empty".to_string()));
        }
        let pixels_per_point = f64::from(pixel_width) / self.page_width;
        let slices = self.page_slices(pixel_width, pixel_height);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        #[allow(clippy::cast_possible_truncation)]
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            Object::Real(self.page_width as f32),
            Object::Real(self.page_height as f32),
        ];
        let mut kids: Vec<Object> = Vec::with_capacity(slices.len());
        for slice in &slices {
            let rows = slice.end - slice.start;
            let part = imageops::crop_imm(image, 0, slice.start, pixel_width, rows).to_image();
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(pixel_width),
                    "Height" => i64::from(rows),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8_i64,
                    "Filter" => "DCTDecode",
                },
                encode_jpeg(&part)?,
            ));
            let resources_id = doc.add_object(dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            });

            // Each slice hangs from the top edge of its page.
            let width = self.page_width;
            let height = f64::from(rows) / pixels_per_point;
            let y = self.page_height - height;
            let content = format!("q {width:.2} 0 0 {height:.2} 0 {y:.2} cm /Im0 Do Q");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let page_count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|err| ExportError::Assemble(err.to_string()))?;
        tracing::debug!(pages = slices.len(), bytes = bytes.len(), "assembled pdf");
        Ok(bytes)
    }
}

fn encode_jpeg(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    // JPEG carries no alpha channel.
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut cursor = Cursor::new(Vec::new());
    rgb.write_to(&mut cursor, ImageFormat::Jpeg)
        .map_err(|err| ExportError::Assemble(err.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_when_image_fits() {
        assert_eq!(page_offsets(500.0, A4_HEIGHT_PT), vec![0.0]);
        assert_eq!(page_offsets(A4_HEIGHT_PT, A4_HEIGHT_PT), vec![0.0]);
    }

    #[test]
    fn test_offsets_step_by_page_height() {
        let offsets = page_offsets(2000.0, A4_HEIGHT_PT);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[1] + A4_HEIGHT_PT).abs() < 1e-9);
        assert!((offsets[2] + 2.0 * A4_HEIGHT_PT).abs() < 1e-9);
    }

    #[test]
    fn test_page_count_is_ceiling_of_ratio() {
        for pages in 1..6_u32 {
            let height = f64::from(pages).mul_add(A4_HEIGHT_PT, -1.0);
            assert_eq!(page_offsets(height, A4_HEIGHT_PT).len(), pages as usize);
        }
    }

    #[test]
    fn test_assembled_pdf_has_expected_pages() {
        // Tall enough for three A4 pages once scaled to page width.
        let image = RgbaImage::from_pixel(100, 400, image::Rgba([200, 10, 10, 255]));
        assert_eq!(PdfAssembler::default().page_slices(100, 400).len(), 3);

        let bytes = PdfAssembler::default().assemble(&image).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn test_slices_cover_image_contiguously() {
        let assembler = PdfAssembler::default();
        let slices = assembler.page_slices(100, 400);
        assert_eq!(slices.first().map(|slice| slice.start), Some(0));
        assert_eq!(slices.last().map(|slice| slice.end), Some(400));
        for pair in slices.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        // One page height of a 100px wide image is about 141 rows.
        assert!((140..=142).contains(&(slices[0].end - slices[0].start)));
        assert_eq!(assembler.page_slices(100, 0), Vec::<Range<u32>>::new());
    }

    #[test]
    fn test_capture_taller_than_jpeg_limit_assembles() {
        let height = 66_000;
        let image = RgbaImage::from_pixel(40, height, image::Rgba([250, 250, 250, 255]));
        let assembler = PdfAssembler::default();

        let slices = assembler.page_slices(40, height);
        assert!(slices.iter().all(|slice| slice.end - slice.start < 65_535));
        assert_eq!(slices.last().map(|slice| slice.end), Some(height));

        let bytes = assembler.assemble(&image).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let image = RgbaImage::new(0, 0);
        assert!(PdfAssembler::default().assemble(&image).is_err());
    }
}
