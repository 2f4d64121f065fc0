//! facematch-render — Draw match boxes and labels onto the target image.

pub mod glyphs;

use facematch_core::{Annotation, BoundingBox, Renderer};
use glyphs::{glyph, text_width, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_COLOR: [u8; 3] = [255, 0, 0];
pub const DEFAULT_THICKNESS: u32 = 5;
pub const DEFAULT_LABEL_SCALE: u32 = 2;
/// Largest stroke width and label scale accepted from configuration.
pub const MAX_THICKNESS: u32 = 64;
pub const MAX_LABEL_SCALE: u32 = 32;
/// Gap between the bottom of a label and the top of its box.
const LABEL_GAP: u32 = 3;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to save image {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Raster renderer: hollow rectangle per match, label above its top-left corner.
#[derive(Debug, Clone)]
pub struct ImageRenderer {
    pub color: Rgb<u8>,
    /// Stroke width in pixels, drawn inward from the box edge.
    pub thickness: u32,
    /// Integer scale applied to the 5×7 glyphs.
    pub label_scale: u32,
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self {
            color: Rgb(DEFAULT_COLOR),
            thickness: DEFAULT_THICKNESS,
            label_scale: DEFAULT_LABEL_SCALE,
        }
    }
}

impl ImageRenderer {
    /// Draw every annotation in place.
    pub fn annotate(&self, image: &mut RgbImage, annotations: &[Annotation]) {
        for a in annotations {
            if !self.draw_box(image, &a.bounding_box) {
                tracing::warn!(
                    face_index = a.face_index,
                    bbox = %a.bounding_box,
                    width = image.width(),
                    height = image.height(),
                    "box lies outside the image; not drawn"
                );
                continue;
            }
            let scale = self.label_scale.max(1);
            let text_height = GLYPH_HEIGHT.saturating_mul(scale);
            let y = a.bounding_box.top.saturating_sub(text_height.saturating_add(LABEL_GAP));
            // Shift left so the label stays inside the image when it can.
            let x = a
                .bounding_box
                .left
                .min(image.width().saturating_sub(text_width(&a.label, scale)));
            self.draw_text(image, x, y, &a.label);
        }
    }

    /// Returns false when the box does not intersect the image.
    fn draw_box(&self, image: &mut RgbImage, bbox: &BoundingBox) -> bool {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 || bbox.left >= w || bbox.top >= h {
            return false;
        }
        let right = bbox.right.min(w - 1);
        let bottom = bbox.bottom.min(h - 1);
        let t = self.thickness.max(1);

        for y in bbox.top..=bottom {
            for x in bbox.left..=right {
                let on_edge = x - bbox.left < t
                    || bbox.right.saturating_sub(x) < t
                    || y - bbox.top < t
                    || bbox.bottom.saturating_sub(y) < t;
                if on_edge {
                    image.put_pixel(x, y, self.color);
                }
            }
        }
        true
    }

    fn draw_text(&self, image: &mut RgbImage, x0: u32, y0: u32, text: &str) {
        let (w, h) = image.dimensions();
        let s = self.label_scale.max(1);
        let advance = GLYPH_ADVANCE.saturating_mul(s);

        for (i, c) in text.chars().enumerate() {
            let gx = x0.saturating_add(advance.saturating_mul(i as u32));
            if gx >= w {
                break;
            }
            for (row, bits) in glyph(c).iter().enumerate() {
                let y_start = y0.saturating_add((row as u32).saturating_mul(s));
                if y_start >= h {
                    break;
                }
                let y_end = y_start.saturating_add(s).min(h);
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    // Each set bit is an s×s cell, clipped to the image.
                    let x_start = gx.saturating_add(col.saturating_mul(s));
                    let x_end = x_start.saturating_add(s).min(w);
                    for py in y_start..y_end {
                        for px in x_start..x_end {
                            image.put_pixel(px, py, self.color);
                        }
                    }
                }
            }
        }
    }
}

impl Renderer for ImageRenderer {
    type Error = RenderError;

    fn render(&self, image: &Path, annotations: &[Annotation], output: &Path) -> Result<(), RenderError> {
        let mut canvas = image::open(image)
            .map_err(|source| RenderError::Open {
                path: image.to_path_buf(),
                source,
            })?
            .to_rgb8();

        self.annotate(&mut canvas, annotations);

        canvas.save(output).map_err(|source| RenderError::Save {
            path: output.to_path_buf(),
            source,
        })?;

        tracing::info!(
            output = %output.display(),
            boxes = annotations.len(),
            "annotated image written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn annotation(top: u32, right: u32, bottom: u32, left: u32, label: &str) -> Annotation {
        Annotation {
            face_index: 0,
            bounding_box: BoundingBox { top, right, bottom, left },
            label: label.into(),
        }
    }

    #[test]
    fn test_box_edges_drawn_interior_untouched() {
        let mut img = RgbImage::new(100, 100);
        let renderer = ImageRenderer { thickness: 2, ..Default::default() };
        renderer.annotate(&mut img, &[annotation(40, 80, 90, 20, "")]);

        assert_eq!(*img.get_pixel(20, 40), RED);
        assert_eq!(*img.get_pixel(21, 60), RED);
        assert_eq!(*img.get_pixel(80, 90), RED);
        assert_eq!(*img.get_pixel(79, 60), RED);
        assert_eq!(*img.get_pixel(22, 60), BLACK);
        assert_eq!(*img.get_pixel(50, 65), BLACK);
        assert_eq!(*img.get_pixel(19, 40), BLACK);
    }

    #[test]
    fn test_box_clamped_to_image() {
        let mut img = RgbImage::new(50, 50);
        ImageRenderer::default().annotate(&mut img, &[annotation(10, 500, 400, 10, "")]);
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(30, 30), BLACK);
    }

    #[test]
    fn test_box_outside_image_skipped() {
        let mut img = RgbImage::new(20, 20);
        ImageRenderer::default().annotate(&mut img, &[annotation(30, 60, 60, 30, "bob")]);
        assert!(img.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_label_drawn_above_box() {
        let mut img = RgbImage::new(100, 100);
        let renderer = ImageRenderer { thickness: 1, label_scale: 1, ..Default::default() };
        renderer.annotate(&mut img, &[annotation(50, 90, 90, 10, "L")]);

        // 'L' is a vertical bar in column 0 plus a bottom row; label top is 50 - 7 - 3.
        assert_eq!(*img.get_pixel(10, 40), RED);
        assert_eq!(*img.get_pixel(10, 46), RED);
        assert_eq!(*img.get_pixel(14, 46), RED);
        assert_eq!(*img.get_pixel(14, 40), BLACK);
        assert_eq!(*img.get_pixel(10, 39), BLACK);
    }

    #[test]
    fn test_label_near_top_clamped() {
        let mut img = RgbImage::new(60, 60);
        let renderer = ImageRenderer { thickness: 1, label_scale: 1, ..Default::default() };
        renderer.annotate(&mut img, &[annotation(2, 50, 50, 5, "I")]);
        // 'I' top row spans columns 1..=3 of the glyph.
        assert_eq!(*img.get_pixel(6, 0), RED);
    }

    #[test]
    fn test_label_kept_inside_right_edge() {
        let mut img = RgbImage::new(40, 40);
        let renderer = ImageRenderer { thickness: 1, label_scale: 1, ..Default::default() };
        // "LL" is 11 px wide; a box starting at x=35 pushes it back to x=29.
        renderer.annotate(&mut img, &[annotation(20, 39, 39, 35, "LL")]);
        assert_eq!(*img.get_pixel(29, 10), RED);
        assert_eq!(*img.get_pixel(35, 10), RED);
        assert_eq!(*img.get_pixel(28, 10), BLACK);
    }

    #[test]
    fn test_huge_scale_and_thickness_do_not_overflow() {
        let mut img = RgbImage::new(32, 32);
        let renderer = ImageRenderer {
            thickness: u32::MAX,
            label_scale: u32::MAX / 4,
            ..Default::default()
        };
        renderer.annotate(&mut img, &[annotation(10, 30, 30, 2, "bob")]);
        // The stroke swallows the whole box; the label cell fills from the origin.
        assert_eq!(*img.get_pixel(15, 20), RED);
        assert_eq!(*img.get_pixel(0, 0), RED);
    }

    #[test]
    fn test_render_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("group.png");
        let output = dir.path().join("group_annotated.png");
        RgbImage::new(64, 64).save(&input).unwrap();

        ImageRenderer::default()
            .render(&input, &[annotation(20, 60, 60, 4, "teddy")], &output)
            .unwrap();

        let written = image::open(&output).unwrap().to_rgb8();
        assert_eq!(written.dimensions(), (64, 64));
        assert_eq!(*written.get_pixel(4, 20), RED);
    }

    #[test]
    fn test_render_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageRenderer::default()
            .render(&dir.path().join("missing.png"), &[], &dir.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Open { .. }));
    }
}
