// ============================================================================
// EXPORT: encode the persisted surface to an image file
// ============================================================================

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tga::TgaEncoder;
use image::{ImageEncoder, RgbImage, RgbaImage};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub const JPEG_QUALITY: u8 = 90;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tga,
}

impl SaveFormat {
    pub fn all() -> &'static [SaveFormat] {
        &[SaveFormat::Png, SaveFormat::Jpeg, SaveFormat::Bmp, SaveFormat::Tga]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SaveFormat::Png => "PNG",
            SaveFormat::Jpeg => "JPEG",
            SaveFormat::Bmp => "BMP",
            SaveFormat::Tga => "TGA",
        }
    }

    /// Format name or file extension, case-insensitive.
    pub fn parse(s: &str) -> Option<SaveFormat> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "bmp" => Some(SaveFormat::Bmp),
            "tga" => Some(SaveFormat::Tga),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<SaveFormat> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(SaveFormat::parse)
    }
}

/// Flatten straight-alpha RGBA onto an opaque white background.
pub fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    let (w, h) = image.dimensions();
    let mut out = RgbImage::new(w, h);
    let src_row = w as usize * 4;
    let dst_row = w as usize * 3;
    let src = image.as_raw();
    let dst: &mut [u8] = &mut out;
    dst.par_chunks_mut(dst_row)
        .zip(src.par_chunks(src_row))
        .for_each(|(d, s)| {
            for (dp, sp) in d.chunks_exact_mut(3).zip(s.chunks_exact(4)) {
                let a = sp[3] as f32 / 255.0;
                for c in 0..3 {
                    dp[c] = (sp[c] as f32 * a + 255.0 * (1.0 - a)).round() as u8;
                }
            }
        });
    out
}

/// Encode `image` into `path` in the requested format.
pub fn save_image(image: &RgbaImage, path: &Path, format: SaveFormat) -> Result<(), String> {
    let result = encode_and_write(image, path, format);
    match &result {
        Ok(()) => crate::log_info!(
            "exported {}x{} {} to {}",
            image.width(),
            image.height(),
            format.label(),
            path.display()
        ),
        Err(e) => crate::log_err!("export to {} failed: {}", path.display(), e),
    }
    result
}

fn encode_and_write(image: &RgbaImage, path: &Path, format: SaveFormat) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("Cannot create '{}': {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);
    let (w, h) = image.dimensions();

    let encoded = match format {
        SaveFormat::Png => {
            PngEncoder::new(&mut writer).write_image(image.as_raw(), w, h, image::ColorType::Rgba8)
        }
        SaveFormat::Jpeg => {
            let rgb = flatten_onto_white(image);
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode(
                rgb.as_raw(),
                w,
                h,
                image::ColorType::Rgb8,
            )
        }
        SaveFormat::Bmp => {
            BmpEncoder::new(&mut writer).encode(image.as_raw(), w, h, image::ColorType::Rgba8)
        }
        SaveFormat::Tga => {
            TgaEncoder::new(&mut writer).encode(image.as_raw(), w, h, image::ColorType::Rgba8)
        }
    };
    encoded.map_err(|e| format!("Failed to encode {}: {}", format.label(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_name_or_extension() {
        assert_eq!(SaveFormat::parse("PNG"), Some(SaveFormat::Png));
        assert_eq!(SaveFormat::parse(".jpeg"), Some(SaveFormat::Jpeg));
        assert_eq!(SaveFormat::parse("gif"), None);
        assert_eq!(
            SaveFormat::from_path(Path::new("/tmp/out.TGA")),
            Some(SaveFormat::Tga)
        );
        assert_eq!(SaveFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn transparent_pixels_flatten_to_white() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(1, 0, image::Rgba([255, 0, 0, 255]));
        let rgb = flatten_onto_white(&img);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn png_export_round_trips_pixels() {
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(2, 1, image::Rgba([1, 2, 3, 200]));
        let path = std::env::temp_dir().join(format!("zpaint_export_{}.png", std::process::id()));
        save_image(&img, &path, SaveFormat::Png).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, img);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let img = RgbaImage::new(1, 1);
        let path = std::env::temp_dir()
            .join("zpaint_missing_dir_for_export")
            .join("deeper")
            .join("x.png");
        assert!(save_image(&img, &path, SaveFormat::Png).is_err());
    }
}
