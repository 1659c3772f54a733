use std::path::Path;

use crate::error::{ViewerError, ViewerResult};
use crate::model::{TextureBinding, TextureKind};

use super::wgpu_backend::WgpuContext;

const CHECKER_SIZE: u32 = 8;

/// Decoded RGBA8 pixels, bottom row first to match the cube's UVs
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn decode_rgba(path: &Path) -> ViewerResult<DecodedImage> {
    let image = image::open(path).map_err(|source| ViewerError::TextureDecode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.flipv().into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage { width, height, pixels: rgba.into_raw() })
}

/// Magenta and black squares, used when an image can't be read
pub fn checkerboard() -> DecodedImage {
    let mut pixels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let on = (x + y) % 2 == 0;
            pixels.extend_from_slice(if on { &[255, 0, 255, 255] } else { &[0, 0, 0, 255] });
        }
    }
    DecodedImage { width: CHECKER_SIZE, height: CHECKER_SIZE, pixels }
}

/// Upload the image at `path`, falling back to a checkerboard if it fails to decode.
pub fn load_texture(ctx: &mut WgpuContext, path: &Path, kind: TextureKind) -> TextureBinding {
    let image = decode_rgba(path).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "using checkerboard texture");
        checkerboard()
    });
    let label = path.display().to_string();
    let id = ctx.create_texture_rgba8(&label, image.width, image.height, &image.pixels);
    TextureBinding { id, kind, path: path.to_path_buf() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates() {
        let img = checkerboard();
        assert_eq!(img.pixels.len(), (img.width * img.height * 4) as usize);
        assert_eq!(&img.pixels[0..4], &[255, 0, 255, 255]);
        assert_eq!(&img.pixels[4..8], &[0, 0, 0, 255]);
        let row = (img.width * 4) as usize;
        assert_eq!(&img.pixels[row..row + 4], &[0, 0, 0, 255]);
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("definitely/not/here.png");
        match decode_rgba(path) {
            Err(ViewerError::TextureDecode { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("decoded a missing file"),
        }
    }

    #[test]
    fn decoded_rows_are_flipped() {
        let dir = std::env::temp_dir().join("scene_viewer_texture_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("two_rows.png");
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let decoded = decode_rgba(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (1, 2));
        // Top row of the file ends up last
        assert_eq!(&decoded.pixels[0..4], &[0, 0, 255, 255]);
        assert_eq!(&decoded.pixels[4..8], &[255, 0, 0, 255]);
    }
}
