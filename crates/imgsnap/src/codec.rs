//! PNG encode/decode on top of the `image` crate.

use image::RgbaImage;

use crate::error::{Error, Result};

/// Decode any supported image into an RGBA matrix.
/// `what` names the side ("baseline" / "candidate") for error messages.
pub fn decode(bytes: &[u8], what: &'static str) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| Error::Decode { what, source })
}

pub fn encode(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(Error::Encode)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn encoded_png_decodes_to_same_pixels() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let png = encode(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let back = decode(&png, "candidate").unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode(b"definitely not a png", "baseline").unwrap_err();
        assert!(matches!(err, Error::Decode { what: "baseline", .. }));
        assert!(err.to_string().contains("baseline"));
    }
}
