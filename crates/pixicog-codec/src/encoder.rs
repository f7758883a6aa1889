use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;

use crate::error::FormatError;
use crate::image::{Image, WorkingSet, CHANNELS};

/// Encode a working set as checkpoint text.
///
/// One line per entry, `name,<image>,<image>,...`, each line terminated by
/// `\n`. An empty set encodes to the empty string.
pub fn encode(ws: &WorkingSet) -> Result<String, FormatError> {
    let mut out = String::new();
    for (name, images) in ws {
        validate_name(name)?;
        out.push_str(name);
        for image in images {
            out.push(',');
            out.push_str(&encode_image(image));
        }
        out.push('\n');
    }
    Ok(out)
}

/// `<width>|<height>|4|<payload>`, the payload being unpadded standard
/// base64 of the pixels visited column by column.
pub fn encode_image(image: &Image) -> String {
    let payload = STANDARD_NO_PAD.encode(column_major_bytes(image));
    format!(
        "{}|{}|{}|{}",
        image.width(),
        image.height(),
        CHANNELS,
        payload
    )
}

fn column_major_bytes(image: &Image) -> Vec<u8> {
    let raw = image.as_raw();
    let stride = image.width() as usize * CHANNELS;
    let mut out = Vec::with_capacity(raw.len());
    for x in 0..image.width() as usize {
        for y in 0..image.height() as usize {
            let offset = y * stride + x * CHANNELS;
            out.extend_from_slice(&raw[offset..offset + CHANNELS]);
        }
    }
    out
}

fn validate_name(name: &str) -> Result<(), FormatError> {
    if name.is_empty() || name.contains([',', '\n', '\r']) {
        return Err(FormatError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Rgba;

    #[test]
    fn test_encode_empty_set() {
        assert_eq!(encode(&WorkingSet::new()).unwrap(), "");
    }

    #[test]
    fn test_encode_single_pixel() {
        let mut ws = WorkingSet::new();
        ws.insert("one", vec![Image::filled(1, 1, Rgba::WHITE)]);
        // 0xFFFFFFFF -> "/////w" without padding
        assert_eq!(encode(&ws).unwrap(), "one,1|1|4|/////w\n");
    }

    #[test]
    fn test_encode_column_major() {
        // 2x1: left pixel 1,2,3,4 right pixel 5,6,7,8; 1x2 with the same
        // bytes top-to-bottom must produce the identical payload.
        let wide = Image::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let tall = Image::from_raw(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let wide_payload = encode_image(&wide);
        let tall_payload = encode_image(&tall);
        assert_eq!(wide_payload.rsplit('|').next(), tall_payload.rsplit('|').next());

        // 2x2 row-major [a b / c d] must be emitted a, c, b, d.
        let mut grid = Image::new(2, 2);
        grid.put_pixel(0, 0, Rgba::new(1, 1, 1, 1));
        grid.put_pixel(1, 0, Rgba::new(2, 2, 2, 2));
        grid.put_pixel(0, 1, Rgba::new(3, 3, 3, 3));
        grid.put_pixel(1, 1, Rgba::new(4, 4, 4, 4));
        let expected = STANDARD_NO_PAD.encode([1u8, 1, 1, 1, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4]);
        assert_eq!(encode_image(&grid), format!("2|2|4|{}", expected));
    }

    #[test]
    fn test_encode_empty_list_and_zero_image() {
        let mut ws = WorkingSet::new();
        ws.insert("empty", Vec::new());
        ws.insert("zero", vec![Image::new(0, 0)]);
        assert_eq!(encode(&ws).unwrap(), "empty\nzero,0|0|4|\n");
    }

    #[test]
    fn test_encode_rejects_bad_names() {
        for name in ["", "a,b", "a\nb", "a\rb"] {
            let mut ws = WorkingSet::new();
            ws.insert(name, Vec::new());
            assert!(matches!(encode(&ws), Err(FormatError::InvalidName { .. })), "{:?}", name);
        }
    }
}
