use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;

use crate::error::FormatError;
use crate::image::{buffer_len, Image, ImageList, WorkingSet, CHANNELS};

/// Decode checkpoint text produced by [`crate::encode`].
///
/// A single trailing newline is ignored; every other line must carry a
/// non-empty entry name. A repeated name overwrites the earlier entry.
pub fn decode(input: &str) -> Result<WorkingSet, FormatError> {
    let body = input.strip_suffix('\n').unwrap_or(input);
    let mut ws = WorkingSet::new();
    if body.is_empty() {
        return Ok(ws);
    }

    for (idx, line) in body.split('\n').enumerate() {
        let line_no = idx + 1;
        let mut tokens = line.split(',');
        let name = tokens
            .next()
            .filter(|name| !name.is_empty())
            .ok_or(FormatError::MissingName { line: line_no })?;
        let images = tokens
            .map(|token| decode_image(token, line_no))
            .collect::<Result<ImageList, _>>()?;
        ws.insert(name, images);
    }

    Ok(ws)
}

/// Decode one `<width>|<height>|<channels>|<payload>` entry.
pub fn decode_image(token: &str, line: usize) -> Result<Image, FormatError> {
    let fields: Vec<&str> = token.split('|').collect();
    if fields.len() != 4 {
        return Err(FormatError::FieldCount {
            line,
            found: fields.len(),
        });
    }

    let width: u32 = parse_field(fields[0], "width", line)?;
    let height: u32 = parse_field(fields[1], "height", line)?;
    let channels: usize = parse_field(fields[2], "channel count", line)?;
    if channels != CHANNELS {
        return Err(FormatError::UnsupportedChannels {
            line,
            found: channels,
        });
    }

    let data = STANDARD_NO_PAD
        .decode(fields[3])
        .map_err(|source| FormatError::Payload { line, source })?;
    let expected = buffer_len(width, height).ok_or(FormatError::TooLarge { width, height })?;
    if data.len() != expected {
        return Err(FormatError::PayloadLength {
            line,
            expected,
            found: data.len(),
        });
    }

    // Payload walks x outer, y inner; the buffer is row-major.
    let (w, h) = (width as usize, height as usize);
    let mut pixels = vec![0u8; expected];
    for (i, px) in data.chunks_exact(CHANNELS).enumerate() {
        let (x, y) = (i / h, i % h);
        let offset = (y * w + x) * CHANNELS;
        pixels[offset..offset + CHANNELS].copy_from_slice(px);
    }

    Image::from_raw(width, height, pixels)
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<T, FormatError> {
    value.parse().map_err(|_| FormatError::InvalidNumber {
        line,
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Rgba;

    #[test]
    fn test_decode_empty() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("\n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_single_pixel() {
        let ws = decode("one,1|1|4|/////w,1|1|4|AAAA/w\n").unwrap();
        let list = ws.get("one").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].get_pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(list[1].get_pixel(0, 0), Some(Rgba::BLACK));
    }

    #[test]
    fn test_decode_column_major() {
        let payload = STANDARD_NO_PAD.encode([1u8, 1, 1, 1, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4]);
        let ws = decode(&format!("grid,2|2|4|{}", payload)).unwrap();
        let img = &ws.get("grid").unwrap()[0];
        assert_eq!(img.get_pixel(0, 0), Some(Rgba::new(1, 1, 1, 1)));
        assert_eq!(img.get_pixel(1, 0), Some(Rgba::new(2, 2, 2, 2)));
        assert_eq!(img.get_pixel(0, 1), Some(Rgba::new(3, 3, 3, 3)));
        assert_eq!(img.get_pixel(1, 1), Some(Rgba::new(4, 4, 4, 4)));
    }

    #[test]
    fn test_decode_name_only_line_is_empty_list() {
        let ws = decode("empty\nzero,0|0|4|\n").unwrap();
        assert_eq!(ws.get("empty").map(Vec::len), Some(0));
        let zero = &ws.get("zero").unwrap()[0];
        assert_eq!((zero.width(), zero.height()), (0, 0));
    }

    #[test]
    fn test_decode_missing_name() {
        assert!(matches!(decode("a\n\nb\n"), Err(FormatError::MissingName { line: 2 })));
        assert!(matches!(decode(",1|1|4|/////w"), Err(FormatError::MissingName { line: 1 })));
    }

    #[test]
    fn test_decode_field_count() {
        assert!(matches!(decode("a,1|1|/////w"), Err(FormatError::FieldCount { found: 3, .. })));
        assert!(matches!(decode("a,1|1|4|x|y"), Err(FormatError::FieldCount { found: 5, .. })));
        assert!(matches!(decode("a,"), Err(FormatError::FieldCount { found: 1, .. })));
    }

    #[test]
    fn test_decode_bad_numbers() {
        assert!(matches!(
            decode("a,w|1|4|/////w"),
            Err(FormatError::InvalidNumber { field: "width", .. })
        ));
        assert!(matches!(
            decode("a,1|-1|4|/////w"),
            Err(FormatError::InvalidNumber { field: "height", .. })
        ));
        assert!(matches!(
            decode("a,1|1|four|/////w"),
            Err(FormatError::InvalidNumber { field: "channel count", .. })
        ));
        assert!(matches!(
            decode("a,1|1|3|////"),
            Err(FormatError::UnsupportedChannels { found: 3, .. })
        ));
    }

    #[test]
    fn test_decode_payload_errors() {
        assert!(matches!(decode("a,1|1|4|!!!!"), Err(FormatError::Payload { .. })));
        assert!(matches!(
            decode("a,2|1|4|/////w"),
            Err(FormatError::PayloadLength { expected: 8, found: 4, .. })
        ));
    }

    #[test]
    fn test_error_reports_line_number() {
        let err = decode("ok,1|1|4|/////w\nbad,1|1\n").unwrap_err();
        assert!(matches!(err, FormatError::FieldCount { line: 2, found: 2 }));
        assert!(err.to_string().contains("line 2"));
    }
}
