//! Image, ImageList and WorkingSet: the data threaded through a pipeline.
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

use crate::error::FormatError;

/// Bytes per pixel. Checkpoints always carry RGBA.
pub const CHANNELS: usize = 4;

/// One 8-bit RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_bytes(self) -> [u8; CHANNELS] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; CHANNELS]> for Rgba {
    fn from([r, g, b, a]: [u8; CHANNELS]) -> Self {
        Self { r, g, b, a }
    }
}

/// A width × height grid of RGBA pixels.
///
/// The buffer is stored row-major (`(y * width + x) * 4`); its length is
/// always `width * height * 4`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Transparent image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Image with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let count = width as usize * height as usize;
        let pixels = color.to_bytes().repeat(count);
        Self { width, height, pixels }
    }

    /// Wrap a row-major RGBA buffer, checking its length.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FormatError> {
        let expected =
            buffer_len(width, height).ok_or(FormatError::TooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(FormatError::BufferLength {
                expected,
                found: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let offset = self.offset(x, y)?;
        let mut px = [0u8; CHANNELS];
        px.copy_from_slice(&self.pixels[offset..offset + CHANNELS]);
        Some(Rgba::from(px))
    }

    /// Overwrite one pixel.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the image.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let offset = match self.offset(x, y) {
            Some(offset) => offset,
            None => panic!(
                "pixel ({}, {}) out of bounds for {}x{} image",
                x, y, self.width, self.height
            ),
        };
        self.pixels[offset..offset + CHANNELS].copy_from_slice(&color.to_bytes());
    }

    /// Iterate `(x, y, pixel)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Rgba)> + '_ {
        let width = self.width.max(1);
        self.pixels
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, px)| {
                let i = i as u32;
                (i % width, i / width, Rgba::new(px[0], px[1], px[2], px[3]))
            })
    }

    /// Apply `f` to every pixel in place.
    pub fn map_pixels(&mut self, mut f: impl FnMut(Rgba) -> Rgba) {
        for px in self.pixels.chunks_exact_mut(CHANNELS) {
            let mapped = f(Rgba::new(px[0], px[1], px[2], px[3]));
            px.copy_from_slice(&mapped.to_bytes());
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }
}

pub(crate) fn buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// Ordered images; order is significant and the list may be empty.
pub type ImageList = Vec<Image>;

/// Named image lists threaded through the pipeline.
///
/// Entries are added or overwritten, never removed. Names iterate in sorted
/// order so the encoded form of a set is byte-for-byte deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingSet {
    entries: BTreeMap<String, ImageList>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry, returning the previous list.
    pub fn insert(&mut self, name: impl Into<String>, images: ImageList) -> Option<ImageList> {
        self.entries.insert(name.into(), images)
    }

    pub fn get(&self, name: &str) -> Option<&ImageList> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ImageList> {
        self.entries.get_mut(name)
    }

    /// The list under `name`, created empty if missing.
    pub fn list_mut(&mut self, name: &str) -> &mut ImageList {
        self.entries.entry(name.to_string()).or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ImageList> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a WorkingSet {
    type Item = (&'a String, &'a ImageList);
    type IntoIter = btree_map::Iter<'a, String, ImageList>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, ImageList)> for WorkingSet {
    fn from_iter<I: IntoIterator<Item = (K, ImageList)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_buffer_length() {
        let img = Image::filled(3, 2, Rgba::WHITE);
        assert_eq!(img.as_raw().len(), 3 * 2 * CHANNELS);
        assert!(img.pixels().all(|(_, _, px)| px == Rgba::WHITE));
    }

    #[test]
    fn test_put_and_get_pixel() {
        let mut img = Image::new(4, 3);
        img.put_pixel(3, 1, Rgba::new(1, 2, 3, 4));
        assert_eq!(img.get_pixel(3, 1), Some(Rgba::new(1, 2, 3, 4)));
        assert_eq!(img.get_pixel(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(img.get_pixel(4, 0), None);
        assert_eq!(img.get_pixel(0, 3), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_put_pixel_out_of_bounds() {
        Image::new(1, 1).put_pixel(1, 0, Rgba::BLACK);
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = Image::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, FormatError::BufferLength { expected: 16, found: 15 }));
        assert!(Image::from_raw(0, 0, Vec::new()).is_ok());
    }

    #[test]
    fn test_pixels_coordinates() {
        let mut img = Image::new(2, 2);
        img.put_pixel(1, 0, Rgba::WHITE);
        let coords: Vec<_> = img.pixels().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(img.pixels().nth(1).map(|(_, _, px)| px), Some(Rgba::WHITE));
    }

    #[test]
    fn test_working_set_overwrite_and_order() {
        let mut ws = WorkingSet::new();
        assert!(ws.insert("zeta", vec![Image::new(1, 1)]).is_none());
        ws.insert("alpha", Vec::new());
        let previous = ws.insert("zeta", Vec::new()).unwrap();
        assert_eq!(previous.len(), 1);
        assert_eq!(ws.names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
        ws.list_mut("beta").push(Image::new(2, 2));
        assert_eq!(ws.len(), 3);
        assert_eq!(ws.get("beta").map(Vec::len), Some(1));
    }
}
