//! pixicog checkpoint codec: the image working-set model and its text form.
//!
//! # Format
//!
//! ```text
//! <name>,<w>|<h>|4|<base64>,<w>|<h>|4|<base64>
//! <name>
//! ```
//!
//! One line per named image list. Payloads are unpadded standard base64 of
//! the RGBA bytes, pixels visited column by column (x outer, y inner).
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod image;

pub use decoder::{decode, decode_image};
pub use encoder::{encode, encode_image};
pub use error::FormatError;
pub use image::{Image, ImageList, Rgba, WorkingSet, CHANNELS};
