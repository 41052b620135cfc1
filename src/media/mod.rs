/// Image decoding module
///
/// This module handles:
/// - Decoding photos at full size for the photo screen
/// - Generating grid thumbnails
///
/// Decoding never fails loudly: a missing or corrupt file becomes `None`
/// and the UI shows a blank or placeholder image instead.

pub mod decode;
pub mod thumbnail;

pub use decode::DecodedImage;
