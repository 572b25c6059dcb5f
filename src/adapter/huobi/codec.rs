//! Frame decoding. Huobi sends every market data frame gzip-compressed.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{Error, Result};

/// Inflate a gzip-compressed binary frame into its JSON text.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the payload is not valid gzip or not UTF-8.
pub fn inflate(frame: &[u8]) -> Result<String> {
    let mut decoder = GzDecoder::new(frame);
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|e| Error::Parse(format!("failed to inflate frame: {e}")))?;
    Ok(text)
}
