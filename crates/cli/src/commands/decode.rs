//! Decode a stored `userdata` value.
//!
//! Useful when inspecting rows by hand:
//!
//! ```bash
//! psql -Atc "SELECT userdata FROM shipping_addresses WHERE id = 4" | multiship-cli decode
//! ```

use std::io::Read;

use multiship_core::{CodecError, decode_payload};
use thiserror::Error;

/// Errors from the decode command.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid payload: {0}")]
    Codec(#[from] CodecError),

    #[error("Failed to render payload: {0}")]
    Render(#[from] serde_json::Error),
}

/// Decode `blob`, or standard input when `blob` is `None`, and print the
/// address fields as pretty JSON.
///
/// # Errors
///
/// Returns an error if input cannot be read or the value is not a valid
/// payload envelope.
pub fn run(blob: Option<String>) -> Result<(), DecodeError> {
    let raw = match blob {
        Some(blob) => blob,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let rendered = render(raw.trim())?;

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }
    Ok(())
}

fn render(raw: &str) -> Result<String, DecodeError> {
    let payload = decode_payload(raw)?;
    Ok(serde_json::to_string_pretty(&payload)?)
}
