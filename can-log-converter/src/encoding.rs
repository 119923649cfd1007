//! Text file loading with encoding fallback
//!
//! Log and DBC files produced by Windows tooling are frequently Latin-1 /
//! Windows-1252 rather than UTF-8. Files are read as raw bytes and decoded
//! as UTF-8 first, then byte-by-byte as Latin-1 if that fails.

use std::path::Path;

/// Read a text file, falling back to Latin-1 when it is not valid UTF-8
pub(crate) fn read_text_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_text(bytes))
}

/// Decode bytes as UTF-8, or as Latin-1 when UTF-8 decoding fails
pub(crate) fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("File is not valid UTF-8, falling back to Latin-1");
            // Latin-1 maps each byte directly to the same Unicode code point
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("Grad °C".as_bytes().to_vec()), "Grad °C");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xB0 is the degree sign in Latin-1 but invalid on its own in UTF-8
        let bytes = vec![b'G', b'r', b'a', b'd', b' ', 0xB0, b'C'];
        assert_eq!(decode_text(bytes), "Grad °C");
    }

    #[test]
    fn test_read_text_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[b'a', 0xE4, b'b']).unwrap(); // "aäb" in Latin-1
        let text = read_text_file(file.path()).unwrap();
        assert_eq!(text, "aäb");
    }
}
