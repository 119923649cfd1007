//! Signal value extraction
//!
//! Extracts physical signal values from raw CAN payloads based on signal
//! definitions from the catalog. The payload is viewed as a zero-padded
//! 64-bit little-endian window; a signal descriptor selects a bit range
//! inside it. Handles Intel/Motorola start bit translation, sign extension
//! and physical value conversion.

use crate::signals::{SignalDefinition, ValueType};
use byteorder::{ByteOrder, LittleEndian};

/// Signal decoder - extracts values from frame payloads
pub struct SignalDecoder;

impl SignalDecoder {
    /// Decode a signal's physical value from a frame payload
    ///
    /// # Arguments
    /// * `data` - Raw frame payload (any length; only the first 8 bytes
    ///   contribute)
    /// * `signal` - Signal definition from the catalog
    ///
    /// # Returns
    /// * `Some(value)` with `raw * factor + offset` applied
    /// * `None` for an empty payload or a descriptor outside the window;
    ///   decoding never fails the surrounding conversion
    pub fn physical_value(data: &[u8], signal: &SignalDefinition) -> Option<f64> {
        let raw = Self::extract_raw(data, signal)?;
        // Unsigned values stay in u64: a 64-bit signal with bit 63 set must
        // not come out negative
        let value = match signal.value_type {
            ValueType::Unsigned => raw as f64,
            ValueType::Signed => Self::sign_extend(raw, u32::from(signal.size)) as f64,
        };
        Some(value * signal.factor + signal.offset)
    }

    /// Extract the raw masked signal bits, before sign interpretation
    pub fn extract_raw(data: &[u8], signal: &SignalDefinition) -> Option<u64> {
        if data.is_empty() {
            return None;
        }

        // The catalog drops unusable descriptors at load time; this guard
        // covers definitions built directly in code.
        if !signal.fits_window() {
            log::warn!(
                "Signal '{}' ({} bits at window offset {}) lies outside the 64-bit payload window",
                signal.name,
                signal.size,
                signal.window_offset()
            );
            return None;
        }
        let offset = signal.window_offset() as u32;

        // Zero-pad (or truncate) the payload to the 64-bit window. Payloads
        // longer than 8 bytes contribute only their first 8 bytes, the low
        // 64 bits of a little-endian read.
        let mut window = [0u8; 8];
        let take = data.len().min(8);
        window[..take].copy_from_slice(&data[..take]);
        let value = LittleEndian::read_u64(&window);

        let size = u32::from(signal.size);
        let mask = if size >= 64 { u64::MAX } else { (1u64 << size) - 1 };
        Some((value >> offset) & mask)
    }

    /// Sign-extend a value from N bits to 64 bits
    ///
    /// If the value's MSB is 1, fill the upper bits with 1s.
    fn sign_extend(value: u64, bits: u32) -> i64 {
        if bits >= 64 {
            return value as i64;
        }

        let sign_bit = 1u64 << (bits - 1);
        if (value & sign_bit) != 0 {
            let mask = !0u64 << bits;
            (value | mask) as i64
        } else {
            value as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::ByteOrder;

    fn signal(start_bit: u16, size: u16, byte_order: ByteOrder, value_type: ValueType) -> SignalDefinition {
        SignalDefinition {
            name: "Test".to_string(),
            start_bit,
            size,
            byte_order,
            value_type,
            factor: 1.0,
            offset: 0.0,
            min: 0.0,
            max: 0.0,
            unit: None,
        }
    }

    #[test]
    fn test_extract_little_endian_simple() {
        // 8 bits starting at bit 0 (byte 0)
        let data = vec![0xAB, 0xCD, 0xEF, 0x12];
        let sig = signal(0, 8, ByteOrder::LittleEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), Some(0xAB));
    }

    #[test]
    fn test_extract_little_endian_cross_byte() {
        // 16 bits starting at bit 0 (bytes 0-1)
        let data = vec![0xAB, 0xCD, 0xEF, 0x12];
        let sig = signal(0, 16, ByteOrder::LittleEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), Some(0xCDAB));
    }

    #[test]
    fn test_extract_little_endian_mid_bits() {
        // 4 bits starting at bit 12: upper nibble of byte 1
        let data = vec![0x00, 0xC5];
        let sig = signal(12, 4, ByteOrder::LittleEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), Some(0xC));
    }

    #[test]
    fn test_extract_big_endian_single_byte() {
        // Motorola start bit 7 with width 8 covers exactly byte 0
        let data = vec![0xAB, 0xCD];
        let sig = signal(7, 8, ByteOrder::BigEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), Some(0xAB));
    }

    #[test]
    fn test_extract_big_endian_second_byte() {
        let data = vec![0xAB, 0xCD];
        let sig = signal(15, 8, ByteOrder::BigEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), Some(0xCD));
    }

    #[test]
    fn test_signed_extraction() {
        let data = vec![0xFF];
        let sig = signal(0, 8, ByteOrder::LittleEndian, ValueType::Signed);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), Some(0xFF));
        assert_eq!(SignalDecoder::physical_value(&data, &sig), Some(-1.0));
    }

    #[test]
    fn test_physical_value_scaling() {
        // Raw 0x05 with factor 2 and offset 1 gives 11.0
        let data = vec![0x05];
        let mut sig = signal(0, 8, ByteOrder::LittleEndian, ValueType::Unsigned);
        sig.factor = 2.0;
        sig.offset = 1.0;
        assert_eq!(SignalDecoder::physical_value(&data, &sig), Some(11.0));
    }

    #[test]
    fn test_short_payload_reads_as_zero_padded() {
        // 16-bit signal over a 1-byte payload: the missing byte reads as 0
        let data = vec![0xAB];
        let sig = signal(0, 16, ByteOrder::LittleEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), Some(0xAB));
    }

    #[test]
    fn test_long_payload_truncated() {
        // Only the first 8 bytes contribute
        let data = vec![0x11, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF];
        let sig = signal(0, 8, ByteOrder::LittleEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), Some(0x11));
    }

    #[test]
    fn test_empty_payload() {
        let sig = signal(0, 8, ByteOrder::LittleEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&[], &sig), None);
    }

    #[test]
    fn test_out_of_window_descriptor() {
        let data = vec![0xFF; 8];
        let sig = signal(60, 8, ByteOrder::LittleEndian, ValueType::Unsigned);
        assert_eq!(SignalDecoder::extract_raw(&data, &sig), None);
    }

    #[test]
    fn test_full_width_signed_signal() {
        let data = vec![0xFF; 8];
        let sig = signal(0, 64, ByteOrder::LittleEndian, ValueType::Signed);
        assert_eq!(SignalDecoder::physical_value(&data, &sig), Some(-1.0));
    }

    #[test]
    fn test_full_width_unsigned_signal() {
        // An unsigned signal with bit 63 set must not wrap negative
        let data = vec![0xFF; 8];
        let sig = signal(0, 64, ByteOrder::LittleEndian, ValueType::Unsigned);
        let value = SignalDecoder::physical_value(&data, &sig).unwrap();
        assert!(value > 0.0);
        assert_eq!(value, u64::MAX as f64);
    }

    #[test]
    fn test_sign_extend_positive() {
        assert_eq!(SignalDecoder::sign_extend(0x7F, 8), 127);
    }

    #[test]
    fn test_sign_extend_negative() {
        assert_eq!(SignalDecoder::sign_extend(0xFF, 8), -1);
    }

    #[test]
    fn test_sign_extend_negative_16bit() {
        assert_eq!(SignalDecoder::sign_extend(0x8000, 16), -32768);
    }
}
