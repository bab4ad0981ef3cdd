//! Frame layout of the speed sensor.
//!
//! The device frame is laid out as:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 2 | Header |
//! | 2 | 17 | Data (little-endian bit field container) |
//! | 19 | 1 | FCS |
//!
//! The speed is the 12-bit field at bits 8..20 (one-based bits 9 to 20) of
//! the data section, in units of 0.1 km/h.
//!
//! Other devices may use a different header length, data length or field
//! position, so the layout is a value rather than a set of literals. A
//! layout can be loaded from JSON; missing fields take their defaults.
//!
//! # Example
//!
//! ```
//! use hdlc_speed::layout::FrameLayout;
//!
//! let layout = FrameLayout::from_json(r#"{ "speed_bits": 10 }"#).unwrap();
//! assert_eq!(layout.header_len, 2);
//! assert_eq!(layout.speed_bits, 10);
//! assert_eq!(layout.min_frame_len(), 19);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParserError, Result};

/// Default header length in bytes.
pub const DEFAULT_HEADER_LEN: usize = 2;

/// Default data section length in bytes.
pub const DEFAULT_PAYLOAD_LEN: usize = 17;

/// Default bit offset of the speed field inside the data section.
pub const DEFAULT_SPEED_SHIFT: u32 = 8;

/// Default width of the speed field in bits.
pub const DEFAULT_SPEED_BITS: u32 = 12;

/// Default km/h per speed field unit.
pub const DEFAULT_SPEED_SCALE: f64 = 0.1;

/// Largest header or data section length a layout may declare.
pub const MAX_SECTION_LEN: usize = 64 * 1024;

/// Position and scaling of the speed field inside an unescaped frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameLayout {
    /// Bytes skipped at the start of the frame.
    pub header_len: usize,

    /// Length of the data section that holds the speed field.
    pub payload_len: usize,

    /// Bit offset of the speed field, counted from the least significant bit
    /// of the little-endian data section.
    pub speed_shift: u32,

    /// Width of the speed field in bits (at most 64).
    pub speed_bits: u32,

    /// Multiplier converting the raw field to km/h.
    pub speed_scale: f64,
}

impl Default for FrameLayout {
    fn default() -> Self {
        FrameLayout {
            header_len: DEFAULT_HEADER_LEN,
            payload_len: DEFAULT_PAYLOAD_LEN,
            speed_shift: DEFAULT_SPEED_SHIFT,
            speed_bits: DEFAULT_SPEED_BITS,
            speed_scale: DEFAULT_SPEED_SCALE,
        }
    }
}

impl FrameLayout {
    /// Minimum unescaped frame length needed to extract the speed field.
    ///
    /// The trailing FCS byte is not required: a frame of exactly this length
    /// still yields a speed.
    #[must_use]
    pub const fn min_frame_len(&self) -> usize {
        self.header_len.saturating_add(self.payload_len)
    }

    /// Mask applied to the shifted data section.
    #[must_use]
    pub const fn speed_mask(&self) -> u64 {
        if self.speed_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.speed_bits) - 1
        }
    }

    /// Checks that the layout describes a readable field.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::InvalidLayout` when the data section is empty,
    /// the header or data section is longer than [`MAX_SECTION_LEN`], the field width is zero or wider than 64 bits, the field starts past
    /// the end of the data section, or the scale is not finite.
    pub fn validate(&self) -> Result<()> {
        if self.payload_len == 0 {
            return Err(invalid("payload_len must be non-zero"));
        }
        if self.header_len > MAX_SECTION_LEN || self.payload_len > MAX_SECTION_LEN {
            return Err(invalid(format!(
                "header_len and payload_len must not exceed {MAX_SECTION_LEN} bytes, got {} and {}",
                self.header_len, self.payload_len
            )));
        }
        if self.speed_bits == 0 || self.speed_bits > 64 {
            return Err(invalid(format!(
                "speed_bits must be between 1 and 64, got {}",
                self.speed_bits
            )));
        }
        let payload_bits = self.payload_len.saturating_mul(8);
        if self.speed_shift as usize >= payload_bits {
            return Err(invalid(format!(
                "speed_shift {} lies outside the {}-bit data section",
                self.speed_shift, payload_bits
            )));
        }
        if !self.speed_scale.is_finite() {
            return Err(invalid("speed_scale must be finite"));
        }
        Ok(())
    }

    /// Parses and validates a layout from JSON text.
    ///
    /// # Errors
    ///
    /// - `ParserError::Serialization` if the JSON is malformed or contains
    ///   unknown fields
    /// - `ParserError::InvalidLayout` if validation fails
    pub fn from_json(text: &str) -> Result<Self> {
        let layout: FrameLayout = serde_json::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Loads and validates a layout from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::IoError` if the file cannot be read, otherwise
    /// the errors of [`FrameLayout::from_json`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

fn invalid(reason: impl Into<String>) -> ParserError {
    ParserError::InvalidLayout {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = FrameLayout::default();
        assert_eq!(layout.header_len, 2);
        assert_eq!(layout.payload_len, 17);
        assert_eq!(layout.min_frame_len(), 19);
        assert_eq!(layout.speed_mask(), 0xFFF);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_speed_mask_full_width() {
        let layout = FrameLayout {
            speed_bits: 64,
            ..FrameLayout::default()
        };
        assert_eq!(layout.speed_mask(), u64::MAX);
    }

    #[test]
    fn test_validate_rejects_empty_payload() {
        let layout = FrameLayout {
            payload_len: 0,
            ..FrameLayout::default()
        };
        assert!(matches!(
            layout.validate(),
            Err(ParserError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_width() {
        for bits in [0, 65] {
            let layout = FrameLayout {
                speed_bits: bits,
                ..FrameLayout::default()
            };
            assert!(layout.validate().is_err(), "width {bits} accepted");
        }
    }

    #[test]
    fn test_validate_rejects_field_outside_payload() {
        let layout = FrameLayout {
            payload_len: 2,
            speed_shift: 16,
            ..FrameLayout::default()
        };
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_validate_rejects_overflowing_layout() {
        let result = FrameLayout::from_json(r#"{ "header_len": 18446744073709551615 }"#);
        assert!(matches!(result, Err(ParserError::InvalidLayout { .. })));

        let layout = FrameLayout {
            payload_len: MAX_SECTION_LEN + 1,
            ..FrameLayout::default()
        };
        assert!(layout.validate().is_err());

        let largest = FrameLayout {
            header_len: MAX_SECTION_LEN,
            payload_len: MAX_SECTION_LEN,
            ..FrameLayout::default()
        };
        assert!(largest.validate().is_ok());
        assert_eq!(largest.min_frame_len(), 2 * MAX_SECTION_LEN);
    }

    #[test]
    fn test_min_frame_len_saturates_without_validation() {
        let layout = FrameLayout {
            header_len: usize::MAX,
            ..FrameLayout::default()
        };
        assert_eq!(layout.min_frame_len(), usize::MAX);
    }

    #[test]
    fn test_validate_rejects_non_finite_scale() {
        let layout = FrameLayout {
            speed_scale: f64::NAN,
            ..FrameLayout::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let layout = FrameLayout::from_json(r#"{ "header_len": 4, "speed_scale": 0.5 }"#).unwrap();
        assert_eq!(layout.header_len, 4);
        assert_eq!(layout.payload_len, DEFAULT_PAYLOAD_LEN);
        assert!((layout.speed_scale - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_json_empty_object() {
        assert_eq!(FrameLayout::from_json("{}").unwrap(), FrameLayout::default());
    }

    #[test]
    fn test_from_json_unknown_field() {
        let result = FrameLayout::from_json(r#"{ "speed_offset": 3 }"#);
        assert!(matches!(result, Err(ParserError::Serialization(_))));
    }

    #[test]
    fn test_from_json_invalid_layout() {
        let result = FrameLayout::from_json(r#"{ "speed_bits": 0 }"#);
        assert!(matches!(result, Err(ParserError::InvalidLayout { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let result = FrameLayout::load(Path::new("/nonexistent/layout.json"));
        assert!(matches!(result, Err(ParserError::IoError(_))));
    }
}
