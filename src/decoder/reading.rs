//! Structured readings extracted from complete records.

use std::fmt;

use super::pattern::Layout;

/// Reading type reported by the spectrophotometer in the last field of a
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `A`
    Absorbance,
    /// `T`
    Transmittance,
    /// `C`
    Concentration,
    /// `F`
    Factor,
}
impl Mode {
    pub fn from_byte(byte: u8) -> Option<Mode> {
        match byte {
            b'A' => Some(Mode::Absorbance),
            b'T' => Some(Mode::Transmittance),
            b'C' => Some(Mode::Concentration),
            b'F' => Some(Mode::Factor),
            _ => None,
        }
    }

    /// The letter used on the wire.
    pub fn as_char(self) -> char {
        match self {
            Mode::Absorbance => 'A',
            Mode::Transmittance => 'T',
            Mode::Concentration => 'C',
            Mode::Factor => 'F',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Absorbance => "absorbance",
            Mode::Transmittance => "transmittance",
            Mode::Concentration => "concentration",
            Mode::Factor => "factor",
        }
    }
}
impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One decoded record.
///
/// The text fields are kept exactly as received, at their fixed width (3
/// characters for the wavelength and 5 for the value with the default
/// grammar).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub wavelength: String,
    pub value: String,
    pub mode: Mode,
}
impl Reading {
    /// Extract the reading fields from an accepted record. Returns `None` if
    /// `record` is too short for `layout` or the mode letter is unknown.
    pub(crate) fn from_record(record: &str, layout: &Layout) -> Option<Reading> {
        let wavelength = layout.wavelength.slice(record)?;
        let value = layout.value.slice(record)?;
        let mode = layout.mode.slice(record)?;
        Some(Reading {
            wavelength: wavelength.to_owned(),
            value: value.to_owned(),
            mode: Mode::from_byte(*mode.as_bytes().first()?)?,
        })
    }

    /// Wavelength in nanometers.
    pub fn wavelength_nm(&self) -> Option<u16> {
        self.wavelength.trim().parse().ok()
    }

    /// The value field as a number. Padding spaces are ignored, so `"  .15"`
    /// gives `0.15`.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }
}
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}nm {} {}", self.wavelength, self.value, self.mode)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::pattern::SPEC20_PATTERN;

    fn extract(record: &str) -> Option<Reading> {
        Reading::from_record(record, &Layout::of(SPEC20_PATTERN).unwrap())
    }

    #[test]
    fn mode_letters() {
        for (letter, mode) in [
            (b'A', Mode::Absorbance),
            (b'T', Mode::Transmittance),
            (b'C', Mode::Concentration),
            (b'F', Mode::Factor),
        ]
        .iter()
        {
            assert_eq!(Mode::from_byte(*letter), Some(*mode));
            assert_eq!(mode.as_char(), *letter as char);
        }
        assert_eq!(Mode::from_byte(b'B'), None);
    }

    #[test]
    fn fields_at_fixed_offsets() {
        let reading = extract("630NM  -0.15 A").unwrap();
        assert_eq!(reading.wavelength, "630");
        assert_eq!(reading.value, "-0.15");
        assert_eq!(reading.mode, Mode::Absorbance);
        assert_eq!(reading.wavelength_nm(), Some(630));
        assert_eq!(reading.numeric_value(), Some(-0.15));
    }

    #[test]
    fn padded_values_parse() {
        assert_eq!(extract("450NM    .15 T").unwrap().numeric_value(), Some(0.15));
        assert_eq!(extract("450NM  +1.00 C").unwrap().numeric_value(), Some(1.0));
        assert_eq!(extract("450NM  -.153 A").unwrap().numeric_value(), Some(-0.153));
    }

    #[test]
    fn unparsable_value_is_none() {
        let reading = extract("450NM  --.-- F").unwrap();
        assert_eq!(reading.value, "--.--");
        assert_eq!(reading.numeric_value(), None);
    }

    #[test]
    fn short_record_is_rejected() {
        assert_eq!(extract("630NM  -0.15"), None);
    }

    #[test]
    fn display() {
        let reading = extract("630NM  -0.15 A").unwrap();
        assert_eq!(reading.to_string(), "630nm -0.15 A");
        assert_eq!(Mode::Factor.name(), "factor");
    }
}
