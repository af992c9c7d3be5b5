//! Positional grammar of the spectrophotometer serial records.
//!
//! A record is described as one [`FieldKind`] per byte. The byte at index `i`
//! of a record must belong to the character class of `pattern[i]`. Fields have
//! a fixed width, so their location in the accumulated text is derived once
//! from the pattern (see [`Layout`]) instead of being hardcoded.

use crate::error::{Error, Result};

use super::reading::Mode;

// =============================================================================
// Public Interface
// =============================================================================

/// Character class expected at one byte position of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A digit of the wavelength.
    Wavelength,
    /// One letter of the `NM` unit suffix.
    Unit,
    /// A space between fields.
    Separator,
    /// A digit, `.`, `+`, `-` or space of the reading value.
    Value,
    /// The reading type letter (see [`Mode`]).
    Mode,
    /// The carriage return preceding the terminator.
    CarriageReturn,
    /// The line feed terminating a record.
    LineFeed,
}
impl FieldKind {
    /// Check whether `byte` belongs to the character class of this field.
    pub fn accepts(self, byte: u8) -> bool {
        match self {
            FieldKind::Wavelength => byte.is_ascii_digit(),
            FieldKind::Unit => byte == b'N' || byte == b'M',
            FieldKind::Separator => byte == b' ',
            FieldKind::Value => {
                byte.is_ascii_digit() || matches!(byte, b'.' | b'+' | b'-' | b' ')
            }
            FieldKind::Mode => Mode::from_byte(byte).is_some(),
            FieldKind::CarriageReturn => byte == b'\r',
            FieldKind::LineFeed => byte == b'\n',
        }
    }

    /// Line terminators are matched but not kept in the accumulated text.
    pub fn is_stored(self) -> bool {
        !matches!(self, FieldKind::CarriageReturn | FieldKind::LineFeed)
    }
}

/// Record layout of the Spectronic 20, e.g. `"630NM  -0.15 A\r\n"`.
pub const SPEC20_PATTERN: &[FieldKind] = &[
    FieldKind::Wavelength,
    FieldKind::Wavelength,
    FieldKind::Wavelength,
    FieldKind::Unit,
    FieldKind::Unit,
    FieldKind::Separator,
    FieldKind::Separator,
    FieldKind::Value,
    FieldKind::Value,
    FieldKind::Value,
    FieldKind::Value,
    FieldKind::Value,
    FieldKind::Separator,
    FieldKind::Mode,
    FieldKind::CarriageReturn,
    FieldKind::LineFeed,
];

/// Location of a fixed-width field in the accumulated record text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub offset: usize,
    pub len: usize,
}
impl FieldSpan {
    /// Bounds-checked extraction of the field from `text`.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.offset..self.offset + self.len)
    }
}

/// Where the reading fields sit in a record accepted against a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub wavelength: FieldSpan,
    pub value: FieldSpan,
    pub mode: FieldSpan,
}
impl Layout {
    /// Derive the field spans of `pattern`, rejecting patterns from which a
    /// reading cannot be extracted.
    pub fn of(pattern: &[FieldKind]) -> Result<Layout> {
        match pattern.split_last() {
            Some((FieldKind::LineFeed, body)) => {
                if body.contains(&FieldKind::LineFeed) {
                    return Err(Error::Pattern("line feed is only allowed as terminator"));
                }
            }
            _ => return Err(Error::Pattern("pattern must end with a line feed")),
        }

        let layout = Layout {
            wavelength: span_of(pattern, FieldKind::Wavelength)
                .ok_or(Error::Pattern("wavelength must be one contiguous field"))?,
            value: span_of(pattern, FieldKind::Value)
                .ok_or(Error::Pattern("value must be one contiguous field"))?,
            mode: span_of(pattern, FieldKind::Mode)
                .ok_or(Error::Pattern("mode must be one contiguous field"))?,
        };
        if layout.mode.len != 1 {
            return Err(Error::Pattern("mode must be a single character"));
        }
        Ok(layout)
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// The span of the single contiguous run of `kind` in `pattern`, counted in
/// stored characters. `None` when the run is missing or split.
fn span_of(pattern: &[FieldKind], kind: FieldKind) -> Option<FieldSpan> {
    let mut span: Option<FieldSpan> = None;
    let mut offset = 0;
    let mut previous = None;

    for &current in pattern {
        if current == kind {
            span = match span {
                None => Some(FieldSpan { offset, len: 1 }),
                Some(run) if previous == Some(kind) => Some(FieldSpan {
                    len: run.len + 1,
                    ..run
                }),
                Some(_) => return None,
            };
        }
        if current.is_stored() {
            offset += 1;
        }
        previous = Some(current);
    }
    span
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::FieldKind::{CarriageReturn, LineFeed, Mode, Separator, Unit, Value, Wavelength};
    use super::*;

    #[test]
    fn spec20_record_is_sixteen_bytes() {
        assert_eq!(SPEC20_PATTERN.len(), 16);
    }

    #[test]
    fn spec20_layout() {
        let layout = Layout::of(SPEC20_PATTERN).unwrap();
        assert_eq!(layout.wavelength, FieldSpan { offset: 0, len: 3 });
        assert_eq!(layout.value, FieldSpan { offset: 7, len: 5 });
        assert_eq!(layout.mode, FieldSpan { offset: 13, len: 1 });
    }

    #[test]
    fn character_classes() {
        assert!(Wavelength.accepts(b'0') && Wavelength.accepts(b'9'));
        assert!(!Wavelength.accepts(b' '));
        assert!(Unit.accepts(b'N') && Unit.accepts(b'M'));
        assert!(!Unit.accepts(b'n'));
        assert!(Separator.accepts(b' ') && !Separator.accepts(b'-'));
        for byte in b"0123456789.+- " {
            assert!(Value.accepts(*byte), "value should accept {:?}", *byte as char);
        }
        assert!(!Value.accepts(b'e'));
        for byte in b"ATCF" {
            assert!(Mode.accepts(*byte));
        }
        assert!(!Mode.accepts(b'a') && !Mode.accepts(b'X'));
        assert!(CarriageReturn.accepts(b'\r') && !CarriageReturn.accepts(b'\n'));
        assert!(LineFeed.accepts(b'\n') && !LineFeed.accepts(b'\r'));
    }

    #[test]
    fn terminators_are_not_stored() {
        assert!(!CarriageReturn.is_stored());
        assert!(!LineFeed.is_stored());
        assert!(Separator.is_stored());
    }

    #[test]
    fn layout_follows_a_shorter_grammar() {
        let pattern = [
            Wavelength, Wavelength, Wavelength, Separator, Value, Value, Value, Separator, Mode,
            LineFeed,
        ];
        let layout = Layout::of(&pattern).unwrap();
        assert_eq!(layout.wavelength, FieldSpan { offset: 0, len: 3 });
        assert_eq!(layout.value, FieldSpan { offset: 4, len: 3 });
        assert_eq!(layout.mode, FieldSpan { offset: 8, len: 1 });
    }

    #[test]
    fn missing_terminator_is_rejected() {
        let pattern = [Wavelength, Value, Mode, CarriageReturn];
        assert!(matches!(Layout::of(&pattern), Err(Error::Pattern(_))));
        assert!(matches!(Layout::of(&[]), Err(Error::Pattern(_))));
    }

    #[test]
    fn early_terminator_is_rejected() {
        let pattern = [Wavelength, LineFeed, Value, Mode, LineFeed];
        assert!(matches!(Layout::of(&pattern), Err(Error::Pattern(_))));
    }

    #[test]
    fn split_field_is_rejected() {
        let pattern = [Wavelength, Value, Separator, Value, Mode, LineFeed];
        assert!(matches!(Layout::of(&pattern), Err(Error::Pattern(_))));
    }

    #[test]
    fn missing_field_is_rejected() {
        let pattern = [Wavelength, Value, LineFeed];
        assert!(matches!(Layout::of(&pattern), Err(Error::Pattern(_))));
    }

    #[test]
    fn wide_mode_is_rejected() {
        let pattern = [Wavelength, Value, Mode, Mode, LineFeed];
        assert!(matches!(Layout::of(&pattern), Err(Error::Pattern(_))));
    }

    #[test]
    fn span_slicing_is_bounds_checked() {
        let span = FieldSpan { offset: 7, len: 5 };
        assert_eq!(span.slice("630NM  -0.15 A"), Some("-0.15"));
        assert_eq!(span.slice("630NM  -0"), None);
    }
}
