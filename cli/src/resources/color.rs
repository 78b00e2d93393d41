//! RGB colours and the live system-colour seam.
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use thiserror::Error;

/// Errors from parsing a colour specification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// A `#`-prefixed spec that is not `#RRGGBB`.
    #[error("'{0}' did not parse as a hex RGB value")]
    InvalidHex(String),

    /// A spec that is not three whitespace-separated integers.
    #[error("'{0}' did not parse as 3 decimal RGB values")]
    InvalidDecimal(String),

    /// A channel parsed but lies outside `[0, 255]`.
    #[error("The background colors must all be in the range [0, 255] (got '{0}')")]
    OutOfRange(String),
}

/// An RGB colour.
///
/// Parses from `#RRGGBB` or `"R G B"`; displays in the decimal form, which is
/// also how Windows stores colours in the registry.
///
/// # Examples
///
/// ```
/// use dotfiles_windows::resources::color::Color;
///
/// let hex: Color = "#0099FF".parse().unwrap();
/// let dec: Color = "0 153 255".parse().unwrap();
/// assert_eq!(hex, dec);
/// assert_eq!(hex.to_string(), "0 153 255");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Color {
    /// Create a colour from its channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Pack into a Win32 `COLORREF` (`0x00BBGGRR`).
    #[must_use]
    pub fn colorref(self) -> u32 {
        u32::from(self.red) | (u32::from(self.green) << 8) | (u32::from(self.blue) << 16)
    }

    fn parse_hex(spec: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(spec.to_string());
        let Some(digits) = spec.strip_prefix('#') else {
            return Err(invalid());
        };
        // `from_str_radix` would also accept a sign.
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            spec.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(invalid)
        };
        Ok(Self::new(channel(1..3)?, channel(3..5)?, channel(5..7)?))
    }

    fn parse_decimal(spec: &str) -> Result<Self, ColorError> {
        let tokens: Vec<&str> = spec.split_whitespace().collect();
        let [red, green, blue] = tokens.as_slice() else {
            return Err(ColorError::InvalidDecimal(spec.to_string()));
        };
        let channel = |token: &str| -> Result<u8, ColorError> {
            let value = token.parse::<i64>().map_err(|e| match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ColorError::OutOfRange(spec.to_string())
                }
                _ => ColorError::InvalidDecimal(spec.to_string()),
            })?;
            u8::try_from(value).map_err(|_| ColorError::OutOfRange(spec.to_string()))
        };
        Ok(Self::new(channel(red)?, channel(green)?, channel(blue)?))
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        if spec.starts_with('#') {
            Self::parse_hex(spec)
        } else {
            Self::parse_decimal(spec)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.red, self.green, self.blue)
    }
}

/// Immediate, non-persistent change of the desktop colour.
#[cfg_attr(test, mockall::automock)]
pub trait SystemColors: Send + Sync {
    /// Change the desktop colour for the current session.
    fn set_desktop_color(&self, color: Color);
}

/// [`SystemColors`] over `SetSysColors`; a no-op on other platforms.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSystemColors;

impl SystemColors for NativeSystemColors {
    fn set_desktop_color(&self, color: Color) {
        #[cfg(windows)]
        {
            // COLOR_DESKTOP
            let elements = [1i32];
            let values = [color.colorref()];
            // SAFETY: both arrays hold exactly one element, matching the count.
            #[allow(unsafe_code)]
            unsafe {
                windows_sys::Win32::Graphics::Gdi::SetSysColors(
                    1,
                    elements.as_ptr(),
                    values.as_ptr(),
                );
            }
        }
        #[cfg(not(windows))]
        {
            let _ = color;
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_decimal_agree() {
        let hex: Color = "#0099FF".parse().unwrap();
        let dec: Color = "0 153 255".parse().unwrap();
        assert_eq!(hex, Color::new(0, 153, 255));
        assert_eq!(hex, dec);
        assert_eq!(hex.to_string(), "0 153 255");
    }

    #[test]
    fn hex_is_case_insensitive() {
        assert_eq!("#0099ff".parse::<Color>().unwrap(), Color::new(0, 153, 255));
    }

    #[test]
    fn decimal_tolerates_extra_whitespace() {
        let color: Color = "  10\t20   30 ".parse().unwrap();
        assert_eq!(color, Color::new(10, 20, 30));
    }

    #[test]
    fn hex_wrong_length_is_rejected() {
        for spec in ["#fff", "#0099ff0", "#"] {
            let err = spec.parse::<Color>().unwrap_err();
            assert_eq!(err, ColorError::InvalidHex(spec.to_string()), "{spec}");
        }
    }

    #[test]
    fn hex_non_digits_are_rejected() {
        let err = "#00zz00".parse::<Color>().unwrap_err();
        assert!(err.to_string().contains("did not parse as a hex RGB value"));
    }

    #[test]
    fn hex_signs_are_rejected() {
        for spec in ["#+f+f+f", "#-1-1-1", "#00+f00"] {
            let err = spec.parse::<Color>().unwrap_err();
            assert!(matches!(err, ColorError::InvalidHex(_)), "{spec}");
        }
    }

    #[test]
    fn hex_with_multibyte_characters_is_rejected() {
        assert!("#ééé0".parse::<Color>().is_err());
    }

    #[test]
    fn decimal_wrong_count_is_rejected() {
        for spec in ["1 2", "1 2 3 4", "", "blue"] {
            let err = spec.parse::<Color>().unwrap_err();
            assert_eq!(err, ColorError::InvalidDecimal(spec.to_string()), "{spec}");
        }
    }

    #[test]
    fn decimal_non_numbers_are_rejected() {
        let err = "1 two 3".parse::<Color>().unwrap_err();
        assert!(err.to_string().contains("did not parse as 3 decimal RGB values"));
    }

    #[test]
    fn out_of_range_channels_are_rejected() {
        for spec in ["256 0 0", "0 -1 0", "0 0 99999999999999999999999"] {
            let err = spec.parse::<Color>().unwrap_err();
            assert!(matches!(err, ColorError::OutOfRange(_)), "{spec}: {err}");
        }
    }

    #[test]
    fn colorref_packs_bgr() {
        assert_eq!(Color::new(0x11, 0x22, 0x33).colorref(), 0x0033_2211);
    }

    #[test]
    fn mock_records_color() {
        let mut mock = MockSystemColors::new();
        mock.expect_set_desktop_color()
            .withf(|c| *c == Color::new(1, 2, 3))
            .times(1)
            .return_const(());
        mock.set_desktop_color(Color::new(1, 2, 3));
    }
}
