use super::{Reflect, Shape};
use crate::{RecliError, Result};

/// Kind of a scalar value as seen by the codec.
///
/// All integer widths share [`ScalarKind::Int`]; the width only matters when
/// a parsed value is range-checked on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `true` / `false`
    Bool,
    /// Signed or unsigned integer of any width
    Int,
    /// `f32` or `f64`
    Float,
    /// Raw string
    String,
    /// Type with its own text encoding
    Text,
}

/// Converts a scalar value to and from its textual form.
pub trait Scalar {
    /// The codec kind of this value.
    fn kind(&self) -> ScalarKind;

    /// Renders the value as text.
    ///
    /// # Errors
    /// Returns an error if a text codec fails to encode the value.
    fn read(&self) -> Result<String>;

    /// Parses `text` into the value, leaving it unchanged on failure.
    ///
    /// # Errors
    /// Returns `RecliError::Conversion` if the text does not parse or
    /// overflows the declared width.
    fn write(&mut self, text: &str) -> Result<()>;
}

macro_rules! scalar_reflect {
    ($($ty:ty),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape(&mut self) -> Shape<'_> {
                Shape::Scalar(self)
            }

            fn as_scalar(&self) -> Option<&dyn Scalar> {
                Some(self)
            }
        }
    )*};
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            fn kind(&self) -> ScalarKind {
                ScalarKind::Int
            }

            fn read(&self) -> Result<String> {
                Ok(self.to_string())
            }

            fn write(&mut self, text: &str) -> Result<()> {
                let parsed = parse_integer(text, stringify!($ty))?;
                *self = <$ty>::try_from(parsed).map_err(|_| {
                    RecliError::conversion(text, stringify!($ty), format!("value overflows: {parsed}"))
                })?;
                Ok(())
            }
        }

        scalar_reflect!($ty);
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Scalar for bool {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Bool
    }

    fn read(&self) -> Result<String> {
        Ok(self.to_string())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        *self = match text {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
            "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
            _ => return Err(RecliError::conversion(text, "bool", "invalid syntax")),
        };
        Ok(())
    }
}

impl Scalar for f64 {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Float
    }

    fn read(&self) -> Result<String> {
        Ok(self.to_string())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        *self = text
            .parse::<f64>()
            .map_err(|e| RecliError::conversion(text, "f64", e))?;
        Ok(())
    }
}

impl Scalar for f32 {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Float
    }

    fn read(&self) -> Result<String> {
        Ok(self.to_string())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        let parsed = text
            .parse::<f64>()
            .map_err(|e| RecliError::conversion(text, "f32", e))?;
        let narrowed = parsed as f32;
        if parsed.is_finite() && narrowed.is_infinite() {
            return Err(RecliError::conversion(
                text,
                "f32",
                format!("value overflows: {parsed}"),
            ));
        }
        *self = narrowed;
        Ok(())
    }
}

impl Scalar for String {
    fn kind(&self) -> ScalarKind {
        ScalarKind::String
    }

    fn read(&self) -> Result<String> {
        Ok(self.clone())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        text.clone_into(self);
        Ok(())
    }
}

scalar_reflect!(bool, f32, f64, String);

/// Parses an integer literal with an optional sign and base prefix.
///
/// Accepts `0x`, `0o` and `0b` prefixes, a leading `0` for octal, and `_`
/// between digits or right after a prefix.
pub(crate) fn parse_integer(text: &str, target: &'static str) -> Result<i128> {
    let invalid = |reason: &str| RecliError::conversion(text, target, reason);

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = if let Some(rest) = strip_prefix_ignore_case(unsigned, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ignore_case(unsigned, "0o") {
        (8, rest)
    } else if let Some(rest) = strip_prefix_ignore_case(unsigned, "0b") {
        (2, rest)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // A base prefix counts as a digit, so one separator may follow it.
    let digits = match radix {
        10 => digits,
        _ => digits.strip_prefix('_').unwrap_or(digits),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err(invalid("invalid syntax"));
    }
    let digits = digits.replace('_', "");
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid("invalid syntax"));
    }

    let magnitude = i128::from_str_radix(&digits, radix).map_err(|e| invalid(&e.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&text[prefix.len()..]),
        _ => None,
    }
}

/// Registers enum-like types as text-codec scalars.
///
/// The type's `Display` impl is its marshal-to-text side and its `FromStr`
/// impl the unmarshal side; parse errors are surfaced verbatim. Text-codec
/// scalars are always edited by their symbolic names, whatever their
/// underlying representation.
///
/// ```
/// use std::{fmt, str::FromStr};
///
/// #[derive(Default)]
/// enum Mode { #[default] Static, Ldap }
///
/// impl fmt::Display for Mode {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str(match self { Mode::Static => "static", Mode::Ldap => "ldap" })
///     }
/// }
///
/// impl FromStr for Mode {
///     type Err = String;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         match s {
///             "static" => Ok(Mode::Static),
///             "ldap" => Ok(Mode::Ldap),
///             other => Err(format!("unknown mode '{other}'")),
///         }
///     }
/// }
///
/// recli::text_scalar!(Mode);
/// ```
#[macro_export]
macro_rules! text_scalar {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Scalar for $ty {
            fn kind(&self) -> $crate::ScalarKind {
                $crate::ScalarKind::Text
            }

            fn read(&self) -> $crate::Result<::std::string::String> {
                Ok(::std::string::ToString::to_string(self))
            }

            fn write(&mut self, text: &str) -> $crate::Result<()> {
                *self = text
                    .parse::<$ty>()
                    .map_err(|e| $crate::RecliError::conversion(text, stringify!($ty), e))?;
                Ok(())
            }
        }

        impl $crate::Reflect for $ty {
            fn shape(&mut self) -> $crate::Shape<'_> {
                $crate::Shape::Scalar(self)
            }

            fn as_scalar(&self) -> Option<&dyn $crate::Scalar> {
                Some(self)
            }
        }
    )+};
}
