//! Exact-numeric width resolution
//!
//! With numeric mapping enabled, `NUMERIC(p, 0)` columns narrow enough to fit
//! a 64-bit integer collapse to the smallest lossless integer width. Every
//! other exact numeric stays a scaled decimal.

use rust_decimal::Decimal;
use std::fmt;

use crate::schema::LogicalType;

/// Reported scale meaning "no declared precision" (Oracle `NUMBER`)
pub const UNCONSTRAINED_SCALE: i32 = -127;

/// Scale substituted for [`UNCONSTRAINED_SCALE`]
pub const UNCONSTRAINED_SCALE_SUBSTITUTE: i32 = 127;

/// Largest scale a [`Decimal`] value can carry
pub const MAX_DECIMAL_SCALE: u32 = 28;

/// Integer width an exact numeric collapses to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    /// 8-bit
    Int8,
    /// 16-bit
    Int16,
    /// 32-bit
    Int32,
    /// 64-bit
    Int64,
}

impl IntWidth {
    /// Logical type for this width
    pub const fn logical_type(self) -> LogicalType {
        match self {
            Self::Int8 => LogicalType::Int8,
            Self::Int16 => LogicalType::Int16,
            Self::Int32 => LogicalType::Int32,
            Self::Int64 => LogicalType::Int64,
        }
    }

    /// Width in bits
    pub const fn bits(self) -> u32 {
        match self {
            Self::Int8 => 8,
            Self::Int16 => 16,
            Self::Int32 => 32,
            Self::Int64 => 64,
        }
    }

    /// Next wider width, used for unsigned columns
    pub const fn widen(self) -> Self {
        match self {
            Self::Int8 => Self::Int16,
            Self::Int16 => Self::Int32,
            Self::Int32 | Self::Int64 => Self::Int64,
        }
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int{}", self.bits())
    }
}

/// Decide whether an exact numeric column collapses to an integer width.
///
/// Applies only with `map_numerics`, scale 0 and precision below 19. Digit
/// counts 1-2 map to int8, 3-4 to int16, 5-9 to int32 and 10-18 to int64.
pub fn resolve_numeric_width(precision: i32, scale: i32, map_numerics: bool) -> Option<IntWidth> {
    if !map_numerics || scale != 0 || precision >= 19 {
        return None;
    }
    let width = if precision > 9 {
        IntWidth::Int64
    } else if precision > 4 {
        IntWidth::Int32
    } else if precision > 2 {
        IntWidth::Int16
    } else {
        IntWidth::Int8
    };
    Some(width)
}

/// Decimal scale for a reported column scale
#[inline]
pub const fn decimal_scale(scale: i32) -> i32 {
    if scale == UNCONSTRAINED_SCALE {
        UNCONSTRAINED_SCALE_SUBSTITUTE
    } else {
        scale
    }
}

/// Exact value of `unscaled * 10^-scale`, or `None` if a [`Decimal`] cannot
/// hold it without loss.
///
/// Scales above [`MAX_DECIMAL_SCALE`] are accepted when the trailing digits
/// are zero; negative scales multiply.
pub fn scaled_decimal(unscaled: i64, scale: i32) -> Option<Decimal> {
    let unscaled = i128::from(unscaled);
    if scale < 0 {
        let factor = 10i128.checked_pow(scale.unsigned_abs())?;
        return Decimal::try_from_i128_with_scale(unscaled.checked_mul(factor)?, 0).ok();
    }
    let scale = scale as u32;
    if scale <= MAX_DECIMAL_SCALE {
        return Decimal::try_from_i128_with_scale(unscaled, scale).ok();
    }
    if unscaled == 0 {
        return Some(Decimal::new(0, MAX_DECIMAL_SCALE));
    }
    let divisor = 10i128.checked_pow(scale - MAX_DECIMAL_SCALE)?;
    if unscaled % divisor != 0 {
        return None;
    }
    Decimal::try_from_i128_with_scale(unscaled / divisor, MAX_DECIMAL_SCALE).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_boundaries() {
        assert_eq!(resolve_numeric_width(1, 0, true), Some(IntWidth::Int8));
        assert_eq!(resolve_numeric_width(2, 0, true), Some(IntWidth::Int8));
        assert_eq!(resolve_numeric_width(3, 0, true), Some(IntWidth::Int16));
        assert_eq!(resolve_numeric_width(4, 0, true), Some(IntWidth::Int16));
        assert_eq!(resolve_numeric_width(5, 0, true), Some(IntWidth::Int32));
        assert_eq!(resolve_numeric_width(9, 0, true), Some(IntWidth::Int32));
        assert_eq!(resolve_numeric_width(10, 0, true), Some(IntWidth::Int64));
        assert_eq!(resolve_numeric_width(18, 0, true), Some(IntWidth::Int64));
        assert_eq!(resolve_numeric_width(19, 0, true), None);
    }

    #[test]
    fn test_width_requires_policy_and_zero_scale() {
        assert_eq!(resolve_numeric_width(5, 0, false), None);
        assert_eq!(resolve_numeric_width(5, 2, true), None);
        assert_eq!(resolve_numeric_width(38, UNCONSTRAINED_SCALE, true), None);
    }

    #[test]
    fn test_decimal_scale_sentinel() {
        assert_eq!(decimal_scale(-127), 127);
        assert_eq!(decimal_scale(2), 2);
        assert_eq!(decimal_scale(-2), -2);
    }

    #[test]
    fn test_widen() {
        assert_eq!(IntWidth::Int8.widen(), IntWidth::Int16);
        assert_eq!(IntWidth::Int32.widen(), IntWidth::Int64);
        assert_eq!(IntWidth::Int64.widen(), IntWidth::Int64);
        assert_eq!(IntWidth::Int16.to_string(), "int16");
    }

    #[test]
    fn test_scaled_decimal() {
        assert_eq!(scaled_decimal(12345, 2), Some(Decimal::new(12345, 2)));
        assert_eq!(scaled_decimal(7, 0), Some(Decimal::new(7, 0)));
        assert_eq!(scaled_decimal(5, -2), Some(Decimal::new(500, 0)));
        assert_eq!(scaled_decimal(0, 127), Some(Decimal::ZERO));
        assert_eq!(scaled_decimal(1, 127), None);
        assert_eq!(scaled_decimal(1000, 31), Some(Decimal::new(1, 28)));
    }
}
