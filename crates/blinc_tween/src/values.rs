//! Tweenable value types
//!
//! A tween's endpoints are carried as a [`TweenValue`], a closed tagged union
//! over the scalar kinds the engine knows about. The [`ValueKind`] tag selects
//! the interpolator a tween is bound to when it is created.

use std::fmt;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Copy {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

// ============================================================================
// Floating-point Implementations
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t as f64
    }
}

// ============================================================================
// Integer Implementations
// ============================================================================

// Integers interpolate in floating point and truncate toward zero, so a tween
// from 0 to 10 over four steps yields 0, 2, 5, 7, 10.

impl Interpolate for i32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let start = *self as f64;
        (start + (*other as f64 - start) * t as f64) as i32
    }
}

impl Interpolate for i64 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let start = *self as f64;
        (start + (*other as f64 - start) * t as f64) as i64
    }
}

// ============================================================================
// Kind Tags
// ============================================================================

/// Tag identifying the kind of a [`TweenValue`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
}

impl ValueKind {
    /// All kinds, in declaration order
    pub const ALL: [ValueKind; 4] = [
        ValueKind::Float,
        ValueKind::Double,
        ValueKind::Int,
        ValueKind::Long,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tagged Values
// ============================================================================

/// A value a tween can carry and hand to its setter
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenValue {
    Float(f32),
    Double(f64),
    Int(i32),
    Long(i64),
}

impl TweenValue {
    /// The kind tag of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            TweenValue::Float(_) => ValueKind::Float,
            TweenValue::Double(_) => ValueKind::Double,
            TweenValue::Int(_) => ValueKind::Int,
            TweenValue::Long(_) => ValueKind::Long,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            TweenValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            TweenValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            TweenValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            TweenValue::Long(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f32> for TweenValue {
    fn from(value: f32) -> Self {
        TweenValue::Float(value)
    }
}

impl From<f64> for TweenValue {
    fn from(value: f64) -> Self {
        TweenValue::Double(value)
    }
}

impl From<i32> for TweenValue {
    fn from(value: i32) -> Self {
        TweenValue::Int(value)
    }
}

impl From<i64> for TweenValue {
    fn from(value: i64) -> Self {
        TweenValue::Long(value)
    }
}

impl fmt::Display for TweenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TweenValue::Float(v) => write!(f, "{v}"),
            TweenValue::Double(v) => write!(f, "{v}"),
            TweenValue::Int(v) => write!(f, "{v}"),
            TweenValue::Long(v) => write!(f, "{v}"),
        }
    }
}

// ============================================================================
// Stock Interpolators
// ============================================================================

// Each stock interpolator handles exactly one kind. The engine rejects tweens
// whose endpoints differ in kind, so the fallback arm only returns `end`
// unchanged for direct misuse of these functions.

/// Linear interpolation for [`ValueKind::Float`]
pub fn lerp_float(start: TweenValue, end: TweenValue, t: f32) -> TweenValue {
    match (start, end) {
        (TweenValue::Float(a), TweenValue::Float(b)) => TweenValue::Float(a.lerp(&b, t)),
        _ => end,
    }
}

/// Linear interpolation for [`ValueKind::Double`]
pub fn lerp_double(start: TweenValue, end: TweenValue, t: f32) -> TweenValue {
    match (start, end) {
        (TweenValue::Double(a), TweenValue::Double(b)) => TweenValue::Double(a.lerp(&b, t)),
        _ => end,
    }
}

/// Truncating linear interpolation for [`ValueKind::Int`]
pub fn lerp_int(start: TweenValue, end: TweenValue, t: f32) -> TweenValue {
    match (start, end) {
        (TweenValue::Int(a), TweenValue::Int(b)) => TweenValue::Int(a.lerp(&b, t)),
        _ => end,
    }
}

/// Truncating linear interpolation for [`ValueKind::Long`]
pub fn lerp_long(start: TweenValue, end: TweenValue, t: f32) -> TweenValue {
    match (start, end) {
        (TweenValue::Long(a), TweenValue::Long(b)) => TweenValue::Long(a.lerp(&b, t)),
        _ => end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f32.lerp(&1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((10.0_f32.lerp(&20.0, 0.25) - 12.5).abs() < 1e-6);
        assert!((10.0_f64.lerp(&20.0, 0.25) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_int_interpolation_truncates() {
        let values: Vec<i32> = [0.0, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .map(|t| 0_i32.lerp(&10, *t))
            .collect();
        assert_eq!(values, vec![0, 2, 5, 7, 10]);

        // Truncation is toward zero, not toward the start value's floor
        assert_eq!(10_i32.lerp(&0, 0.25), 7);
        assert_eq!(0_i32.lerp(&-10, 0.25), -2);
    }

    #[test]
    fn test_int_interpolation_full_range() {
        assert_eq!(i32::MIN.lerp(&i32::MAX, 0.0), i32::MIN);
        assert_eq!(i32::MIN.lerp(&i32::MAX, 1.0), i32::MAX);
        assert_eq!(0_i64.lerp(&1_000_000_000_000, 0.5), 500_000_000_000);
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(TweenValue::from(1.0_f32).kind(), ValueKind::Float);
        assert_eq!(TweenValue::from(1.0_f64).kind(), ValueKind::Double);
        assert_eq!(TweenValue::from(1_i32).kind(), ValueKind::Int);
        assert_eq!(TweenValue::from(1_i64).kind(), ValueKind::Long);
        assert_eq!(TweenValue::Int(3).as_i32(), Some(3));
        assert_eq!(TweenValue::Int(3).as_f32(), None);
        assert_eq!(ValueKind::Double.to_string(), "double");
    }

    #[test]
    fn test_stock_interpolators() {
        assert_eq!(
            lerp_float(TweenValue::Float(0.0), TweenValue::Float(10.0), 0.25),
            TweenValue::Float(2.5)
        );
        assert_eq!(
            lerp_int(TweenValue::Int(0), TweenValue::Int(10), 0.75),
            TweenValue::Int(7)
        );
        assert_eq!(
            lerp_long(TweenValue::Long(-4), TweenValue::Long(4), 0.5),
            TweenValue::Long(0)
        );
        assert_eq!(
            lerp_double(TweenValue::Double(1.0), TweenValue::Double(3.0), 0.5),
            TweenValue::Double(2.0)
        );
    }
}
