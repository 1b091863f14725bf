//! Interpolator registry
//!
//! Maps a [`ValueKind`] to the function that computes intermediate values for
//! that kind. A tween resolves its interpolator once, when it is created, and
//! keeps it for its whole lifetime.

use crate::error::{Result, TweenError};
use crate::values::{lerp_float, lerp_int, TweenValue, ValueKind};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Pure function computing `start + fraction * (end - start)` for one kind
pub type InterpolatorFn = Rc<dyn Fn(TweenValue, TweenValue, f32) -> TweenValue>;

/// Kind-to-interpolator lookup table
#[derive(Clone)]
pub struct InterpolatorRegistry {
    interpolators: FxHashMap<ValueKind, InterpolatorFn>,
}

impl InterpolatorRegistry {
    /// Create a registry with the built-in float and int interpolators
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(ValueKind::Float, lerp_float);
        registry.register(ValueKind::Int, lerp_int);
        registry
    }

    /// Create a registry with nothing registered
    pub fn empty() -> Self {
        Self {
            interpolators: FxHashMap::default(),
        }
    }

    /// Install the interpolator for `kind`, replacing any previous one
    ///
    /// Returns true if an existing interpolator was replaced.
    pub fn register<F>(&mut self, kind: ValueKind, interpolator: F) -> bool
    where
        F: Fn(TweenValue, TweenValue, f32) -> TweenValue + 'static,
    {
        let replaced = self
            .interpolators
            .insert(kind, Rc::new(interpolator))
            .is_some();
        if replaced {
            tracing::debug!("InterpolatorRegistry: replaced interpolator for {}", kind);
        }
        replaced
    }

    /// Look up the interpolator for `kind`
    pub fn resolve(&self, kind: ValueKind) -> Result<InterpolatorFn> {
        self.interpolators
            .get(&kind)
            .cloned()
            .ok_or(TweenError::UnsupportedKind(kind))
    }

    pub fn contains(&self, kind: ValueKind) -> bool {
        self.interpolators.contains_key(&kind)
    }

    /// Registered kinds, in [`ValueKind::ALL`] order
    pub fn kinds(&self) -> Vec<ValueKind> {
        ValueKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }
}

impl Default for InterpolatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InterpolatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolatorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::lerp_double;

    #[test]
    fn test_builtins_registered() {
        let registry = InterpolatorRegistry::new();
        assert_eq!(registry.kinds(), vec![ValueKind::Float, ValueKind::Int]);

        let lerp = registry.resolve(ValueKind::Float).unwrap();
        assert_eq!(
            lerp(TweenValue::Float(0.0), TweenValue::Float(4.0), 0.5),
            TweenValue::Float(2.0)
        );
    }

    #[test]
    fn test_unregistered_kind_fails() {
        let registry = InterpolatorRegistry::new();
        assert_eq!(
            registry.resolve(ValueKind::Double).err(),
            Some(TweenError::UnsupportedKind(ValueKind::Double))
        );

        let empty = InterpolatorRegistry::empty();
        assert!(empty.kinds().is_empty());
        assert!(empty.resolve(ValueKind::Float).is_err());
    }

    #[test]
    fn test_register_and_overwrite() {
        let mut registry = InterpolatorRegistry::new();
        assert!(!registry.register(ValueKind::Double, lerp_double));
        assert!(registry.contains(ValueKind::Double));

        // Last write wins
        assert!(registry.register(ValueKind::Float, |_, end, _| end));
        let snap = registry.resolve(ValueKind::Float).unwrap();
        assert_eq!(
            snap(TweenValue::Float(0.0), TweenValue::Float(9.0), 0.1),
            TweenValue::Float(9.0)
        );
    }
}
