//! Blinc Tween Engine
//!
//! Tick-driven value interpolation for frame loops.
//!
//! # Features
//!
//! - **Owner Groups**: Tweens are grouped under any hashable owner key, so all
//!   tweens of an object can be cancelled at once
//! - **Buffered Scheduling**: Adds and removals are staged and applied at fixed
//!   points of each tick, so callbacks can safely schedule or cancel tweens
//! - **Pluggable Interpolation**: Each value kind maps to one interpolator,
//!   resolved once when a tween is created
//! - **Logical Time**: Progress is counted in ticks supplied by the caller, not
//!   wall-clock time
//!
//! # Example
//!
//! ```rust
//! use blinc_tween::{TweenEngine, TweenValue};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let engine = TweenEngine::new();
//! let x = Rc::new(Cell::new(0));
//!
//! let target = x.clone();
//! engine
//!     .add("sprite", move |v: TweenValue| target.set(v.as_i32().unwrap_or(0)), 0, 10, 4)
//!     .unwrap();
//!
//! while engine.advance() {}
//! assert_eq!(x.get(), 10);
//! ```

pub mod error;
pub mod registry;
pub mod scheduler;
pub mod tween;
pub mod values;

pub use error::{Result, TweenError};
pub use registry::{InterpolatorFn, InterpolatorRegistry};
pub use scheduler::{EngineConfig, EngineHandle, EngineStats, TweenEngine};
pub use tween::{CompletionCallback, Setter, Tween, TweenPhase};
pub use values::{
    lerp_double, lerp_float, lerp_int, lerp_long, Interpolate, TweenValue, ValueKind,
};
