//! Tween scheduler
//!
//! Owns every live tween, grouped by an owner key, and steps them once per
//! call to [`TweenEngine::advance`]. The caller's frame loop drives the engine;
//! there is no timer or background thread.
//!
//! # Buffered mutation
//!
//! Setters and completion callbacks run while the engine is stepping, and may
//! add or remove tweens. Those requests never touch the active lists directly:
//! additions land in a pending-add buffer and removals in a pending-remove
//! buffer. Each tick runs three phases in a fixed order:
//!
//! 1. **Purge** - staged removals are taken out of the active lists
//! 2. **Step** - completed tweens are dropped, then every active tween updates
//! 3. **Merge** - staged additions are appended to the active lists
//!
//! So a tween created during tick N first emits on tick N + 1, and a tween
//! removed during tick N never emits on tick N + 1.
//!
//! ```ignore
//! use blinc_tween::TweenEngine;
//!
//! let engine = TweenEngine::new();
//! let handle = engine.handle();
//!
//! engine.add_with_completion("panel", |v| println!("x = {v}"), 0.0_f32, 100.0, 30, move || {
//!     // Chain a fade once the slide finishes
//!     let _ = handle.add("panel", |v| println!("alpha = {v}"), 1.0_f32, 0.0, 10);
//! })?;
//!
//! while engine.advance() {}
//! ```

use crate::error::{Result, TweenError};
use crate::registry::InterpolatorRegistry;
use crate::tween::{CompletionCallback, Setter, Tween};
use crate::values::{TweenValue, ValueKind};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::hash::Hash;
use std::rc::{Rc, Weak};

/// Owner-keyed map that iterates owners in first-insertion order
type OwnerMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Tweens staged for addition or removal under one owner
type Staged = SmallVec<[Tween; 4]>;

// ============================================================================
// Configuration
// ============================================================================

/// Engine construction options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Install the float and int interpolators at construction
    pub builtin_interpolators: bool,
    /// Drop an owner's entry once its active list becomes empty
    pub prune_empty_owners: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            builtin_interpolators: true,
            prune_empty_owners: true,
        }
    }

    /// Start with an empty interpolator registry
    pub fn bare() -> Self {
        Self::new().builtin_interpolators(false)
    }

    pub fn builtin_interpolators(mut self, enabled: bool) -> Self {
        self.builtin_interpolators = enabled;
        self
    }

    pub fn prune_empty_owners(mut self, enabled: bool) -> Self {
        self.prune_empty_owners = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the engine's bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Completed `advance()` calls
    pub tick: u64,
    /// Owners with an active list
    pub owners: usize,
    /// Tweens in active lists, including completed ones awaiting removal
    pub active: usize,
    pub pending_add: usize,
    pub pending_remove: usize,
}

// ============================================================================
// Engine State
// ============================================================================

/// Internal state shared between the engine and its handles
struct EngineInner<K> {
    config: EngineConfig,
    registry: RefCell<InterpolatorRegistry>,
    active: RefCell<OwnerMap<K, Vec<Tween>>>,
    pending_add: RefCell<OwnerMap<K, Staged>>,
    pending_remove: RefCell<OwnerMap<K, Staged>>,
    next_id: Cell<u64>,
    tick: Cell<u64>,
    /// Set while `advance()` is running
    advancing: Cell<bool>,
}

/// Clears the advancing flag even if a callback panics
struct AdvanceGuard<'a>(&'a Cell<bool>);

impl Drop for AdvanceGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<K: Eq + Hash + Clone> EngineInner<K> {
    fn new(config: EngineConfig) -> Self {
        let registry = if config.builtin_interpolators {
            InterpolatorRegistry::new()
        } else {
            InterpolatorRegistry::empty()
        };

        Self {
            config,
            registry: RefCell::new(registry),
            active: RefCell::new(OwnerMap::default()),
            pending_add: RefCell::new(OwnerMap::default()),
            pending_remove: RefCell::new(OwnerMap::default()),
            next_id: Cell::new(0),
            tick: Cell::new(0),
            advancing: Cell::new(false),
        }
    }

    fn register_interpolator<F>(&self, kind: ValueKind, interpolator: F) -> bool
    where
        F: Fn(TweenValue, TweenValue, f32) -> TweenValue + 'static,
    {
        self.registry.borrow_mut().register(kind, interpolator)
    }

    fn enqueue(
        &self,
        owner: K,
        setter: Setter,
        start: TweenValue,
        end: TweenValue,
        total_steps: u32,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Tween> {
        let kind = start.kind();
        let stepper = self.registry.borrow().resolve(kind)?;
        if end.kind() != kind {
            return Err(TweenError::KindMismatch {
                start: kind,
                end: end.kind(),
            });
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let tween = Tween::new(id, stepper, setter, start, end, total_steps, on_complete);
        tracing::trace!(
            "TweenEngine: staged tween {} ({} -> {} over {} steps)",
            id,
            start,
            end,
            total_steps
        );

        self.pending_add
            .borrow_mut()
            .entry(owner)
            .or_default()
            .push(tween.clone());
        Ok(tween)
    }

    fn remove(&self, owner: &K, tween: &Tween) {
        let mut pending = self.pending_remove.borrow_mut();
        let staged = pending.entry(owner.clone()).or_default();
        if !staged.contains(tween) {
            staged.push(tween.clone());
        }
    }

    fn remove_all(&self, owner: &K) {
        let active = self.active.borrow();
        let Some(list) = active.get(owner) else {
            return;
        };
        if list.is_empty() {
            return;
        }

        let mut pending = self.pending_remove.borrow_mut();
        let staged = pending.entry(owner.clone()).or_default();
        let mut newly_staged = 0;
        for tween in list {
            if !staged.contains(tween) {
                staged.push(tween.clone());
                newly_staged += 1;
            }
        }
        tracing::debug!(
            "TweenEngine: staged {} tween(s) for removal from one owner",
            newly_staged
        );
    }

    fn advance(&self) -> bool {
        if self.advancing.get() {
            tracing::warn!("TweenEngine: advance() called from inside a tween callback; ignored");
            return !self.is_idle();
        }
        self.advancing.set(true);
        let _guard = AdvanceGuard(&self.advancing);

        let purged = self.purge();
        let stepped = self.step();
        let merged = self.merge();

        let tick = self.tick.get() + 1;
        self.tick.set(tick);
        tracing::trace!(
            "TweenEngine: tick {} (purged={}, stepped={}, merged={})",
            tick,
            purged,
            stepped,
            merged
        );

        !self.is_idle()
    }

    /// Phase 1: resolve staged removals against the active lists
    ///
    /// A removal for a tween still waiting in the pending-add buffer is
    /// carried over, so it is purged right after that tween merges and
    /// before its first step.
    fn purge(&self) -> usize {
        let removals = std::mem::take(&mut *self.pending_remove.borrow_mut());
        let mut carried: OwnerMap<K, Staged> = OwnerMap::default();
        // Tweens leave the active lists here but are dropped only after the
        // borrow ends, since dropping a setter may call back into the engine.
        let mut purged: Vec<Tween> = Vec::new();
        {
            let mut active = self.active.borrow_mut();
            let pending_add = self.pending_add.borrow();

            for (owner, staged) in &removals {
                let waiting = pending_add.get(owner);
                let mut list = active.get_mut(owner);
                for tween in staged {
                    let index = list
                        .as_deref()
                        .and_then(|list| list.iter().position(|t| t == tween));
                    if let (Some(index), Some(list)) = (index, list.as_deref_mut()) {
                        purged.push(list.remove(index));
                    } else if waiting.is_some_and(|waiting| waiting.contains(tween)) {
                        carried.entry(owner.clone()).or_default().push(tween.clone());
                    }
                }
            }
        }

        if !carried.is_empty() {
            let mut pending = self.pending_remove.borrow_mut();
            for (owner, staged) in carried {
                let entry = pending.entry(owner).or_default();
                for tween in staged {
                    if !entry.contains(&tween) {
                        entry.push(tween);
                    }
                }
            }
        }

        let count = purged.len();
        drop(purged);
        drop(removals);
        count
    }

    /// Phase 2: drop completed tweens, then update every active tween
    fn step(&self) -> usize {
        // The active lists are only mutated in purge and merge, so a snapshot
        // taken here is exactly what the lists hold for the whole phase. No
        // borrow is held while callbacks run, or while finished tweens drop.
        let mut finished: Vec<Tween> = Vec::new();
        let snapshot: Vec<Tween> = {
            let mut active = self.active.borrow_mut();
            for list in active.values_mut() {
                let (done, running): (Vec<Tween>, Vec<Tween>) = std::mem::take(list)
                    .into_iter()
                    .partition(Tween::is_complete);
                *list = running;
                finished.extend(done);
            }
            if self.config.prune_empty_owners {
                active.retain(|_, list| !list.is_empty());
            }
            active.values().flatten().cloned().collect()
        };
        drop(finished);

        for tween in &snapshot {
            tween.update();
        }
        snapshot.len()
    }

    /// Phase 3: append staged additions to the active lists
    fn merge(&self) -> usize {
        let additions = std::mem::take(&mut *self.pending_add.borrow_mut());
        let mut active = self.active.borrow_mut();
        let mut merged = 0;

        for (owner, staged) in additions {
            merged += staged.len();
            active.entry(owner).or_default().extend(staged);
        }
        merged
    }

    fn active_count(&self, owner: &K) -> usize {
        self.active.borrow().get(owner).map_or(0, Vec::len)
    }

    fn is_idle(&self) -> bool {
        self.pending_add.borrow().is_empty()
            && self.pending_remove.borrow().is_empty()
            && self
                .active
                .borrow()
                .values()
                .flatten()
                .all(Tween::is_complete)
    }

    fn stats(&self) -> EngineStats {
        let active = self.active.borrow();
        EngineStats {
            tick: self.tick.get(),
            owners: active.len(),
            active: active.values().map(Vec::len).sum(),
            pending_add: self.pending_add.borrow().values().map(|staged| staged.len()).sum(),
            pending_remove: self
                .pending_remove
                .borrow()
                .values()
                .map(|staged| staged.len())
                .sum(),
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// The tween engine: interpolator registry plus owner-grouped tween lists
///
/// All operations take `&self`, so setters and completion callbacks can call
/// back into the engine through an [`EngineHandle`]. The engine is
/// single-threaded and not `Send`.
pub struct TweenEngine<K> {
    inner: Rc<EngineInner<K>>,
}

impl<K: Eq + Hash + Clone> TweenEngine<K> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            inner: Rc::new(EngineInner::new(config)),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.inner.config
    }

    /// Get a weak handle for use inside tween callbacks
    ///
    /// Handles don't keep the engine alive, so capturing one in a setter
    /// doesn't create a reference cycle.
    pub fn handle(&self) -> EngineHandle<K> {
        EngineHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Install the interpolator for `kind`, replacing any previous one
    ///
    /// Tweens already created keep the interpolator they were created with.
    /// Returns true if an existing interpolator was replaced.
    pub fn register_interpolator<F>(&self, kind: ValueKind, interpolator: F) -> bool
    where
        F: Fn(TweenValue, TweenValue, f32) -> TweenValue + 'static,
    {
        self.inner.register_interpolator(kind, interpolator)
    }

    pub fn has_interpolator(&self, kind: ValueKind) -> bool {
        self.inner.registry.borrow().contains(kind)
    }

    /// Schedule a tween from `start` to `end` over `total_steps` ticks
    ///
    /// The tween is staged and joins the active list at the end of the next
    /// `advance()`, so its first value is emitted the tick after that. It
    /// emits `total_steps + 1` values, from `start` through `end`.
    ///
    /// # Errors
    ///
    /// [`TweenError::UnsupportedKind`] if no interpolator is registered for
    /// the kind of `start`, [`TweenError::KindMismatch`] if `end` is a
    /// [`TweenValue`] of a different kind. Nothing is staged on error.
    pub fn add<S, V>(
        &self,
        owner: K,
        setter: S,
        start: V,
        end: V,
        total_steps: u32,
    ) -> Result<Tween>
    where
        S: FnMut(TweenValue) + 'static,
        V: Into<TweenValue>,
    {
        self.inner.enqueue(
            owner,
            Box::new(setter),
            start.into(),
            end.into(),
            total_steps,
            None,
        )
    }

    /// Schedule a tween that calls `on_complete` once after its final value
    ///
    /// The callback runs synchronously inside `advance()`, in the same update
    /// that emitted `end`.
    pub fn add_with_completion<S, V, C>(
        &self,
        owner: K,
        setter: S,
        start: V,
        end: V,
        total_steps: u32,
        on_complete: C,
    ) -> Result<Tween>
    where
        S: FnMut(TweenValue) + 'static,
        V: Into<TweenValue>,
        C: FnOnce() + 'static,
    {
        self.inner.enqueue(
            owner,
            Box::new(setter),
            start.into(),
            end.into(),
            total_steps,
            Some(Box::new(on_complete)),
        )
    }

    /// Stage a tween for removal at the start of the next `advance()`
    ///
    /// A tween that has not joined its active list yet is removed right after
    /// it joins, before its first step. Unknown owners and tweens are ignored;
    /// staging twice is a no-op.
    pub fn remove(&self, owner: &K, tween: &Tween) {
        self.inner.remove(owner, tween);
    }

    /// Stage every active tween of `owner` for removal
    ///
    /// Tweens still waiting to join the active list are not affected.
    pub fn remove_all(&self, owner: &K) {
        self.inner.remove_all(owner);
    }

    /// Run one tick: purge, step, merge
    ///
    /// Returns true while any tween is running or any change is staged. Calls
    /// made from inside a tween callback are ignored.
    pub fn advance(&self) -> bool {
        self.inner.advance()
    }

    /// Number of completed `advance()` calls
    pub fn tick(&self) -> u64 {
        self.inner.tick.get()
    }

    /// Length of `owner`'s active list, including completed tweens awaiting
    /// removal
    pub fn active_count(&self, owner: &K) -> usize {
        self.inner.active_count(owner)
    }

    pub fn pending_add_count(&self) -> usize {
        self.inner.stats().pending_add
    }

    pub fn pending_remove_count(&self) -> usize {
        self.inner.stats().pending_remove
    }

    /// True when no tween is running and nothing is staged
    pub fn is_idle(&self) -> bool {
        self.inner.is_idle()
    }

    pub fn stats(&self) -> EngineStats {
        self.inner.stats()
    }
}

impl<K: Eq + Hash + Clone> Default for TweenEngine<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Engine Handle
// ============================================================================

/// Weak handle to a [`TweenEngine`]
///
/// Once the engine is dropped, `add` fails with [`TweenError::EngineDropped`]
/// and removals do nothing.
pub struct EngineHandle<K> {
    inner: Weak<EngineInner<K>>,
}

impl<K> Clone for EngineHandle<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash + Clone> EngineHandle<K> {
    /// Check if the engine is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// See [`TweenEngine::register_interpolator`]; false if the engine is gone
    pub fn register_interpolator<F>(&self, kind: ValueKind, interpolator: F) -> bool
    where
        F: Fn(TweenValue, TweenValue, f32) -> TweenValue + 'static,
    {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.register_interpolator(kind, interpolator))
    }

    /// See [`TweenEngine::add`]
    pub fn add<S, V>(
        &self,
        owner: K,
        setter: S,
        start: V,
        end: V,
        total_steps: u32,
    ) -> Result<Tween>
    where
        S: FnMut(TweenValue) + 'static,
        V: Into<TweenValue>,
    {
        let inner = self.inner.upgrade().ok_or(TweenError::EngineDropped)?;
        inner.enqueue(
            owner,
            Box::new(setter),
            start.into(),
            end.into(),
            total_steps,
            None,
        )
    }

    /// See [`TweenEngine::add_with_completion`]
    pub fn add_with_completion<S, V, C>(
        &self,
        owner: K,
        setter: S,
        start: V,
        end: V,
        total_steps: u32,
        on_complete: C,
    ) -> Result<Tween>
    where
        S: FnMut(TweenValue) + 'static,
        V: Into<TweenValue>,
        C: FnOnce() + 'static,
    {
        let inner = self.inner.upgrade().ok_or(TweenError::EngineDropped)?;
        inner.enqueue(
            owner,
            Box::new(setter),
            start.into(),
            end.into(),
            total_steps,
            Some(Box::new(on_complete)),
        )
    }

    pub fn remove(&self, owner: &K, tween: &Tween) {
        if let Some(inner) = self.inner.upgrade() {
            inner.remove(owner, tween);
        }
    }

    pub fn remove_all(&self, owner: &K) {
        if let Some(inner) = self.inner.upgrade() {
            inner.remove_all(owner);
        }
    }
}
