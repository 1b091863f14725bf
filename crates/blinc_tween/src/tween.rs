//! Tween state machine
//!
//! A [`Tween`] steps a value from `start` to `end` over a fixed number of
//! ticks, handing each intermediate value to its setter. It emits one value
//! per update for steps `0..=total_steps` and then completes.

use crate::registry::InterpolatorFn;
use crate::values::{TweenValue, ValueKind};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Callback receiving each newly computed value
pub type Setter = Box<dyn FnMut(TweenValue)>;

/// Callback invoked once when a tween finishes
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Lifecycle state of a tween
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenPhase {
    /// Still emitting values
    Running,
    /// Final value emitted and completion fired; awaiting removal
    Completed,
}

/// Internal tween storage
///
/// Counters and flags are `Cell`s so a tween can be inspected through a
/// handle while its own setter is running.
struct TweenNode {
    id: u64,
    stepper: InterpolatorFn,
    setter: RefCell<Setter>,
    on_complete: Cell<Option<CompletionCallback>>,
    start: TweenValue,
    end: TweenValue,
    current_step: Cell<u32>,
    total_steps: u32,
    complete: Cell<bool>,
}

/// Handle to a scheduled tween (cheap to clone)
///
/// Two handles are equal only if they refer to the same tween.
#[derive(Clone)]
pub struct Tween {
    node: Rc<TweenNode>,
}

impl Tween {
    pub(crate) fn new(
        id: u64,
        stepper: InterpolatorFn,
        setter: Setter,
        start: TweenValue,
        end: TweenValue,
        total_steps: u32,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        Self {
            node: Rc::new(TweenNode {
                id,
                stepper,
                setter: RefCell::new(setter),
                on_complete: Cell::new(on_complete),
                start,
                end,
                current_step: Cell::new(0),
                total_steps,
                complete: Cell::new(false),
            }),
        }
    }

    /// Engine-unique sequence number
    pub fn id(&self) -> u64 {
        self.node.id
    }

    pub fn kind(&self) -> ValueKind {
        self.node.start.kind()
    }

    pub fn start(&self) -> TweenValue {
        self.node.start
    }

    pub fn end(&self) -> TweenValue {
        self.node.end
    }

    /// Index of the next value to emit
    pub fn current_step(&self) -> u32 {
        self.node.current_step.get()
    }

    pub fn total_steps(&self) -> u32 {
        self.node.total_steps
    }

    /// Interpolation fraction the next update will use
    ///
    /// A zero-step tween always reports 1.0: its only emission is `end`.
    pub fn progress(&self) -> f32 {
        let total = self.node.total_steps;
        if total == 0 {
            return 1.0;
        }
        self.node.current_step.get() as f32 / total as f32
    }

    pub fn is_complete(&self) -> bool {
        self.node.complete.get()
    }

    pub fn phase(&self) -> TweenPhase {
        if self.is_complete() {
            TweenPhase::Completed
        } else {
            TweenPhase::Running
        }
    }

    /// Advance one step: emit the current value, then complete after the last
    ///
    /// Does nothing once the tween has completed.
    pub(crate) fn update(&self) {
        let node = &self.node;
        if node.complete.get() {
            return;
        }

        let step = node.current_step.get();
        let value = (node.stepper)(node.start, node.end, self.progress());
        {
            let mut setter = node.setter.borrow_mut();
            (*setter)(value);
        }
        node.current_step.set(step.saturating_add(1));

        // `step == total_steps` is the update that moved current_step to
        // total_steps + 1
        if step == node.total_steps {
            if let Some(on_complete) = node.on_complete.take() {
                on_complete();
            }
            node.complete.set(true);
        }
    }
}

impl PartialEq for Tween {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Tween {}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.node.id)
            .field("start", &self.node.start)
            .field("end", &self.node.end)
            .field("current_step", &self.node.current_step.get())
            .field("total_steps", &self.node.total_steps)
            .field("complete", &self.node.complete.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{lerp_float, lerp_int};

    fn recording_tween(
        start: TweenValue,
        end: TweenValue,
        total_steps: u32,
    ) -> (Tween, Rc<RefCell<Vec<TweenValue>>>, Rc<Cell<u32>>) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(Cell::new(0));
        let stepper: InterpolatorFn = match start.kind() {
            ValueKind::Int => Rc::new(lerp_int) as InterpolatorFn,
            _ => Rc::new(lerp_float) as InterpolatorFn,
        };

        let sink = values.clone();
        let done = completions.clone();
        let tween = Tween::new(
            1,
            stepper,
            Box::new(move |v| sink.borrow_mut().push(v)),
            start,
            end,
            total_steps,
            Some(Box::new(move || done.set(done.get() + 1))),
        );
        (tween, values, completions)
    }

    #[test]
    fn test_emits_start_through_end() {
        let (tween, values, completions) =
            recording_tween(TweenValue::Float(0.0), TweenValue::Float(10.0), 4);

        for _ in 0..4 {
            tween.update();
            assert_eq!(tween.phase(), TweenPhase::Running);
        }
        assert_eq!(completions.get(), 0);

        tween.update();
        assert_eq!(tween.phase(), TweenPhase::Completed);
        assert_eq!(completions.get(), 1);
        assert_eq!(tween.current_step(), 5);

        let expected: Vec<TweenValue> = [0.0, 2.5, 5.0, 7.5, 10.0]
            .into_iter()
            .map(TweenValue::Float)
            .collect();
        assert_eq!(*values.borrow(), expected);
    }

    #[test]
    fn test_completed_tween_is_inert() {
        let (tween, values, completions) =
            recording_tween(TweenValue::Int(0), TweenValue::Int(10), 1);

        tween.update();
        tween.update();
        assert!(tween.is_complete());

        tween.update();
        tween.update();
        assert_eq!(values.borrow().len(), 2);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn test_zero_steps_emits_end_and_completes() {
        let (tween, values, completions) =
            recording_tween(TweenValue::Int(3), TweenValue::Int(8), 0);

        assert_eq!(tween.progress(), 1.0);
        tween.update();

        assert_eq!(*values.borrow(), vec![TweenValue::Int(8)]);
        assert_eq!(completions.get(), 1);
        assert!(tween.is_complete());
    }

    #[test]
    fn test_completes_without_callback() {
        let tween = Tween::new(
            7,
            Rc::new(lerp_float),
            Box::new(|_| {}),
            TweenValue::Float(1.0),
            TweenValue::Float(2.0),
            2,
            None,
        );
        for _ in 0..3 {
            tween.update();
        }
        assert!(tween.is_complete());
    }

    #[test]
    fn test_handle_identity() {
        let (a, _, _) = recording_tween(TweenValue::Float(0.0), TweenValue::Float(1.0), 1);
        let (b, _, _) = recording_tween(TweenValue::Float(0.0), TweenValue::Float(1.0), 1);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
