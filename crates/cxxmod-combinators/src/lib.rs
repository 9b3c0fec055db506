//! A small parser-combinator kernel over a generic token slice.
//!
//! Recognizers are plain values composed with free functions (`alt`,
//! `seq`, `diff`, `not_`, `lookahead`, `repeat`, `action`) rather than
//! operator overloads or expression templates: composing two recognizers
//! produces a new concrete type, so there is no dynamic dispatch on the
//! hot path unless the caller boxes one explicitly.
//!
//! A recognizer either consumes a prefix of the cursor and returns
//! `true`, or leaves the cursor exactly where it found it and returns
//! `false`. Combinators rely on that contract to backtrack by saving and
//! restoring `Cursor::pos`; a `Recognizer` impl that consumes input on
//! failure breaks every combinator built on top of it.

pub mod combinators;
pub mod cursor;

pub use combinators::{
    action, alt, at_least, between, diff, exactly, lookahead, not_, one_or_more, repeat, seq,
    zero_or_more, zero_or_one, Action, Alt, Diff, NegativeLookahead, PositiveLookahead, Repeat,
    Seq,
};
pub use cursor::Cursor;

/// A match/no-match test over a cursor of `T`. Implementors must leave
/// the cursor untouched on failure.
pub trait Recognizer<T> {
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool;
}

impl<T, F> Recognizer<T> for F
where
    F: Fn(&mut Cursor<'_, T>, &mut ScanState) -> bool,
{
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        self(cursor, state)
    }
}

/// Lets callers fold a dynamically-sized list of recognizers (e.g. a
/// punctuator table) with `alt` without naming each intermediate type.
impl<T, R: Recognizer<T> + ?Sized> Recognizer<T> for Box<R> {
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        (**self).recognize(cursor, state)
    }
}


/// Scanner-wide state threaded through a recognition pass. The only
/// piece of state the kernel itself needs is whether semantic actions
/// are currently allowed to run; lookahead suppresses them so that
/// probing ahead never has a side effect.
#[derive(Debug, Default)]
pub struct ScanState {
    actions_enabled: bool,
}

impl ScanState {
    pub fn new() -> Self {
        Self {
            actions_enabled: true,
        }
    }

    pub fn actions_enabled(&self) -> bool {
        self.actions_enabled
    }

    /// Suppress actions for the duration of the guard's lifetime,
    /// restoring the previous value on every exit path -- including an
    /// early return or a panic unwind inside the guarded call.
    pub fn suppress_actions(&mut self) -> ActionGuard<'_> {
        let previous = self.actions_enabled;
        self.actions_enabled = false;
        ActionGuard {
            state: self,
            previous,
        }
    }
}

/// RAII guard restoring `ScanState::actions_enabled` when dropped. Derefs
/// to the underlying `ScanState` so callers can keep threading it through
/// nested `recognize` calls while the guard is alive.
pub struct ActionGuard<'a> {
    state: &'a mut ScanState,
    previous: bool,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.state.actions_enabled = self.previous;
    }
}

impl std::ops::Deref for ActionGuard<'_> {
    type Target = ScanState;
    fn deref(&self) -> &ScanState {
        self.state
    }
}

impl std::ops::DerefMut for ActionGuard<'_> {
    fn deref_mut(&mut self) -> &mut ScanState {
        self.state
    }
}
