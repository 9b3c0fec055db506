use crate::{Cursor, Recognizer, ScanState};

/// `a` if it matches, else `b`, tried from the same starting position.
pub struct Alt<A, B> {
    a: A,
    b: B,
}

impl<T, A: Recognizer<T>, B: Recognizer<T>> Recognizer<T> for Alt<A, B> {
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        let start = cursor.pos();
        if self.a.recognize(cursor, state) {
            return true;
        }
        cursor.set_pos(start);
        self.b.recognize(cursor, state)
    }
}

pub fn alt<T, A: Recognizer<T>, B: Recognizer<T>>(a: A, b: B) -> Alt<A, B> {
    Alt { a, b }
}

/// `a` followed immediately by `b`; neither consumes if the pair fails.
pub struct Seq<A, B> {
    a: A,
    b: B,
}

impl<T, A: Recognizer<T>, B: Recognizer<T>> Recognizer<T> for Seq<A, B> {
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        let start = cursor.pos();
        if self.a.recognize(cursor, state) && self.b.recognize(cursor, state) {
            true
        } else {
            cursor.set_pos(start);
            false
        }
    }
}

pub fn seq<T, A: Recognizer<T>, B: Recognizer<T>>(a: A, b: B) -> Seq<A, B> {
    Seq { a, b }
}

/// `a` but not `b`: matches iff `a` matches and `b` fails to match the
/// exact same span starting at the same position. Used where the
/// tokenizer needs "any punctuator except this specific one" style
/// rules without enumerating the rest of the alphabet.
pub struct Diff<A, B> {
    a: A,
    b: B,
}

impl<T, A: Recognizer<T>, B: Recognizer<T>> Recognizer<T> for Diff<A, B> {
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        let start = cursor.pos();
        if !self.a.recognize(cursor, state) {
            return false;
        }
        let a_end = cursor.pos();

        cursor.set_pos(start);
        let b_matches_same_span = {
            let mut probe = *cursor;
            let mut guard = state.suppress_actions();
            self.b.recognize(&mut probe, &mut guard) && probe.pos() == a_end
        };

        if b_matches_same_span {
            cursor.set_pos(start);
            false
        } else {
            cursor.set_pos(a_end);
            true
        }
    }
}

pub fn diff<T, A: Recognizer<T>, B: Recognizer<T>>(a: A, b: B) -> Diff<A, B> {
    Diff { a, b }
}

/// Zero-width negative lookahead: succeeds iff `inner` fails, consuming
/// nothing either way.
pub struct NegativeLookahead<A> {
    inner: A,
}

impl<T, A: Recognizer<T>> Recognizer<T> for NegativeLookahead<A> {
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        let start = cursor.pos();
        let mut guard = state.suppress_actions();
        let matched = self.inner.recognize(cursor, &mut guard);
        cursor.set_pos(start);
        !matched
    }
}

pub fn not_<T, A: Recognizer<T>>(inner: A) -> NegativeLookahead<A> {
    NegativeLookahead { inner }
}

/// Zero-width positive lookahead: succeeds iff `inner` matches,
/// consuming nothing.
pub struct PositiveLookahead<A> {
    inner: A,
}

impl<T, A: Recognizer<T>> Recognizer<T> for PositiveLookahead<A> {
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        let start = cursor.pos();
        let mut guard = state.suppress_actions();
        let matched = self.inner.recognize(cursor, &mut guard);
        cursor.set_pos(start);
        matched
    }
}

pub fn lookahead<T, A: Recognizer<T>>(inner: A) -> PositiveLookahead<A> {
    PositiveLookahead { inner }
}

/// `inner` applied greedily between `min` and `max` (inclusive, `None`
/// meaning unbounded) times.
pub struct Repeat<A> {
    inner: A,
    min: usize,
    max: Option<usize>,
}

impl<T, A: Recognizer<T>> Recognizer<T> for Repeat<A> {
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        let start = cursor.pos();
        let mut count = 0;
        loop {
            if let Some(max) = self.max {
                if count >= max {
                    break;
                }
            }
            let before = cursor.pos();
            if !self.inner.recognize(cursor, state) {
                break;
            }
            // A zero-width match would loop forever; treat it as the end
            // of the repetition instead of hanging.
            if cursor.pos() == before {
                break;
            }
            count += 1;
        }
        if count >= self.min {
            true
        } else {
            cursor.set_pos(start);
            false
        }
    }
}

pub fn repeat<T, A: Recognizer<T>>(inner: A, min: usize, max: Option<usize>) -> Repeat<A> {
    Repeat { inner, min, max }
}

pub fn zero_or_more<T, A: Recognizer<T>>(inner: A) -> Repeat<A> {
    repeat(inner, 0, None)
}

pub fn one_or_more<T, A: Recognizer<T>>(inner: A) -> Repeat<A> {
    repeat(inner, 1, None)
}

pub fn zero_or_one<T, A: Recognizer<T>>(inner: A) -> Repeat<A> {
    repeat(inner, 0, Some(1))
}

pub fn exactly<T, A: Recognizer<T>>(inner: A, n: usize) -> Repeat<A> {
    repeat(inner, n, Some(n))
}

pub fn at_least<T, A: Recognizer<T>>(inner: A, n: usize) -> Repeat<A> {
    repeat(inner, n, None)
}

pub fn between<T, A: Recognizer<T>>(inner: A, min: usize, max: usize) -> Repeat<A> {
    repeat(inner, min, Some(max))
}

/// Runs `inner`; on a match, invokes `f` with the consumed span, but
/// only if actions are currently enabled (i.e. this isn't happening
/// inside a lookahead probe).
pub struct Action<A, F> {
    inner: A,
    f: F,
}

impl<T, A, F> Recognizer<T> for Action<A, F>
where
    A: Recognizer<T>,
    F: Fn(&[T]),
{
    fn recognize(&self, cursor: &mut Cursor<'_, T>, state: &mut ScanState) -> bool {
        let start = cursor.pos();
        if !self.inner.recognize(cursor, state) {
            return false;
        }
        if state.actions_enabled() {
            (self.f)(cursor.slice_from(start));
        }
        true
    }
}

pub fn action<T, A, F>(inner: A, f: F) -> Action<A, F>
where
    A: Recognizer<T>,
    F: Fn(&[T]),
{
    Action { inner, f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn tok<'a>(expected: char) -> impl Fn(&mut Cursor<'a, char>, &mut ScanState) -> bool + Copy {
        move |cursor, _state| {
            if cursor.peek() == Some(&expected) {
                cursor.advance(1);
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn alt_falls_back_and_restores_position_on_first_failure() {
        let input = vec!['b'];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        assert!(alt(tok('a'), tok('b')).recognize(&mut cursor, &mut state));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn seq_backtracks_fully_when_second_element_fails() {
        let input = vec!['a', 'z'];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        assert!(!seq(tok('a'), tok('b')).recognize(&mut cursor, &mut state));
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn diff_rejects_when_exclusion_matches_same_span() {
        let input = vec!['a'];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        // "any single char, but not 'a'" must reject on "a".
        let any = |c: &mut Cursor<'_, char>, _: &mut ScanState| {
            if c.peek().is_some() {
                c.advance(1);
                true
            } else {
                false
            }
        };
        assert!(!diff(any, tok('a')).recognize(&mut cursor, &mut state));
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn diff_accepts_when_exclusion_does_not_match() {
        let input = vec!['x'];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        let any = |c: &mut Cursor<'_, char>, _: &mut ScanState| {
            if c.peek().is_some() {
                c.advance(1);
                true
            } else {
                false
            }
        };
        assert!(diff(any, tok('a')).recognize(&mut cursor, &mut state));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn not_is_zero_width() {
        let input = vec!['b'];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        assert!(not_(tok('a')).recognize(&mut cursor, &mut state));
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn lookahead_is_zero_width_on_success() {
        let input = vec!['a'];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        assert!(lookahead(tok('a')).recognize(&mut cursor, &mut state));
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn zero_or_more_matches_empty_input() {
        let input: Vec<char> = vec![];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        assert!(zero_or_more(tok('a')).recognize(&mut cursor, &mut state));
    }

    #[test]
    fn one_or_more_requires_at_least_one() {
        let input: Vec<char> = vec![];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        assert!(!one_or_more(tok('a')).recognize(&mut cursor, &mut state));
    }

    #[test]
    fn exactly_n_stops_after_n_and_requires_n() {
        let input = vec!['a', 'a', 'a'];
        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        assert!(exactly(tok('a'), 2).recognize(&mut cursor, &mut state));
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn action_runs_only_when_actions_enabled() {
        let input = vec!['a'];
        let seen = RefCell::new(false);

        let mut cursor = Cursor::new(&input);
        let mut state = ScanState::new();
        let recognizer = action(tok('a'), |_: &[char]| *seen.borrow_mut() = true);
        assert!(recognizer.recognize(&mut cursor, &mut state));
        assert!(*seen.borrow());

        *seen.borrow_mut() = false;
        let mut cursor = Cursor::new(&input);
        let recognizer = action(tok('a'), |_: &[char]| *seen.borrow_mut() = true);
        assert!(lookahead(recognizer).recognize(&mut cursor, &mut state));
        assert!(!*seen.borrow());
    }
}
