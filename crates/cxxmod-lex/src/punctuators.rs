use cxxmod_combinators::{alt, Cursor, Recognizer, ScanState};

/// The C++ punctuator set, longest-first so `alt`'s left-to-right,
/// first-match-wins semantics produce maximal munch without a separate
/// length comparison pass.
const PUNCTUATORS: &[&[u8]] = &[
    b"<=>",
    b"->*",
    b"...",
    b"<<=",
    b">>=",
    b"::",
    b"->",
    b".*",
    b"<<",
    b">>",
    b"<=",
    b">=",
    b"==",
    b"!=",
    b"&&",
    b"||",
    b"++",
    b"--",
    b"+=",
    b"-=",
    b"*=",
    b"/=",
    b"%=",
    b"&=",
    b"|=",
    b"^=",
    b"<:",
    b":>",
    b"<%",
    b"%>",
    b"%:",
    b"(",
    b")",
    b"[",
    b"]",
    b"{",
    b"}",
    b";",
    b":",
    b"?",
    b".",
    b"~",
    b"!",
    b"+",
    b"-",
    b"*",
    b"/",
    b"%",
    b"^",
    b"&",
    b"|",
    b"=",
    b"<",
    b">",
    b",",
    b"#",
];

fn literal(pat: &'static [u8]) -> impl Fn(&mut Cursor<'_, u8>, &mut ScanState) -> bool {
    move |cursor, _state| {
        if cursor.remaining().starts_with(pat) {
            cursor.advance(pat.len());
            true
        } else {
            false
        }
    }
}

fn build() -> Box<dyn Recognizer<u8>> {
    let mut combined: Box<dyn Recognizer<u8>> = Box::new(literal(PUNCTUATORS[0]));
    for pat in &PUNCTUATORS[1..] {
        combined = Box::new(alt(combined, literal(pat)));
    }
    combined
}

/// Longest punctuator matching at `src[pos..]`, or `None`.
pub fn punctuator_len(src: &[u8], pos: usize) -> Option<usize> {
    let recognizer = build();
    let mut cursor = Cursor::new(&src[pos..]);
    let mut state = ScanState::new();
    if recognizer.recognize(&mut cursor, &mut state) {
        Some(cursor.pos())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximal_munch_prefers_three_byte_spaceship() {
        assert_eq!(punctuator_len(b"<=>x", 0), Some(3));
    }

    #[test]
    fn maximal_munch_prefers_two_byte_over_one() {
        assert_eq!(punctuator_len(b"::x", 0), Some(2));
        assert_eq!(punctuator_len(b"<x", 0), Some(1));
    }

    #[test]
    fn no_match_on_alpha() {
        assert_eq!(punctuator_len(b"abc", 0), None);
    }

    #[test]
    fn digraph_punctuators_recognized() {
        assert_eq!(punctuator_len(b"<:", 0), Some(2));
        assert_eq!(punctuator_len(b"%:", 0), Some(2));
    }
}
