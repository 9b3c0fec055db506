use serde::{Deserialize, Serialize};

/// The closed set of preprocessing-token-level kinds the tokenizer emits.
/// Deliberately flat rather than a nested enum-of-enums: every rule in
/// the grammar skeleton maps to exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Whitespace,
    Newline,
    DeletedNewline,
    LineComment,
    BlockComment,
    Identifier,
    Keyword,
    Number,
    Character,
    String,
    RawString,
    EscapeSequence,
    UniversalCharacterName,
    Punctuator,
    PreprocessorControl,
    PreprocessorIdentifier,
    MacroName,
    MacroArg,
    MacroVaArgs,
    MacroArgList,
    MacroReplacement,
    Encoding,
    Delimiter,
    UserDefinedLiteral,
    LocalHeaderName,
    SystemHeaderName,
    ModuleDecl,
    ModuleExport,
    ModuleImport,
    ModuleName,
}

/// A lexed span: `start ≤ end`, both absolute byte offsets into the
/// source text before post-processing rebases them to be line-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        debug_assert!(start <= end);
        Self { start, end, kind }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One physical line, with its tokens rebased to offsets relative to
/// `offset`. `size` excludes the line terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub offset: usize,
    pub size: usize,
    pub tokens: Vec<Token>,
}

impl LineRecord {
    pub fn new(offset: usize, size: usize) -> Self {
        Self {
            offset,
            size,
            tokens: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_len_matches_span() {
        let t = Token::new(3, 7, TokenKind::Identifier);
        assert_eq!(t.len(), 4);
        assert!(!t.is_empty());
    }

    #[test]
    fn empty_token_has_zero_len() {
        let t = Token::new(5, 5, TokenKind::DeletedNewline);
        assert!(t.is_empty());
    }
}
