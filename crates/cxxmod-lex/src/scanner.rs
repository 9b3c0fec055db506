use crate::lines::assemble_lines;
use crate::punctuators::punctuator_len;
use crate::splice::{collapse_splices, eol_len, splice_len};
use cxxmod_model::{LineRecord, Token, TokenKind};

const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "auto", "bool", "break", "case", "catch", "char", "char8_t",
    "char16_t", "char32_t", "class", "concept", "const", "constexpr", "continue", "decltype",
    "default", "delete", "do", "double", "else", "enum", "explicit", "extern", "false", "float",
    "for", "friend", "goto", "if", "inline", "int", "long", "mutable", "namespace", "new",
    "noexcept", "nullptr", "operator", "private", "protected", "public", "requires", "return",
    "short", "signed", "sizeof", "static", "struct", "switch", "template", "this", "throw",
    "true", "try", "typedef", "typename", "union", "unsigned", "using", "virtual", "void",
    "volatile", "wchar_t", "while",
];

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

/// Entry point: tokenizes `src` at the preprocessing-token level and
/// assembles the result into per-line records.
pub fn tokenize_preprocessing_file(src: &[u8]) -> Vec<LineRecord> {
    let mut scanner = Scanner::new(src);
    scanner.run();
    assemble_lines(src.len(), scanner.tokens)
}

struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
    at_line_start: bool,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            pos: 0,
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.pos < self.src.len() {
            self.step();
        }
    }

    /// Consumes any deleted splice sitting at the current position
    /// (emitting its `deleted_newline`/`newline` pair) and returns the
    /// next real byte without consuming it. This is the "filter" the
    /// rest of the scanner consults before testing a byte's class.
    fn peek_logical(&mut self) -> Option<u8> {
        loop {
            if let Some(n) = splice_len(self.src, self.pos) {
                let del_start = self.pos;
                self.tokens
                    .push(Token::new(del_start, del_start + 1, TokenKind::DeletedNewline));
                self.tokens
                    .push(Token::new(del_start + 1, del_start + n, TokenKind::Newline));
                self.pos += n;
                continue;
            }
            break;
        }
        self.src.get(self.pos).copied()
    }

    fn consume_while(&mut self, pred: impl Fn(u8) -> bool) -> (usize, usize) {
        let start = self.pos;
        loop {
            match self.peek_logical() {
                Some(b) if pred(b) => self.pos += 1,
                _ => break,
            }
        }
        (start, self.pos)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_logical() {
                Some(b' ') | Some(b'\t') => {
                    let (s, e) = self.consume_while(|c| c == b' ' || c == b'\t');
                    self.tokens.push(Token::new(s, e, TokenKind::Whitespace));
                }
                Some(b'\r') | Some(b'\n') => {
                    let n = eol_len(self.src, self.pos);
                    let s = self.pos;
                    self.tokens.push(Token::new(s, s + n, TokenKind::Newline));
                    self.pos += n;
                }
                Some(b'/') if self.src[self.pos..].starts_with(b"//") => {
                    let start = self.pos;
                    self.pos += 2;
                    self.consume_while(|c| c != b'\r' && c != b'\n');
                    self.tokens
                        .push(Token::new(start, self.pos, TokenKind::LineComment));
                }
                Some(b'/') if self.src[self.pos..].starts_with(b"/*") => {
                    let tok = self.scan_block_comment();
                    self.tokens.push(tok);
                }
                _ => break,
            }
        }
    }

    fn scan_block_comment(&mut self) -> Token {
        let start = self.pos;
        self.pos += 2;
        loop {
            match self.peek_logical() {
                None => break,
                Some(b'*') => {
                    self.pos += 1;
                    if self.peek_logical() == Some(b'/') {
                        self.pos += 1;
                        break;
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
        Token::new(start, self.pos, TokenKind::BlockComment)
    }

    fn scan_identifier_word(&mut self) -> (usize, usize) {
        self.consume_while(is_ident_continue)
    }

    fn scan_number(&mut self) -> (usize, usize) {
        let start = self.pos;
        loop {
            match self.peek_logical() {
                Some(b) if b.is_ascii_alphanumeric() || b == b'.' => self.pos += 1,
                Some(b'\'') => {
                    self.pos += 1;
                    if matches!(self.peek_logical(), Some(c) if c.is_ascii_alphanumeric()) {
                        self.pos += 1;
                    }
                }
                Some(b'+') | Some(b'-') => {
                    let prev = if self.pos > 0 { self.src.get(self.pos - 1).copied() } else { None };
                    if matches!(prev, Some(b'e') | Some(b'E') | Some(b'p') | Some(b'P')) {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        (start, self.pos)
    }

    fn scan_quoted(&mut self, quote: u8) -> usize {
        self.pos += 1;
        loop {
            match self.peek_logical() {
                None => break,
                Some(b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek_logical().is_some() {
                        self.pos += 1;
                    }
                }
                Some(b'\r') | Some(b'\n') => break,
                Some(_) => self.pos += 1,
            }
        }
        self.pos
    }

    fn scan_raw_string(&mut self) -> usize {
        self.pos += 1; // opening quote
        let delim_start = self.pos;
        loop {
            match self.peek_logical() {
                Some(b'(') => break,
                Some(_) => self.pos += 1,
                None => return self.pos,
            }
        }
        let delim = self.src[delim_start..self.pos].to_vec();
        self.pos += 1; // '('
        loop {
            match self.peek_logical() {
                None => break,
                Some(b')') => {
                    self.pos += 1;
                    if self.src[self.pos..].starts_with(&delim)
                        && self.src.get(self.pos + delim.len()) == Some(&b'"')
                    {
                        self.pos += delim.len() + 1;
                        break;
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
        self.pos
    }

    fn scan_header_name(&mut self, open: u8) -> usize {
        let close = if open == b'<' { b'>' } else { b'"' };
        self.pos += 1;
        loop {
            match self.peek_logical() {
                None => break,
                Some(b) if b == close => {
                    self.pos += 1;
                    break;
                }
                Some(b'\r') | Some(b'\n') => break,
                Some(_) => self.pos += 1,
            }
        }
        self.pos
    }

    fn scan_control_line(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1; // '#'
        let _ = self.consume_while(|c| c == b' ' || c == b'\t');
        let _ = self.consume_while(|b| b.is_ascii_alphabetic());
        self.consume_while(|c| c != b'\r' && c != b'\n');
        Token::new(start, self.pos, TokenKind::PreprocessorControl)
    }

    /// Prefix match for `encoding? ("R\"" | "\"" | "'")`; returns the byte
    /// length of everything up to (but not including) the opening quote,
    /// whether it is a raw string, and the quote character.
    fn detect_literal(&self, pos: usize) -> Option<(usize, bool, u8)> {
        let rest = &self.src[pos..];
        let enc_len = [b"u8".as_slice(), b"u", b"U", b"L"]
            .iter()
            .find(|p| rest.starts_with(p))
            .map(|p| p.len())
            .unwrap_or(0);
        let rest2 = &rest[enc_len..];
        if rest2.starts_with(b"R\"") {
            return Some((enc_len + 1, true, b'"'));
        }
        if rest2.starts_with(b"\"") {
            return Some((enc_len, false, b'"'));
        }
        if rest2.starts_with(b"'") {
            return Some((enc_len, false, b'\''));
        }
        None
    }

    fn scan_literal_from(&mut self, start: usize, prefix_len: usize, is_raw: bool, quote: u8) {
        self.pos = start + prefix_len;
        let kind = if is_raw {
            self.scan_raw_string();
            TokenKind::RawString
        } else {
            self.scan_quoted(quote);
            if quote == b'"' {
                TokenKind::String
            } else {
                TokenKind::Character
            }
        };
        self.emit_literal_with_suffix(start, kind);
        self.at_line_start = false;
    }

    fn emit_literal_with_suffix(&mut self, start: usize, kind: TokenKind) {
        let lit_end = self.pos;
        self.tokens.push(Token::new(start, lit_end, kind));
        if self.pos < self.src.len() && is_ident_start(self.src[self.pos]) {
            let (s, e) = self.scan_identifier_word();
            self.tokens.push(Token::new(s, e, TokenKind::UserDefinedLiteral));
        }
    }

    fn parse_qname_part(&mut self) -> Option<(usize, usize)> {
        if self.pos >= self.src.len() || !is_ident_start(self.src[self.pos]) {
            return None;
        }
        let (s, e) = self.scan_identifier_word();
        self.tokens.push(Token::new(s, e, TokenKind::Identifier));
        Some((s, e))
    }

    fn parse_qualified_name(&mut self) -> Option<(usize, usize)> {
        let (start, mut end) = self.parse_qname_part()?;
        loop {
            self.skip_trivia();
            if self.peek_logical() != Some(b'.') {
                break;
            }
            let dot_start = self.pos;
            self.pos += 1;
            self.tokens
                .push(Token::new(dot_start, self.pos, TokenKind::Punctuator));
            self.skip_trivia();
            match self.parse_qname_part() {
                Some((_, e2)) => end = e2,
                None => break,
            }
        }
        Some((start, end))
    }

    fn parse_module_ref(&mut self) -> Option<(usize, usize)> {
        self.skip_trivia();
        if self.peek_logical() == Some(b':') {
            let colon_start = self.pos;
            self.pos += 1;
            self.tokens
                .push(Token::new(colon_start, self.pos, TokenKind::Punctuator));
            self.skip_trivia();
            return match self.parse_qualified_name() {
                Some((_, e)) => Some((colon_start, e)),
                None => Some((colon_start, self.pos)),
            };
        }
        let first = self.parse_qualified_name()?;
        self.skip_trivia();
        if self.peek_logical() == Some(b':') {
            let colon_start = self.pos;
            self.pos += 1;
            self.tokens
                .push(Token::new(colon_start, self.pos, TokenKind::Punctuator));
            self.skip_trivia();
            if let Some((_, e2)) = self.parse_qualified_name() {
                return Some((first.0, e2));
            }
            return Some((first.0, self.pos));
        }
        Some(first)
    }

    /// Consumes pp-tokens up to (and including) the next `;`, recursing
    /// through the normal dispatcher so nested comments/strings/splices
    /// inside a declaration's tail are handled uniformly.
    fn consume_to_semicolon(&mut self) {
        self.skip_trivia();
        while self.peek_logical().is_some() && self.peek_logical() != Some(b';') {
            self.step();
            self.skip_trivia();
        }
        if self.peek_logical() == Some(b';') {
            let s = self.pos;
            self.pos += 1;
            self.tokens.push(Token::new(s, self.pos, TokenKind::Punctuator));
        }
    }

    fn scan_module_decl(&mut self, kw_start: usize) -> usize {
        self.skip_trivia();
        let name_span = if self.peek_logical() == Some(b';') {
            None
        } else {
            self.parse_module_ref()
        };
        self.consume_to_semicolon();
        let decl_end = self.pos;
        self.tokens
            .push(Token::new(kw_start, decl_end, TokenKind::ModuleDecl));
        if let Some((s, e)) = name_span {
            self.tokens.push(Token::new(s, e, TokenKind::ModuleName));
        }
        self.at_line_start = false;
        decl_end
    }

    fn scan_module_import(&mut self, kw_start: usize) -> usize {
        self.skip_trivia();
        let mut name_span = None;
        let header_kind = match self.peek_logical() {
            Some(b'<') => Some(TokenKind::SystemHeaderName),
            Some(b'"') => Some(TokenKind::LocalHeaderName),
            _ => None,
        };
        if let Some(kind) = header_kind {
            let start = self.pos;
            let open = self.src[self.pos];
            self.scan_header_name(open);
            self.tokens.push(Token::new(start, self.pos, kind));
        } else {
            name_span = self.parse_module_ref();
        }
        self.consume_to_semicolon();
        let import_end = self.pos;
        self.tokens
            .push(Token::new(kw_start, import_end, TokenKind::ModuleImport));
        if let Some((s, e)) = name_span {
            self.tokens.push(Token::new(s, e, TokenKind::ModuleName));
        }
        self.at_line_start = false;
        import_end
    }

    fn scan_module_export(&mut self, kw_start: usize, kw_end: usize) {
        self.skip_trivia();
        if self.pos < self.src.len() && is_ident_start(self.src[self.pos]) {
            let word_start = self.pos;
            let (s, e) = self.scan_identifier_word();
            let text = collapse_splices(self.src, s, e);
            match text.as_str() {
                "module" => {
                    let inner_end = self.scan_module_decl(word_start);
                    self.tokens
                        .push(Token::new(kw_start, inner_end, TokenKind::ModuleExport));
                }
                "import" => {
                    let inner_end = self.scan_module_import(word_start);
                    self.tokens
                        .push(Token::new(kw_start, inner_end, TokenKind::ModuleExport));
                }
                _ => {
                    self.tokens.push(Token::new(kw_start, kw_end, TokenKind::Keyword));
                    let kind = if is_keyword(&text) {
                        TokenKind::Keyword
                    } else {
                        TokenKind::Identifier
                    };
                    self.tokens.push(Token::new(s, e, kind));
                }
            }
        } else {
            self.tokens.push(Token::new(kw_start, kw_end, TokenKind::Keyword));
        }
        self.at_line_start = false;
    }

    fn step(&mut self) {
        let b = match self.peek_logical() {
            Some(b) => b,
            None => return,
        };

        if b == b'\r' || b == b'\n' {
            let n = eol_len(self.src, self.pos);
            let start = self.pos;
            self.tokens.push(Token::new(start, start + n, TokenKind::Newline));
            self.pos += n;
            self.at_line_start = true;
            return;
        }

        if b == b' ' || b == b'\t' {
            let (s, e) = self.consume_while(|c| c == b' ' || c == b'\t');
            self.tokens.push(Token::new(s, e, TokenKind::Whitespace));
            return;
        }

        if self.src[self.pos..].starts_with(b"//") {
            let start = self.pos;
            self.pos += 2;
            self.consume_while(|c| c != b'\r' && c != b'\n');
            self.tokens
                .push(Token::new(start, self.pos, TokenKind::LineComment));
            self.at_line_start = false;
            return;
        }

        if self.src[self.pos..].starts_with(b"/*") {
            let tok = self.scan_block_comment();
            self.tokens.push(tok);
            self.at_line_start = false;
            return;
        }

        if b == b'#' && self.at_line_start {
            let tok = self.scan_control_line();
            self.tokens.push(tok);
            self.at_line_start = false;
            return;
        }

        if is_ident_start(b) {
            let was_at_line_start = self.at_line_start;
            let (start, end) = self.scan_identifier_word();
            self.at_line_start = false;

            if let Some((prefix_len, is_raw, quote)) = self.detect_literal(start) {
                if prefix_len <= end - start || prefix_len == 0 {
                    self.scan_literal_from(start, prefix_len, is_raw, quote);
                    return;
                }
            }

            let text = collapse_splices(self.src, start, end);
            if was_at_line_start && text == "export" {
                self.scan_module_export(start, end);
                return;
            }
            if was_at_line_start && text == "module" {
                self.scan_module_decl(start);
                return;
            }
            if was_at_line_start && text == "import" {
                self.scan_module_import(start);
                return;
            }

            let kind = if is_keyword(&text) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            self.tokens.push(Token::new(start, end, kind));
            return;
        }

        if b.is_ascii_digit() || (b == b'.' && self.src.get(self.pos + 1).map_or(false, |c| c.is_ascii_digit())) {
            let (start, end) = self.scan_number();
            self.tokens.push(Token::new(start, end, TokenKind::Number));
            self.at_line_start = false;
            return;
        }

        if b == b'"' || b == b'\'' {
            let start = self.pos;
            let kind = if b == b'"' { TokenKind::String } else { TokenKind::Character };
            self.scan_quoted(b);
            self.emit_literal_with_suffix(start, kind);
            self.at_line_start = false;
            return;
        }

        if let Some(len) = punctuator_len(self.src, self.pos) {
            let start = self.pos;
            self.pos += len;
            self.tokens.push(Token::new(start, self.pos, TokenKind::Punctuator));
            self.at_line_start = false;
            return;
        }

        // Restart-loop fallback: an unrecognized byte is skipped rather
        // than aborting the whole scan.
        self.pos += 1;
        self.at_line_start = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(src: &[u8], tok: &Token, line: &LineRecord) -> String {
        let abs_start = line.offset + tok.start;
        let abs_end = line.offset + tok.end;
        String::from_utf8_lossy(&src[abs_start..abs_end]).into_owned()
    }

    #[test]
    fn invariant_1_line_records_cover_the_whole_source() {
        let src = b"int main() {\n  return 0;\n}\n";
        let lines = tokenize_preprocessing_file(src);
        let mut covered = 0usize;
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.offset, covered, "line {i} starts right after the previous terminator");
            covered = line.offset + line.size;
            // account for the terminator itself (not stored as a token).
            if i + 1 < lines.len() {
                covered = lines[i + 1].offset;
            }
        }
    }

    #[test]
    fn invariant_2_every_token_is_within_its_line_size() {
        let src = b"export module m;\nint f();\n";
        for line in tokenize_preprocessing_file(src) {
            for tok in &line.tokens {
                assert!(tok.start <= tok.end);
                assert!(tok.end <= line.size);
            }
        }
    }

    #[test]
    fn invariant_3_whitespace_tokens_never_abut() {
        let src = b"a    b\n";
        for line in tokenize_preprocessing_file(src) {
            let mut prev_end: Option<usize> = None;
            for tok in &line.tokens {
                if tok.kind == TokenKind::Whitespace {
                    assert_ne!(Some(tok.start), prev_end);
                }
                prev_end = Some(tok.end);
            }
        }
    }

    #[test]
    fn invariant_4_raw_string_fidelity_round_trips() {
        let src = b"auto s = R\"(hello\nworld)\";\n";
        let lines = tokenize_preprocessing_file(src);
        let mut reconstructed = String::new();
        for line in &lines {
            for tok in &line.tokens {
                if tok.kind == TokenKind::RawString {
                    reconstructed.push_str(&text_of(src, tok, line));
                }
            }
        }
        assert_eq!(reconstructed, "R\"(hello\nworld)\"");
    }

    #[test]
    fn s1_simple_interface_emits_export_and_decl_markers() {
        let src = b"export module m; int f();\n";
        let lines = tokenize_preprocessing_file(src);
        let kinds: Vec<TokenKind> = lines[0].tokens.iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&TokenKind::ModuleExport));
        assert!(kinds.contains(&TokenKind::ModuleDecl));
        assert!(kinds.contains(&TokenKind::ModuleName));
    }

    #[test]
    fn s2_implementation_unit_has_decl_without_export() {
        let src = b"module m;\nint f(){return 0;}\n";
        let lines = tokenize_preprocessing_file(src);
        let kinds: Vec<TokenKind> = lines[0].tokens.iter().map(|t| t.kind).collect();
        assert!(!kinds.contains(&TokenKind::ModuleExport));
        assert!(kinds.contains(&TokenKind::ModuleDecl));
    }

    #[test]
    fn s4_legacy_header_import_emits_system_header_name() {
        let src = b"import <vector>;\n";
        let lines = tokenize_preprocessing_file(src);
        let kinds: Vec<TokenKind> = lines[0].tokens.iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&TokenKind::ModuleImport));
        assert!(kinds.contains(&TokenKind::SystemHeaderName));
        assert!(!kinds.contains(&TokenKind::ModuleName));
    }

    #[test]
    fn s5_deleted_splice_inside_keyword_still_yields_module_decl() {
        let src = b"export mod\\\nule m;\n";
        let lines = tokenize_preprocessing_file(src);
        let mut saw_export = false;
        let mut saw_decl = false;
        let mut saw_deleted = false;
        for line in &lines {
            for tok in &line.tokens {
                match tok.kind {
                    TokenKind::ModuleExport => saw_export = true,
                    TokenKind::ModuleDecl => saw_decl = true,
                    TokenKind::DeletedNewline => saw_deleted = true,
                    _ => {}
                }
            }
        }
        assert!(saw_export && saw_decl && saw_deleted);
    }

    #[test]
    fn qualified_and_partition_names_emit_dot_and_colon_punctuators() {
        let src = b"export module a.b:part;\n";
        let lines = tokenize_preprocessing_file(src);
        let punctuator_texts: Vec<String> = lines[0]
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Punctuator)
            .map(|t| text_of(src, t, &lines[0]))
            .collect();
        assert!(punctuator_texts.contains(&".".to_string()));
        assert!(punctuator_texts.contains(&":".to_string()));
    }
}
