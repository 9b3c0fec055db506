use cxxmod_model::{LineRecord, Token, TokenKind};

/// Turns the flat, absolute-offset token stream produced by the raw scan
/// into per-line records: splits any token whose span crosses a line
/// boundary into same-kind fragments (§4.B "Post-processing"), coalesces
/// adjacent whitespace, and rebases offsets to be line-relative.
///
/// Line boundaries are derived from the `Newline` tokens already present
/// in the stream rather than re-scanning the source, since the scanner
/// is required to emit one for every terminator (including the second
/// half of a deleted-splice pair).
pub fn assemble_lines(src_len: usize, mut tokens: Vec<Token>) -> Vec<LineRecord> {
    tokens.sort_by_key(|t| (t.start, t.end));

    let mut newline_spans: Vec<(usize, usize)> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Newline)
        .map(|t| (t.start, t.end))
        .collect();
    newline_spans.sort_unstable();

    let mut line_starts = vec![0usize];
    line_starts.extend(newline_spans.iter().map(|&(_, end)| end));

    let mut lines: Vec<LineRecord> = Vec::with_capacity(line_starts.len());
    for (i, &start) in line_starts.iter().enumerate() {
        let content_end = newline_spans.get(i).map(|&(s, _)| s).unwrap_or(src_len);
        let size = content_end.saturating_sub(start);
        lines.push(LineRecord::new(start, size));
    }

    for token in &tokens {
        if token.kind == TokenKind::Newline {
            continue;
        }
        place_token(&mut lines, token);
    }

    for line in &mut lines {
        line.tokens.sort_by_key(|t| (t.start, t.end));
        coalesce_whitespace(&mut line.tokens);
    }

    lines
}

fn find_line_index(lines: &[LineRecord], offset: usize) -> usize {
    match lines.binary_search_by_key(&offset, |l| l.offset) {
        Ok(i) => i,
        Err(0) => 0,
        Err(i) => i - 1,
    }
    .min(lines.len().saturating_sub(1))
}

fn place_token(lines: &mut [LineRecord], token: &Token) {
    let mut remaining_start = token.start;
    let mut li = find_line_index(lines, remaining_start);

    loop {
        let line_offset = lines[li].offset;
        let line_end_abs = line_offset + lines[li].size;
        let frag_end = token.end.min(line_end_abs).max(remaining_start);

        lines[li].tokens.push(Token::new(
            remaining_start - line_offset,
            frag_end - line_offset,
            token.kind,
        ));

        if token.end <= line_end_abs {
            break;
        }
        li += 1;
        if li >= lines.len() {
            break;
        }
        remaining_start = lines[li].offset;
    }
}

fn coalesce_whitespace(tokens: &mut Vec<Token>) {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for &tok in tokens.iter() {
        if let Some(last) = merged.last_mut() {
            if last.kind == TokenKind::Whitespace
                && tok.kind == TokenKind::Whitespace
                && last.end == tok.start
            {
                last.end = tok.end;
                continue;
            }
        }
        merged.push(tok);
    }
    *tokens = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_no_newline_tokens() {
        let tokens = vec![Token::new(0, 3, TokenKind::Identifier)];
        let lines = assemble_lines(3, tokens);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].offset, 0);
        assert_eq!(lines[0].size, 3);
        assert_eq!(lines[0].tokens, vec![Token::new(0, 3, TokenKind::Identifier)]);
    }

    #[test]
    fn newline_token_splits_file_into_two_lines() {
        // "ab\ncd" : tokens ab(0,2), newline(2,3), cd(3,5)
        let tokens = vec![
            Token::new(0, 2, TokenKind::Identifier),
            Token::new(2, 3, TokenKind::Newline),
            Token::new(3, 5, TokenKind::Identifier),
        ];
        let lines = assemble_lines(5, tokens);
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].offset, lines[0].size), (0, 2));
        assert_eq!((lines[1].offset, lines[1].size), (3, 2));
        assert_eq!(lines[0].tokens, vec![Token::new(0, 2, TokenKind::Identifier)]);
        assert_eq!(lines[1].tokens, vec![Token::new(0, 2, TokenKind::Identifier)]);
    }

    #[test]
    fn token_spanning_a_line_boundary_is_split_same_kind() {
        // block comment "/*\n*/" spans both lines: /* at 0..2, newline 2..3, */ at 3..5
        // but the BlockComment token itself spans 0..5 (crosses the newline).
        let tokens = vec![
            Token::new(0, 5, TokenKind::BlockComment),
            Token::new(2, 3, TokenKind::Newline),
        ];
        let lines = assemble_lines(5, tokens);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].tokens, vec![Token::new(0, 2, TokenKind::BlockComment)]);
        assert_eq!(lines[1].tokens, vec![Token::new(0, 2, TokenKind::BlockComment)]);
    }

    #[test]
    fn adjacent_whitespace_tokens_coalesce() {
        let tokens = vec![
            Token::new(0, 1, TokenKind::Whitespace),
            Token::new(1, 3, TokenKind::Whitespace),
            Token::new(3, 4, TokenKind::Identifier),
        ];
        let lines = assemble_lines(4, tokens);
        assert_eq!(
            lines[0].tokens,
            vec![
                Token::new(0, 3, TokenKind::Whitespace),
                Token::new(3, 4, TokenKind::Identifier),
            ]
        );
    }

    #[test]
    fn every_token_offset_is_within_its_line_size() {
        let tokens = vec![
            Token::new(0, 5, TokenKind::ModuleDecl),
            Token::new(5, 6, TokenKind::Newline),
        ];
        let lines = assemble_lines(6, tokens);
        for line in &lines {
            for tok in &line.tokens {
                assert!(tok.start <= tok.end);
                assert!(tok.end <= line.size);
            }
        }
    }
}
