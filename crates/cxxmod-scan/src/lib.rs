//! Module scanner: consumes the line records produced by `cxxmod-lex` and
//! extracts a single translation unit's module declaration/import set.
//! Grounded on the `decl_info`/`callback` bracket-stack scanner in
//! `original_source/src/cxx/scanner.cc`.

use cxxmod_lex::splice::collapse_splices;
use cxxmod_lex::{tokenize_preprocessing_file, LineRecord, Token, TokenKind};
use cxxmod_model::{ModuleName, ModuleUnit};

/// Scans preprocessed C++ source text and returns the resulting module unit.
pub fn scan(src: &[u8]) -> ModuleUnit {
    let lines = tokenize_preprocessing_file(src);
    let logical_lines = group_logical_lines(&lines);

    let mut unit = ModuleUnit::default();
    let mut close_stack: Vec<u8> = Vec::new();

    for tokens in &logical_lines {
        if !close_stack.is_empty() {
            update_brackets(src, tokens, &mut close_stack);
            continue;
        }

        match first_significant(tokens) {
            Some(tok)
                if matches!(
                    tok.kind,
                    TokenKind::ModuleExport | TokenKind::ModuleImport | TokenKind::ModuleDecl
                ) =>
            {
                apply_module_line(src, tokens, &mut unit);
            }
            _ => update_brackets(src, tokens, &mut close_stack),
        }
    }

    normalize_partitions(&mut unit);
    unit
}

/// Re-joins consecutive `LineRecord`s whenever a deleted splice made the
/// scanner break a physical line in the middle of a construct, so a single
/// declaration is processed as one unit even when a splice falls inside
/// its keyword or name. Tokens come back in absolute source offsets.
fn group_logical_lines(lines: &[LineRecord]) -> Vec<Vec<Token>> {
    let mut groups = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for line in lines {
        for tok in &line.tokens {
            current.push(Token::new(line.offset + tok.start, line.offset + tok.end, tok.kind));
        }
        let continues = line
            .tokens
            .last()
            .map(|t| t.kind == TokenKind::DeletedNewline && t.end == line.size)
            .unwrap_or(false);
        if !continues {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn first_significant(tokens: &[Token]) -> Option<&Token> {
    tokens.iter().find(|t| {
        !matches!(
            t.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DeletedNewline
        )
    })
}

fn update_brackets(src: &[u8], tokens: &[Token], stack: &mut Vec<u8>) {
    for tok in tokens {
        if tok.kind != TokenKind::Punctuator {
            continue;
        }
        let text = collapse_splices(src, tok.start, tok.end);
        match text.as_str() {
            "(" => stack.push(b')'),
            "{" => stack.push(b'}'),
            ")" => pop_bracket(stack, b')'),
            "}" => pop_bracket(stack, b'}'),
            _ => {}
        }
    }
}

/// Pops the matching close off the top of the stack; if the top doesn't
/// match, scans leftward for the first matching close and truncates to
/// that position, tolerating malformed nesting without aborting.
fn pop_bracket(stack: &mut Vec<u8>, close: u8) {
    if stack.is_empty() {
        return;
    }
    if *stack.last().unwrap() == close {
        stack.pop();
    } else if let Some(idx) = stack.iter().rposition(|&c| c == close) {
        stack.truncate(idx);
    }
}

#[derive(Default)]
struct DeclInfo {
    module_export: bool,
    module_decl: bool,
    module_import: bool,
    legacy_header: bool,
    name_start: usize,
    name_end: usize,
}

impl DeclInfo {
    fn is_decl(&mut self, tok: &Token) -> bool {
        match tok.kind {
            TokenKind::ModuleExport => {
                self.module_export = true;
                true
            }
            TokenKind::ModuleDecl => {
                self.module_decl = true;
                true
            }
            TokenKind::ModuleImport => {
                self.module_import = true;
                true
            }
            TokenKind::ModuleName => {
                self.name_start = tok.start;
                self.name_end = tok.end;
                true
            }
            TokenKind::SystemHeaderName | TokenKind::LocalHeaderName => {
                self.legacy_header = true;
                self.name_start = tok.start;
                self.name_end = tok.end;
                false
            }
            _ => false,
        }
    }

    fn within(&self, tok: &Token) -> bool {
        tok.start >= self.name_start && tok.start < self.name_end
    }
}

/// Filters a module-declaration line down to the tokens that make up its
/// name, then walks them to build the `module`/`part` strings.
fn extract(src: &[u8], tokens: &[Token]) -> Option<(DeclInfo, ModuleName)> {
    let mut info = DeclInfo::default();
    let mut filtered: Vec<Token> = tokens.iter().copied().filter(|t| !info.is_decl(t)).collect();
    filtered.retain(|t| info.within(t));
    filtered.sort_by_key(|t| t.start);

    if filtered.is_empty() {
        return None;
    }

    let mut module_name = String::new();
    let mut part_name = String::new();
    let mut in_part = false;

    for tok in &filtered {
        match tok.kind {
            TokenKind::Identifier | TokenKind::SystemHeaderName | TokenKind::LocalHeaderName => {
                let text = collapse_splices(src, tok.start, tok.end);
                if in_part {
                    part_name.push_str(&text);
                } else {
                    module_name.push_str(&text);
                }
            }
            TokenKind::Punctuator => {
                if tok.len() > 1 {
                    return None;
                }
                match src[tok.start] {
                    b':' => {
                        if in_part {
                            log::debug!("dropping module declaration with a second partition colon");
                            return None;
                        }
                        in_part = true;
                    }
                    b'.' => {
                        if in_part {
                            part_name.push('.');
                        } else {
                            module_name.push('.');
                        }
                    }
                    _ => {}
                }
            }
            _ => return None,
        }
    }

    Some((info, ModuleName::new(module_name, part_name)))
}

fn apply_module_line(src: &[u8], tokens: &[Token], unit: &mut ModuleUnit) {
    let Some((info, name)) = extract(src, tokens) else {
        return;
    };

    if info.module_decl {
        unit.is_interface = info.module_export;
        if !info.module_export {
            unit.imports.push(name.clone());
        }
        unit.name = name;
        return;
    }

    if info.module_import {
        if info.legacy_header {
            if !name.module.is_empty() && name.part.is_empty() {
                unit.imports.push(ModuleName::new(name.module, ""));
            }
            return;
        }
        unit.imports.push(name);
    }
}

/// Resolves partition-only imports against the unit's own module name,
/// dropping any that can't be scoped to it.
fn normalize_partitions(unit: &mut ModuleUnit) {
    let own_module = unit.name.module.clone();
    unit.imports.retain_mut(|imp| {
        if imp.part.is_empty() {
            return true;
        }
        if imp.module.is_empty() {
            if own_module.is_empty() {
                return false;
            }
            imp.module = own_module.clone();
            return true;
        }
        imp.module == own_module
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_simple_interface() {
        let unit = scan(b"export module m; int f();\n");
        assert_eq!(unit.name, ModuleName::plain("m"));
        assert!(unit.is_interface);
        assert!(unit.imports.is_empty());
    }

    #[test]
    fn s2_implementation_self_imports_its_interface() {
        let unit = scan(b"module m;\nint f(){return 0;}\n");
        assert_eq!(unit.name, ModuleName::plain("m"));
        assert!(!unit.is_interface);
        assert_eq!(unit.imports, vec![ModuleName::plain("m")]);
    }

    #[test]
    fn s3_qualified_partition_interface() {
        let unit = scan(b"export module a.b:part;\n");
        assert_eq!(unit.name, ModuleName::new("a.b", "part"));
        assert!(unit.is_interface);
    }

    #[test]
    fn s3_partition_import_is_scoped_to_enclosing_module() {
        let unit = scan(b"module a.b;\nimport :part;\n");
        assert_eq!(unit.name, ModuleName::new("a.b", ""));
        assert!(!unit.is_interface);
        assert_eq!(
            unit.imports,
            vec![ModuleName::new("a.b", ""), ModuleName::new("a.b", "part")]
        );
    }

    #[test]
    fn s4_legacy_header_import() {
        let unit = scan(b"import <vector>;\n");
        assert_eq!(unit.name, ModuleName::global());
        assert!(!unit.is_interface);
        assert_eq!(unit.imports, vec![ModuleName::new("<vector>", "")]);
    }

    #[test]
    fn s5_deleted_splice_inside_keyword_matches_s1() {
        let spliced = scan(b"export mod\\\nule m;\n");
        let plain = scan(b"export module m;\n");
        assert_eq!(spliced, plain);
    }

    #[test]
    fn s6_scan_level_two_units_share_a_module_name() {
        let exporter = scan(b"export module m;\n");
        let importer = scan(b"module other;\nimport m;\n");
        assert!(exporter.is_interface);
        assert_eq!(exporter.name, ModuleName::plain("m"));
        assert!(importer.imports.contains(&ModuleName::plain("m")));
    }

    #[test]
    fn invariant_5_module_name_idempotence_across_declaration_only_rescans() {
        let full = scan(b"export module m;\nint f(){ return 0; }\n");
        let decl_only = scan(b"export module m;\n");
        assert_eq!(full, decl_only);
    }

    #[test]
    fn invariant_6_partition_scoping_holds() {
        let unit = scan(b"module a.b;\nimport :part;\n");
        for imp in &unit.imports {
            if !imp.part.is_empty() {
                assert_eq!(imp.module, unit.name.module);
                assert!(!unit.name.module.is_empty());
            }
        }
    }

    #[test]
    fn bare_global_module_fragment_leaves_the_unit_untouched() {
        let unit = scan(b"module;\n#include <cstdio>\nexport module m;\n");
        assert_eq!(unit.name, ModuleName::plain("m"));
        assert!(unit.is_interface);
    }

    #[test]
    fn malformed_bracket_nesting_does_not_abort_the_scan() {
        let unit = scan(b"void f() { if (true) } }\nexport module m;\n");
        assert_eq!(unit.name, ModuleName::plain("m"));
        assert!(unit.is_interface);
    }
}
