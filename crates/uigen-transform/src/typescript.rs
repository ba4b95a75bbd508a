//! Removal of type-only TypeScript constructs.
//!
//! Only top-level declarations that have no runtime meaning are removed:
//! `import type`, `export type { .. }`, `type X = ..`, `interface X { .. }`
//! and `type` specifiers inside import braces. Inline annotations are left
//! alone.
//!
//! Removed text is replaced by spaces with line breaks kept, so line and
//! column numbers in later diagnostics still point into the original file.

use crate::scanner::Cursor;
use regex::Regex;
use std::sync::LazyLock;

static TYPE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+type\s[^;'"]*?from\s*['"][^'"\n]*['"][ \t]*;?"#)
        .expect("valid regex")
});
static TYPE_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*export\s+type\s*\{[^}]*\}(?:\s*from\s*['"][^'"\n]*['"])?[ \t]*;?"#)
        .expect("valid regex")
});
static TYPE_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?type[ \t]+[A-Za-z_$][\w$]*[ \t]*(?:<[^\n=]*>)?[ \t]*=",
    )
    .expect("valid regex")
});
static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?interface[ \t]+[A-Za-z_$][\w$]*")
        .expect("valid regex")
});
static IMPORT_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*import\s*\{([^}]*)\}").expect("valid regex"));
static TYPE_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\btype\s+[A-Za-z_$][\w$]*(?:\s+as\s+[A-Za-z_$][\w$]*)?\s*,?")
        .expect("valid regex")
});

/// Returns `true` for paths whose source may contain TypeScript syntax.
#[must_use]
pub fn is_typescript(path: &str) -> bool {
    path.ends_with(".ts") || path.ends_with(".tsx") || path.ends_with(".mts")
}

/// Blanks out type-only declarations in `source`.
///
/// # Examples
///
/// ```
/// use uigen_transform::strip_types;
///
/// let out = strip_types("type Props = { label: string };\nexport const a = 1;");
/// assert_eq!(out.trim(), "export const a = 1;");
/// assert_eq!(out.lines().count(), 2);
/// ```
#[must_use]
pub fn strip_types(source: &str) -> String {
    let mut ranges: Vec<(usize, usize)> = Vec::new();

    ranges.extend(TYPE_IMPORT.find_iter(source).map(|m| (m.start(), m.end())));
    ranges.extend(TYPE_EXPORT.find_iter(source).map(|m| (m.start(), m.end())));
    ranges.extend(
        TYPE_ALIAS
            .find_iter(source)
            .map(|m| (m.start(), alias_end(source, m.end()))),
    );
    ranges.extend(
        INTERFACE
            .find_iter(source)
            .filter_map(|m| interface_end(source, m.end()).map(|end| (m.start(), end))),
    );
    for caps in IMPORT_BRACES.captures_iter(source) {
        if let Some(inner) = caps.get(1) {
            ranges.extend(
                TYPE_SPECIFIER
                    .find_iter(inner.as_str())
                    .map(|m| (inner.start() + m.start(), inner.start() + m.end())),
            );
        }
    }

    if ranges.is_empty() {
        return source.to_string();
    }
    blank(source, ranges)
}

/// Finds the end of a type alias body starting after its `=`.
fn alias_end(source: &str, body_start: usize) -> usize {
    let mut cursor = Cursor::new(source, "");
    cursor.advance(body_start);
    let mut depth = 0usize;
    let mut last_significant = b'=';

    while let Some(byte) = cursor.peek() {
        match byte {
            b'\'' | b'"' | b'`' => {
                if byte == b'`' {
                    skip_template(&mut cursor);
                } else if cursor.take_string().is_err() {
                    return cursor.pos();
                }
                last_significant = b'"';
                continue;
            }
            b'=' if cursor.peek_at(1) == Some(b'>') => {
                cursor.advance(2);
                last_significant = b'>';
                continue;
            }
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => return cursor.pos() + 1,
            b'\n' if depth == 0 && !matches!(last_significant, b'=' | b'|' | b'&' | b',' | b':') => {
                let rest = source[cursor.pos()..].trim_start();
                if !(rest.starts_with('|') || rest.starts_with('&')) {
                    return cursor.pos();
                }
            }
            _ => {}
        }
        if !byte.is_ascii_whitespace() {
            last_significant = byte;
        }
        cursor.bump();
    }
    cursor.pos()
}

fn skip_template(cursor: &mut Cursor<'_>) {
    cursor.bump();
    while let Some(byte) = cursor.bump() {
        match byte {
            b'\\' => {
                cursor.bump();
            }
            b'`' => return,
            _ => {}
        }
    }
}

/// Finds the end of an interface body: the `}` matching its first `{`.
fn interface_end(source: &str, header_end: usize) -> Option<usize> {
    let open = header_end + source[header_end..].find('{')?;
    let mut cursor = Cursor::new(source, "");
    cursor.advance(open);
    let mut depth = 0usize;

    while let Some(byte) = cursor.peek() {
        match byte {
            b'\'' | b'"' => {
                cursor.take_string().ok()?;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(cursor.pos() + 1);
                }
            }
            _ => {}
        }
        cursor.bump();
    }
    None
}

/// Replaces every char inside `ranges` with a space, keeping line breaks.
fn blank(source: &str, mut ranges: Vec<(usize, usize)>) -> String {
    ranges.sort_unstable();
    let mut out = String::with_capacity(source.len());
    let mut copied = 0usize;

    for (start, end) in ranges {
        let start = start.max(copied);
        if start >= end {
            continue;
        }
        out.push_str(&source[copied..start]);
        out.extend(
            source[start..end]
                .chars()
                .map(|c| if c == '\n' || c == '\r' { c } else { ' ' }),
        );
        copied = end;
    }
    out.push_str(&source[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_type_removed() {
        let out = strip_types("import type { FC } from 'react';\nimport x from 'y';");
        assert_eq!(out.trim_start(), "import x from 'y';");
    }

    #[test]
    fn test_export_type_braces_removed() {
        let out = strip_types("export type { Props } from './types';\nexport const a = 1;");
        assert!(!out.contains("Props"));
        assert!(out.contains("export const a = 1;"));
    }

    #[test]
    fn test_multiline_union_alias() {
        let source = "type Size =\n  | 'sm'\n  | 'lg';\nconst s = 1;";
        let out = strip_types(source);
        assert_eq!(out.lines().count(), 4);
        assert_eq!(out.lines().last(), Some("const s = 1;"));
        assert!(!out.contains("sm"));
    }

    #[test]
    fn test_alias_without_semicolon_ends_at_line() {
        let out = strip_types("type Cb = (v: number) => void\nconst x = 2");
        assert_eq!(out.lines().nth(1), Some("const x = 2"));
        assert!(out.lines().next().unwrap().trim().is_empty());
    }

    #[test]
    fn test_object_alias_spanning_lines() {
        let source = "export type Props = {\n  label: string;\n  onClick?: () => void;\n};\nexport default 1;";
        let out = strip_types(source);
        assert!(!out.contains("label"));
        assert!(out.ends_with("export default 1;"));
    }

    #[test]
    fn test_interface_removed() {
        let source = "interface ButtonProps {\n  label: string;\n  nested: { a: '}' };\n}\nexport function Button() {}";
        let out = strip_types(source);
        assert!(!out.contains("label"));
        assert!(out.contains("export function Button() {}"));
        assert_eq!(out.lines().count(), source.lines().count());
    }

    #[test]
    fn test_type_specifiers_in_import_braces() {
        let out = strip_types("import { useState, type Dispatch } from 'react';");
        assert!(out.contains("useState"));
        assert!(!out.contains("Dispatch"));
    }

    #[test]
    fn test_plain_javascript_untouched() {
        let source = "const type = 1;\nconst interfaceCount = type + 1;";
        assert_eq!(strip_types(source), source);
    }

    #[test]
    fn test_is_typescript() {
        assert!(is_typescript("/App.tsx"));
        assert!(is_typescript("/util.ts"));
        assert!(!is_typescript("/App.jsx"));
    }
}
