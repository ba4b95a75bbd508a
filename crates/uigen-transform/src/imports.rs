//! Import rewriting and stylesheet extraction.
//!
//! Runs over already-lowered code. A token-aware scan finds the `import`
//! and `export` keywords that sit in code, never inside strings, template
//! text, comments or regular expressions. Static imports and
//! `export .. from` are matched only at statement positions; `import("..")`
//! anywhere in code. Every specifier found is classified:
//!
//! - the alias prefix (`@/` by default) resolves against the tree root
//! - `./` and `../` resolve against the importing file's directory
//! - `/`-rooted specifiers are normalized
//! - `http:`, `https:`, `data:` and `blob:` URLs pass through
//! - anything else is a bare package specifier, left for preview assembly
//!
//! Local specifiers are rewritten to their absolute form. Stylesheet
//! imports never reach the output: side-effect imports are dropped and
//! bindings become a proxy that maps class names to themselves.

use crate::jsx::EXPRESSION_KEYWORDS;
use crate::scanner::{Cursor, is_ident_byte};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uigen_files::FilePath;

static STATIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\Aimport\b\s*(?:([\w$*{}\s,]+?)\s*from\s*)?(['"])([^'"\n]+)['"][ \t]*;?"#)
        .expect("valid regex")
});
static EXPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\Aexport\s*(?:\*(?:\s*as\s+[\w$]+)?|\{[^}]*\})\s*from\s*(['"])([^'"\n]+)['"]"#,
    )
    .expect("valid regex")
});
static DYNAMIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\Aimport\s*\(\s*(['"])([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

/// Expression that stands in for an imported stylesheet's bindings.
pub const STYLE_PROXY: &str =
    "new Proxy({}, { get: (_, key) => (typeof key === \"string\" ? key : undefined) })";

/// Where an import specifier points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "specifier", rename_all = "snake_case")]
pub enum ImportTarget {
    /// A module in the tree, as an absolute path before extension lookup
    Local(FilePath),
    /// A third-party package specifier
    Bare(String),
    /// A URL that is loaded as written
    Url(String),
}

impl ImportTarget {
    /// Classifies `specifier` as written in the file at `importer`.
    ///
    /// # Examples
    ///
    /// ```
    /// use uigen_files::FilePath;
    /// use uigen_transform::ImportTarget;
    ///
    /// let importer = FilePath::new("/components/ui/Card.jsx").unwrap();
    /// let target = ImportTarget::classify("../Button", &importer, "@/");
    /// assert_eq!(target, ImportTarget::Local(FilePath::new("/components/Button").unwrap()));
    ///
    /// let target = ImportTarget::classify("@/lib/utils", &importer, "@/");
    /// assert_eq!(target.specifier(), "/lib/utils");
    ///
    /// let target = ImportTarget::classify("@radix-ui/react-slot", &importer, "@/");
    /// assert!(matches!(target, ImportTarget::Bare(_)));
    /// ```
    #[must_use]
    pub fn classify(specifier: &str, importer: &FilePath, alias_prefix: &str) -> Self {
        const URL_SCHEMES: [&str; 4] = ["http://", "https://", "data:", "blob:"];

        if URL_SCHEMES.iter().any(|scheme| specifier.starts_with(scheme)) {
            return Self::Url(specifier.to_string());
        }

        let local = if let Some(rest) = specifier.strip_prefix(alias_prefix) {
            Some(FilePath::root().join(rest))
        } else if specifier.starts_with('/') {
            Some(FilePath::new(specifier))
        } else if is_relative(specifier) {
            let dir = importer.parent().unwrap_or_else(FilePath::root);
            Some(dir.join(specifier))
        } else {
            None
        };

        match local {
            Some(Ok(path)) => Self::Local(path),
            _ => Self::Bare(specifier.to_string()),
        }
    }

    /// Returns the specifier written into the rewritten code.
    #[must_use]
    pub fn specifier(&self) -> &str {
        match self {
            Self::Local(path) => path.as_str(),
            Self::Bare(specifier) | Self::Url(specifier) => specifier,
        }
    }

    /// Returns `true` for tree-local targets.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Returns `true` if `specifier` names a stylesheet.
#[must_use]
pub fn is_stylesheet(specifier: &str) -> bool {
    let end = specifier.find(['?', '#']).unwrap_or(specifier.len());
    specifier[..end].ends_with(".css")
}

/// One import found in a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleImport {
    /// The specifier as written in the source
    pub specifier: String,
    /// Where it resolves
    pub target: ImportTarget,
    /// `true` for `import("..")` expressions
    pub dynamic: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Rewritten {
    pub(crate) code: String,
    pub(crate) imports: Vec<ModuleImport>,
    pub(crate) stylesheets: Vec<FilePath>,
    pub(crate) external_stylesheets: Vec<String>,
}

/// Rewrites the imports of the module at `path`.
pub(crate) fn rewrite(code: &str, path: &FilePath, alias_prefix: &str) -> Rewritten {
    let mut out = Rewritten::default();
    let mut rewritten = String::with_capacity(code.len());
    let mut copied = 0;

    for site in keyword_sites(code) {
        if site.offset < copied {
            continue;
        }
        let rest = &code[site.offset..];
        let replaced = match site.keyword {
            Keyword::Import if site.statement => STATIC_IMPORT
                .captures(rest)
                .map(|caps| (caps, Form::Static))
                .or_else(|| DYNAMIC_IMPORT.captures(rest).map(|caps| (caps, Form::Dynamic))),
            Keyword::Import => DYNAMIC_IMPORT.captures(rest).map(|caps| (caps, Form::Dynamic)),
            Keyword::Export if site.statement => {
                EXPORT_FROM.captures(rest).map(|caps| (caps, Form::ExportFrom))
            }
            Keyword::Export => None,
        };
        let Some((caps, form)) = replaced else {
            continue;
        };

        let text = match form {
            Form::Static => rewrite_static(&caps, path, alias_prefix, &mut out),
            Form::ExportFrom | Form::Dynamic => {
                let dynamic = matches!(form, Form::Dynamic);
                rewrite_specifier(&caps, 2, path, alias_prefix, dynamic, &mut out.imports)
            }
        };
        let consumed = caps.get(0).map_or(0, |m| m.end());

        rewritten.push_str(&code[copied..site.offset]);
        rewritten.push_str(&text);
        copied = site.offset + consumed;
    }

    rewritten.push_str(&code[copied..]);
    out.code = rewritten;
    out
}

#[derive(Debug, Clone, Copy)]
enum Form {
    Static,
    ExportFrom,
    Dynamic,
}

fn rewrite_static(
    caps: &Captures<'_>,
    path: &FilePath,
    alias_prefix: &str,
    out: &mut Rewritten,
) -> String {
    let specifier = caps.get(3).map_or("", |m| m.as_str());
    if !is_stylesheet(specifier) {
        return rewrite_specifier(caps, 3, path, alias_prefix, false, &mut out.imports);
    }

    match ImportTarget::classify(specifier, path, alias_prefix) {
        ImportTarget::Local(sheet) => {
            if !out.stylesheets.contains(&sheet) {
                out.stylesheets.push(sheet);
            }
        }
        ImportTarget::Bare(sheet) | ImportTarget::Url(sheet) => {
            if !out.external_stylesheets.contains(&sheet) {
                out.external_stylesheets.push(sheet);
            }
        }
    }

    caps.get(1)
        .map(|clause| style_bindings(clause.as_str()))
        .unwrap_or_default()
}

/// Turns an import clause into declarations bound to [`STYLE_PROXY`].
fn style_bindings(clause: &str) -> String {
    let clause = clause.trim();
    let mut declarations = Vec::new();

    let (default, rest) = match clause.find(['{', '*']) {
        Some(pos) => (clause[..pos].trim().trim_end_matches(','), &clause[pos..]),
        None => (clause, ""),
    };

    if !default.trim().is_empty() {
        declarations.push(format!("{} = {STYLE_PROXY}", default.trim()));
    }

    let rest = rest.trim();
    if let Some(namespace) = rest.strip_prefix('*') {
        let namespace = namespace.trim();
        let name = namespace.strip_prefix("as").unwrap_or(namespace).trim();
        declarations.push(format!("{name} = {STYLE_PROXY}"));
    } else if rest.starts_with('{') {
        let names = rest
            .trim_matches(['{', '}'])
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.replacen(" as ", ": ", 1))
            .collect::<Vec<_>>()
            .join(", ");
        declarations.push(format!("{{ {names} }} = {STYLE_PROXY}"));
    }

    if declarations.is_empty() {
        String::new()
    } else {
        format!("const {};", declarations.join(", "))
    }
}

fn rewrite_specifier(
    caps: &Captures<'_>,
    group: usize,
    path: &FilePath,
    alias_prefix: &str,
    dynamic: bool,
    imports: &mut Vec<ModuleImport>,
) -> String {
    let (Some(whole), Some(spec)) = (caps.get(0), caps.get(group)) else {
        return caps.get(0).map_or_else(String::new, |m| m.as_str().to_string());
    };

    let target = ImportTarget::classify(spec.as_str(), path, alias_prefix);
    let text = whole.as_str();
    let start = spec.start() - whole.start();
    let end = spec.end() - whole.start();
    let rewritten = format!("{}{}{}", &text[..start], target.specifier(), &text[end..]);

    imports.push(ModuleImport {
        specifier: spec.as_str().to_string(),
        target,
        dynamic,
    });
    rewritten
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Import,
    Export,
}

/// An `import` or `export` keyword found in code.
#[derive(Debug, Clone, Copy)]
struct Site {
    offset: usize,
    keyword: Keyword,
    /// `true` when the keyword starts a statement
    statement: bool,
}

/// The last significant token seen in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Semicolon,
    Brace,
    Dot,
    Punct,
    Keyword,
    Value,
}

impl Prev {
    const fn expects_expression(self) -> bool {
        !matches!(self, Self::Value)
    }
}

/// Lists the `import` and `export` keywords of `code` that are not part of
/// a string, template text, comment or regular expression.
fn keyword_sites(code: &str) -> Vec<Site> {
    let mut scanner = SiteScanner {
        cursor: Cursor::new(code, ""),
        sites: Vec::new(),
    };
    scanner.code(false);
    scanner.sites
}

#[derive(Debug)]
struct SiteScanner<'a> {
    cursor: Cursor<'a>,
    sites: Vec<Site>,
}

impl SiteScanner<'_> {
    /// Scans code until end of input, or until the `}` closing a template
    /// substitution when `nested`. That `}` is left for the caller.
    fn code(&mut self, nested: bool) {
        let mut prev = Prev::Start;
        let mut newline = false;
        let mut depth = 0usize;

        while let Some(byte) = self.cursor.peek() {
            match byte {
                b'/' if self.cursor.peek_at(1) == Some(b'/') => {
                    self.cursor.take_line_comment();
                    continue;
                }
                b'/' if self.cursor.peek_at(1) == Some(b'*') => {
                    if self.cursor.take_block_comment().is_err() {
                        return;
                    }
                    continue;
                }
                b'/' if prev.expects_expression() => {
                    if self.cursor.take_regex().is_err() {
                        return;
                    }
                    prev = Prev::Value;
                }
                b'\'' | b'"' => {
                    if self.cursor.take_string().is_err() {
                        return;
                    }
                    prev = Prev::Value;
                }
                b'`' => {
                    self.template();
                    prev = Prev::Value;
                }
                b'{' => {
                    self.cursor.bump();
                    depth += 1;
                    prev = Prev::Brace;
                }
                b'}' => {
                    if depth == 0 && nested {
                        return;
                    }
                    depth = depth.saturating_sub(1);
                    self.cursor.bump();
                    prev = Prev::Brace;
                }
                b'\n' => {
                    self.cursor.bump();
                    newline = true;
                    continue;
                }
                b if b.is_ascii_whitespace() => {
                    self.cursor.bump();
                    continue;
                }
                b if is_ident_byte(b) => {
                    let offset = self.cursor.pos();
                    let word = self.cursor.take_word();
                    let keyword = match word {
                        "import" => Some(Keyword::Import),
                        "export" => Some(Keyword::Export),
                        _ => None,
                    };
                    if let Some(keyword) = keyword
                        && prev != Prev::Dot
                    {
                        let statement = matches!(prev, Prev::Start | Prev::Semicolon | Prev::Brace)
                            || (newline && prev == Prev::Value);
                        self.sites.push(Site {
                            offset,
                            keyword,
                            statement,
                        });
                    }
                    prev = if EXPRESSION_KEYWORDS.contains(&word) {
                        Prev::Keyword
                    } else {
                        Prev::Value
                    };
                }
                b => {
                    self.cursor.bump();
                    prev = match b {
                        b';' => Prev::Semicolon,
                        b'.' => Prev::Dot,
                        b')' | b']' => Prev::Value,
                        _ => Prev::Punct,
                    };
                }
            }
            newline = false;
        }
    }

    /// Skips a template literal, scanning its `${}` substitutions as code.
    fn template(&mut self) {
        self.cursor.bump();
        loop {
            match self.cursor.peek() {
                None => return,
                Some(b'\\') => self.cursor.advance(2),
                Some(b'`') => {
                    self.cursor.bump();
                    return;
                }
                Some(b'$') if self.cursor.peek_at(1) == Some(b'{') => {
                    self.cursor.advance(2);
                    self.code(true);
                    self.cursor.bump();
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> FilePath {
        FilePath::new("/App.jsx").unwrap()
    }

    fn run(code: &str) -> Rewritten {
        rewrite(code, &app(), "@/")
    }

    #[test]
    fn test_alias_import_rewritten_to_root() {
        let out = run("import Button from '@/components/Button';");
        assert_eq!(out.code, "import Button from '/components/Button';");
        assert_eq!(
            out.imports[0].target,
            ImportTarget::Local(FilePath::new("/components/Button").unwrap())
        );
    }

    #[test]
    fn test_relative_import_resolved_against_importer() {
        let card = FilePath::new("/components/ui/Card.jsx").unwrap();
        let out = rewrite("import { cn } from \"../../lib/utils\";", &card, "@/");
        assert_eq!(out.code, "import { cn } from \"/lib/utils\";");
    }

    #[test]
    fn test_bare_and_url_imports_untouched() {
        let source = "import React, { useState } from 'react';\nimport x from 'https://cdn.example/x.js';";
        let out = run(source);
        assert_eq!(out.code, source);
        assert_eq!(out.imports[0].target, ImportTarget::Bare("react".to_string()));
        assert!(matches!(out.imports[1].target, ImportTarget::Url(_)));
    }

    #[test]
    fn test_multiline_import_clause() {
        let out = run("import {\n  Card,\n  CardHeader,\n} from './Card';");
        assert_eq!(out.code, "import {\n  Card,\n  CardHeader,\n} from '/Card';");
    }

    #[test]
    fn test_side_effect_stylesheet_removed() {
        let out = run("import './styles.css';\nimport a from './a';");
        assert_eq!(out.code, "\nimport a from '/a';");
        assert_eq!(out.stylesheets, vec![FilePath::new("/styles.css").unwrap()]);
        assert_eq!(out.imports.len(), 1);
    }

    #[test]
    fn test_stylesheet_default_binding_becomes_proxy() {
        let out = run("import styles from './Button.module.css';");
        assert_eq!(out.code, format!("const styles = {STYLE_PROXY};"));
    }

    #[test]
    fn test_stylesheet_named_and_namespace_bindings() {
        assert_eq!(
            style_bindings("{ primary, ghost as g }"),
            format!("const {{ primary, ghost: g }} = {STYLE_PROXY};")
        );
        assert_eq!(
            style_bindings("* as s"),
            format!("const s = {STYLE_PROXY};")
        );
        assert_eq!(
            style_bindings("d, { a }"),
            format!("const d = {STYLE_PROXY}, {{ a }} = {STYLE_PROXY};")
        );
    }

    #[test]
    fn test_bare_stylesheet_is_external() {
        let out = run("import 'react-toastify/dist/ReactToastify.css';");
        assert!(out.code.is_empty());
        assert_eq!(
            out.external_stylesheets,
            vec!["react-toastify/dist/ReactToastify.css".to_string()]
        );
    }

    #[test]
    fn test_export_from_and_dynamic_import() {
        let out = run("export { default } from './Button';\nconst m = import('@/pages/Home');");
        assert_eq!(
            out.code,
            "export { default } from '/Button';\nconst m = import('/pages/Home');"
        );
        assert!(out.imports[1].dynamic);
    }

    #[test]
    fn test_import_text_in_template_literal_untouched() {
        let source = "const snippet = `\nimport './styles.css';\nimport x from './x';\n`;";
        let out = run(source);
        assert_eq!(out.code, source);
        assert!(out.imports.is_empty());
        assert!(out.stylesheets.is_empty());
    }

    #[test]
    fn test_template_substitution_is_scanned_as_code() {
        let out = run("const page = `${await import('./Home')}`;");
        assert_eq!(out.code, "const page = `${await import('/Home')}`;");
        assert!(out.imports[0].dynamic);
    }

    #[test]
    fn test_imports_in_comments_and_strings_untouched() {
        let source = r#"// import a from './a';
/* import './b.css'; */
const s = "import c from './c'";"#;
        let out = run(source);
        assert_eq!(out.code, source);
        assert!(out.imports.is_empty());
        assert!(out.stylesheets.is_empty());
    }

    #[test]
    fn test_several_imports_on_one_line() {
        let out = run("import a from './a'; import './x.css'; import b from '@/b';");
        assert_eq!(out.code, "import a from '/a';  import b from '/b';");
        assert_eq!(out.imports.len(), 2);
        assert_eq!(out.stylesheets, vec![FilePath::new("/x.css").unwrap()]);
    }

    #[test]
    fn test_indented_import_keeps_indentation() {
        let out = run("  import a from './a';");
        assert_eq!(out.code, "  import a from '/a';");
    }

    #[test]
    fn test_member_import_call_untouched() {
        let source = "loader.import('./x');
const y = other.export;";
        let out = run(source);
        assert_eq!(out.code, source);
        assert!(out.imports.is_empty());
    }

    #[test]
    fn test_dynamic_import_after_arrow() {
        let source = "const f = x => import\n('./lazy');";
        let out = run(source);
        assert_eq!(out.code, "const f = x => import\n('/lazy');");
        assert!(out.imports[0].dynamic);
    }

    #[test]
    fn test_scoped_package_is_not_alias() {
        let target = ImportTarget::classify("@/x", &app(), "@/");
        assert!(target.is_local());
        let target = ImportTarget::classify("@scope/pkg", &app(), "@/");
        assert_eq!(target, ImportTarget::Bare("@scope/pkg".to_string()));
    }

    #[test]
    fn test_relative_cannot_escape_root() {
        let target = ImportTarget::classify("../../x", &app(), "@/");
        assert_eq!(target.specifier(), "/x");
    }

    #[test]
    fn test_is_stylesheet_ignores_query() {
        assert!(is_stylesheet("./a.css?inline"));
        assert!(!is_stylesheet("./a.cssx"));
    }
}
