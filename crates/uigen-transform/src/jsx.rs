//! JSX lowering to the automatic React runtime.
//!
//! `<Button kind="primary">Go</Button>` becomes
//! `_jsx(Button, { kind: "primary", children: "Go" })`. Elements with more
//! than one child use `_jsxs` with a children array, fragments use
//! `_Fragment`, and a `key` attribute moves to the third argument.
//!
//! The lowering walks the whole file once. Outside JSX it copies code
//! verbatim while tracking just enough state (comments, strings, template
//! literals, regular expressions, and whether an expression may start) to
//! tell a JSX `<` from a less-than operator.

use crate::scanner::{Cursor, is_ident_byte, is_ident_start, is_identifier};
use uigen_core::SyntaxError;

/// Import injected into files that contain JSX.
pub const RUNTIME_IMPORT: &str =
    "import { jsx as _jsx, jsxs as _jsxs, Fragment as _Fragment } from \"react/jsx-runtime\";";

/// Specifier of the automatic runtime module.
pub const RUNTIME_MODULE: &str = "react/jsx-runtime";

/// Keywords after which an expression, and therefore JSX or a regular
/// expression, may start.
pub(crate) const EXPRESSION_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
    "default",
];

#[derive(Debug)]
pub(crate) struct Lowered {
    pub(crate) code: String,
    pub(crate) uses_jsx: bool,
}

/// Lowers every JSX expression in `source`.
pub(crate) fn lower(source: &str, path: &str) -> Result<Lowered, SyntaxError> {
    let mut lowering = Lowering {
        cursor: Cursor::new(source, path),
        uses_jsx: false,
    };
    let code = lowering.code(Stop::Eof)?;
    Ok(Lowered {
        code,
        uses_jsx: lowering.uses_jsx,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Eof,
    Brace,
}

/// The last significant token seen in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Punct,
    Keyword,
    Value,
}

impl Prev {
    const fn expects_expression(self) -> bool {
        !matches!(self, Self::Value)
    }
}

#[derive(Debug)]
enum Prop {
    Named(String, String),
    Spread(String),
}

impl Prop {
    fn render(self) -> String {
        match self {
            Self::Named(name, value) if is_identifier(&name) => format!("{name}: {value}"),
            Self::Named(name, value) => format!("{}: {value}", js_string(&name)),
            Self::Spread(expr) => format!("...{expr}"),
        }
    }
}

#[derive(Debug)]
struct Lowering<'a> {
    cursor: Cursor<'a>,
    uses_jsx: bool,
}

impl Lowering<'_> {
    /// Copies code until end of input, or until the `}` that closes the
    /// enclosing brace when `stop` is [`Stop::Brace`]. That `}` is left for
    /// the caller.
    fn code(&mut self, stop: Stop) -> Result<String, SyntaxError> {
        let opened_at = self.cursor.pos().saturating_sub(1);
        let mut out = String::new();
        let mut prev = Prev::Start;
        let mut depth = 0usize;

        loop {
            let Some(byte) = self.cursor.peek() else {
                return match stop {
                    Stop::Eof => Ok(out),
                    Stop::Brace => Err(self
                        .cursor
                        .error_at(opened_at, "Unexpected end of input: unclosed '{'")),
                };
            };

            match byte {
                b'/' if self.cursor.peek_at(1) == Some(b'/') => {
                    out.push_str(self.cursor.take_line_comment());
                }
                b'/' if self.cursor.peek_at(1) == Some(b'*') => {
                    out.push_str(self.cursor.take_block_comment()?);
                }
                b'/' if prev.expects_expression() => {
                    out.push_str(self.cursor.take_regex()?);
                    prev = Prev::Value;
                }
                b'\'' | b'"' => {
                    out.push_str(self.cursor.take_string()?);
                    prev = Prev::Value;
                }
                b'`' => {
                    self.template(&mut out)?;
                    prev = Prev::Value;
                }
                b'<' if prev.expects_expression() && self.at_jsx_start() => {
                    out.push_str(&self.element()?);
                    prev = Prev::Value;
                }
                b'{' => {
                    self.cursor.bump();
                    out.push('{');
                    depth += 1;
                    prev = Prev::Punct;
                }
                b'}' => {
                    if depth == 0 {
                        if stop == Stop::Brace {
                            return Ok(out);
                        }
                        return Err(self.cursor.error_here("Unexpected token '}'"));
                    }
                    depth -= 1;
                    self.cursor.bump();
                    out.push('}');
                    prev = Prev::Value;
                }
                b if is_ident_byte(b) => {
                    let word = self.cursor.take_word();
                    out.push_str(word);
                    prev = if EXPRESSION_KEYWORDS.contains(&word) {
                        Prev::Keyword
                    } else {
                        Prev::Value
                    };
                }
                b if b.is_ascii_whitespace() => {
                    self.cursor.bump();
                    out.push(char::from(b));
                }
                b => {
                    self.cursor.bump();
                    out.push(char::from(b));
                    prev = if matches!(b, b')' | b']') {
                        Prev::Value
                    } else {
                        Prev::Punct
                    };
                }
            }
        }
    }

    fn at_jsx_start(&self) -> bool {
        self.cursor
            .peek_at(1)
            .is_some_and(|b| is_ident_start(b) || b == b'>')
    }

    /// Copies a template literal, lowering JSX inside `${}` substitutions.
    fn template(&mut self, out: &mut String) -> Result<(), SyntaxError> {
        let start = self.cursor.pos();
        self.cursor.bump();
        let mut chunk = start;

        loop {
            match self.cursor.peek() {
                None => return Err(self.cursor.error_at(start, "Unterminated template literal")),
                Some(b'\\') => self.cursor.advance(2),
                Some(b'`') => {
                    self.cursor.bump();
                    out.push_str(self.cursor.slice(chunk, self.cursor.pos()));
                    return Ok(());
                }
                Some(b'$') if self.cursor.peek_at(1) == Some(b'{') => {
                    self.cursor.advance(2);
                    out.push_str(self.cursor.slice(chunk, self.cursor.pos()));
                    let inner = self.code(Stop::Brace)?;
                    out.push_str(&inner);
                    self.cursor.bump();
                    out.push('}');
                    chunk = self.cursor.pos();
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
    }

    /// Skips whitespace and comments inside a tag or container.
    fn skip_trivia(&mut self) -> Result<(), SyntaxError> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with("//") {
                self.cursor.take_line_comment();
            } else if self.cursor.starts_with("/*") {
                self.cursor.take_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    /// Parses one element or fragment starting at `<` and returns the
    /// runtime call expression.
    fn element(&mut self) -> Result<String, SyntaxError> {
        let open = self.cursor.pos();
        self.cursor.bump();
        self.uses_jsx = true;

        if self.cursor.eat(b'>') {
            let children = self.children(open, "")?;
            return Ok(build_call("_Fragment", Vec::new(), None, children));
        }

        let name = self.cursor.take_jsx_name();
        if name.is_empty() {
            return Err(self.cursor.error_at(open, "Expected a JSX element name after '<'"));
        }
        let element_type = element_type(name);
        let mut props = Vec::new();
        let mut key = None;

        loop {
            self.skip_trivia()?;
            match self.cursor.peek() {
                None => return Err(self.cursor.error_at(open, "Unterminated JSX tag")),
                Some(b'/') => {
                    self.cursor.bump();
                    if !self.cursor.eat(b'>') {
                        return Err(self.cursor.error_here("Expected '>' after '/' in JSX tag"));
                    }
                    return Ok(build_call(&element_type, props, key, Vec::new()));
                }
                Some(b'>') => {
                    self.cursor.bump();
                    let children = self.children(open, name)?;
                    return Ok(build_call(&element_type, props, key, children));
                }
                Some(b'{') => {
                    let brace = self.cursor.pos();
                    self.cursor.bump();
                    self.skip_trivia()?;
                    if !self.cursor.starts_with("...") {
                        return Err(self
                            .cursor
                            .error_at(brace, "Expected '...' in JSX spread attribute"));
                    }
                    self.cursor.advance(3);
                    let expr = self.code(Stop::Brace)?;
                    self.cursor.bump();
                    props.push(Prop::Spread(expr.trim().to_string()));
                }
                Some(b) if is_ident_start(b) => {
                    let attr = self.cursor.take_jsx_name();
                    self.skip_trivia()?;
                    let value = if self.cursor.eat(b'=') {
                        self.skip_trivia()?;
                        self.attribute_value()?
                    } else {
                        "true".to_string()
                    };
                    if attr == "key" {
                        key = Some(value);
                    } else {
                        props.push(Prop::Named(attr.to_string(), value));
                    }
                }
                Some(_) => return Err(self.cursor.error_here("Unexpected token in JSX tag")),
            }
        }
    }

    fn attribute_value(&mut self) -> Result<String, SyntaxError> {
        match self.cursor.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                let start = self.cursor.pos();
                self.cursor.bump();
                while self.cursor.peek().is_some_and(|b| b != quote) {
                    self.cursor.bump();
                }
                if self.cursor.is_eof() {
                    return Err(self.cursor.error_at(start, "Unterminated string constant"));
                }
                let raw = self.cursor.slice(start + 1, self.cursor.pos());
                self.cursor.bump();
                Ok(js_string(&decode_entities(raw)))
            }
            Some(b'{') => {
                let brace = self.cursor.pos();
                self.cursor.bump();
                let expr = self.code(Stop::Brace)?;
                self.cursor.bump();
                let expr = expr.trim();
                if expr.is_empty() {
                    return Err(self.cursor.error_at(
                        brace,
                        "JSX attributes must only be assigned a non-empty expression",
                    ));
                }
                Ok(expr.to_string())
            }
            Some(b'<') => self.element(),
            _ => Err(self.cursor.error_here("Expected a JSX attribute value")),
        }
    }

    /// Parses children up to and including the closing tag for `name`; an
    /// empty `name` means a fragment.
    fn children(&mut self, open: usize, name: &str) -> Result<Vec<String>, SyntaxError> {
        let mut children = Vec::new();

        loop {
            match self.cursor.peek() {
                None => {
                    let message = if name.is_empty() {
                        "Unterminated JSX fragment"
                    } else {
                        "Unterminated JSX contents"
                    };
                    return Err(self.cursor.error_at(open, message));
                }
                Some(b'<') if self.cursor.peek_at(1) == Some(b'/') => {
                    let close = self.cursor.pos();
                    self.cursor.advance(2);
                    self.cursor.skip_whitespace();
                    let closing = self.cursor.take_jsx_name();
                    self.cursor.skip_whitespace();
                    if !self.cursor.eat(b'>') {
                        return Err(self.cursor.error_here("Expected '>' in JSX closing tag"));
                    }
                    if closing != name {
                        let message = if name.is_empty() {
                            "Expected corresponding closing tag for JSX fragment".to_string()
                        } else {
                            format!("Expected corresponding JSX closing tag for <{name}>")
                        };
                        return Err(self.cursor.error_at(close, &message));
                    }
                    return Ok(children);
                }
                Some(b'<') => children.push(self.element()?),
                Some(b'{') => {
                    self.cursor.bump();
                    self.skip_trivia()?;
                    if self.cursor.eat(b'}') {
                        continue;
                    }
                    let expr = self.code(Stop::Brace)?;
                    self.cursor.bump();
                    children.push(expr.trim().to_string());
                }
                Some(b'}') => {
                    return Err(self.cursor.error_here("Unexpected token '}' in JSX text"));
                }
                Some(_) => {
                    let start = self.cursor.pos();
                    while self
                        .cursor
                        .peek()
                        .is_some_and(|b| !matches!(b, b'<' | b'{' | b'}'))
                    {
                        self.cursor.bump();
                    }
                    let raw = self.cursor.slice(start, self.cursor.pos());
                    if let Some(text) = clean_text(raw) {
                        children.push(js_string(&decode_entities(&text)));
                    }
                }
            }
        }
    }
}

fn element_type(name: &str) -> String {
    let intrinsic = !name.contains('.')
        && (name.contains('-')
            || name.contains(':')
            || name.bytes().next().is_some_and(|b| b.is_ascii_lowercase()));
    if intrinsic {
        js_string(name)
    } else {
        name.to_string()
    }
}

fn build_call(
    element_type: &str,
    props: Vec<Prop>,
    key: Option<String>,
    mut children: Vec<String>,
) -> String {
    let callee = if children.len() > 1 { "_jsxs" } else { "_jsx" };
    let mut entries: Vec<String> = props.into_iter().map(Prop::render).collect();

    match children.len() {
        0 => {}
        1 => entries.push(format!("children: {}", children.remove(0))),
        _ => entries.push(format!("children: [{}]", children.join(", "))),
    }

    let props = if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join(", "))
    };

    match key {
        Some(key) => format!("{callee}({element_type}, {props}, {key})"),
        None => format!("{callee}({element_type}, {props})"),
    }
}

/// Encodes `text` as a double-quoted JavaScript string literal.
pub(crate) fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// Applies the JSX text whitespace rules: each line is trimmed where it
/// meets a line break, blank lines are dropped, and the remaining lines are
/// joined with single spaces.
fn clean_text(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let last_non_empty = lines
        .iter()
        .rposition(|line| line.chars().any(|c| !matches!(c, ' ' | '\t' | '\r')))?;

    let mut out = String::new();
    for (index, line) in lines.iter().enumerate() {
        let line = line.replace('\t', " ");
        let mut trimmed = line.as_str();
        if index != 0 {
            trimmed = trimmed.trim_start_matches([' ', '\r']);
        }
        if index != lines.len() - 1 {
            trimmed = trimmed.trim_end_matches([' ', '\r']);
        }
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            if index != last_non_empty {
                out.push(' ');
            }
        }
    }

    if out.is_empty() { None } else { Some(out) }
}

/// Decodes the HTML character references JSX text and attribute strings
/// may contain.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code);
    }

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "middot" => '·',
        "bull" => '•',
        "times" => '×',
        "larr" => '←',
        "rarr" => '→',
        "uarr" => '↑',
        "darr" => '↓',
        "lbrace" => '{',
        "rbrace" => '}',
        "laquo" => '«',
        "raquo" => '»',
        "euro" => '€',
        "deg" => '°',
        _ => return None,
    };
    Some(c)
}
