//! Line-level YAML value locator.
//!
//! Maps field paths (`a.b[0].c`) to the byte span of their scalar value on
//! the source line, so a value can be replaced without re-serializing the
//! document. Comments, key order and formatting of every other byte stay
//! as they were.
//!
//! Only single-line scalars get a span. Block scalars (`|`, `>`), flow
//! collections, aliases, tagged values and multi-line scalars are left out;
//! callers treat a missing span as "cannot rewrite".

use std::collections::HashMap;

use crate::core::types::FieldPath;
use crate::core::walk::join_path;

/// Location of a scalar value inside a document.
///
/// `start..end` covers the value text, excluding surrounding quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Key,
    Item,
}

#[derive(Debug)]
struct Frame {
    indent: isize,
    path: String,
    kind: FrameKind,
    items: usize,
}

/// Locate every single-line scalar value in `text`.
pub fn locate(text: &str) -> HashMap<FieldPath, Span> {
    let mut locator = Locator::new();
    for (n, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        locator.line(n, line);
    }
    locator.spans
}

/// Apply replacements to `text`. Spans must come from [`locate`] on the same text.
pub fn rewrite(text: &str, replacements: &[(Span, String)]) -> String {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();

    let mut ordered: Vec<&(Span, String)> = replacements.iter().collect();
    ordered.sort_by(|a, b| (b.0.line, b.0.start).cmp(&(a.0.line, a.0.start)));

    for (span, value) in ordered {
        if let Some(line) = lines.get_mut(span.line) {
            line.replace_range(span.start..span.end, value);
        }
    }
    lines.join("\n")
}

struct Locator {
    stack: Vec<Frame>,
    spans: HashMap<FieldPath, Span>,
    /// Skip lines indented deeper than this column (block scalar bodies).
    skip_deeper_than: Option<usize>,
    /// Last plain scalar, dropped if the next line continues it.
    open_scalar: Option<(FieldPath, usize)>,
}

impl Locator {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                indent: -1,
                path: String::new(),
                kind: FrameKind::Root,
                items: 0,
            }],
            spans: HashMap::new(),
            skip_deeper_than: None,
            open_scalar: None,
        }
    }

    fn line(&mut self, n: usize, line: &str) {
        let trimmed = line.trim_start_matches(' ');
        if trimmed.is_empty() {
            return;
        }
        let indent = line.len() - trimmed.len();

        if let Some(limit) = self.skip_deeper_than {
            if indent > limit {
                return;
            }
            self.skip_deeper_than = None;
        }

        if trimmed.starts_with('#') {
            return;
        }
        if indent == 0 && (trimmed.starts_with("---") || trimmed.starts_with("...") || trimmed.starts_with('%')) {
            return;
        }

        if let Some((path, col)) = self.open_scalar.take() {
            if indent > col {
                self.spans.remove(&path);
                self.skip_deeper_than = Some(col);
                return;
            }
        }

        self.node(n, line, indent);
    }

    fn node(&mut self, n: usize, line: &str, col: usize) {
        let rest = &line[col..];
        if rest == "-" || rest.starts_with("- ") {
            self.item(n, line, col);
        } else {
            self.entry(n, line, col);
        }
    }

    fn item(&mut self, n: usize, line: &str, col: usize) {
        let icol = col as isize;
        while self.stack.len() > 1 {
            let top = self.top();
            if top.indent > icol || (top.indent == icol && top.kind == FrameKind::Item) {
                self.stack.pop();
            } else {
                break;
            }
        }

        let parent = self.top_mut();
        let path = format!("{}[{}]", parent.path, parent.items);
        parent.items += 1;
        self.stack.push(Frame {
            indent: icol,
            path,
            kind: FrameKind::Item,
            items: 0,
        });

        let after = &line[col + 1..];
        let inner = after.trim_start_matches(' ');
        if inner.is_empty() || inner.starts_with('#') {
            return;
        }
        self.node(n, line, col + 1 + (after.len() - inner.len()));
    }

    fn entry(&mut self, n: usize, line: &str, col: usize) {
        let icol = col as isize;
        while self.stack.len() > 1 && self.top().indent >= icol {
            self.stack.pop();
        }

        let Some((key, value_col)) = split_key(line, col) else {
            return;
        };
        let path = join_path(&self.top().path, &key);

        let value = &line[value_col..];
        let trimmed = value.trim_start_matches(' ');
        let start = value_col + (value.len() - trimmed.len());

        match trimmed.as_bytes().first() {
            None | Some(b'#') => self.push_key(icol, path),
            Some(b'|') | Some(b'>') => self.skip_deeper_than = Some(col),
            Some(b'"') => match closing_double(trimmed) {
                Some(close) => self.insert(path, n, start + 1, start + close),
                None => self.skip_deeper_than = Some(col),
            },
            Some(b'\'') => match closing_single(trimmed) {
                Some(close) => self.insert(path, n, start + 1, start + close),
                None => self.skip_deeper_than = Some(col),
            },
            Some(b'&') | Some(b'!') => {
                let remainder = trimmed
                    .split_once(' ')
                    .map(|(_, r)| r.trim_start())
                    .unwrap_or("");
                if remainder.is_empty() || remainder.starts_with('#') {
                    self.push_key(icol, path);
                }
            }
            Some(b'{') | Some(b'[') | Some(b'*') => {}
            Some(_) => {
                let end = match trimmed.find(" #") {
                    Some(i) => trimmed[..i].trim_end().len(),
                    None => trimmed.trim_end().len(),
                };
                self.insert(path.clone(), n, start, start + end);
                self.open_scalar = Some((path, col));
            }
        }
    }

    fn push_key(&mut self, indent: isize, path: String) {
        self.stack.push(Frame {
            indent,
            path,
            kind: FrameKind::Key,
            items: 0,
        });
    }

    fn insert(&mut self, path: FieldPath, line: usize, start: usize, end: usize) {
        self.spans.insert(path, Span { line, start, end });
    }

    fn top(&self) -> &Frame {
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }
}

/// Split `key: value` starting at `col`; returns the key and the column after the colon.
fn split_key(line: &str, col: usize) -> Option<(String, usize)> {
    let rest = &line[col..];
    let bytes = rest.as_bytes();

    let (key, colon) = match bytes.first()? {
        b'"' => {
            let close = closing_double(rest)?;
            let inner = &rest[1..close];
            if inner.contains('\\') {
                return None;
            }
            (inner.to_string(), after_quoted_key(rest, close)?)
        }
        b'\'' => {
            let close = closing_single(rest)?;
            (rest[1..close].replace("''", "'"), after_quoted_key(rest, close)?)
        }
        b'{' | b'[' | b'?' | b'#' => return None,
        _ => {
            let mut found = None;
            for (i, &b) in bytes.iter().enumerate() {
                if b == b'#' && i > 0 && bytes[i - 1] == b' ' {
                    return None;
                }
                if b == b':' && matches!(bytes.get(i + 1), None | Some(b' ')) {
                    found = Some(i);
                    break;
                }
            }
            let colon = found?;
            let key = rest[..colon].trim_end();
            if key.is_empty() {
                return None;
            }
            (key.to_string(), colon)
        }
    };

    Some((key, col + colon + 1))
}

/// Index of the colon following a quoted key that closes at `close`.
fn after_quoted_key(rest: &str, close: usize) -> Option<usize> {
    let tail = &rest[close + 1..];
    let spaces = tail.len() - tail.trim_start_matches(' ').len();
    let colon = close + 1 + spaces;
    let bytes = rest.as_bytes();
    if bytes.get(colon) == Some(&b':') && matches!(bytes.get(colon + 1), None | Some(b' ')) {
        Some(colon)
    } else {
        None
    }
}

/// Index of the closing quote of a double-quoted scalar starting at 0.
fn closing_double(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Index of the closing quote of a single-quoted scalar starting at 0.
fn closing_single(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}
