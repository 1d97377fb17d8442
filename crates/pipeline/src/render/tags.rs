//! Tag expansion inside WordprocessingML parts.
//!
//! Supports the subset of tags the RDTI template uses:
//!
//! ```text
//! {key}             value (XML-escaped, newlines become <w:br/>)
//! {#key}...{/key}   section: repeat per list item, or render once if truthy
//! {^key}...{/key}   inverted section: render once if falsy
//! ```
//!
//! Parts are read and written as `quick_xml` events. Only character data
//! inside `w:t` elements is scanned for tags; attributes and every other
//! event pass through untouched.
//!
//! Word processors often split a typed tag across several runs. Tag
//! fragments are merged back into the run where the tag opens before
//! expansion. A section tag that sits alone in its paragraph takes the
//! paragraph with it, so list sections repeat whole paragraphs.

use std::borrow::Cow;
use std::fmt::Display;

use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::Value;

use crate::error::RenderError;

const TAG_OPEN: char = '{';
const TAG_CLOSE: char = '}';
const TEXT_ELEMENT: &str = "w:t";
const PARAGRAPH_ELEMENT: &str = "w:p";
const BREAK_ELEMENT: &str = "w:br";
const SPACE_ATTRIBUTE: &str = "xml:space";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Value,
    Section,
    Inverted,
    Close,
}

/// A part as read: markup events, and the unescaped content of `w:t`.
#[derive(Debug)]
enum Piece {
    Markup(Event<'static>),
    Text(String),
}

#[derive(Debug)]
enum Token {
    Markup(Event<'static>),
    Text(String),
    Tag(TagKind, String),
}

#[derive(Debug)]
enum Node {
    Raw(Event<'static>),
    Text(String),
    Value(String),
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

/// Expand every tag in one XML part against `data`.
pub fn render_part(part: &str, xml: &str, data: &Value) -> Result<String, RenderError> {
    let pieces = merge_split_tags(read_pieces(part, xml)?);
    let tokens = lex(part, pieces)?;
    let tokens = collapse_section_paragraphs(tokens);
    let nodes = build_tree(part, tokens)?;

    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut scopes = vec![data];
    render_nodes(part, &nodes, &mut scopes, &mut writer)?;
    String::from_utf8(writer.into_inner()).map_err(|_| RenderError::Encoding {
        part: part.to_string(),
    })
}

/// `true` if the part contains anything that looks like a tag.
pub fn has_tags(xml: &str) -> bool {
    xml.contains(TAG_OPEN)
}

fn xml_error(part: &str, err: impl Display) -> RenderError {
    RenderError::Xml {
        part: part.to_string(),
        message: err.to_string(),
    }
}

fn is_element(name: &[u8], element: &str) -> bool {
    name == element.as_bytes()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn read_pieces(part: &str, xml: &str) -> Result<Vec<Piece>, RenderError> {
    let mut reader = Reader::from_str(xml);
    let mut pieces = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| xml_error(part, e))? {
            Event::Eof => break,
            Event::Start(start) if is_element(start.name().as_ref(), TEXT_ELEMENT) => {
                in_text = true;
                pieces.push(Piece::Markup(Event::Start(preserve_space(start))));
            }
            Event::End(end) if is_element(end.name().as_ref(), TEXT_ELEMENT) => {
                in_text = false;
                pieces.push(Piece::Markup(Event::End(end.into_owned())));
            }
            Event::Text(text) if in_text => {
                let content = text.unescape().map_err(|e| xml_error(part, e))?;
                if let Some(Piece::Text(previous)) = pieces.last_mut() {
                    previous.push_str(&content);
                } else {
                    pieces.push(Piece::Text(content.into_owned()));
                }
            }
            other => pieces.push(Piece::Markup(other.into_owned())),
        }
    }

    Ok(pieces)
}

/// Expanded values may start or end with spaces, so every `w:t` keeps them.
fn preserve_space(start: BytesStart<'_>) -> BytesStart<'static> {
    let mut start = start.into_owned();
    let declared = start
        .attributes()
        .flatten()
        .any(|attr| attr.key.as_ref() == SPACE_ATTRIBUTE.as_bytes());
    if !declared {
        start.push_attribute((SPACE_ATTRIBUTE, "preserve"));
    }
    start
}

// ---------------------------------------------------------------------------
// Run merging
// ---------------------------------------------------------------------------

fn merge_split_tags(mut pieces: Vec<Piece>) -> Vec<Piece> {
    let mut owner: Option<usize> = None;

    for index in 0..pieces.len() {
        let Piece::Text(content) = &mut pieces[index] else {
            continue;
        };
        let content = std::mem::take(content);
        let mut keep = String::with_capacity(content.len());

        for c in content.chars() {
            match owner {
                Some(o) if o != index => {
                    if let Piece::Text(target) = &mut pieces[o] {
                        target.push(c);
                    }
                    if c == TAG_CLOSE {
                        owner = None;
                    }
                }
                _ => {
                    keep.push(c);
                    if c == TAG_OPEN {
                        owner = Some(index);
                    } else if c == TAG_CLOSE {
                        owner = None;
                    }
                }
            }
        }
        pieces[index] = Piece::Text(keep);
    }

    pieces
}

// ---------------------------------------------------------------------------
// Lexing
// ---------------------------------------------------------------------------

fn lex(part: &str, pieces: Vec<Piece>) -> Result<Vec<Token>, RenderError> {
    let mut tokens = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Markup(event) => tokens.push(Token::Markup(event)),
            Piece::Text(text) => lex_text(part, &text, &mut tokens)?,
        }
    }
    Ok(tokens)
}

fn lex_text(part: &str, text: &str, tokens: &mut Vec<Token>) -> Result<(), RenderError> {
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix(TAG_OPEN) {
            let end = inner
                .find(TAG_CLOSE)
                .ok_or_else(|| RenderError::UnterminatedTag {
                    part: part.to_string(),
                })?;
            tokens.push(parse_tag(part, &inner[..end])?);
            rest = &inner[end + TAG_CLOSE.len_utf8()..];
        } else {
            let stop = rest.find(TAG_OPEN).unwrap_or(rest.len());
            tokens.push(Token::Text(rest[..stop].to_string()));
            rest = &rest[stop..];
        }
    }
    Ok(())
}

fn parse_tag(part: &str, inner: &str) -> Result<Token, RenderError> {
    let inner = inner.trim();
    let (kind, name) = match inner.chars().next() {
        Some('#') => (TagKind::Section, &inner[1..]),
        Some('^') => (TagKind::Inverted, &inner[1..]),
        Some('/') => (TagKind::Close, &inner[1..]),
        _ => (TagKind::Value, inner),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(RenderError::EmptyTag {
            part: part.to_string(),
        });
    }
    Ok(Token::Tag(kind, name.to_string()))
}

// ---------------------------------------------------------------------------
// Paragraph sections
// ---------------------------------------------------------------------------

fn is_paragraph_start(token: &Token) -> bool {
    match token {
        Token::Markup(Event::Start(start)) => is_element(start.name().as_ref(), PARAGRAPH_ELEMENT),
        _ => false,
    }
}

fn is_paragraph_end(token: &Token) -> bool {
    match token {
        Token::Markup(Event::End(end)) => is_element(end.name().as_ref(), PARAGRAPH_ELEMENT),
        _ => false,
    }
}

/// Drop the paragraph wrapping any section tag that is alone in it.
fn collapse_section_paragraphs(tokens: Vec<Token>) -> Vec<Token> {
    let mut removed = vec![false; tokens.len()];

    for (index, token) in tokens.iter().enumerate() {
        if !matches!(token, Token::Tag(kind, _) if *kind != TagKind::Value) {
            continue;
        }

        let start = tokens[..index].iter().enumerate().rev().find_map(|(j, t)| {
            if is_paragraph_start(t) {
                Some(Some(j))
            } else if is_paragraph_end(t) {
                Some(None)
            } else {
                None
            }
        });
        let end = tokens.iter().enumerate().skip(index + 1).find_map(|(j, t)| {
            if is_paragraph_end(t) {
                Some(Some(j))
            } else if is_paragraph_start(t) {
                Some(None)
            } else {
                None
            }
        });
        let (Some(Some(start)), Some(Some(end))) = (start, end) else {
            continue;
        };

        let alone = (start..=end).all(|j| {
            j == index
                || match &tokens[j] {
                    Token::Markup(_) => true,
                    Token::Text(text) => text.trim().is_empty(),
                    Token::Tag(..) => false,
                }
        });
        if alone {
            for (j, flag) in removed.iter_mut().enumerate().take(end + 1).skip(start) {
                if j != index {
                    *flag = true;
                }
            }
        }
    }

    tokens
        .into_iter()
        .zip(removed)
        .filter(|(_, removed)| !removed)
        .map(|(token, _)| token)
        .collect()
}

// ---------------------------------------------------------------------------
// Tree building and rendering
// ---------------------------------------------------------------------------

fn build_tree(part: &str, tokens: Vec<Token>) -> Result<Vec<Node>, RenderError> {
    let mut stack: Vec<(String, bool, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();

    for token in tokens {
        match token {
            Token::Markup(event) => current.push(Node::Raw(event)),
            Token::Text(text) => current.push(Node::Text(text)),
            Token::Tag(TagKind::Value, name) => current.push(Node::Value(name)),
            Token::Tag(TagKind::Section, name) => {
                stack.push((name, false, std::mem::take(&mut current)));
            }
            Token::Tag(TagKind::Inverted, name) => {
                stack.push((name, true, std::mem::take(&mut current)));
            }
            Token::Tag(TagKind::Close, name) => {
                let Some((open, inverted, parent)) = stack.pop() else {
                    return Err(RenderError::UnbalancedSection {
                        part: part.to_string(),
                        expected: "no open section".to_string(),
                        found: name,
                    });
                };
                if open != name {
                    return Err(RenderError::UnbalancedSection {
                        part: part.to_string(),
                        expected: open,
                        found: name,
                    });
                }
                let children = std::mem::replace(&mut current, parent);
                current.push(Node::Section {
                    name,
                    inverted,
                    children,
                });
            }
        }
    }

    if let Some((name, _, _)) = stack.pop() {
        return Err(RenderError::UnclosedSection {
            part: part.to_string(),
            name,
        });
    }
    Ok(current)
}

type PartWriter = Writer<Vec<u8>>;

fn render_nodes<'a>(
    part: &str,
    nodes: &[Node],
    scopes: &mut Vec<&'a Value>,
    writer: &mut PartWriter,
) -> Result<(), RenderError> {
    for node in nodes {
        match node {
            Node::Raw(event) => emit(part, writer, event.clone())?,
            Node::Text(text) => write_text(part, writer, text)?,
            Node::Value(name) => write_value(part, writer, lookup(scopes, name))?,
            Node::Section {
                name,
                inverted: true,
                children,
            } => {
                if !is_truthy(lookup(scopes, name)) {
                    render_nodes(part, children, scopes, writer)?;
                }
            }
            Node::Section { name, children, .. } => match lookup(scopes, name) {
                Some(Value::Array(items)) => {
                    for item in items {
                        scopes.push(item);
                        render_nodes(part, children, scopes, writer)?;
                        scopes.pop();
                    }
                }
                Some(object @ Value::Object(_)) => {
                    scopes.push(object);
                    render_nodes(part, children, scopes, writer)?;
                    scopes.pop();
                }
                value if is_truthy(value) => render_nodes(part, children, scopes, writer)?,
                _ => {}
            },
        }
    }
    Ok(())
}

fn emit(part: &str, writer: &mut PartWriter, event: Event<'_>) -> Result<(), RenderError> {
    writer.write_event(event).map_err(|e| xml_error(part, e))
}

fn write_text(part: &str, writer: &mut PartWriter, text: &str) -> Result<(), RenderError> {
    if text.is_empty() {
        return Ok(());
    }
    emit(part, writer, Event::Text(BytesText::from_escaped(escape(text))))
}

/// Write a value; each newline closes the current `w:t`, adds a `w:br` and
/// opens a fresh `w:t`.
fn write_value(
    part: &str,
    writer: &mut PartWriter,
    value: Option<&Value>,
) -> Result<(), RenderError> {
    let text: Cow<'_, str> = match value {
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(Value::Number(n)) => Cow::Owned(n.to_string()),
        Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
        _ => return Ok(()),
    };

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            emit(part, writer, Event::End(BytesEnd::new(TEXT_ELEMENT)))?;
            emit(part, writer, Event::Empty(BytesStart::new(BREAK_ELEMENT)))?;
            emit(
                part,
                writer,
                Event::Start(
                    BytesStart::new(TEXT_ELEMENT).with_attributes([(SPACE_ATTRIBUTE, "preserve")]),
                ),
            )?;
        }
        write_text(part, writer, &line.replace('\r', ""))?;
    }
    Ok(())
}

/// Resolve `name` from the innermost scope outwards. `.` is the current item.
fn lookup<'a>(scopes: &[&'a Value], name: &str) -> Option<&'a Value> {
    if name == "." {
        return scopes.last().copied();
    }
    scopes.iter().rev().copied().find_map(|scope| scope.get(name))
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}
