//! Generic XML tree for svn's `--xml` output
//!
//! Children are grouped by element name. A name seen once holds a single
//! element, a name seen more than once holds a list; [`as_sequence`] is the one
//! place that flattens both shapes so parsers never branch on cardinality.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;

use crate::error::{ParseError, ParseResult};

/// Children sharing one element name
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    Single(XmlElement),
    Multiple(Vec<XmlElement>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    /// Concatenated character data, trimmed at both ends
    pub text: String,
    pub children: BTreeMap<String, XmlValue>,
}

/// Normalise a child slot to a sequence: absent → 0, single → 1, list → n
pub fn as_sequence(value: Option<&XmlValue>) -> Vec<&XmlElement> {
    match value {
        None => Vec::new(),
        Some(XmlValue::Single(element)) => vec![element],
        Some(XmlValue::Multiple(elements)) => elements.iter().collect(),
    }
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn push_child(&mut self, child: XmlElement) {
        let name = child.name.clone();
        let value = match self.children.remove(&name) {
            None => XmlValue::Single(child),
            Some(XmlValue::Single(existing)) => XmlValue::Multiple(vec![existing, child]),
            Some(XmlValue::Multiple(mut list)) => {
                list.push(child);
                XmlValue::Multiple(list)
            }
        };
        self.children.insert(name, value);
    }

    pub fn child(&self, name: &str) -> Option<&XmlValue> {
        self.children.get(name)
    }

    /// All children with this name, in document order
    pub fn children_named(&self, name: &str) -> Vec<&XmlElement> {
        as_sequence(self.child(name))
    }

    /// First child with this name
    pub fn first(&self, name: &str) -> Option<&XmlElement> {
        self.children_named(name).into_iter().next()
    }

    /// Follow a chain of first children, e.g. `["info", "entry"]`
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, name| element.first(name))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Numeric attribute, 0 when missing or not a number
    pub fn attr_u64(&self, name: &str) -> u64 {
        self.attr(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Text of the first child with this name, empty when missing
    pub fn child_text(&self, name: &str) -> &str {
        self.first(name).map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// Parse a whole document into a synthetic root whose children are the
/// top-level elements. Empty input yields an empty root.
pub fn parse_document(xml: &str) -> ParseResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = vec![XmlElement::new(String::new())];

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                stack.push(start_element(e)?);
            }
            Event::Empty(ref e) => {
                let element = start_element(e)?;
                attach(&mut stack, element)?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| ParseError("unbalanced closing tag".to_string()))?;
                element.text = element.text.trim().to_string();
                attach(&mut stack, element)?;
            }
            Event::Text(ref e) => {
                let raw = utf8(e)?;
                let text = unescape(raw).map_err(|err| ParseError(err.to_string()))?;
                append_text(&mut stack, &text);
            }
            Event::CData(ref e) => {
                let raw = utf8(e)?;
                append_text(&mut stack, raw);
            }
            Event::GeneralRef(ref e) => {
                let reference = format!("&{};", utf8(e)?);
                let text = unescape(&reference).map_err(|err| ParseError(err.to_string()))?;
                append_text(&mut stack, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(ParseError("unexpected end of document".to_string()));
    }

    stack
        .pop()
        .ok_or_else(|| ParseError("empty parser stack".to_string()))
}

fn start_element(e: &BytesStart<'_>) -> ParseResult<XmlElement> {
    let mut element = XmlElement::new(utf8(e.name().as_ref())?.to_string());

    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError(err.to_string()))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let raw = utf8(&attr.value)?;
        let value = unescape(raw).map_err(|err| ParseError(err.to_string()))?;
        element.attributes.insert(key, value.into_owned());
    }

    Ok(element)
}

fn attach(stack: &mut [XmlElement], element: XmlElement) -> ParseResult<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| ParseError("unbalanced closing tag".to_string()))?;
    parent.push_child(element);
    Ok(())
}

fn append_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}

fn utf8(bytes: &[u8]) -> ParseResult<&str> {
    std::str::from_utf8(bytes).map_err(|err| ParseError(format!("invalid UTF-8: {}", err)))
}
