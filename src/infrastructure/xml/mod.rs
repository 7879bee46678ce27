//! Owned XML tree model built on quick-xml
//!
//! The classifier and both processors need random access into the document
//! (root shape checks, descendant lookups), so the streaming event reader is
//! materialized into a small owned tree. Namespace prefixes are stripped by
//! a generic rewrite pass after parsing so downstream path lookups need not
//! know the document's namespace.

use quick_xml::events::Event;
use quick_xml::Reader;

/// XML parse failure. Callers treat this as a "not XML" skip, not an error:
/// the raw bucket may hold unrelated objects.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Document has no root element")]
    NoRoot,
}

/// One element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name, namespace prefix stripped after normalization
    pub name: String,
    /// Concatenated text content of this element (children excluded)
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// First direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first direct child with the given tag name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim()).filter(|t| !t.is_empty())
    }

    /// Depth-first search for the first descendant (self included) with the
    /// given tag name.
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.descendant(name))
    }

    /// Trimmed text of the first matching descendant.
    pub fn descendant_text(&self, name: &str) -> Option<&str> {
        self.descendant(name)
            .map(|e| e.text.trim())
            .filter(|t| !t.is_empty())
    }
}

/// Parse raw bytes into a normalized element tree.
///
/// Input is assumed UTF-8; invalid sequences are replaced, never fatal.
/// Namespace prefixes are stripped from every tag before returning.
pub fn parse_document(raw: &[u8]) -> Result<Element, XmlError> {
    let text = String::from_utf8_lossy(raw);
    let mut reader = Reader::from_str(&text);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::Malformed("multiple root elements".to_string()));
                }
                stack.push(Element {
                    name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                    ..Element::default()
                });
            }
            Ok(Event::Empty(e)) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                    ..Element::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => {
                        return Err(XmlError::Malformed("multiple root elements".to_string()))
                    }
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::Malformed("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(current) = stack.last_mut() {
                    let decoded = t
                        .unescape()
                        .map_err(|e| XmlError::Malformed(e.to_string()))?;
                    current.text.push_str(&decoded);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(XmlError::Malformed(e.to_string())),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(XmlError::Malformed("unclosed element".to_string()));
    }

    let mut root = root.ok_or(XmlError::NoRoot)?;
    strip_namespace_prefixes(&mut root);
    Ok(root)
}

/// Rewrite every tag in the tree, stripping any namespace-prefix wrapper
/// (`ns:Tag` or `{uri}Tag` forms), so path lookups remain stable whatever
/// namespace the document declares.
pub fn strip_namespace_prefixes(element: &mut Element) {
    if let Some(idx) = element.name.rfind(|c| c == '}' || c == ':') {
        element.name = element.name[idx + 1..].to_string();
    }
    for child in &mut element.children {
        strip_namespace_prefixes(child);
    }
}
