//! Build a [`Document`] from XML text with quick-xml

use std::collections::HashMap;
use std::sync::LazyLock;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::error::NormalizeError;

use super::tree::{Document, Element, Node};

/// General entity declared in a DOCTYPE internal subset
static ENTITY_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!ENTITY\s+([A-Za-z_:][\w.:-]*)\s+(?:"([^"]*)"|'([^']*)')\s*>"#).unwrap()
});

/// Entities declared inline, keyed by name
type EntityMap = HashMap<String, String>;

fn internal_entities(doctype: &str) -> EntityMap {
    ENTITY_DECL
        .captures_iter(doctype)
        .filter_map(|caps| {
            let value = caps.get(2).or_else(|| caps.get(3))?;
            Some((caps[1].to_string(), value.as_str().to_string()))
        })
        .collect()
}

impl Document {
    /// Parse an XML document
    ///
    /// Attribute values are unescaped, including entities declared in the
    /// doctype's internal subset; text, comments, CDATA, processing
    /// instructions and the doctype keep their raw form. The XML declaration
    /// and whitespace-only text outside the root are dropped.
    pub fn parse(source: &str) -> Result<Document, NormalizeError> {
        let mut reader = Reader::from_str(source);
        let mut builder = TreeBuilder::default();

        loop {
            let position = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                NormalizeError::xml(e.to_string(), reader.error_position() as usize)
            })?;

            match event {
                Event::Start(start) => {
                    let elem = element_from_start(&start, &reader, &builder.entities, position)?;
                    builder.open(elem, position);
                }
                Event::Empty(start) => {
                    let mut elem =
                        element_from_start(&start, &reader, &builder.entities, position)?;
                    elem.self_closing = true;
                    builder.close(elem, position)?;
                }
                Event::End(_) => {
                    // quick-xml has already checked the end name against the open tag
                    let Some((elem, start)) = builder.stack.pop() else {
                        return Err(NormalizeError::xml("unexpected end tag", position));
                    };
                    builder.close(elem, start)?;
                }
                Event::Text(text) => builder.push_text(&String::from_utf8_lossy(&text)),
                Event::GeneralRef(reference) => {
                    builder.push_text(&format!("&{};", String::from_utf8_lossy(&reference)))
                }
                Event::CData(data) => {
                    builder.push(Node::CData(String::from_utf8_lossy(&data).into_owned()))
                }
                Event::Comment(comment) => builder.push(Node::Comment(
                    String::from_utf8_lossy(&comment).into_owned(),
                )),
                Event::PI(pi) => builder.push(Node::ProcessingInstruction(
                    String::from_utf8_lossy(&pi).into_owned(),
                )),
                Event::DocType(doctype) => {
                    let raw = String::from_utf8_lossy(&doctype).into_owned();
                    builder.entities.extend(internal_entities(&raw));
                    builder.push(Node::DocType(raw));
                }
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        builder.finish()
    }
}

fn element_from_start(
    start: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    entities: &EntityMap,
    position: usize,
) -> Result<Element, NormalizeError> {
    let mut elem = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    let decoder = reader.decoder();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| NormalizeError::xml(e.to_string(), position))?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value_with(decoder, |name| {
                resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
            })
            .map_err(|e| NormalizeError::xml(format!("attribute '{}': {}", name, e), position))?;
        elem.set_attr(&name, value);
    }

    Ok(elem)
}

#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    /// Open elements with the byte offset of their start tag
    stack: Vec<(Element, usize)>,
    entities: EntityMap,
}

impl TreeBuilder {
    fn container(&mut self) -> &mut Vec<Node> {
        if let Some((top, _)) = self.stack.last_mut() {
            &mut top.children
        } else if self.root.is_none() {
            &mut self.prolog
        } else {
            &mut self.epilog
        }
    }

    fn push(&mut self, node: Node) {
        self.container().push(node);
    }

    /// Append text, merging with a preceding text node so entity
    /// references stay part of the surrounding character data
    fn push_text(&mut self, raw: &str) {
        let container = self.container();
        if let Some(Node::Text(existing)) = container.last_mut() {
            existing.push_str(raw);
        } else {
            container.push(Node::Text(raw.to_string()));
        }
    }

    fn open(&mut self, elem: Element, position: usize) {
        self.stack.push((elem, position));
    }

    fn close(&mut self, elem: Element, position: usize) -> Result<(), NormalizeError> {
        if let Some((parent, _)) = self.stack.last_mut() {
            parent.children.push(Node::Element(elem));
        } else if self.root.is_some() {
            return Err(NormalizeError::MultipleRoots {
                name: elem.name,
                position,
            });
        } else {
            self.root = Some(elem);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Document, NormalizeError> {
        if let Some((elem, position)) = self.stack.pop() {
            return Err(NormalizeError::UnclosedElement {
                name: elem.name,
                position,
            });
        }
        let root = self.root.ok_or(NormalizeError::MissingRoot)?;

        self.prolog.retain(|n| !n.is_whitespace());
        self.epilog.retain(|n| !n.is_whitespace());

        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}
