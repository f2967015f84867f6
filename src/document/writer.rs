//! Serialize a [`Document`] back to XML with quick-xml

use std::io::{self, Write};

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::tree::{Document, Element, Node};

/// Declaration written at the top of every output file
pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>";

impl Document {
    /// Write the document as UTF-8 XML, preceded by [`XML_DECLARATION`]
    pub fn write_to<W: Write>(&self, out: W) -> io::Result<()> {
        let mut writer = Writer::new(out);
        writer.get_mut().write_all(XML_DECLARATION.as_bytes())?;
        writer.get_mut().write_all(b"\n")?;

        for node in &self.prolog {
            write_node(&mut writer, node)?;
            writer.get_mut().write_all(b"\n")?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            writer.get_mut().write_all(b"\n")?;
            write_node(&mut writer, node)?;
        }
        Ok(())
    }

    /// Serialize to a string
    pub fn to_xml(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> io::Result<()> {
    match node {
        Node::Element(elem) => write_element(writer, elem),
        Node::Text(raw) => writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str()))),
        Node::CData(raw) => writer.write_event(Event::CData(BytesCData::new(raw.as_str()))),
        Node::Comment(raw) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))
        }
        Node::ProcessingInstruction(raw) => {
            writer.write_event(Event::PI(BytesPI::new(raw.as_str())))
        }
        Node::DocType(raw) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(raw.as_str())))
        }
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, elem: &Element) -> io::Result<()> {
    let mut start = BytesStart::new(elem.name.as_str());
    for attr in elem.attributes() {
        let value = escape_attribute(&attr.value);
        start.push_attribute((attr.name.as_bytes(), value.as_bytes()));
    }

    if elem.children.is_empty() && elem.self_closing {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &elem.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(elem.name.as_str())))
}

/// Escape markup characters, plus whitespace that attribute value
/// normalization would otherwise fold into spaces on the next read
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
