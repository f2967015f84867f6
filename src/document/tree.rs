//! Mutable XML tree used by the normalizer

/// A single attribute, value stored unescaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A node inside an element or at document level
///
/// Everything except elements is kept as raw markup content and written back
/// as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, still escaped (`&amp;` stays `&amp;`)
    Text(String),
    /// Body of `<![CDATA[...]]>`
    CData(String),
    /// Body of `<!--...-->`
    Comment(String),
    /// Body of `<?...?>`
    ProcessingInstruction(String),
    /// Body of `<!DOCTYPE ...>`
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(elem) => Some(elem),
            _ => None,
        }
    }

    /// True for text nodes that hold nothing but whitespace
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written (`svg`, `svg:metadata`)
    pub name: String,
    attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Written as `<name/>` when it has no children
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Builder-style attribute setter, mostly for tests
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Tag name without its namespace prefix
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Namespace prefix of the tag name, if any
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut [Attribute] {
        &mut self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Set an attribute only when it is missing. Returns true if it was added.
    pub fn set_attr_if_absent(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.has_attr(name) {
            return false;
        }
        self.attributes.push(Attribute::new(name, value));
        true
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// Direct element children, in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Visit this element and every descendant element, depth first
    pub fn walk(&self, f: &mut impl FnMut(&Element)) {
        f(self);
        for child in &self.children {
            if let Node::Element(elem) = child {
                elem.walk(f);
            }
        }
    }

    /// Mutable variant of [`Element::walk`]
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            if let Node::Element(elem) = child {
                elem.walk_mut(f);
            }
        }
    }
}

fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// A parsed XML document: the root element and whatever surrounds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Comments, PIs and doctype before the root (the XML declaration is not kept)
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Nodes after the root element
    pub epilog: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }
}
