//! XML document tree
//!
//! This module provides a mutable, namespace-aware XML tree. It keeps
//! enough of the input (ordered attributes including namespace declarations,
//! mixed content, comments, processing instructions) that a parsed document
//! can be written back out structurally unchanged.

use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::names::{is_namespace_declaration, split_qname};
use crate::namespaces::QName;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::Writer;
use std::io::Write;

/// A single attribute, kept under its raw (possibly prefixed) name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Raw attribute name, e.g. `view:childName` or `xmlns:cm`
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Local part of the attribute name
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Whether this attribute declares a namespace
    pub fn is_namespace_declaration(&self) -> bool {
        is_namespace_declaration(&self.name)
    }
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Element node
    Element(Element),
    /// Character data (unescaped)
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
    /// Processing instruction content (target and data)
    ProcessingInstruction(String),
    /// Document type declaration content
    DocType(String),
}

impl Node {
    /// Get the element, if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Resolved element name
    pub qname: QName,
    /// Prefix used in the source document
    pub prefix: Option<String>,
    /// Attributes in document order, namespace declarations included
    pub attributes: Vec<Attribute>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            prefix: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Name as written in the source, prefix included
    pub fn name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.qname.local_name),
            None => self.qname.local_name.clone(),
        }
    }

    /// Get an attribute value by raw name, falling back to local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .or_else(|| self.attributes.iter().find(|a| a.local_name() == name))
            .map(|a| a.value.as_str())
    }

    /// Iterate over direct child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenated text of all descendant text and CDATA nodes
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    /// Replace all children with a single text node.
    ///
    /// An empty string leaves the element without children.
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) | Node::CData(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            _ => {}
        }
    }
}

/// XML declaration values carried over from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// XML version
    pub version: String,
    /// Standalone flag, if declared
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            standalone: None,
        }
    }
}

/// Pre-order iterator over the elements of a node list
pub struct Elements<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Elements<'a> {
    fn new(nodes: &'a [Node]) -> Self {
        Self {
            stack: vec![nodes.iter()],
        }
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(iter) = self.stack.last_mut() {
            match iter.next() {
                Some(Node::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                }
                Some(_) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// XML Document representation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// XML declaration, if the input had one
    pub declaration: Option<Declaration>,
    /// Top-level nodes: doctype, comments, processing instructions and the document element
    pub children: Vec<Node>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string with default limits
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document, enforcing the given limits.
    ///
    /// Parsing is namespace-aware: an element or attribute using an
    /// undeclared prefix is rejected.
    pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = NsReader::from_str(xml);
        let mut doc = Document::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let position = reader.buffer_position();
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| ParseError::new(e.to_string()).with_location(position))?;

            let namespace = match resolved {
                ResolveResult::Bound(Namespace(uri)) => {
                    Some(String::from_utf8_lossy(uri).into_owned())
                }
                ResolveResult::Unbound => None,
                ResolveResult::Unknown(prefix) => {
                    return Err(ParseError::new(format!(
                        "unbound namespace prefix '{}'",
                        String::from_utf8_lossy(&prefix)
                    ))
                    .with_location(position)
                    .into())
                }
            };

            match event {
                Event::Start(e) => {
                    if stack.is_empty() && doc.root().is_some() {
                        return Err(multiple_roots(position));
                    }
                    limits.check_xml_depth(stack.len() + 1)?;
                    let element = build_element(&e, namespace, &reader, limits, position)?;
                    stack.push(element);
                }
                Event::End(_) => {
                    let current = stack.pop().ok_or_else(|| {
                        Error::from(
                            ParseError::new("unexpected closing tag").with_location(position),
                        )
                    })?;
                    attach(&mut stack, &mut doc, Node::Element(current));
                }
                Event::Empty(e) => {
                    if stack.is_empty() && doc.root().is_some() {
                        return Err(multiple_roots(position));
                    }
                    limits.check_xml_depth(stack.len() + 1)?;
                    let element = build_element(&e, namespace, &reader, limits, position)?;
                    attach(&mut stack, &mut doc, Node::Element(element));
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|e| {
                            ParseError::new(format!("failed to unescape text: {}", e))
                                .with_location(position)
                        })?
                        .into_owned();
                    if stack.is_empty() {
                        if !text.trim().is_empty() {
                            return Err(ParseError::new("text outside the document element")
                                .with_location(position)
                                .into());
                        }
                    } else {
                        attach(&mut stack, &mut doc, Node::Text(text));
                    }
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    if stack.is_empty() {
                        return Err(ParseError::new("CDATA outside the document element")
                            .with_location(position)
                            .into());
                    }
                    attach(&mut stack, &mut doc, Node::CData(text));
                }
                Event::Comment(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    attach(&mut stack, &mut doc, Node::Comment(text));
                }
                Event::PI(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    attach(&mut stack, &mut doc, Node::ProcessingInstruction(text));
                }
                Event::DocType(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    doc.children.push(Node::DocType(text));
                }
                Event::Decl(e) => {
                    let version = e
                        .version()
                        .map(|v| String::from_utf8_lossy(&v).into_owned())
                        .unwrap_or_else(|_| "1.0".to_string());
                    let standalone = e
                        .standalone()
                        .and_then(|s| s.ok())
                        .map(|s| String::from_utf8_lossy(&s).into_owned());
                    doc.declaration = Some(Declaration {
                        version,
                        standalone,
                    });
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::new(format!(
                "unexpected end of input: <{}> is not closed",
                open.name()
            ))
            .with_location(xml.len())
            .into());
        }

        if doc.root().is_none() {
            return Err(ParseError::new("document has no root element").into());
        }

        Ok(doc)
    }

    /// Get the document element
    pub fn root(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }

    /// Get the document element mutably
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// All elements in document order
    pub fn elements(&self) -> Elements<'_> {
        Elements::new(&self.children)
    }

    /// Visit every element in document order, parents before children
    pub fn for_each_element_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Element),
    {
        visit_mut(&mut self.children, &mut f);
    }

    /// Detach every element matching `pred`, subtree included.
    ///
    /// Returns the number of subtrees detached; matches nested inside an
    /// already-detached subtree are not counted separately.
    pub fn remove_elements<P>(&mut self, pred: P) -> usize
    where
        P: Fn(&Element) -> bool,
    {
        remove_matching(&mut self.children, &pred)
    }

    /// Serialize the document.
    ///
    /// The declaration is always written and always says UTF-8, since that
    /// is what gets written.
    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::new(out);
        let decl = self.declaration.clone().unwrap_or_default();
        writer.write_event(Event::Decl(BytesDecl::new(
            &decl.version,
            Some("UTF-8"),
            decl.standalone.as_deref(),
        )))?;

        for node in &self.children {
            writer.get_mut().write_all(b"\n")?;
            write_node(&mut writer, node)?;
        }
        writer.get_mut().write_all(b"\n")?;

        Ok(())
    }

    /// Serialize the document to a string
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Write(e.to_string()))
    }
}

fn multiple_roots(position: usize) -> Error {
    ParseError::new("document has more than one root element")
        .with_location(position)
        .into()
}

fn attach(stack: &mut [Element], doc: &mut Document, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => doc.children.push(node),
    }
}

fn build_element(
    start: &BytesStart,
    namespace: Option<String>,
    reader: &NsReader<&[u8]>,
    limits: &Limits,
    position: usize,
) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| ParseError::new(format!("invalid element name: {}", e)).with_location(position))?
        .to_string();
    let (prefix, local) = split_qname(&name);

    let mut element = Element::new(QName::new(namespace, local));
    element.prefix = prefix.map(str::to_string);

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| {
            ParseError::new(format!("failed to parse attribute: {}", e)).with_location(position)
        })?;

        let attr_name = std::str::from_utf8(attr.key.as_ref()).map_err(|e| {
            ParseError::new(format!("invalid attribute name: {}", e)).with_location(position)
        })?;

        if let (Some(attr_prefix), _) = split_qname(attr_name) {
            if attr_prefix != "xmlns" && attr_prefix != "xml" {
                if let (ResolveResult::Unknown(_), _) = reader.resolve_attribute(attr.key) {
                    return Err(ParseError::new(format!(
                        "unbound namespace prefix '{}' on attribute '{}'",
                        attr_prefix, attr_name
                    ))
                    .with_location(position)
                    .into());
                }
            }
        }

        let attr_value = attr
            .unescape_value()
            .map_err(|e| {
                ParseError::new(format!("failed to unescape attribute value: {}", e))
                    .with_location(position)
            })?
            .into_owned();

        element.attributes.push(Attribute::new(attr_name, attr_value));
    }

    limits.check_attributes(element.attributes.len())?;
    Ok(element)
}

fn visit_mut<F>(nodes: &mut [Node], f: &mut F)
where
    F: FnMut(&mut Element),
{
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
            visit_mut(&mut el.children, f);
        }
    }
}

fn remove_matching<P>(nodes: &mut Vec<Node>, pred: &P) -> usize
where
    P: Fn(&Element) -> bool,
{
    let before = nodes.len();
    nodes.retain(|node| !matches!(node, Node::Element(el) if pred(el)));
    let mut removed = before - nodes.len();

    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            removed += remove_matching(&mut el.children, pred);
        }
    }
    removed
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    match node {
        Node::Element(el) => write_element(writer, el)?,
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
        Node::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
        Node::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesText::from_escaped(text.as_str())))?
        }
        Node::DocType(text) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?
        }
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let name = element.name();
    let mut start = BytesStart::new(name.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    }
    Ok(())
}
