//! The mutable element tree.
//!
//! Attribute values and text are stored escaped, exactly as they appear in
//! the source, and are written back without re-escaping.

use rdmerge_types::NamespaceBinding;

use crate::names::{rename_qualified, rewrite_value_prefixes, split_qualified};

/// Attribute controlling whitespace handling for an element's subtree.
pub const XML_SPACE_ATTRIBUTE: &str = "xml:space";

/// A parsed document: one root element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTree {
    root: Element,
}

impl DocumentTree {
    /// Wrap a root element.
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Namespace declarations on the root element, in document order.
    pub fn namespace_declarations(&self) -> Vec<NamespaceBinding> {
        self.root.namespace_declarations()
    }
}

/// An attribute with its qualified name and escaped value.
#[derive(Clone, Debug, PartialEq, Eq)]
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

    pub fn prefix(&self) -> Option<&str> {
        split_qualified(&self.name).0
    }

    pub fn local_name(&self) -> &str {
        split_qualified(&self.name).1
    }

    /// Returns `true` for `xmlns` and `xmlns:*` attributes.
    pub fn is_namespace_declaration(&self) -> bool {
        self.declared_prefix().is_some()
    }

    /// The prefix this attribute declares, `""` for the default namespace.
    pub fn declared_prefix(&self) -> Option<&str> {
        if self.name == "xmlns" {
            Some("")
        } else {
            self.name.strip_prefix("xmlns:")
        }
    }
}

/// A child of an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Escaped character data, entity references included.
    Text(String),
    CData(String),
    Comment(String),
    /// Target and content of a processing instruction.
    ProcessingInstruction(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

/// An element with its qualified name, attributes, and children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Qualified name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn prefix(&self) -> Option<&str> {
        split_qualified(&self.name).0
    }

    pub fn local_name(&self) -> &str {
        split_qualified(&self.name).1
    }

    // ---------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Escaped value of the attribute with this exact qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    /// Returns the previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.attributes.push(Attribute { name, value });
                None
            }
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(idx).value)
    }

    // ---------------------------------------------------------------
    // Namespace declarations
    // ---------------------------------------------------------------

    /// Namespace declarations made on this element, in document order.
    pub fn namespace_declarations(&self) -> Vec<NamespaceBinding> {
        self.attributes
            .iter()
            .filter_map(|a| {
                a.declared_prefix()
                    .map(|prefix| NamespaceBinding::new(prefix, a.value.clone()))
            })
            .collect()
    }

    /// Returns `true` if this element declares `prefix` (`""` = default).
    pub fn declares_prefix(&self, prefix: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.declared_prefix() == Some(prefix))
    }

    /// URI this element itself binds to `prefix`.
    pub fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.declared_prefix() == Some(prefix))
            .map(|a| a.value.as_str())
    }

    /// Add or replace a namespace declaration.
    pub fn declare_namespace(&mut self, binding: &NamespaceBinding) {
        self.set_attribute(binding.attribute_name(), binding.uri.clone());
    }

    /// Remove the declaration of `prefix`, returning its URI.
    pub fn remove_namespace_declaration(&mut self, prefix: &str) -> Option<String> {
        let idx = self
            .attributes
            .iter()
            .position(|a| a.declared_prefix() == Some(prefix))?;
        Some(self.attributes.remove(idx).value)
    }

    // ---------------------------------------------------------------
    // Children
    // ---------------------------------------------------------------

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Direct child elements, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// All elements below this one in document order (pre-order),
    /// excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.child_elements().collect::<Vec<_>>().into_iter().rev().collect(),
        }
    }

    /// Whether whitespace inside this element is significant, given the
    /// setting inherited from its parent. `xml:space="preserve"` turns it
    /// on and `xml:space="default"` turns it off again.
    pub fn preserves_space(&self, inherited: bool) -> bool {
        match self.attribute(XML_SPACE_ATTRIBUTE) {
            Some("preserve") => true,
            Some("default") => false,
            _ => inherited,
        }
    }

    /// Append escaped text, extending a trailing text node if present.
    pub(crate) fn append_text(&mut self, text: &str) {
        match self.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => self.children.push(Node::Text(text.to_string())),
        }
    }

    /// Drop whitespace-only text used for layout between child markup.
    /// Text-only content is kept as is.
    pub(crate) fn drop_formatting_whitespace(&mut self) {
        let has_markup = self.children.iter().any(|n| !matches!(n, Node::Text(_)));
        if has_markup {
            self.children.retain(|n| !n.is_blank_text());
        }
    }

    // ---------------------------------------------------------------
    // Prefix rewriting
    // ---------------------------------------------------------------

    /// Rewrite every element and attribute name using prefix `old` to use
    /// `new` instead, in this element and its descendants.
    ///
    /// Descent stops at elements that re-declare `old`, since the prefix
    /// means something else inside them. With `rewrite_values`, prefixed
    /// type references inside attribute values are rewritten too. Returns
    /// the number of names and values changed.
    pub fn rename_prefix(&mut self, old: &str, new: &str, rewrite_values: bool) -> usize {
        let mut changed = 0;

        if let Some(name) = rename_qualified(&self.name, old, new, true) {
            self.name = name;
            changed += 1;
        }

        for attr in self.attributes.iter_mut() {
            if attr.is_namespace_declaration() {
                continue;
            }
            if let Some(name) = rename_qualified(&attr.name, old, new, false) {
                attr.name = name;
                changed += 1;
            }
            if rewrite_values {
                if let Some(value) = rewrite_value_prefixes(&attr.value, old, new) {
                    attr.value = value;
                    changed += 1;
                }
            }
        }

        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                if !el.declares_prefix(old) {
                    changed += el.rename_prefix(old, new, rewrite_values);
                }
            }
        }

        changed
    }
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        let children: Vec<&Element> = next.child_elements().collect();
        self.stack.extend(children.into_iter().rev());
        Some(next)
    }
}
