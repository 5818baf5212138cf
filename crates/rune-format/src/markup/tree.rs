use ego_tree::{NodeId, NodeRef, Tree};

/// Which serialization rules apply to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Html,
    Xml,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// Tree root; never serialized itself.
    Document,
    /// Everything between `<!DOCTYPE ` and `>`.
    Doctype(String),
    Element(MarkupElement),
    /// Character data that is escaped on output.
    Text(String),
    /// Raw text of `script`, `style` and the other raw-text elements.
    Data(String),
    /// Stylesheet literal written by the style pass, already padded.
    Css(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl MarkupNode {
    pub fn as_element(&self) -> Option<&MarkupElement> {
        match self {
            MarkupNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text-like content, if this node carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            MarkupNode::Text(text) | MarkupNode::Data(text) | MarkupNode::Css(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
}

impl MarkupElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Overwrite an existing attribute in place, or append it.
    pub fn set_attr(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }
}

/// A parsed markup document owned by a single formatting call.
#[derive(Debug, Clone)]
pub struct MarkupDocument {
    tree: Tree<MarkupNode>,
    flavor: Flavor,
}

impl MarkupDocument {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            tree: Tree::new(MarkupNode::Document),
            flavor,
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn tree(&self) -> &Tree<MarkupNode> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree<MarkupNode> {
        &mut self.tree
    }

    pub fn root(&self) -> NodeRef<'_, MarkupNode> {
        self.tree.root()
    }

    /// Append `value` under `parent`, returning the new node's id.
    pub fn append(&mut self, parent: NodeId, value: MarkupNode) -> Option<NodeId> {
        let mut parent = self.tree.get_mut(parent)?;
        Some(parent.append(value).id())
    }

    /// Element ids in document order whose element matches `predicate`.
    pub fn elements_where<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&MarkupElement) -> bool,
    {
        self.tree
            .root()
            .descendants()
            .filter(|node| node.value().as_element().is_some_and(&predicate))
            .map(|node| node.id())
            .collect()
    }

    /// Number of ancestors of `id`, not counting the document root.
    pub fn depth(&self, id: NodeId) -> usize {
        self.tree.get(id).map(node_depth).unwrap_or(0)
    }

    /// Concatenated text of the direct text-like children of `id`.
    pub fn child_text(&self, id: NodeId) -> String {
        let Some(node) = self.tree.get(id) else {
            return String::new();
        };
        node.children()
            .filter_map(|child| child.value().text())
            .collect()
    }

    /// Drop every child of `id` and put `value` in their place.
    pub fn replace_children(&mut self, id: NodeId, value: MarkupNode) {
        let Some(mut node) = self.tree.get_mut(id) else {
            return;
        };
        while let Some(mut child) = node.first_child() {
            child.detach();
        }
        node.append(value);
    }

    /// Set an attribute on the element `id`; false when `id` is not an element.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: String) -> bool {
        let Some(mut node) = self.tree.get_mut(id) else {
            return false;
        };
        match node.value() {
            MarkupNode::Element(element) => {
                element.set_attr(name, value);
                true
            }
            _ => false,
        }
    }
}

pub(crate) fn node_depth(node: NodeRef<'_, MarkupNode>) -> usize {
    node.ancestors().count().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MarkupDocument, NodeId, NodeId) {
        let mut doc = MarkupDocument::new(Flavor::Html);
        let root = doc.root().id();
        let html = doc
            .append(root, MarkupNode::Element(MarkupElement::new("html")))
            .unwrap();
        let body = doc
            .append(html, MarkupNode::Element(MarkupElement::new("body")))
            .unwrap();
        let text = doc.append(body, MarkupNode::Text("hi".into())).unwrap();
        (doc, body, text)
    }

    #[test]
    fn depth_counts_ancestors_below_root() {
        let (doc, body, text) = sample();
        assert_eq!(doc.depth(doc.root().id()), 0);
        assert_eq!(doc.depth(body), 1);
        assert_eq!(doc.depth(text), 2);
    }

    #[test]
    fn replace_children_swaps_content() {
        let (mut doc, body, _) = sample();
        doc.replace_children(body, MarkupNode::Css("x".into()));
        assert_eq!(doc.child_text(body), "x");
        let kids: Vec<_> = doc.tree().get(body).unwrap().children().collect();
        assert_eq!(kids.len(), 1);
    }

    #[test]
    fn set_attr_overwrites_in_place() {
        let mut el = MarkupElement::new("p");
        el.attrs.push(("style".into(), "a:b".into()));
        el.attrs.push(("id".into(), "x".into()));
        el.set_attr("style", "a: b".into());
        assert_eq!(el.attrs[0], ("style".to_string(), "a: b".to_string()));
        el.set_attr("class", "c".into());
        assert_eq!(el.attr("class"), Some("c"));
    }
}
