//! Owned, mutable XML tree.
//!
//! `roxmltree` only offers a read-only view, so a parsed document is copied
//! into an arena of [`NodeData`] records addressed by [`NodeId`].  Handles are
//! plain indices and are only meaningful for the tree that issued them.
//! Detached nodes stay in the arena but are unreachable from the document.

use std::fmt::Write as _;

/// Indentation unit used by [`format_xml`].
const INDENT: &str = "    ";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

// ═══════════════════════════════════════════════════════════════════════════════
//  Node types
// ═══════════════════════════════════════════════════════════════════════════════

/// Handle to a node inside an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The payload of a node.
///
/// Element and attribute names are stored fully qualified (`cocoon:platform`,
/// `xmlns:cdv`).  Namespace declarations are kept as ordinary attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        value: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed XML document.
#[derive(Debug, Clone, Default)]
pub struct XmlTree {
    nodes: Vec<NodeData>,
    /// Document-level nodes (comments, processing instructions, the root
    /// element) in document order.
    top_level: Vec<NodeId>,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Parsing – roxmltree → arena
// ═══════════════════════════════════════════════════════════════════════════════

impl XmlTree {
    /// Parse `source` into an owned tree.
    pub fn parse(source: &str) -> Result<Self, roxmltree::Error> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(source, options)?;

        let mut tree = Self::default();
        for child in doc.root().children() {
            if child.is_text() {
                continue;
            }
            if let Some(id) = tree.import(source, child) {
                tree.top_level.push(id);
            }
        }
        Ok(tree)
    }

    fn import(&mut self, source: &str, node: roxmltree::Node) -> Option<NodeId> {
        let kind = match node.node_type() {
            roxmltree::NodeType::Element => NodeKind::Element {
                name: qualified_name(source, &node),
                attributes: import_attributes(&node),
            },
            roxmltree::NodeType::Text => NodeKind::Text(node.text().unwrap_or("").to_string()),
            roxmltree::NodeType::Comment => {
                NodeKind::Comment(node.text().unwrap_or("").to_string())
            }
            roxmltree::NodeType::PI => {
                let pi = node.pi()?;
                NodeKind::ProcessingInstruction {
                    target: pi.target.to_string(),
                    value: pi.value.map(String::from),
                }
            }
            roxmltree::NodeType::Root => return None,
        };

        let id = self.push(kind);
        for child in node.children() {
            if let Some(child_id) = self.import(source, child) {
                self.nodes[child_id.0].parent = Some(id);
                self.nodes[id.0].children.push(child_id);
            }
        }
        Some(id)
    }
}

/// Recover the prefixed tag name from the raw source, since `roxmltree`
/// resolves prefixes away.
fn qualified_name(source: &str, node: &roxmltree::Node) -> String {
    source
        .get(node.range())
        .and_then(|raw| raw.strip_prefix('<'))
        .and_then(|raw| {
            raw.split(|c: char| c.is_whitespace() || c == '/' || c == '>')
                .next()
        })
        .filter(|name| !name.is_empty())
        .map(String::from)
        .unwrap_or_else(|| node.tag_name().name().to_string())
}

fn import_attributes(node: &roxmltree::Node) -> Vec<(String, String)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    let mut attributes = Vec::new();

    // Only declarations introduced on this element.
    for ns in node.namespaces() {
        if ns.name() == Some("xml") || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let key = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        attributes.push((key, ns.uri().to_string()));
    }

    for attr in node.attributes() {
        let name = match attr.namespace().and_then(|uri| node.lookup_prefix(uri)) {
            Some(prefix) => format!("{prefix}:{}", attr.name()),
            None => attr.name().to_string(),
        };
        attributes.push((name, attr.value().to_string()));
    }

    attributes
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Reading
// ═══════════════════════════════════════════════════════════════════════════════

impl XmlTree {
    /// The first element at document level.
    pub fn document_element(&self) -> Option<NodeId> {
        self.top_level.iter().copied().find(|&id| self.is_element(id))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Text(_))
    }

    /// Qualified tag name of an element, `None` for other node kinds.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &self.nodes[id.0].children {
                    self.collect_text(child, out);
                }
            }
            _ => {}
        }
    }

    /// Every attached element, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.top_level.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !self.is_element(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Attached elements whose qualified name is `name` (`*` for all), in
    /// document order.
    pub fn elements_by_name(&self, name: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| name == "*" || self.name(id) == Some(name))
            .collect()
    }

    /// Number of element ancestors.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Mutation
// ═══════════════════════════════════════════════════════════════════════════════

impl XmlTree {
    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData { kind, parent: None, children: Vec::new() });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element { name: name.to_string(), attributes: Vec::new() })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Set (or overwrite in place) an attribute.  No-op on non-elements.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            match attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Remove an attribute.  Returns `true` if it existed.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            let before = attributes.len();
            attributes.retain(|(k, _)| k != name);
            return attributes.len() != before;
        }
        false
    }

    /// Replace all children of `id` with a single text node (none if `text`
    /// is empty).
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            let text_id = self.create_text(text);
            self.append_child(id, text_id);
        }
    }

    /// Detach `child` from wherever it is and append it to `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detach `child` and insert it directly before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        self.detach(child);
        let parent = self.parent(reference);
        let siblings = match parent {
            Some(p) => &mut self.nodes[p.0].children,
            None => &mut self.top_level,
        };
        let pos = siblings
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(siblings.len());
        siblings.insert(pos, child);
        self.nodes[child.0].parent = parent;
    }

    /// Remove `id` from its parent's child list.
    pub fn detach(&mut self, id: NodeId) {
        match self.nodes[id.0].parent.take() {
            Some(p) => self.nodes[p.0].children.retain(|&c| c != id),
            None => self.top_level.retain(|&c| c != id),
        }
    }

    /// Append `child` to `parent`, preceded by a newline-and-indent text node
    /// so the raw tree stays readable.
    pub fn append_indented(&mut self, parent: NodeId, child: NodeId) {
        let indent = format!("\n{}", INDENT.repeat(self.depth(parent) + 1));
        let ws = self.create_text(&indent);
        self.append_child(parent, ws);
        self.append_child(parent, child);
    }

    /// Insert `child` before `reference`, followed by the whitespace that
    /// precedes `reference` so both sit on their own line.
    pub fn insert_before_indented(&mut self, reference: NodeId, child: NodeId) {
        let depth = self.depth(reference);
        self.insert_before(reference, child);
        let indent = format!("\n{}", INDENT.repeat(depth));
        let ws = self.create_text(&indent);
        self.insert_before(reference, ws);
    }

    /// Detach `id` together with a whitespace-only text node right before it.
    pub fn remove_indented(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            let siblings = &self.nodes[parent.0].children;
            if let Some(pos) = siblings.iter().position(|&c| c == id) {
                if pos > 0 {
                    let prev = siblings[pos - 1];
                    if matches!(&self.nodes[prev.0].kind, NodeKind::Text(t) if t.trim().is_empty()) {
                        self.detach(prev);
                    }
                }
            }
        }
        self.detach(id);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Serialization
// ═══════════════════════════════════════════════════════════════════════════════

impl XmlTree {
    /// Compact serialization: an XML declaration followed by the nodes exactly
    /// as stored, whitespace text included.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        for &id in &self.top_level {
            self.write_node(id, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    let _ = write!(out, " {key}=\"{}\"", escape_attribute(value));
                }
                if node.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for &child in &node.children {
                        self.write_node(child, out);
                    }
                    let _ = write!(out, "</{name}>");
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Comment(text) => {
                let _ = write!(out, "<!--{text}-->");
            }
            NodeKind::ProcessingInstruction { target, value } => match value {
                Some(v) => {
                    let _ = write!(out, "<?{target} {v}?>");
                }
                None => {
                    let _ = write!(out, "<?{target}?>");
                }
            },
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Whitespace other than a plain space is written as a character reference,
/// since attribute-value normalization would turn it into a space.
fn escape_attribute(s: &str) -> String {
    escape_text(s)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Pretty printing
// ═══════════════════════════════════════════════════════════════════════════════

/// Shape of a single output line, as seen by the reflow pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// Contains a self-closing tag.
    Single,
    /// Contains a closing tag.
    Closing,
    /// Contains an opening tag.
    Opening,
    /// Text, comments, declarations.
    Other,
}

fn classify_line(line: &str) -> LineKind {
    if is_single_line(line) {
        LineKind::Single
    } else if is_closing_line(line) {
        LineKind::Closing
    } else if is_opening_line(line) {
        LineKind::Opening
    } else {
        LineKind::Other
    }
}

/// `<` … at least one char … `/>`.
fn is_single_line(line: &str) -> bool {
    match (line.find('<'), line.rfind("/>")) {
        (Some(open), Some(close)) => close >= open + 2,
        _ => false,
    }
}

/// `</` … at least one char … `>`.
fn is_closing_line(line: &str) -> bool {
    match (line.find("</"), line.rfind('>')) {
        (Some(open), Some(close)) => close >= open + 3,
        _ => false,
    }
}

/// `<` followed by anything but `!` or `?`, then eventually `>`.
fn is_opening_line(line: &str) -> bool {
    line.match_indices('<').any(|(i, _)| {
        let rest = &line[i + 1..];
        match rest.chars().next() {
            Some(c) if c != '!' && c != '?' => rest[c.len_utf8()..].contains('>'),
            _ => false,
        }
    })
}

/// Indentation change when moving from a line of kind `from` to one of kind
/// `to`.
fn indent_delta(from: LineKind, to: LineKind) -> i32 {
    match (from, to) {
        (LineKind::Opening, LineKind::Closing) => 0,
        (LineKind::Opening, _) => 1,
        (_, LineKind::Closing) => -1,
        _ => 0,
    }
}

/// Put a newline between every `>` and the next `<`, dropping whitespace in
/// between.
fn break_between_tags(xml: &str) -> String {
    let chars: Vec<char> = xml.chars().collect();
    let mut out = String::with_capacity(xml.len() + xml.len() / 8);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        if c == '>' {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == '<' {
                out.push('\n');
                i = j;
            }
        }
    }
    out
}

/// Apply `edit` to every newline-terminated line; the unterminated tail is
/// kept as is.
fn map_terminated_lines(xml: &str, mut edit: impl FnMut(&str, &mut String)) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(pos) = rest.find('\n') {
        edit(&rest[..pos], &mut out);
        out.push('\n');
        rest = &rest[pos + 1..];
    }
    out.push_str(rest);
    out
}

/// Lines ending in a space lose their leading spaces and one trailing space.
fn trim_spaced_line(line: &str, out: &mut String) {
    if !line.ends_with(' ') {
        out.push_str(line);
        return;
    }
    let trimmed = line.trim_start_matches(' ');
    out.push_str(trimmed.strip_suffix(' ').unwrap_or(trimmed));
}

/// Move inline content that follows a tag onto its own line.
fn split_inline_content(line: &str, out: &mut String) {
    let split = line.char_indices().last().and_then(|(last, _)| {
        let open = line.find('<')?;
        let close = line[..last].rfind('>')?;
        (close >= open + 2).then_some(close)
    });
    match split {
        Some(close) => {
            out.push_str(&line[..=close]);
            out.push('\n');
            out.push_str(&line[close + 1..]);
        }
        None => out.push_str(line),
    }
}

/// Re-indent compact XML one element per line.
///
/// An opening tag immediately followed by its closing tag stays on a single
/// line (`<name>Text</name>`).
pub fn format_xml(xml: &str) -> String {
    let xml = break_between_tags(xml);
    let xml = map_terminated_lines(&xml, trim_spaced_line);
    let xml = map_terminated_lines(&xml, split_inline_content);

    let mut formatted = String::with_capacity(xml.len() * 2);
    let mut indent: i32 = 0;
    let mut last = LineKind::Other;

    for line in xml.split('\n') {
        let kind = classify_line(line);
        indent += indent_delta(last, kind);
        let collapse = last == LineKind::Opening && kind == LineKind::Closing;
        last = kind;

        if collapse {
            formatted.pop();
        } else {
            formatted.push_str(&INDENT.repeat(indent.max(0) as usize));
        }
        formatted.push_str(line);
        formatted.push('\n');
    }

    formatted
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_prefixes_and_namespaces() {
        let tree = XmlTree::parse(
            r#"<widget xmlns="http://www.w3.org/ns/widgets" xmlns:cocoon="http://cocoon.io" id="a"><cocoon:platform name="ios"/></widget>"#,
        )
        .unwrap();
        let root = tree.document_element().unwrap();
        assert_eq!(tree.name(root), Some("widget"));
        assert_eq!(tree.attribute(root, "xmlns"), Some("http://www.w3.org/ns/widgets"));
        assert_eq!(tree.attribute(root, "xmlns:cocoon"), Some("http://cocoon.io"));
        assert_eq!(tree.attribute(root, "id"), Some("a"));

        let child = tree.element_children(root).next().unwrap();
        assert_eq!(tree.name(child), Some("cocoon:platform"));
        // Inherited declarations are not repeated on children.
        assert_eq!(tree.attributes(child), &[("name".to_string(), "ios".to_string())]);
    }

    #[test]
    fn compact_serialization() {
        let tree = XmlTree::parse(r#"<a x="1 &amp; 2"><b/><!-- note --><c>t &lt; u</c></a>"#).unwrap();
        assert_eq!(
            tree.to_xml_string(),
            r#"<?xml version="1.0" encoding="UTF-8"?><a x="1 &amp; 2"><b/><!-- note --><c>t &lt; u</c></a>"#
        );
    }

    #[test]
    fn attribute_whitespace_is_escaped() {
        let mut tree = XmlTree::parse("<a/>").unwrap();
        let root = tree.document_element().unwrap();
        tree.set_attribute(root, "v", "x\ny\r\tz");
        let xml = tree.to_xml_string();
        assert!(xml.ends_with(r#"<a v="x&#10;y&#13;&#9;z"/>"#));
        assert!(!format_xml(&xml).contains("x\n"));

        let reparsed = XmlTree::parse(&xml).unwrap();
        let root = reparsed.document_element().unwrap();
        assert_eq!(reparsed.attribute(root, "v"), Some("x\ny\r\tz"));
        assert!(matches!(reparsed.kind(root), NodeKind::Element { name, .. } if name == "a"));
    }

    #[test]
    fn elements_in_document_order() {
        let tree = XmlTree::parse("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<_> = tree.elements().iter().map(|&id| tree.name(id).unwrap()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        assert_eq!(tree.elements_by_name("c").len(), 1);
        assert_eq!(tree.elements_by_name("*").len(), 4);
    }

    #[test]
    fn mutation_primitives() {
        let mut tree = XmlTree::parse("<a><b/></a>").unwrap();
        let root = tree.document_element().unwrap();
        let b = tree.element_children(root).next().unwrap();

        let c = tree.create_element("c");
        tree.insert_before(b, c);
        tree.set_attribute(c, "k", "v");
        tree.set_attribute(c, "k", "w");
        tree.set_text(b, "hello");
        assert_eq!(
            tree.to_xml_string(),
            r#"<?xml version="1.0" encoding="UTF-8"?><a><c k="w"/><b>hello</b></a>"#
        );

        assert!(tree.remove_attribute(c, "k"));
        assert!(!tree.remove_attribute(c, "k"));
        tree.detach(b);
        assert_eq!(tree.parent(b), None);
        assert_eq!(tree.to_xml_string(), r#"<?xml version="1.0" encoding="UTF-8"?><a><c/></a>"#);
    }

    #[test]
    fn indented_append_and_remove() {
        let mut tree = XmlTree::parse("<a></a>").unwrap();
        let root = tree.document_element().unwrap();
        let b = tree.create_element("b");
        tree.append_indented(root, b);
        assert_eq!(tree.children(root).len(), 2);
        assert_eq!(tree.depth(b), 1);
        tree.remove_indented(b);
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn format_basic_document() {
        let compact = r#"<?xml version="1.0" encoding="UTF-8"?><widget id="x"><name>App</name><platform name="ios"><preference name="a" value="b"/></platform><content src="index.html"/></widget>"#;
        let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<widget id=\"x\">
    <name>App</name>
    <platform name=\"ios\">
        <preference name=\"a\" value=\"b\"/>
    </platform>
    <content src=\"index.html\"/>
</widget>
";
        assert_eq!(format_xml(compact), expected);
    }

    #[test]
    fn format_ignores_existing_whitespace() {
        let spaced = "<a>\n        <b/>\n  <c>x</c>\n</a>";
        assert_eq!(format_xml(spaced), "<a>\n    <b/>\n    <c>x</c>\n</a>\n");
    }

    #[test]
    fn format_comment_keeps_level() {
        let compact = "<a><!-- hi --><b/></a>";
        assert_eq!(format_xml(compact), "<a>\n    <!-- hi -->\n    <b/>\n</a>\n");
    }

    #[test]
    fn line_classification() {
        assert_eq!(classify_line("<b/>"), LineKind::Single);
        assert_eq!(classify_line("</b>"), LineKind::Closing);
        assert_eq!(classify_line("<b x=\"1\">"), LineKind::Opening);
        assert_eq!(classify_line("text"), LineKind::Other);
        assert_eq!(classify_line("<!-- c -->"), LineKind::Other);
        assert_eq!(classify_line("<?xml version=\"1.0\"?>"), LineKind::Other);
    }

    #[test]
    fn trailing_space_rule() {
        let mut out = String::new();
        trim_spaced_line("  a b  ", &mut out);
        assert_eq!(out, "a b ");
        out.clear();
        trim_spaced_line("  keep", &mut out);
        assert_eq!(out, "  keep");
    }
}
