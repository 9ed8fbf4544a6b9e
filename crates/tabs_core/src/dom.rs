//! Live document model: an arena of elements and text nodes with queued
//! mutation records, enough of a DOM for the widget to run headless.

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::Html;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text children are written back unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Document,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn set_attr(&mut self, name: &str, value: &str) -> bool {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) if existing == value => false,
            Some((_, existing)) => {
                *existing = value.to_string();
                true
            }
            None => {
                self.attrs.push((name.to_string(), value.to_string()));
                true
            }
        }
    }

    fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| key != name);
        self.attrs.len() != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// What a registered observer wants to hear about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub subtree: bool,
    pub attributes: bool,
    /// Attribute names to report; empty means all.
    pub attribute_filter: Vec<String>,
}

impl ObserveOptions {
    fn accepts(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::Attribute(name) => {
                self.attributes
                    && (self.attribute_filter.is_empty()
                        || self.attribute_filter.iter().any(|f| f == name))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

#[derive(Debug)]
struct Registration {
    id: ObserverId,
    target: NodeId,
    options: ObserveOptions,
    records: Vec<MutationRecord>,
}

/// Owned document tree.
///
/// Every mutating call that actually changes state queues a [`MutationRecord`]
/// for the observers whose scope covers the target. Records are never delivered
/// synchronously; the host drains them with [`Document::take_records`] once the
/// mutation has fully applied.
///
/// Removed and replaced nodes are detached, not freed: the arena only grows,
/// so ids held by widgets stay valid (and report `is_connected() == false`)
/// for the life of the document. A host that keeps splicing fragments into
/// one document for a long time pays for every detached subtree.
#[derive(Debug)]
pub struct Document {
    tree: Tree<DomNode>,
    focused: Option<NodeId>,
    observers: Vec<Registration>,
    next_observer: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(DomNode::Document),
            focused: None,
            observers: Vec::new(),
            next_observer: 1,
        }
    }

    /// Parse markup into a fresh document.
    ///
    /// Input that opens with a doctype or `<html>` is parsed as a whole page,
    /// keeping the doctype and the `html`/`head`/`body` wrappers; anything else
    /// is parsed as a body fragment.
    pub fn parse(markup: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        if is_full_page(markup) {
            let page = Html::parse_document(markup);
            doc.import_children(root, page.tree.root());
        } else {
            let fragment = Html::parse_fragment(markup);
            doc.import_children(root, *fragment.root_element());
        }
        doc
    }

    pub fn root(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.tree.get(id)?.value() {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.parent().map(|p| p.id())
    }

    /// Element descendants of `scope` (excluding `scope`) in document order.
    pub fn select_all<P>(&self, scope: NodeId, pred: P) -> Vec<NodeId>
    where
        P: Fn(&ElementData) -> bool,
    {
        let Some(node) = self.tree.get(scope) else {
            return Vec::new();
        };
        node.descendants()
            .skip(1)
            .filter(|n| matches!(n.value(), DomNode::Element(el) if pred(el)))
            .map(|n| n.id())
            .collect()
    }

    pub fn select_first<P>(&self, scope: NodeId, pred: P) -> Option<NodeId>
    where
        P: Fn(&ElementData) -> bool,
    {
        self.tree
            .get(scope)?
            .descendants()
            .skip(1)
            .find(|n| matches!(n.value(), DomNode::Element(el) if pred(el)))
            .map(|n| n.id())
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|node| {
                node.children()
                    .filter(|c| matches!(c.value(), DomNode::Element(_)))
                    .map(|c| c.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nearest inclusive ancestor element matching `pred`.
    pub fn closest<P>(&self, id: NodeId, pred: P) -> Option<NodeId>
    where
        P: Fn(&ElementData) -> bool,
    {
        let node = self.tree.get(id)?;
        std::iter::once(node)
            .chain(node.ancestors())
            .find(|n| matches!(n.value(), DomNode::Element(el) if pred(el)))
            .map(|n| n.id())
    }

    /// True when `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match self.tree.get(node) {
            Some(n) => n.id() == ancestor || n.ancestors().any(|a| a.id() == ancestor),
            None => false,
        }
    }

    /// True while the node is still attached under the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.tree.get(id) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|n| match n.value() {
                DomNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Append a new element under `parent` and return its id.
    pub fn create_element(
        &mut self,
        parent: NodeId,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Option<NodeId> {
        let data = ElementData {
            name: name.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        let id = self.tree.get_mut(parent)?.append(DomNode::Element(data)).id();
        self.record(parent, MutationKind::ChildList);
        Some(id)
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Option<NodeId> {
        let id = self
            .tree
            .get_mut(parent)?
            .append(DomNode::Text(text.to_string()))
            .id();
        self.record(parent, MutationKind::ChildList);
        Some(id)
    }

    /// Detach a node from its parent. Returns false if it was already detached.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
        self.record(parent, MutationKind::ChildList);
        true
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let changed = match self.tree.get_mut(id) {
            Some(mut node) => match node.value() {
                DomNode::Element(el) => el.set_attr(name, value),
                _ => false,
            },
            None => false,
        };
        if changed {
            self.record(id, MutationKind::Attribute(name.to_string()));
        }
        changed
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let changed = match self.tree.get_mut(id) {
            Some(mut node) => match node.value() {
                DomNode::Element(el) => el.remove_attr(name),
                _ => false,
            },
            None => false,
        };
        if changed {
            self.record(id, MutationKind::Attribute(name.to_string()));
        }
        changed
    }

    /// Force `class` on or off. Returns true only if the class list changed.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        let mut classes: Vec<&str> = el
            .attr("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
            .collect();
        if classes.contains(&class) == on {
            return false;
        }
        if on {
            classes.push(class);
        } else {
            classes.retain(|c| *c != class);
        }
        let value = classes.join(" ");
        self.set_attr(id, "class", &value)
    }

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        parse_style(self.attr(id, "style")?)
            .into_iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value)
    }

    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) -> bool {
        let mut decls = parse_style(self.attr(id, "style").unwrap_or_default());
        match decls.iter_mut().find(|(key, _)| key == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => decls.push((property.to_string(), value.to_string())),
        }
        self.set_attr(id, "style", &render_style(&decls))
    }

    pub fn remove_style_property(&mut self, id: NodeId, property: &str) -> bool {
        let Some(style) = self.attr(id, "style") else {
            return false;
        };
        let mut decls = parse_style(style);
        let before = decls.len();
        decls.retain(|(key, _)| key != property);
        if decls.len() == before {
            return false;
        }
        if decls.is_empty() {
            self.remove_attr(id, "style")
        } else {
            self.set_attr(id, "style", &render_style(&decls))
        }
    }

    /// Replace the children of `id` with the parsed `markup`.
    pub fn set_inner_html(&mut self, id: NodeId, markup: &str) -> bool {
        if self.element(id).is_none() {
            return false;
        }
        let children: Vec<NodeId> = self
            .tree
            .get(id)
            .map(|node| node.children().map(|c| c.id()).collect())
            .unwrap_or_default();
        for child in children {
            if let Some(mut node) = self.tree.get_mut(child) {
                node.detach();
            }
        }
        let fragment = Html::parse_fragment(markup);
        self.import_children(id, *fragment.root_element());
        self.record(id, MutationKind::ChildList);
        true
    }

    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.element(id).is_some() && self.is_connected(id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    /// Focused element, provided it is still attached.
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused.filter(|id| self.is_connected(*id))
    }

    pub fn observe(&mut self, target: NodeId, options: ObserveOptions) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Registration {
            id,
            target,
            options,
            records: Vec::new(),
        });
        id
    }

    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|reg| reg.id == observer)
            .map(|reg| std::mem::take(&mut reg.records))
            .unwrap_or_default()
    }

    pub fn has_pending_records(&self) -> bool {
        self.observers.iter().any(|reg| !reg.records.is_empty())
    }

    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|reg| reg.id != observer);
        self.observers.len() != before
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id) {
            write_node(node, &mut out);
        }
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id) {
            for child in node.children() {
                write_node(child, &mut out);
            }
        }
        out
    }

    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    fn import_children(&mut self, parent: NodeId, source: NodeRef<'_, scraper::Node>) {
        for child in source.children() {
            match child.value() {
                scraper::Node::Element(el) => {
                    let data = ElementData {
                        name: el.name().to_string(),
                        attrs: el
                            .attrs()
                            .map(|(k, v)| (k.to_string(), v.to_string()))
                            .collect(),
                    };
                    let Some(mut parent_node) = self.tree.get_mut(parent) else {
                        return;
                    };
                    let id = parent_node.append(DomNode::Element(data)).id();
                    self.import_children(id, child);
                }
                scraper::Node::Text(text) => {
                    let text: &str = text;
                    self.append_imported(parent, DomNode::Text(text.to_string()));
                }
                scraper::Node::Comment(comment) => {
                    let comment: &str = comment;
                    self.append_imported(parent, DomNode::Comment(comment.to_string()));
                }
                scraper::Node::Doctype(doctype) => {
                    self.append_imported(parent, DomNode::Doctype(doctype.name().to_string()));
                }
                _ => {}
            }
        }
    }

    fn append_imported(&mut self, parent: NodeId, value: DomNode) {
        if let Some(mut parent_node) = self.tree.get_mut(parent) {
            parent_node.append(value);
        }
    }

    fn record(&mut self, target: NodeId, kind: MutationKind) {
        if self.observers.is_empty() {
            return;
        }
        let lineage: Vec<NodeId> = match self.tree.get(target) {
            Some(node) => std::iter::once(node.id())
                .chain(node.ancestors().map(|a| a.id()))
                .collect(),
            None => return,
        };
        for reg in &mut self.observers {
            if !reg.options.accepts(&kind) {
                continue;
            }
            let in_scope =
                reg.target == target || (reg.options.subtree && lineage.contains(&reg.target));
            if in_scope {
                reg.records.push(MutationRecord {
                    target,
                    kind: kind.clone(),
                });
            }
        }
    }
}

fn is_full_page(markup: &str) -> bool {
    let head = markup.trim_start_matches('\u{feff}').trim_start();
    let head = head.get(..9).unwrap_or(head).to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

fn render_style(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(key, value)| format!("{key}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_node(node: NodeRef<'_, DomNode>, out: &mut String) {
    match node.value() {
        DomNode::Document => {
            for child in node.children() {
                write_node(child, out);
            }
        }
        DomNode::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        DomNode::Text(text) if is_raw_text_parent(node) => out.push_str(text),
        DomNode::Text(text) => escape_into(text, false, out),
        DomNode::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        DomNode::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (key, value) in &el.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.name.as_str()) {
                return;
            }
            for child in node.children() {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn is_raw_text_parent(node: NodeRef<'_, DomNode>) -> bool {
    node.parent().is_some_and(|parent| match parent.value() {
        DomNode::Element(el) => RAW_TEXT_ELEMENTS.contains(&el.name.as_str()),
        _ => false,
    })
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_style, render_style, Document};

    #[test]
    fn style_declarations_parse_and_render() {
        let decls = parse_style(" Display: none ;visibility:hidden;;");
        assert_eq!(
            decls,
            vec![
                ("display".to_string(), "none".to_string()),
                ("visibility".to_string(), "hidden".to_string()),
            ]
        );
        assert_eq!(render_style(&decls), "display: none; visibility: hidden;");
    }

    #[test]
    fn removing_last_style_property_drops_attribute() {
        let mut doc = Document::parse(r#"<div id="w" style="display: none"></div>"#);
        let w = doc.select_first(doc.root(), |el| el.id() == Some("w")).unwrap();
        assert!(doc.remove_style_property(w, "display"));
        assert_eq!(doc.attr(w, "style"), None);
        assert!(!doc.remove_style_property(w, "display"));
    }

    #[test]
    fn serializer_escapes_text_and_attributes() {
        let doc = Document::parse(r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3<br></p>"#);
        assert_eq!(
            doc.to_html(),
            r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3<br></p>"#
        );
    }

    #[test]
    fn script_and_style_text_is_written_verbatim() {
        let markup = "<div id=\"w\"><script>if (a < b && c) { x(); }</script><style>a > b { color: red; }</style></div>";
        let mut doc = Document::parse(markup);
        assert_eq!(doc.to_html(), markup);

        let w = doc.select_first(doc.root(), |el| el.id() == Some("w")).unwrap();
        let spliced = r#"<script type="application/ld+json">{"name": "Tee & <Co>"}</script>"#;
        assert!(doc.set_inner_html(w, spliced));
        assert_eq!(doc.inner_html(w), spliced);
    }

    #[test]
    fn full_page_keeps_doctype_wrappers_and_comments() {
        let page = concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><title>Shop</title></head>",
            "<body><!-- product tabs --><div id=\"w\"></div></body></html>",
        );
        let doc = Document::parse(page);
        assert_eq!(doc.to_html(), page);
        assert!(doc.select_first(doc.root(), |el| el.id() == Some("w")).is_some());
    }

    #[test]
    fn removed_node_stays_addressable_but_disconnected() {
        let mut doc = Document::parse(r#"<div id="w"><p id="x">hi</p></div>"#);
        let x = doc.select_first(doc.root(), |el| el.id() == Some("x")).unwrap();
        assert!(doc.remove(x));
        assert!(!doc.is_connected(x));
        assert_eq!(doc.text_content(x), "hi");
        assert_eq!(doc.to_html(), r#"<div id="w"></div>"#);
    }
}
