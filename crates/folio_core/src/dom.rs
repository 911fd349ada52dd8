//! Headless document model
//!
//! A small element tree that stands in for the browser DOM. Elements carry
//! layout rects (in document coordinates) so intersection observation can be
//! computed, and inline style overrides so animation state can be written,
//! read back, and cleared again on teardown.
//!
//! `Document` is a cheap-clone handle; all clones share the same tree.
//!
//! ```rust
//! use folio_core::dom::{Document, ElementSpec, Property, Rect, Selector};
//!
//! let doc = Document::new();
//! let section = doc.append(doc.body(), ElementSpec::new("section").class("hero")).unwrap();
//! let title_spec = ElementSpec::new("h1")
//!     .class("hero-title")
//!     .rect(Rect::new(0.0, 0.0, 800.0, 120.0));
//! let title = doc.append(section, title_spec).unwrap();
//!
//! let found = doc.select_all(section, &Selector::parse(".hero-title").unwrap());
//! assert_eq!(found, vec![title]);
//!
//! doc.set_style(title, Property::Opacity, 0.0).unwrap();
//! assert_eq!(doc.computed_style(title, Property::Opacity), 0.0);
//! ```

use crate::error::{DomError, Result};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

new_key_type! {
    /// Handle to an element in a [`Document`]
    pub struct ElementId;
}

/// Axis-aligned rectangle in CSS pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection of two rects
    ///
    /// Edge-adjacent rects produce a zero-area intersection rather than
    /// `None`, matching how browsers report touching boxes.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < x || bottom < y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Grow (positive) or shrink (negative) each edge independently
    pub fn inflate(&self, top: f32, right: f32, bottom: f32, left: f32) -> Rect {
        Rect::new(
            self.x - left,
            self.y - top,
            self.width + left + right,
            self.height + top + bottom,
        )
    }
}

/// Style properties the animation layer is allowed to override inline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
    /// SVG stroke offset in percent of path length (100 = hidden, 0 = drawn)
    StrokeDashoffset,
    /// Width as a percentage of the parent (bar fills)
    WidthPercent,
    /// Displayed numeric value of a counter
    Counter,
}

impl Property {
    /// Value the property has when no inline override is present
    pub fn initial(self) -> f32 {
        match self {
            Property::Opacity | Property::Scale => 1.0,
            Property::TranslateX
            | Property::TranslateY
            | Property::StrokeDashoffset
            | Property::WidthPercent
            | Property::Counter => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::Opacity => "opacity",
            Property::TranslateX => "translate-x",
            Property::TranslateY => "translate-y",
            Property::Scale => "scale",
            Property::StrokeDashoffset => "stroke-dashoffset",
            Property::WidthPercent => "width",
            Property::Counter => "counter",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Simple selector: `.class`, `#id` or a bare tag name
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    Class(String),
    Id(String),
    Tag(String),
}

impl Selector {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (sigil, name) = if let Some(rest) = text.strip_prefix('.') {
            (Some('.'), rest)
        } else if let Some(rest) = text.strip_prefix('#') {
            (Some('#'), rest)
        } else {
            (None, text)
        };

        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(DomError::InvalidSelector(text.to_string()));
        }

        let name = name.to_string();
        Ok(match sigil {
            Some('.') => Selector::Class(name),
            Some(_) => Selector::Id(name),
            None => Selector::Tag(name),
        })
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Class(name) => write!(f, ".{name}"),
            Selector::Id(name) => write!(f, "#{name}"),
            Selector::Tag(name) => f.write_str(name),
        }
    }
}

/// Description of an element to create
#[derive(Clone, Debug, Default)]
pub struct ElementSpec {
    tag: String,
    id: Option<String>,
    classes: SmallVec<[String; 4]>,
    rect: Rect,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }
}

struct ElementData {
    tag: String,
    id: Option<String>,
    classes: SmallVec<[String; 4]>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    rect: Rect,
    inline: FxHashMap<Property, f32>,
}

impl ElementData {
    fn from_spec(spec: ElementSpec) -> Self {
        Self {
            tag: spec.tag,
            id: spec.id,
            classes: spec.classes,
            parent: None,
            children: Vec::new(),
            rect: spec.rect,
            inline: FxHashMap::default(),
        }
    }

    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Class(name) => self.classes.iter().any(|c| c == name),
            Selector::Id(name) => self.id.as_deref() == Some(name.as_str()),
            Selector::Tag(name) => self.tag.eq_ignore_ascii_case(name),
        }
    }
}

struct DocumentInner {
    elements: SlotMap<ElementId, ElementData>,
    body: ElementId,
    mutations: u64,
}

impl DocumentInner {
    fn is_ancestor(&self, ancestor: ElementId, mut node: ElementId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.elements.get(node).and_then(|e| e.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn unlink(&mut self, element: ElementId) {
        let parent = self.elements.get_mut(element).and_then(|e| e.parent.take());
        if let Some(parent) = parent.and_then(|p| self.elements.get_mut(p)) {
            parent.children.retain(|c| *c != element);
        }
    }
}

/// Shared handle to a headless document
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Document {
    /// Create an empty document containing only `<body>`
    pub fn new() -> Self {
        let mut elements = SlotMap::with_key();
        let body = elements.insert(ElementData::from_spec(ElementSpec::new("body")));
        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                elements,
                body,
                mutations: 0,
            })),
        }
    }

    pub fn body(&self) -> ElementId {
        self.inner.borrow().body
    }

    /// Create a detached element
    pub fn create(&self, spec: ElementSpec) -> ElementId {
        self.inner
            .borrow_mut()
            .elements
            .insert(ElementData::from_spec(spec))
    }

    /// Create an element and append it to `parent`
    pub fn append(&self, parent: ElementId, spec: ElementSpec) -> Result<ElementId> {
        if !self.contains(parent) {
            return Err(DomError::UnknownElement);
        }
        let child = self.create(spec);
        self.append_child(parent, child)?;
        Ok(child)
    }

    /// Move `child` under `parent`, detaching it from any previous parent
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if !inner.elements.contains_key(parent) || !inner.elements.contains_key(child) {
            return Err(DomError::UnknownElement);
        }
        if inner.is_ancestor(child, parent) {
            return Err(DomError::Cycle);
        }
        inner.unlink(child);
        inner.elements[child].parent = Some(parent);
        inner.elements[parent].children.push(child);
        Ok(())
    }

    /// Detach an element (and its subtree) from its parent without destroying it
    pub fn detach(&self, element: ElementId) {
        self.inner.borrow_mut().unlink(element);
    }

    /// Destroy an element and its whole subtree
    pub fn remove(&self, element: ElementId) {
        let mut inner = self.inner.borrow_mut();
        if element == inner.body {
            return;
        }
        inner.unlink(element);
        let mut stack = vec![element];
        while let Some(id) = stack.pop() {
            if let Some(data) = inner.elements.remove(id) {
                stack.extend(data.children);
            }
        }
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.inner.borrow().elements.contains_key(element)
    }

    /// Whether the element is reachable from `<body>`
    pub fn is_connected(&self, element: ElementId) -> bool {
        let inner = self.inner.borrow();
        inner.elements.contains_key(element) && inner.is_ancestor(inner.body, element)
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.inner.borrow().elements.get(element).and_then(|e| e.parent)
    }

    pub fn tag(&self, element: ElementId) -> Option<String> {
        self.inner.borrow().elements.get(element).map(|e| e.tag.clone())
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.inner
            .borrow()
            .elements
            .get(element)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    pub fn rect(&self, element: ElementId) -> Option<Rect> {
        self.inner.borrow().elements.get(element).map(|e| e.rect)
    }

    pub fn set_rect(&self, element: ElementId, rect: Rect) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let data = inner
            .elements
            .get_mut(element)
            .ok_or(DomError::UnknownElement)?;
        data.rect = rect;
        Ok(())
    }

    // =========================================================================
    // Inline styles
    // =========================================================================

    /// Write an inline style override
    pub fn set_style(&self, element: ElementId, property: Property, value: f32) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let data = inner
            .elements
            .get_mut(element)
            .ok_or(DomError::UnknownElement)?;
        data.inline.insert(property, value);
        inner.mutations += 1;
        Ok(())
    }

    /// Remove an inline style override
    ///
    /// Returns `true` if an override was present.
    pub fn clear_style(&self, element: ElementId, property: Property) -> bool {
        let mut inner = self.inner.borrow_mut();
        let removed = inner
            .elements
            .get_mut(element)
            .and_then(|e| e.inline.remove(&property))
            .is_some();
        if removed {
            inner.mutations += 1;
        }
        removed
    }

    pub fn inline_style(&self, element: ElementId, property: Property) -> Option<f32> {
        self.inner
            .borrow()
            .elements
            .get(element)
            .and_then(|e| e.inline.get(&property).copied())
    }

    /// Inline value if present, otherwise the property's initial value
    pub fn computed_style(&self, element: ElementId, property: Property) -> f32 {
        self.inline_style(element, property)
            .unwrap_or_else(|| property.initial())
    }

    /// Properties currently overridden inline, sorted
    pub fn inline_properties(&self, element: ElementId) -> Vec<Property> {
        let inner = self.inner.borrow();
        let mut props: Vec<Property> = inner
            .elements
            .get(element)
            .map(|e| e.inline.keys().copied().collect())
            .unwrap_or_default();
        props.sort();
        props
    }

    /// Total number of inline style writes and removals so far
    pub fn mutation_count(&self) -> u64 {
        self.inner.borrow().mutations
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn matches(&self, element: ElementId, selector: &Selector) -> bool {
        self.inner
            .borrow()
            .elements
            .get(element)
            .is_some_and(|e| e.matches(selector))
    }

    /// All descendants of `root` (excluding `root`) matching `selector`,
    /// in document order
    pub fn select_all(&self, root: ElementId, selector: &Selector) -> Vec<ElementId> {
        let inner = self.inner.borrow();
        let Some(root_data) = inner.elements.get(root) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut stack: Vec<ElementId> = root_data.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let data = &inner.elements[id];
            if data.matches(selector) {
                found.push(id);
            }
            stack.extend(data.children.iter().rev().copied());
        }
        found
    }

    /// First descendant of `root` matching `selector`
    pub fn select(&self, root: ElementId, selector: &Selector) -> Option<ElementId> {
        self.select_all(root, selector).into_iter().next()
    }

    /// Number of live elements, including `<body>`
    pub fn len(&self) -> usize {
        self.inner.borrow().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("elements", &inner.elements.len())
            .field("mutations", &inner.mutations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, ElementId, ElementId, ElementId) {
        let doc = Document::new();
        let section = doc
            .append(doc.body(), ElementSpec::new("section").id("about"))
            .unwrap();
        let a = doc
            .append(section, ElementSpec::new("p").class("line"))
            .unwrap();
        let b = doc
            .append(section, ElementSpec::new("p").class("line").class("muted"))
            .unwrap();
        (doc, section, a, b)
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(
            Selector::parse(".hero-title").unwrap(),
            Selector::Class("hero-title".into())
        );
        assert_eq!(Selector::parse("#about").unwrap(), Selector::Id("about".into()));
        assert_eq!(Selector::parse(" h1 ").unwrap(), Selector::Tag("h1".into()));
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse(".").is_err());
        assert!(Selector::parse(".a b").is_err());
        assert!(Selector::parse("#1abc").is_err());
    }

    #[test]
    fn test_select_all_document_order() {
        let (doc, section, a, b) = sample();
        let lines = doc.select_all(section, &".line".parse().unwrap());
        assert_eq!(lines, vec![a, b]);

        let muted = doc.select_all(doc.body(), &".muted".parse().unwrap());
        assert_eq!(muted, vec![b]);

        // Root itself is excluded
        assert!(doc.select_all(section, &"#about".parse().unwrap()).is_empty());
        assert_eq!(
            doc.select(doc.body(), &"#about".parse().unwrap()),
            Some(section)
        );
    }

    #[test]
    fn test_inline_styles_and_mutations() {
        let (doc, _, a, _) = sample();
        assert_eq!(doc.mutation_count(), 0);
        assert_eq!(doc.computed_style(a, Property::Opacity), 1.0);

        doc.set_style(a, Property::Opacity, 0.25).unwrap();
        doc.set_style(a, Property::TranslateY, 40.0).unwrap();
        assert_eq!(doc.inline_style(a, Property::Opacity), Some(0.25));
        assert_eq!(
            doc.inline_properties(a),
            vec![Property::Opacity, Property::TranslateY]
        );
        assert_eq!(doc.mutation_count(), 2);

        assert!(doc.clear_style(a, Property::Opacity));
        assert!(!doc.clear_style(a, Property::Opacity));
        assert_eq!(doc.mutation_count(), 3);
        assert_eq!(doc.computed_style(a, Property::Opacity), 1.0);
    }

    #[test]
    fn test_connection_and_removal() {
        let (doc, section, a, b) = sample();
        assert!(doc.is_connected(a));

        doc.detach(section);
        assert!(!doc.is_connected(a));
        assert!(doc.contains(a));

        doc.remove(section);
        assert!(!doc.contains(a));
        assert!(!doc.contains(b));
        assert_eq!(doc.set_style(a, Property::Opacity, 0.0), Err(DomError::UnknownElement));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (doc, section, a, _) = sample();
        assert_eq!(doc.append_child(a, section), Err(DomError::Cycle));
        assert_eq!(doc.parent(a), Some(section));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));

        let touching = Rect::new(100.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&touching).map(|r| r.area()), Some(0.0));

        let apart = Rect::new(200.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&apart), None);

        assert_eq!(
            a.inflate(0.0, 0.0, -20.0, 0.0),
            Rect::new(0.0, 0.0, 100.0, 80.0)
        );
    }
}
