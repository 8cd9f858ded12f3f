//! # Catalogs
//!
//! Browsable collections of ready-made content: card templates, built-in
//! icons and caller-supplied logos. Each entry either produces a layer that
//! can be handed to `add_layer`, or (templates) a whole fresh document.
//!
//! Search is case-insensitive over name, id and tags; category and tag
//! filters are exact.

use cardkit_core::Color;
use serde::{Deserialize, Serialize};

use crate::background::Background;
use crate::document::Document;
use crate::icons::{builtin_icons, IconDef};
use crate::model::{LayerContent, LayerNode, ShapeKind};

/// Something that can be listed and filtered in a catalog.
pub trait CatalogItem {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn category(&self) -> &str;
    fn tags(&self) -> &[String];

    fn matches_search(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.name().to_lowercase().contains(&q)
            || self.id().to_lowercase().contains(&q)
            || self.tags().iter().any(|t| t.to_lowercase().contains(&q))
    }
}

/// Search criteria. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Entry must carry at least one of these tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    fn accepts<T: CatalogItem>(&self, item: &T) -> bool {
        if let Some(q) = &self.query {
            if !item.matches_search(q) {
                return false;
            }
        }
        if let Some(cat) = &self.category {
            if !item.category().eq_ignore_ascii_case(cat) {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| item.tags().contains(t)) {
            return false;
        }
        true
    }
}

/// Ordered collection of catalog entries with unique ids.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    items: Vec<T>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: CatalogItem> Catalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Returns `false` if an entry with the same id exists.
    pub fn insert(&mut self, item: T) -> bool {
        if self.get(item.id()).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let pos = self.items.iter().position(|i| i.id() == id)?;
        Some(self.items.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn list_all(&self) -> Vec<&T> {
        self.items.iter().collect()
    }

    pub fn filter(&self, filter: &CatalogFilter) -> Vec<&T> {
        self.items.iter().filter(|i| filter.accepts(*i)).collect()
    }

    /// Distinct categories in insertion order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for item in &self.items {
            if !out.contains(&item.category()) {
                out.push(item.category());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: CatalogItem> FromIterator<T> for Catalog<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}

/// A card layout to start a design from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub document: Document,
}

impl TemplateEntry {
    /// Fresh document from this template. The document and every layer get
    /// new ids, so two instances never share identifiers.
    pub fn instantiate(&self) -> Document {
        let mut doc = self.document.clone();
        doc.id = uuid::Uuid::new_v4().to_string();
        for layer in &mut doc.layers {
            layer.regenerate_ids();
        }
        tracing::debug!("Instantiated template '{}' as {}", self.id, doc.id);
        doc
    }
}

impl CatalogItem for TemplateEntry {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl From<&IconDef> for IconEntry {
    fn from(def: &IconDef) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            category: def.category.to_string(),
            tags: def.tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl IconEntry {
    /// Icon layer at the default size, ready for `add_layer`.
    pub fn to_layer(&self, x: f64, y: f64) -> LayerNode {
        LayerNode::icon(self.id.clone(), x, y).with_name(self.name.clone())
    }
}

impl CatalogItem for IconEntry {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// A logo image the caller has made available, usually an `asset://` ref.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source: String,
    /// Natural size in canvas pixels.
    pub width: f64,
    pub height: f64,
}

impl LogoEntry {
    pub fn to_layer(&self, x: f64, y: f64) -> LayerNode {
        LayerNode::logo(self.source.clone(), x, y, self.width, self.height)
            .with_name(self.name.clone())
    }
}

impl CatalogItem for LogoEntry {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

pub fn icon_catalog() -> Catalog<IconEntry> {
    builtin_icons().iter().map(IconEntry::from).collect()
}

fn template(
    id: &str,
    name: &str,
    category: &str,
    tags: &[&str],
    description: &str,
    background: Background,
    layers: Vec<LayerNode>,
) -> TemplateEntry {
    let mut document = Document::business_card();
    document.name = name.to_string();
    document.background = background;
    document.layers = layers;
    for layer in &mut document.layers {
        layer.assign_missing_ids();
    }
    TemplateEntry {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        description: description.to_string(),
        document,
    }
}

fn heading(text: &str, x: f64, y: f64, size: f64, color: Color) -> LayerNode {
    let mut node = LayerNode::text(text, x, y);
    if let LayerContent::Text(t) = &mut node.content {
        t.font_size = size;
        t.bold = true;
        t.color = color;
        node.height = t.block_height();
    }
    node
}

fn contact_line(icon: &str, text: &str, x: f64, y: f64, color: Color) -> Vec<LayerNode> {
    let mut glyph = LayerNode::icon(icon, x, y);
    glyph.width = 12.0;
    glyph.height = 12.0;
    if let LayerContent::Icon(i) = &mut glyph.content {
        i.fill = color;
    }
    let mut label = LayerNode::text(text, x + 18.0, y - 1.0);
    if let LayerContent::Text(t) = &mut label.content {
        t.font_size = 10.0;
        t.color = color;
        label.height = t.block_height();
    }
    vec![glyph, label]
}

/// Built-in card layouts.
pub fn template_catalog() -> Catalog<TemplateEntry> {
    let dark = Color::rgb(0x22, 0x22, 0x22);
    let accent = Color::rgb(0x1f, 0x6f, 0xeb);

    let mut minimal_layers = vec![
        heading("Your Name", 24.0, 28.0, 20.0, dark),
        heading("Job Title", 24.0, 56.0, 11.0, Color::rgb(0x66, 0x66, 0x66)),
    ];
    minimal_layers.extend(contact_line("phone", "+1 555 0100", 24.0, 92.0, dark));
    minimal_layers.extend(contact_line("mail", "name@example.com", 24.0, 110.0, dark));

    let mut bar = LayerNode::shape(
        ShapeKind::Rectangle { corner_radius: 0.0 },
        0.0,
        0.0,
        10.0,
        144.0,
    );
    if let LayerContent::Shape(s) = &mut bar.content {
        s.fill = Some(accent);
    }
    let mut accent_layers = vec![
        bar.with_name("Accent bar"),
        heading("Your Name", 28.0, 24.0, 18.0, dark),
    ];
    accent_layers.extend(contact_line("globe", "example.com", 28.0, 100.0, dark));
    accent_layers.extend(contact_line("location", "1 Main Street", 28.0, 118.0, dark));

    let mut bold_layers = vec![
        heading("YOUR NAME", 24.0, 40.0, 22.0, Color::WHITE),
        heading("Founder", 24.0, 72.0, 12.0, Color::WHITE),
    ];
    bold_layers.extend(contact_line("phone", "+1 555 0100", 24.0, 108.0, Color::WHITE));

    [
        template(
            "minimal",
            "Minimal",
            "professional",
            &["simple", "clean", "white"],
            "Name, title and two contact lines on white.",
            Background::default(),
            minimal_layers,
        ),
        template(
            "accent-bar",
            "Accent Bar",
            "professional",
            &["modern", "color"],
            "Left color bar with name and contact details.",
            Background::default(),
            accent_layers,
        ),
        template(
            "bold-gradient",
            "Bold Gradient",
            "creative",
            &["gradient", "dark", "color"],
            "White type on a diagonal gradient.",
            Background::gradient(vec![Color::rgb(0x1f, 0x2a, 0x44), accent], 135.0),
            bold_layers,
        ),
        template(
            "blank",
            "Blank",
            "basic",
            &["empty"],
            "An empty landscape card.",
            Background::default(),
            Vec::new(),
        ),
    ]
    .into_iter()
    .collect()
}
