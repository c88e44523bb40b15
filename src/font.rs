//! Font configuration and the cosmic-text font system wrapper.
//!
//! Holds one `FontSystem` and one `SwashCache` for the whole pipeline and
//! maps the chat font kinds (small/medium/bold/italic/large) to cosmic-text
//! attributes and metrics. Changing [`FontConfig`] bumps a generation
//! counter; size caches and message buffers built under an older generation
//! must be discarded.

use cosmic_text::{Attrs, AttrsOwned, Metrics, Style, Weight};

/// The chat font roles a word can be laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontKind {
    Small,
    Medium,
    MediumBold,
    MediumItalic,
    Large,
}

impl FontKind {
    pub const ALL: [FontKind; 5] = [
        FontKind::Small,
        FontKind::Medium,
        FontKind::MediumBold,
        FontKind::MediumItalic,
        FontKind::Large,
    ];

    /// Size factor relative to the configured base size.
    fn scale(self) -> f32 {
        match self {
            FontKind::Small => 0.8,
            FontKind::Medium | FontKind::MediumBold | FontKind::MediumItalic => 1.0,
            FontKind::Large => 1.4,
        }
    }
}

/// Global font settings. A new generation invalidates measurement caches and
/// buffered message surfaces.
#[derive(Debug, Clone)]
pub struct FontConfig {
    pub family: Option<String>,
    pub base_size: f32,
    generation: u64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { family: None, base_size: 13.0, generation: 0 }
    }
}

impl FontConfig {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply new settings, invalidating everything measured under the old
    /// ones.
    pub fn update(&mut self, family: Option<String>, base_size: f32) {
        self.family = family;
        self.base_size = base_size;
        self.generation += 1;
        tracing::debug!(generation = self.generation, "font config changed");
    }
}

/// Shared cosmic-text state for shaping, measurement, and rasterization.
pub struct ChatFontSystem {
    pub font_system: cosmic_text::FontSystem,
    pub swash_cache: cosmic_text::SwashCache,
    config: FontConfig,
}

impl std::fmt::Debug for ChatFontSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatFontSystem")
            .field("config", &self.config)
            .finish()
    }
}

impl ChatFontSystem {
    pub fn new(config: FontConfig) -> Self {
        Self {
            font_system: cosmic_text::FontSystem::new(),
            swash_cache: cosmic_text::SwashCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    pub fn set_config(&mut self, family: Option<String>, base_size: f32) {
        self.config.update(family, base_size);
    }

    /// Pixel size for a font kind under the current config.
    pub fn font_size(&self, kind: FontKind) -> f32 {
        (self.config.base_size * kind.scale()).max(1.0)
    }

    /// Shaping metrics for a font kind. Line height is the conventional
    /// 1.2 × size, rounded up so stacked lines land on pixel boundaries.
    pub fn metrics(&self, kind: FontKind) -> Metrics {
        let size = self.font_size(kind);
        Metrics::new(size, (size * 1.2).ceil())
    }

    /// Cosmic-text attrs for a font kind.
    ///
    /// Borrows the configured family name; use [`Self::attrs_owned`] when the
    /// attrs must outlive a `&mut self` borrow of the font system.
    pub fn attrs(&self, kind: FontKind) -> Attrs<'_> {
        let mut attrs = match self.config.family.as_deref() {
            Some(name) => Attrs::new().family(cosmic_text::Family::Name(name)),
            None => Attrs::new().family(cosmic_text::Family::SansSerif),
        };
        attrs = match kind {
            FontKind::MediumBold => attrs.weight(Weight::BOLD),
            FontKind::MediumItalic => attrs.style(Style::Italic),
            _ => attrs,
        };
        attrs
    }

    pub fn attrs_owned(&self, kind: FontKind) -> AttrsOwned {
        AttrsOwned::new(&self.attrs(kind))
    }
}
