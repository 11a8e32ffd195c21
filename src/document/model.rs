/*!
 * Intermediate representation of a laid-out document.
 *
 * These types mirror what the layout stage hands to the translator: pages
 * with their font tables, embedded objects and paragraphs, each paragraph
 * an ordered list of compositions. All of them are JSON-serializable so a
 * document can be read from and written back to disk unchanged apart from
 * the translated paragraphs.
 */

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Layout label carried by title paragraphs
pub const TITLE_LABEL: &str = "title";

/// Complete document: an ordered list of pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pages in reading order
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Document {
    /// Total number of paragraphs across all pages.
    pub fn paragraph_count(&self) -> usize {
        self.pages.iter().map(|page| page.paragraphs.len()).sum()
    }

    /// First paragraph labelled as a title, in page order.
    pub fn find_title_paragraph(&self) -> Option<&Paragraph> {
        self.pages
            .iter()
            .flat_map(|page| page.paragraphs.iter())
            .find(|paragraph| paragraph.is_title())
    }
}

/// A single page with its font table, embedded objects and paragraphs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page number
    #[serde(default)]
    pub page_number: usize,

    /// Fonts declared on the page
    #[serde(default)]
    pub fonts: Vec<Font>,

    /// Embedded objects carrying their own font tables
    #[serde(default)]
    pub xobjects: Vec<XObject>,

    /// Paragraphs in reading order
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

/// Embedded object (form, image) with a locally scoped font table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XObject {
    pub xobj_id: i64,

    #[serde(default)]
    pub fonts: Vec<Font>,
}

/// Font declared in a page or xobject font table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Font {
    /// Identifier the styles refer to, scoped to its table
    pub font_id: String,

    /// PostScript or family name
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub bold: bool,

    #[serde(default)]
    pub italic: bool,

    #[serde(default)]
    pub monospace: bool,

    #[serde(default)]
    pub serif: bool,
}

/// Drawing state attached to a style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphicState {
    /// Raw per-character drawing instructions (colour, render mode)
    #[serde(default)]
    pub passthrough_per_char_instruction: Option<String>,
}

/// Visual style of a run of characters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Style {
    /// Font reference into the page or xobject font table
    #[serde(default)]
    pub font_id: Option<String>,

    pub font_size: f64,

    #[serde(default)]
    pub graphic_state: Option<GraphicState>,
}

impl Style {
    pub fn new(font_id: impl Into<String>, font_size: f64) -> Self {
        Self {
            font_id: Some(font_id.into()),
            font_size,
            graphic_state: None,
        }
    }

    pub fn with_graphic_state(mut self, instruction: impl Into<String>) -> Self {
        self.graphic_state = Some(GraphicState {
            passthrough_per_char_instruction: Some(instruction.into()),
        });
        self
    }
}

/// A single glyph with its unicode text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Character {
    /// Unicode text of the glyph, or a `(cid:N)` marker when unmapped
    pub char_unicode: String,
}

impl Character {
    pub fn new(char_unicode: impl Into<String>) -> Self {
        Self {
            char_unicode: char_unicode.into(),
        }
    }

    /// Whether the glyph has no unicode mapping.
    pub fn is_unmapped(&self) -> bool {
        is_cid_marker(&self.char_unicode)
    }
}

fn is_cid_marker(text: &str) -> bool {
    text.strip_prefix("(cid:")
        .and_then(|rest| rest.strip_suffix(')'))
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// Concatenate the unicode text of a character sequence.
pub fn characters_to_string(characters: &[Character]) -> String {
    characters.iter().map(|c| c.char_unicode.as_str()).collect()
}

/// Build characters from a string, one per char. Mostly used by tests and tools.
pub fn characters_from_str(text: &str) -> Vec<Character> {
    text.chars().map(|c| Character::new(c.to_string())).collect()
}

/// Line of characters sharing the paragraph style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    #[serde(default)]
    pub characters: Vec<Character>,
}

/// Math run; opaque to translation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Formula {
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl Formula {
    pub fn text(&self) -> String {
        characters_to_string(&self.characters)
    }
}

/// Run of characters sharing one style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SameStyleCharacters {
    #[serde(default)]
    pub characters: Vec<Character>,

    pub style: Style,
}

impl SameStyleCharacters {
    pub fn text(&self) -> String {
        characters_to_string(&self.characters)
    }
}

/// Already-translated text with a style; produced by the translator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SameStyleUnicodeCharacters {
    pub unicode: String,

    #[serde(default)]
    pub style: Option<Style>,
}

/// One ordered element of a paragraph.
///
/// Formula and styled-run payloads are reference counted so that a
/// translated paragraph can hand back the very object it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Composition {
    Line(Line),
    Formula(Arc<Formula>),
    Character(Character),
    SameStyleCharacters(Arc<SameStyleCharacters>),
    SameStyleUnicodeCharacters(SameStyleUnicodeCharacters),
    /// Composition kind this crate does not understand
    #[serde(other)]
    Unknown,
}

impl Composition {
    pub fn line(text: &str) -> Self {
        Self::Line(Line {
            characters: characters_from_str(text),
        })
    }

    pub fn formula(text: &str) -> Self {
        Self::Formula(Arc::new(Formula {
            characters: characters_from_str(text),
        }))
    }

    pub fn styled(text: &str, style: Style) -> Self {
        Self::SameStyleCharacters(Arc::new(SameStyleCharacters {
            characters: characters_from_str(text),
            style,
        }))
    }

    pub fn unicode(text: impl Into<String>, style: Option<Style>) -> Self {
        Self::SameStyleUnicodeCharacters(SameStyleUnicodeCharacters {
            unicode: text.into(),
            style,
        })
    }

    /// Text carried by the composition, if any.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Line(line) => Some(characters_to_string(&line.characters)),
            Self::Formula(formula) => Some(formula.text()),
            Self::Character(character) => Some(character.char_unicode.clone()),
            Self::SameStyleCharacters(run) => Some(run.text()),
            Self::SameStyleUnicodeCharacters(run) => Some(run.unicode.clone()),
            Self::Unknown => None,
        }
    }
}

/// A paragraph as produced by layout analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Stable identifier used in logs and reports
    #[serde(default)]
    pub debug_id: String,

    /// Flattened text of the paragraph
    #[serde(default)]
    pub unicode: String,

    /// Base style of the paragraph
    #[serde(default)]
    pub style: Option<Style>,

    #[serde(default)]
    pub layout_label: Option<String>,

    /// Vertical text is passed through untranslated
    #[serde(default)]
    pub vertical: bool,

    /// Owning embedded object, if any
    #[serde(default)]
    pub xobj_id: Option<i64>,

    #[serde(default)]
    pub compositions: Vec<Composition>,
}

impl Paragraph {
    /// Create a paragraph whose flattened text is derived from its compositions.
    pub fn new(debug_id: impl Into<String>, style: Option<Style>, compositions: Vec<Composition>) -> Self {
        let unicode = compositions.iter().filter_map(Composition::text).collect();
        Self {
            debug_id: debug_id.into(),
            unicode,
            style,
            layout_label: None,
            vertical: false,
            xobj_id: None,
            compositions,
        }
    }

    pub fn with_layout_label(mut self, label: impl Into<String>) -> Self {
        self.layout_label = Some(label.into());
        self
    }

    pub fn is_title(&self) -> bool {
        self.layout_label.as_deref() == Some(TITLE_LABEL)
    }
}
