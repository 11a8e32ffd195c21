/*!
 * Font tables and font resolution.
 *
 * A composition's `font_id` is scoped: paragraphs living inside an embedded
 * object resolve fonts against that object's table, which starts as a copy
 * of the page table and is overridden by the object's own fonts.
 */

use std::collections::HashMap;

use super::model::{Font, Page, Paragraph};

/// Font table keyed by font id.
pub type FontMap = HashMap<String, Font>;

/// Read-only font tables for one page.
#[derive(Debug, Clone, Default)]
pub struct PageFontMaps {
    pub page: FontMap,
    pub xobjects: HashMap<i64, FontMap>,
}

impl PageFontMaps {
    /// Snapshot the font tables of a page.
    pub fn from_page(page: &Page) -> Self {
        let page_map: FontMap = page
            .fonts
            .iter()
            .map(|font| (font.font_id.clone(), font.clone()))
            .collect();

        let xobjects = page
            .xobjects
            .iter()
            .map(|xobj| {
                let mut map = page_map.clone();
                for font in &xobj.fonts {
                    map.insert(font.font_id.clone(), font.clone());
                }
                (xobj.xobj_id, map)
            })
            .collect();

        Self {
            page: page_map,
            xobjects,
        }
    }

    /// Font table that applies to a paragraph.
    pub fn for_paragraph(&self, paragraph: &Paragraph) -> &FontMap {
        paragraph
            .xobj_id
            .and_then(|id| self.xobjects.get(&id))
            .unwrap_or(&self.page)
    }
}

/// Font chosen for rendering translated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    /// Stable identifier used for equality checks
    pub font_id: String,
}

/// Maps a source font to the font that will render translated text.
pub trait FontResolver: Send + Sync {
    /// Resolve `font` for text with the given encoding hint.
    fn map(&self, font: &Font, encoding_hint: &str) -> Option<ResolvedFont>;
}

/// Resolver that picks a target face from the font's traits.
///
/// Fonts that differ only in ways the target faces cannot express (for
/// example two serif regular fonts from different foundries) resolve to the
/// same target and are therefore interchangeable.
#[derive(Debug, Clone, Default)]
pub struct KeywordFontResolver;

impl KeywordFontResolver {
    fn has_keyword(name: &str, keywords: &[&str]) -> bool {
        let lower = name.to_lowercase();
        keywords.iter().any(|k| lower.contains(k))
    }
}

impl FontResolver for KeywordFontResolver {
    fn map(&self, font: &Font, _encoding_hint: &str) -> Option<ResolvedFont> {
        let monospace = font.monospace || Self::has_keyword(&font.name, &["mono", "courier", "consol"]);
        let bold = font.bold || Self::has_keyword(&font.name, &["bold", "black", "heavy", "semibold"]);
        let italic = font.italic || Self::has_keyword(&font.name, &["italic", "oblique"]);
        let serif = font.serif || Self::has_keyword(&font.name, &["serif", "times", "roman"]);

        let family = if monospace {
            "mono"
        } else if serif && !Self::has_keyword(&font.name, &["sans"]) {
            "serif"
        } else {
            "sans"
        };
        let face = match (bold, italic) {
            (true, true) => "bold-italic",
            (true, false) => "bold",
            (false, true) => "italic",
            (false, false) => "regular",
        };

        Some(ResolvedFont {
            font_id: format!("{}-{}", family, face),
        })
    }
}
