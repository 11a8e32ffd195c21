/*!
 * Document intermediate representation consumed by the translator.
 *
 * - `model`: pages, paragraphs, compositions and styles
 * - `fonts`: font tables and font resolution
 */

pub mod fonts;
pub mod model;

pub use self::fonts::{FontMap, FontResolver, KeywordFontResolver, PageFontMaps, ResolvedFont};
pub use self::model::{
    Character, Composition, Document, Font, Formula, GraphicState, Line, Page, Paragraph,
    SameStyleCharacters, SameStyleUnicodeCharacters, Style, XObject, characters_from_str,
    characters_to_string, TITLE_LABEL,
};
