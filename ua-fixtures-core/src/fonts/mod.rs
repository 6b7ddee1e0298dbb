//! Font program loading for embedded composite fonts.

mod loader;
mod source;

pub use loader::{FontData, FontFormat, FontLoader};
pub use source::{FontSource, StaticFontSource, SystemFontSource, DEFAULT_FONT_CANDIDATES};
