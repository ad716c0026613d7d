//! Localization packages and string lookup

pub mod format;
pub mod package;
pub mod provider;

pub use format::{format_text, DEVELOPER, DEVELOPER_URL};
pub use package::{Author, LocalizationPackage};
pub use provider::{ContextLocalization, LocalizationProvider, TranslationTarget, FALLBACK_LOCALE};
