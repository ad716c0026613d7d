//! Placeholder substitution for localized strings

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

use crate::infrastructure::config::Design;

pub const DEVELOPER: &str = env!("CARGO_PKG_AUTHORS");
pub const DEVELOPER_URL: &str = env!("CARGO_PKG_HOMEPAGE");

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{(e\.)?([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Expands `{name}`, `{e.<emoji>}`, `{developer}`, `{developer_url}`, `{{` and `}}`.
/// Placeholders without a value are left as they are.
pub fn format_text(template: &str, design: &Design, args: &[(&str, &str)]) -> String {
    if !template.contains('{') && !template.contains('}') {
        return template.to_string();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let whole = &caps[0];
            match whole {
                "{{" => return "{".to_string(),
                "}}" => return "}".to_string(),
                _ => {}
            }

            let name = &caps[2];
            if caps.get(1).is_some() {
                return design.emoji(name).to_string();
            }

            if let Some((_, value)) = args.iter().find(|(k, _)| *k == name) {
                return value.to_string();
            }

            match name {
                "developer" => DEVELOPER.to_string(),
                "developer_url" => DEVELOPER_URL.to_string(),
                _ => whole.to_string(),
            }
        })
        .into_owned()
}
