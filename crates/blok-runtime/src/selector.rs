//! Selectors and class-name derivation
//!
//! A selector is stored in class form: `tab-bar` for block `TabBar`,
//! `tab-bar__title` for its element `title`. The same string is the
//! registry key and the node's base document class.

use crate::ModValue;

/// Separator between block and element parts
pub const ELEMENT_SEPARATOR: &str = "__";

/// Block identifiers begin with an uppercase letter
pub fn is_block_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Lowercase a name, turning lower→upper boundaries into hyphens
///
/// `TabBar` → `tab-bar`, `Tabs` → `tabs`, `UIButton` → `uibutton`.
pub fn class_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Modifier names compare case-insensitively
pub fn mod_key(name: &str) -> String {
    name.to_lowercase()
}

/// Behavior-lookup key derived from block/element identity
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(String);

impl Selector {
    /// Selector of a block
    pub fn block(name: &str) -> Self {
        Self(class_name(name))
    }

    /// Selector of an element owned by `block`
    pub fn element(block: &Selector, element: &str) -> Self {
        Self(format!(
            "{}{ELEMENT_SEPARATOR}{}",
            block.block_part(),
            class_name(element)
        ))
    }

    /// Normalize a user-written selector (`TabBar`, `tab-bar`,
    /// `TabBar__title`, `tab-bar__title`)
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(ELEMENT_SEPARATOR) {
            Some((block, element)) => Self::element(&Self::block(block), element),
            None => Self::block(raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The block part (`tabs` for `tabs__tab`)
    pub fn block_part(&self) -> &str {
        match self.0.split_once(ELEMENT_SEPARATOR) {
            Some((block, _)) => block,
            None => &self.0,
        }
    }

    /// The element part, if this is an element selector
    pub fn element_part(&self) -> Option<&str> {
        self.0.split_once(ELEMENT_SEPARATOR).map(|(_, element)| element)
    }

    pub fn is_element(&self) -> bool {
        self.element_part().is_some()
    }

    /// Class contributed by a modifier, if any
    ///
    /// `true` → `{selector}_{name}`, a non-empty string →
    /// `{selector}_{name}_{value}`, `false` and `""` → nothing.
    pub fn mod_class(&self, name: &str, value: &ModValue) -> Option<String> {
        let name = mod_key(name);
        match value {
            ModValue::Bool(true) => Some(format!("{}_{name}", self.0)),
            ModValue::Bool(false) => None,
            ModValue::Str(s) if s.is_empty() => None,
            ModValue::Str(s) => Some(format!("{}_{name}_{s}", self.0)),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_block_name() {
        assert!(is_block_name("Tabs"));
        assert!(!is_block_name("tab"));
        assert!(!is_block_name(""));
    }

    #[test]
    fn test_class_name_boundaries() {
        assert_eq!(class_name("Tabs"), "tabs");
        assert_eq!(class_name("TabBar"), "tab-bar");
        assert_eq!(class_name("UIButton"), "uibutton");
        assert_eq!(class_name("Page2Header"), "page2-header");
        assert_eq!(class_name("closeButton"), "close-button");
        assert_eq!(class_name("tab-bar"), "tab-bar");
    }

    #[test]
    fn test_parse_forms_agree() {
        assert_eq!(Selector::parse("TabBar"), Selector::parse("tab-bar"));
        assert_eq!(Selector::parse("Tabs__tab").as_str(), "tabs__tab");
        assert_eq!(
            Selector::element(&Selector::block("Tabs"), "tab"),
            Selector::parse("tabs__tab")
        );
    }

    #[test]
    fn test_parts() {
        let sel = Selector::parse("Tabs__tab");
        assert_eq!(sel.block_part(), "tabs");
        assert_eq!(sel.element_part(), Some("tab"));
        assert!(sel.is_element());
        assert!(!Selector::block("Tabs").is_element());
    }

    #[test]
    fn test_mod_class_contract() {
        let sel = Selector::parse("tabs__tab");
        assert_eq!(
            sel.mod_class("Active", &ModValue::Bool(true)).as_deref(),
            Some("tabs__tab_active")
        );
        assert_eq!(
            sel.mod_class("State", &ModValue::from("release")).as_deref(),
            Some("tabs__tab_state_release")
        );
        assert_eq!(sel.mod_class("Active", &ModValue::Bool(false)), None);
        assert_eq!(sel.mod_class("State", &ModValue::from("")), None);
    }
}
