pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }

    pub fn pressed(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Key-value storage for the theme flag (`localStorage` in the browser).
pub trait ThemeStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
}

pub fn resolve_theme(store: &dyn ThemeStore) -> Theme {
    store
        .load(THEME_KEY)
        .and_then(|value| Theme::parse(&value))
        .unwrap_or_default()
}

pub fn persist_theme(store: &dyn ThemeStore, theme: Theme) {
    store.save(THEME_KEY, theme.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore(RefCell<HashMap<String, String>>);

    impl ThemeStore for MemoryStore {
        fn load(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key).cloned()
        }

        fn save(&self, key: &str, value: &str) {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
        }
    }

    #[test]
    fn missing_or_unknown_flag_defaults_to_dark() {
        let store = MemoryStore::default();
        assert_eq!(resolve_theme(&store), Theme::Dark);

        store.save(THEME_KEY, "sepia");
        assert_eq!(resolve_theme(&store), Theme::Dark);
    }

    #[test]
    fn toggle_round_trips_through_storage() {
        let store = MemoryStore::default();
        let next = resolve_theme(&store).toggled();

        persist_theme(&store, next);

        assert_eq!(store.load("theme").as_deref(), Some("light"));
        assert_eq!(resolve_theme(&store), Theme::Light);
    }

    #[test]
    fn label_names_the_other_theme() {
        assert_eq!(Theme::Dark.toggle_label(), "Switch to light theme");
        assert!(Theme::Dark.pressed());
        assert!(!Theme::Light.pressed());
    }
}
