//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use super::state::{
    MockChange, MockComponent, MockLanguage, MockProject, MockState, MockTranslation, MockUnit,
};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    pub fn project(slug: &str, name: &str) -> MockProject {
        MockProject {
            name: name.to_string(),
            slug: slug.to_string(),
            web: "https://example.com/".to_string(),
        }
    }

    /// A gettext component with `po/*.po` files.
    pub fn component(project: &str, slug: &str, name: &str) -> MockComponent {
        MockComponent {
            project: project.to_string(),
            slug: slug.to_string(),
            name: name.to_string(),
            filemask: "po/*.po".to_string(),
            file_format: "po".to_string(),
            locked: false,
        }
    }

    pub fn translation(project: &str, component: &str, language: &str) -> MockTranslation {
        MockTranslation {
            project: project.to_string(),
            component: component.to_string(),
            language: language.to_string(),
            filename: format!("po/{language}.po"),
            content: format!(
                "msgid \"\"\nmsgstr \"\"\n\"Language: {language}\\n\"\n\nmsgid \"Hello, world!\\n\"\nmsgstr \"\"\n"
            )
            .into_bytes(),
        }
    }

    pub fn language(code: &str, name: &str) -> MockLanguage {
        MockLanguage {
            code: code.to_string(),
            name: name.to_string(),
            direction: "ltr".to_string(),
        }
    }

    pub fn unit(id: u64, translation: (&str, &str, &str), source: &str, target: &str) -> MockUnit {
        let (project, component, language) = translation;
        MockUnit {
            id,
            translation: (project.to_string(), component.to_string(), language.to_string()),
            source: vec![source.to_string()],
            target: vec![target.to_string()],
            state: if target.is_empty() { 0 } else { 20 },
        }
    }

    pub fn change(id: u64, action_name: &str, translation: (&str, &str, &str)) -> MockChange {
        let (project, component, language) = translation;
        MockChange {
            id,
            action_name: action_name.to_string(),
            timestamp: format!("2024-03-01T09:{:02}:00Z", id % 60),
            translation: Some((project.to_string(), component.to_string(), language.to_string())),
            component: None,
        }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// A small instance: project `hello` with components `weblate` and
    /// `android`, Czech and German translations, a few units and changes.
    pub fn default_scenario() -> MockState {
        let cs = ("hello", "weblate", "cs");
        let de = ("hello", "weblate", "de");
        MockState::new()
            .with_language(Self::language("en", "English"))
            .with_language(Self::language("cs", "Czech"))
            .with_language(Self::language("de", "German"))
            .with_project(Self::project("hello", "Hello"))
            .with_project(Self::project("empty", "Empty"))
            .with_component(Self::component("hello", "weblate", "Weblate"))
            .with_component(Self::component("hello", "android", "Android"))
            .with_translation(Self::translation("hello", "weblate", "cs"))
            .with_translation(Self::translation("hello", "weblate", "de"))
            .with_translation(Self::translation("hello", "android", "cs"))
            .with_unit(Self::unit(1, cs, "Hello, world!\n", "Ahoj světe!\n"))
            .with_unit(Self::unit(2, cs, "Orangutan has %d banana.\n", ""))
            .with_unit(Self::unit(3, cs, "Thank you for using Weblate.", "Děkujeme za použití Weblate."))
            .with_unit(Self::unit(4, de, "Hello, world!\n", "Hallo Welt!\n"))
            .with_unit(Self::unit(5, ("hello", "android", "cs"), "Hello", ""))
            .with_change(Self::change(1, "Resource update", cs))
            .with_change(Self::change(2, "New translation", cs))
            .with_change(Self::change(3, "Translation changed", de))
    }

    /// A project with `count` components, for pagination tests.
    pub fn many_components(count: usize) -> MockState {
        (0..count).fold(
            MockState::new().with_project(Self::project("big", "Big")),
            |state, n| {
                state.with_component(Self::component(
                    "big",
                    &format!("component-{n:03}"),
                    &format!("Component {n}"),
                ))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let state = Fixtures::default_scenario();
        assert_eq!(state.projects.len(), 2);
        assert_eq!(state.components.len(), 2);
        assert_eq!(state.translations.len(), 3);
        assert_eq!(state.units.len(), 5);
    }

    #[test]
    fn test_unit_state_follows_target() {
        assert_eq!(Fixtures::unit(1, ("p", "c", "cs"), "a", "").state, 0);
        assert_eq!(Fixtures::unit(1, ("p", "c", "cs"), "a", "b").state, 20);
    }

    #[test]
    fn test_many_components() {
        let state = Fixtures::many_components(45);
        assert_eq!(state.components.len(), 45);
        assert!(state
            .components
            .contains_key(&("big".to_string(), "component-044".to_string())));
    }
}
