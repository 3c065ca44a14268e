//! Project templates and the conventions they imply for materialization.

use serde::Serialize;

/// Leading lines of each file searched for an entry marker.
const DEFAULT_MARKER_WINDOW: usize = 5;

/// Content of the synthetic file produced when there is no code at all.
const DEFAULT_PLACEHOLDER: &str = "// no code available";

/// Values that steer materialization.
///
/// Built from a template identifier that may be absent, then optionally
/// overridden by `.codefence.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conventions {
    /// Conventional root application file, e.g. `/App.tsx`.
    pub entry_path: String,
    /// How many leading lines of each file are searched for an entry marker.
    pub marker_window: usize,
    /// Content of the synthetic file for an empty project.
    pub placeholder: String,
}

impl Conventions {
    /// Conventions for `template`, or for the default template when absent.
    pub fn new(template: Option<Template>) -> Self {
        let template = template.unwrap_or_default();
        return Self {
            entry_path: template.entry_path().to_string(),
            marker_window: DEFAULT_MARKER_WINDOW,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        };
    }
}

impl Default for Conventions {
    fn default() -> Self {
        return Self::new(None);
    }
}

/// How a preview collaborator should lay out code and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewLayout {
    /// Code and preview in switchable tabs. Used for UI frameworks.
    Tabbed,
    /// Code above, program output below. Used for scripts.
    TwoUp,
}

impl PreviewLayout {
    /// Pick the layout for a block's language.
    pub fn for_language(language: &str) -> Self {
        return match language {
            "javascript" | "js" | "python" | "ts" | "typescript" => PreviewLayout::TwoUp,
            _ => PreviewLayout::Tabbed,
        };
    }
}

/// Sandbox project template associated with a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    Angular,
    React,
    #[default]
    ReactTs,
    Solid,
    Svelte,
    Vanilla,
    Vue,
}

impl Template {
    /// Every known template, in identifier order.
    pub const ALL: [Template; 7] = [
        Template::Angular,
        Template::React,
        Template::ReactTs,
        Template::Solid,
        Template::Svelte,
        Template::Vanilla,
        Template::Vue,
    ];

    /// Conventional entry file for this template.
    pub const fn entry_path(self) -> &'static str {
        return match self {
            Template::Angular => "/src/app/app.component.ts",
            Template::React => "/App.js",
            Template::ReactTs | Template::Solid => "/App.tsx",
            Template::Svelte => "/App.svelte",
            Template::Vanilla => "/index.js",
            Template::Vue => "/src/App.vue",
        };
    }

    /// Identifier as stored with a conversation.
    pub const fn identifier(self) -> &'static str {
        return match self {
            Template::Angular => "angular",
            Template::React => "react",
            Template::ReactTs => "react-ts",
            Template::Solid => "solid",
            Template::Svelte => "svelte",
            Template::Vanilla => "vanilla",
            Template::Vue => "vue",
        };
    }

    /// Parse a stored identifier. Unknown identifiers yield `None`.
    pub fn parse(identifier: &str) -> Option<Self> {
        let wanted = identifier.trim();
        return Self::ALL.into_iter().find(|t| return t.identifier().eq_ignore_ascii_case(wanted));
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn parses_known_identifiers() {
        assert_eq!(Template::parse("react-ts"), Some(Template::ReactTs));
        assert_eq!(Template::parse(" Vue "), Some(Template::Vue));
        assert_eq!(Template::parse("nextjs"), None);
    }

    #[test]
    fn conventions_work_without_template() {
        let conventions = Conventions::new(None);
        assert_eq!(conventions.entry_path, "/App.tsx");
        assert_eq!(conventions.placeholder, "// no code available");
        assert_eq!(Conventions::new(Some(Template::Vue)).entry_path, "/src/App.vue");
    }

    #[test]
    fn layout_follows_language() {
        assert_eq!(PreviewLayout::for_language("python"), PreviewLayout::TwoUp);
        assert_eq!(PreviewLayout::for_language("tsx"), PreviewLayout::Tabbed);
    }
}
