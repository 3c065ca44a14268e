//! Best-effort static matching of import-like syntax. Display only, never a resolver.
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::materialize::normalize_path;
use crate::types::Project;

/// Captures the quoted specifier of `from '...'`, `import '...'`, `import('...')`, and `require('...')`.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static IMPORT_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r#"(?:\bfrom\s*|\bimport\s*\(?\s*|\brequire\s*\(\s*)["']([^"'\n]+)["']"#)
        .expect("valid regex");
});

/// Paths of files in `project`, other than `target`, that appear to import `target`.
pub fn dependents_of(target: &str, project: &Project) -> BTreeSet<String> {
    return project
        .files()
        .iter()
        .filter(|file| return file.path != target)
        .filter(|file| {
            return specifiers(&file.content)
                .any(|spec| return specifier_matches(&resolve_specifier(&file.path, spec), target));
        })
        .map(|file| return file.path.clone())
        .collect();
}

/// Resolve a specifier to a root-relative path. Aliases `@/` and `~/` mean the project root.
fn resolve_specifier(importer: &str, specifier: &str) -> String {
    if specifier.starts_with("./") || specifier.starts_with("../") {
        let dir = importer.rsplit_once('/').map_or("", |(dir, _)| return dir);
        return normalize_path(&format!("{dir}/{specifier}"));
    }
    let rooted = specifier
        .strip_prefix("@/")
        .or_else(|| return specifier.strip_prefix("~/"))
        .unwrap_or(specifier);
    return normalize_path(rooted);
}

/// All quoted import specifiers in `content`, in order.
fn specifiers(content: &str) -> impl Iterator<Item = &str> {
    return IMPORT_SPECIFIER
        .captures_iter(content)
        .filter_map(|cap| return cap.get(1))
        .map(|m| return m.as_str());
}

/// Whether a resolved specifier names `target`, with or without extension or `/index` suffix.
fn specifier_matches(resolved: &str, target: &str) -> bool {
    if resolved == target {
        return true;
    }
    let stem = strip_extension(target);
    if resolved == stem {
        return true;
    }
    return stem.strip_suffix("/index").is_some_and(|dir| return resolved == dir);
}

/// Drop the extension from the last path segment, if it has one.
fn strip_extension(path: &str) -> &str {
    let file = path.rsplit_once('/').map_or(path, |(_, file)| return file);
    return match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => {
            let cut = path.len().saturating_sub(file.len()).saturating_add(stem.len());
            path.get(..cut).unwrap_or(path)
        },
        _ => path,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::materialize::materialize;
    use crate::template::Conventions;
    use crate::types::{CodeBlock, Filename};

    fn project(files: &[(&str, &str)]) -> Project {
        let blocks: Vec<CodeBlock> = files
            .iter()
            .map(|(path, code)| {
                let (name, extension) = path.rsplit_once('.').unwrap();
                return CodeBlock {
                    code: (*code).to_string(),
                    filename: Filename { extension: extension.into(), name: name.into() },
                    language: extension.into(),
                };
            })
            .collect();
        return materialize(&blocks, &Conventions::default());
    }

    #[test]
    fn finds_relative_alias_and_absolute_imports() {
        let p = project(&[
            ("App.tsx", "import Button from './components/Button';"),
            ("components/Card.tsx", "import { Button } from \"@/components/Button\";"),
            ("components/Form.tsx", "const B = require('/components/Button.tsx');"),
            ("components/Button.tsx", "export default function Button() {}"),
            ("components/Other.tsx", "import x from './ButtonGroup';"),
        ]);
        let found: Vec<String> = dependents_of("/components/Button.tsx", &p).into_iter().collect();
        assert_eq!(found, vec!["/App.tsx", "/components/Card.tsx", "/components/Form.tsx"]);
    }

    #[test]
    fn parent_relative_and_index_imports_match() {
        let p = project(&[
            ("components/ui/Badge.tsx", "import { cn } from '../../lib';"),
            ("lib/index.ts", "export const cn = 1;"),
        ]);
        assert_eq!(dependents_of("/lib/index.ts", &p).len(), 1);
    }

    #[test]
    fn side_effect_and_dynamic_imports_match() {
        let p = project(&[
            ("App.tsx", "import './styles.css';\nconst Lazy = import('./Lazy');"),
            ("styles.css", "body {}"),
            ("Lazy.tsx", ""),
        ]);
        assert!(dependents_of("/styles.css", &p).contains("/App.tsx"));
        assert!(dependents_of("/Lazy.tsx", &p).contains("/App.tsx"));
    }

    #[test]
    fn a_file_is_not_its_own_dependent() {
        let p = project(&[("a.js", "import './a';")]);
        assert!(dependents_of("/a.js", &p).is_empty());
    }

    #[test]
    fn strips_only_the_last_segment_extension() {
        assert_eq!(strip_extension("/components/Button.tsx"), "/components/Button");
        assert_eq!(strip_extension("/v1.2/readme"), "/v1.2/readme");
        assert_eq!(strip_extension("/.env"), "/.env");
    }
}
