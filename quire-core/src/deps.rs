//! Syntax-highlighting language dependencies
//!
//! The highlighter ships one script per language, and some languages extend
//! others (`jsx` builds on `javascript`, `cpp` on `c`, ...). The table is read
//! from prism's `lang_dependencies.txt` and is only ever used to order script
//! tags, so any problem reading it degrades to "no dependencies".

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Maps a language tag to the single language it must be loaded after
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyMap {
    prerequisites: HashMap<String, String>,
}

impl DependencyMap {
    /// An empty table (every language is independent)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from explicit `(language, prerequisite)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prerequisites: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Read a table from disk. Missing or unreadable files give an empty table.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                debug!("No language dependencies from {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Parse the line-oriented table format.
    ///
    /// Only lines starting with `{` are considered. Each is a brace-delimited,
    /// comma separated list of `"key":"value"` entries; array values are not
    /// supported and skipped. A line with a malformed delimiter contributes
    /// nothing.
    pub fn parse(text: &str) -> Self {
        let mut prerequisites = HashMap::new();

        for line in text.lines() {
            if !line.starts_with('{') {
                continue;
            }

            match parse_line(line) {
                Some(entries) => prerequisites.extend(entries),
                None => debug!("Skipping malformed dependency line: {}", line),
            }
        }

        Self { prerequisites }
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.prerequisites.get(language).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prerequisites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prerequisites.is_empty()
    }

    /// Order `requested` so that every language follows its transitive
    /// prerequisites, dropping duplicates (first occurrence wins).
    ///
    /// Prerequisite chains stop at the first repeated language, so a cyclic
    /// table still terminates.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for language in requested {
            let language = language.as_ref();
            if seen.contains(language) {
                continue;
            }

            // Walk the chain outward from the language, nearest prerequisite first
            let mut chain: Vec<&str> = Vec::new();
            let mut visited: HashSet<&str> = HashSet::from([language]);
            let mut current = language;
            while let Some(prerequisite) = self.get(current) {
                if seen.contains(prerequisite) || !visited.insert(prerequisite) {
                    break;
                }
                chain.push(prerequisite);
                current = prerequisite;
            }

            for prerequisite in chain.into_iter().rev() {
                seen.insert(prerequisite.to_string());
                resolved.push(prerequisite.to_string());
            }
            seen.insert(language.to_string());
            resolved.push(language.to_string());
        }

        resolved
    }
}

fn parse_line(line: &str) -> Option<Vec<(String, String)>> {
    let line = ARRAY_VALUE.replace_all(line, "[not supported]");
    let body = trim_delim(&line, "{", "}")?;

    let mut entries = Vec::new();
    for entry in body.split(',') {
        let mut parts = entry.split(':');
        let key = parts.next()?;
        let value = parts.next()?;
        if value.trim_start().starts_with('[') {
            continue;
        }
        entries.push((trim_delim(key, "\"", "\"")?, trim_delim(value, "\"", "\"")?));
    }
    Some(entries)
}

/// Non-empty `[...]` spans, whose commas would otherwise split entries
static ARRAY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]+\]").expect("valid array pattern"));

fn trim_delim(s: &str, leading: &str, trailing: &str) -> Option<String> {
    let s = s.trim();
    if s.len() < leading.len() + trailing.len() {
        return None;
    }
    s.strip_prefix(leading)?
        .strip_suffix(trailing)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PRISM_SAMPLE: &str = r#"// Prism language dependencies
{"javascript":"clike","actionscript":"javascript","jsx":"javascript","cpp":"c","c":"clike","markup-templating":["markup"],"php":["clike","markup-templating"]}
"#;

    #[test]
    fn test_parse_sample_table() {
        let map = DependencyMap::parse(PRISM_SAMPLE);
        assert_eq!(map.get("jsx"), Some("javascript"));
        assert_eq!(map.get("cpp"), Some("c"));
        assert_eq!(map.get("c"), Some("clike"));
        assert_eq!(map.get("php"), None);
        assert_eq!(map.get("markup-templating"), None);
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_parse_array_commas_do_not_split_entries() {
        let map = DependencyMap::parse("{\"a\":\"b\",\"c\":[\"x\",\"y\"],\"d\":\"e\"}\n");
        assert_eq!(map.get("a"), Some("b"));
        assert_eq!(map.get("c"), None);
        assert_eq!(map.get("d"), Some("e"));
    }

    #[test]
    fn test_parse_ignores_non_brace_lines() {
        let map = DependencyMap::parse("\"a\":\"b\"\n  {\"c\":\"d\"}\n");
        assert!(map.is_empty());
    }

    #[test]
    fn test_parse_malformed_line_contributes_nothing() {
        let map = DependencyMap::parse("{\"a\":\"b\",c:\"d\"}\n{\"x\":\"y\"}\n");
        assert_eq!(map.get("a"), None);
        assert_eq!(map.get("x"), Some("y"));
    }

    #[test]
    fn test_parse_missing_closing_brace() {
        let map = DependencyMap::parse("{\"a\":\"b\"\n");
        assert!(map.is_empty());
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let map = DependencyMap::parse("{ \"a\" : \"b\" , \"c\":\"d\" }  \n");
        assert_eq!(map.get("a"), Some("b"));
        assert_eq!(map.get("c"), Some("d"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let map = DependencyMap::load(Path::new("/nonexistent/lang_dependencies.txt"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(PRISM_SAMPLE.as_bytes())?;
        file.flush()?;

        let map = DependencyMap::load(file.path());
        assert_eq!(map.get("actionscript"), Some("javascript"));
        Ok(())
    }

    #[test]
    fn test_resolve_prerequisite_first() {
        let map = DependencyMap::from_pairs([("jsx", "js")]);
        assert_eq!(map.resolve(&["jsx", "python"]), vec!["js", "jsx", "python"]);
    }

    #[test]
    fn test_resolve_transitive_chain_deepest_first() {
        let map = DependencyMap::parse(PRISM_SAMPLE);
        assert_eq!(
            map.resolve(&["actionscript"]),
            vec!["clike", "javascript", "actionscript"]
        );
    }

    #[test]
    fn test_resolve_deduplicates_first_occurrence() {
        let map = DependencyMap::from_pairs([("jsx", "javascript")]);
        assert_eq!(
            map.resolve(&["python", "jsx", "python", "javascript", "jsx"]),
            vec!["python", "javascript", "jsx"]
        );
    }

    #[test]
    fn test_resolve_shared_prerequisite_once() {
        let map = DependencyMap::parse(PRISM_SAMPLE);
        let resolved = map.resolve(&["cpp", "jsx"]);
        assert_eq!(resolved, vec!["clike", "c", "cpp", "javascript", "jsx"]);
    }

    #[test]
    fn test_resolve_cycle_terminates() {
        let map = DependencyMap::from_pairs([("a", "b"), ("b", "c"), ("c", "a")]);
        let resolved = map.resolve(&["a"]);
        assert_eq!(resolved, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_resolve_self_cycle_terminates() {
        let map = DependencyMap::from_pairs([("a", "a")]);
        assert_eq!(map.resolve(&["a"]), vec!["a"]);
    }

    #[test]
    fn test_resolve_properties() {
        let map = DependencyMap::parse(PRISM_SAMPLE);
        let requested = ["php", "jsx", "go", "cpp", "go", "javascript", "c"];
        let resolved = map.resolve(&requested);

        let unique: HashSet<&String> = resolved.iter().collect();
        assert_eq!(unique.len(), resolved.len());

        for (idx, language) in resolved.iter().enumerate() {
            let mut current = language.as_str();
            while let Some(pre) = map.get(current) {
                let pre_idx = resolved.iter().position(|l| l == pre).unwrap();
                assert!(pre_idx < idx, "{pre} must precede {language}");
                current = pre;
            }
        }

        // Independent languages keep their first-use order
        let php = resolved.iter().position(|l| l == "php").unwrap();
        let go = resolved.iter().position(|l| l == "go").unwrap();
        assert!(php < go);
    }
}
