//! Quoted `#include` scanning (`spec.md` §4.3).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;

lazy_static::lazy_static! {
    static ref INCLUDE_RE: Regex = Regex::new(r#"^\s*#\s*include\s*"([^"]+)""#).unwrap();
}

/// Scans `path` line by line for quoted includes. Angle-bracket includes are
/// ignored. A missing or unreadable file yields an empty list, not an error,
/// matching sources that list headers generated by other build steps.
pub fn scan(path: &Path) -> Vec<String> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Vec::new(),
    };

    let mut includes = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };
        if let Some(captures) = INCLUDE_RE.captures(&line) {
            includes.push(captures[1].to_string());
        }
    }
    includes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn quoted_includes_are_captured_in_order_with_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "main.cpp",
            "#include \"a.hpp\"\n#include \"b.hpp\"\n#include \"a.hpp\"\n",
        );
        assert_eq!(scan(&path), vec!["a.hpp", "b.hpp", "a.hpp"]);
    }

    #[test]
    fn angle_bracket_includes_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "main.cpp", "#include <vector>\n#include \"local.hpp\"\n");
        assert_eq!(scan(&path), vec!["local.hpp"]);
    }

    #[test]
    fn leading_whitespace_and_spaced_hash_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "main.cpp", "   #   include   \"x.hpp\"\n");
        assert_eq!(scan(&path), vec!["x.hpp"]);
    }

    #[test]
    fn missing_file_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.cpp");
        assert_eq!(scan(&path), Vec::<String>::new());
    }

    #[test]
    fn commented_out_includes_do_not_start_with_hash_and_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "main.cpp", "int main() { return 0; }\n// #include \"commented.hpp\"\n");
        assert_eq!(scan(&path), Vec::<String>::new());
    }
}
