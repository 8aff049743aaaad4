//! Aggregating scan for bare `provider` blocks.
//!
//! Modules must not configure providers themselves; providers come wired
//! in by the platform. Unlike the spec rules, this scan collects every
//! offending file before reporting.

use std::fs;
use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

use crate::error::{ValidateError, ValidateResult};

/// Scan every `.tf` file under `module_dir` for top-level provider blocks.
///
/// Unreadable files are skipped with a warning. A directory with no `.tf`
/// files passes trivially.
pub fn scan_provider_blocks(module_dir: &Path) -> ValidateResult<()> {
    let mut offending = Vec::new();

    for entry in WalkDir::new(module_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "tf") {
            continue;
        }

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                warn!("Skipping unreadable file {:?}: {error}", path);
                continue;
            }
        };

        if has_top_level_provider_block(&source) {
            let relative = path
                .strip_prefix(module_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            offending.push(relative);
        }
    }

    if offending.is_empty() {
        Ok(())
    } else {
        offending.sort();
        Err(ValidateError::ProviderBlocks { paths: offending })
    }
}

/// True when the source declares `provider "<name>" { ... }` at file level.
/// Nested occurrences, e.g. provider requirements inside a `terraform`
/// block, do not count.
fn has_top_level_provider_block(source: &str) -> bool {
    let mut depth: i64 = 0;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if depth == 0 && trimmed.starts_with("provider \"") {
            return true;
        }
        depth += brace_delta(line);
        if depth < 0 {
            depth = 0;
        }
    }
    false
}

fn brace_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut in_string = false;
    let mut escaped = false;
    for ch in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => delta += 1,
            '}' if !in_string => delta -= 1,
            '#' if !in_string => break,
            _ => {}
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_detects_top_level_provider() {
        assert!(has_top_level_provider_block(
            "provider \"aws\" {\n  region = \"us-west-2\"\n}\n"
        ));
    }

    #[test]
    fn test_nested_provider_reference_is_ignored() {
        let source = r#"terraform {
  required_providers {
    aws = {
      source = "hashicorp/aws"
    }
  }
}

resource "aws_instance" "main" {
  provider "aws" {}
}
"#;
        assert!(!has_top_level_provider_block(source));
    }

    #[test]
    fn test_aggregates_all_offending_files() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("main.tf"),
            "provider \"aws\" {\n  region = \"us-west-2\"\n}\n",
        )
        .unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        std::fs::write(
            temp.path().join("nested").join("extra.tf"),
            "provider \"google\" {}\n",
        )
        .unwrap();
        std::fs::write(temp.path().join("variables.tf"), "variable \"x\" {}\n").unwrap();
        std::fs::write(temp.path().join("README.md"), "provider \"aws\" {}\n").unwrap();

        let error = scan_provider_blocks(temp.path()).unwrap_err();
        match error {
            ValidateError::ProviderBlocks { paths } => {
                assert_eq!(paths.len(), 2);
                assert!(paths.contains(&"main.tf".to_string()));
                assert!(paths.iter().any(|p| p.ends_with("extra.tf")));
            }
            other => panic!("expected provider-block failure, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_directory_passes() {
        let temp = tempdir().unwrap();
        assert!(scan_provider_blocks(temp.path()).is_ok());
    }
}
