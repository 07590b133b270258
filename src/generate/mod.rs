//! Project generator: copy this template under a new name.
//!
//! The three spellings of the template name are rewritten in file contents
//! and in file and directory names. Build output, VCS data and the local
//! log database are never copied.

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

pub const TEMPLATE_NAME: &str = "duo-scaffold";

const SKIPPED: [&str; 4] = ["target", ".git", "node_modules", crate::db::DATABASE_FILE];

const NAME_PATTERN: &str = r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$";

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("invalid project name {0:?}: use lowercase letters, digits and single dashes")]
  InvalidName(String),
  #[error("template directory {0} does not exist")]
  TemplateMissing(PathBuf),
  #[error("destination {0} already exists (use --force to write into it)")]
  DestinationExists(PathBuf),
  #[error("bad project name pattern: {0}")]
  Pattern(#[from] regex::Error),
  #[error("cannot walk template: {0}")]
  Walk(#[from] walkdir::Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

/// A validated project name in the spellings the template uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectName {
  pub kebab: String,
  pub snake: String,
  pub screaming: String,
}

impl ProjectName {
  pub fn parse(raw: &str) -> Result<Self, GenerateError> {
    let kebab = raw.trim();
    if !Regex::new(NAME_PATTERN)?.is_match(kebab) {
      return Err(GenerateError::InvalidName(raw.to_string()));
    }
    let snake = kebab.replace('-', "_");
    Ok(Self {
      kebab: kebab.to_string(),
      screaming: snake.to_ascii_uppercase(),
      snake,
    })
  }

  /// Rewrite every spelling of `from` into the matching spelling of `self`.
  pub fn substitute(&self, text: &str, from: &ProjectName) -> String {
    text
      .replace(&from.kebab, &self.kebab)
      .replace(&from.snake, &self.snake)
      .replace(&from.screaming, &self.screaming)
  }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
  pub name: ProjectName,
  pub template: PathBuf,
  pub out_dir: PathBuf,
  pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
  pub destination: PathBuf,
  pub files_written: usize,
  pub files_rewritten: usize,
}

pub fn generate(opts: &GenerateOptions) -> Result<GenerateReport, GenerateError> {
  let template_name = ProjectName::parse(TEMPLATE_NAME)?;
  if !opts.template.is_dir() {
    return Err(GenerateError::TemplateMissing(opts.template.clone()));
  }
  let template = std::path::absolute(&opts.template)?;
  let destination = std::path::absolute(&opts.out_dir)?.join(&opts.name.kebab);
  if destination.exists() && !opts.force {
    return Err(GenerateError::DestinationExists(destination));
  }
  std::fs::create_dir_all(&destination)?;

  let mut report = GenerateReport {
    destination: destination.clone(),
    files_written: 0,
    files_rewritten: 0,
  };
  let walker = WalkDir::new(&template)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| !is_skipped(e, &destination));
  for entry in walker {
    let entry = entry?;
    let Ok(relative) = entry.path().strip_prefix(&template) else {
      continue;
    };
    let target = destination.join(opts.name.substitute(&relative.to_string_lossy(), &template_name));

    let file_type = entry.file_type();
    if file_type.is_dir() {
      std::fs::create_dir_all(&target)?;
    } else if file_type.is_file() {
      if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
      }
      let bytes = std::fs::read(entry.path())?;
      match String::from_utf8(bytes) {
        Ok(text) => {
          let rewritten = opts.name.substitute(&text, &template_name);
          if rewritten != text {
            report.files_rewritten += 1;
          }
          std::fs::write(&target, rewritten)?;
        }
        Err(raw) => std::fs::write(&target, raw.into_bytes())?,
      }
      report.files_written += 1;
    } else {
      debug!("skipping non-regular file {}", entry.path().display());
    }
  }

  info!(
    "generated {} in {} ({} files, {} with the name rewritten)",
    opts.name.kebab,
    destination.display(),
    report.files_written,
    report.files_rewritten
  );
  Ok(report)
}

fn is_skipped(entry: &DirEntry, destination: &Path) -> bool {
  if entry.path() == destination {
    return true;
  }
  entry
    .file_name()
    .to_str()
    .is_some_and(|name| SKIPPED.contains(&name))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn name_spellings() {
    let name = ProjectName::parse("my-app2").unwrap();
    assert_eq!(name.kebab, "my-app2");
    assert_eq!(name.snake, "my_app2");
    assert_eq!(name.screaming, "MY_APP2");
  }

  #[test]
  fn rejects_bad_names() {
    for good in ["a", "app", "my-app", "a1-b2-c3"] {
      assert!(ProjectName::parse(good).is_ok(), "{good:?} should be accepted");
    }
    for bad in ["", "My-App", "1app", "my--app", "my_app", "app-", "-app", "my app"] {
      assert!(
        matches!(ProjectName::parse(bad), Err(GenerateError::InvalidName(_))),
        "{bad:?} should be rejected"
      );
    }
  }

  #[test]
  fn substitute_rewrites_all_spellings() {
    let from = ProjectName::parse(TEMPLATE_NAME).unwrap();
    let to = ProjectName::parse("shop").unwrap();
    let text = "name = \"duo-scaffold\"\nuse duo_scaffold::app;\nDUO_SCAFFOLD_DATABASE=x";
    assert_eq!(
      to.substitute(text, &from),
      "name = \"shop\"\nuse shop::app;\nSHOP_DATABASE=x"
    );
  }
}
