//! Combine Clover-style XML coverage reports.
//!
//! The first report that exists is the base. Every `<file>` element of the
//! later reports is copied, with its whole subtree, right before the base's
//! closing `</project>`. Missing inputs are skipped.

use quick_xml::{
  Reader, Writer,
  events::{BytesEnd, Event},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Inputs used when none are given on the command line.
pub const DEFAULT_REPORTS: [&str; 3] = [
  "coverage/unit/clover.xml",
  "coverage/integration/clover.xml",
  "coverage/e2e/clover.xml",
];
pub const DEFAULT_OUTPUT: &str = "coverage/combined/clover.xml";

const FILE_TAG: &[u8] = b"file";
const PROJECT_TAG: &[u8] = b"project";

#[derive(Debug, Error)]
pub enum CoverageError {
  #[error("none of the coverage reports exist")]
  NoReports,
  #[error("base report has no <project> element")]
  MissingProject,
  #[error("malformed coverage XML: {0}")]
  Xml(#[from] quick_xml::Error),
  #[error("combined report is not valid UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineSummary {
  pub reports_read: usize,
  pub reports_skipped: usize,
  pub files_merged: usize,
}

/// Read `inputs` in order, merge them and write the result to `output`.
pub fn combine_reports(
  inputs: &[PathBuf],
  output: &Path,
) -> Result<CombineSummary, CoverageError> {
  let mut summary = CombineSummary::default();
  let mut reports = Vec::new();
  for path in inputs {
    if !path.is_file() {
      warn!("coverage report {} not found, skipping", path.display());
      summary.reports_skipped += 1;
      continue;
    }
    reports.push(std::fs::read_to_string(path)?);
    summary.reports_read += 1;
  }

  let Some((base, others)) = reports.split_first() else {
    return Err(CoverageError::NoReports);
  };
  let others: Vec<&str> = others.iter().map(String::as_str).collect();
  let (combined, files_merged) = combine_xml(base, &others)?;
  summary.files_merged = files_merged;

  if let Some(parent) = output.parent() {
    if !parent.as_os_str().is_empty() {
      std::fs::create_dir_all(parent)?;
    }
  }
  std::fs::write(output, combined)?;
  info!(
    "combined {} coverage report(s) into {} ({} file entries merged)",
    summary.reports_read,
    output.display(),
    summary.files_merged
  );
  Ok(summary)
}

/// Merge the `<file>` elements of `others` into `base`.
///
/// Returns the combined document and the number of elements appended.
pub fn combine_xml(base: &str, others: &[&str]) -> Result<(String, usize), CoverageError> {
  let mut extra = Vec::new();
  for report in others {
    extra.extend(file_elements(report)?);
  }

  let mut reader = Reader::from_str(base);
  let mut writer = Writer::new(Vec::new());
  let mut inserted = false;
  loop {
    match reader.read_event()? {
      Event::Eof => break,
      Event::End(e) if !inserted && e.name().as_ref() == PROJECT_TAG => {
        write_all(&mut writer, &extra)?;
        inserted = true;
        writer.write_event(Event::End(e))?;
      }
      Event::Empty(e) if !inserted && e.name().as_ref() == PROJECT_TAG => {
        writer.write_event(Event::Start(e))?;
        write_all(&mut writer, &extra)?;
        inserted = true;
        writer.write_event(Event::End(BytesEnd::new("project")))?;
      }
      ev => writer.write_event(ev)?,
    }
  }
  if !inserted {
    return Err(CoverageError::MissingProject);
  }

  let combined = String::from_utf8(writer.into_inner())?;
  Ok((combined, extra.len()))
}

fn write_all(
  writer: &mut Writer<Vec<u8>>,
  elements: &[Vec<Event<'static>>],
) -> Result<(), CoverageError> {
  for element in elements {
    for ev in element {
      writer.write_event(ev.clone())?;
    }
  }
  Ok(())
}

/// Every top-level `<file>` subtree of a report, as owned events.
fn file_elements(xml: &str) -> Result<Vec<Vec<Event<'static>>>, CoverageError> {
  let mut reader = Reader::from_str(xml);
  let mut found = Vec::new();
  let mut current: Option<(Vec<Event<'static>>, usize)> = None;
  loop {
    let ev = reader.read_event()?;
    if matches!(ev, Event::Eof) {
      break;
    }
    match current.take() {
      Some((mut events, depth)) => {
        let depth = match &ev {
          Event::Start(_) => depth + 1,
          Event::End(_) => depth - 1,
          _ => depth,
        };
        events.push(ev.into_owned());
        if depth == 0 {
          found.push(events);
        } else {
          current = Some((events, depth));
        }
      }
      None => match ev {
        Event::Start(e) if e.name().as_ref() == FILE_TAG => {
          current = Some((vec![Event::Start(e.into_owned())], 1));
        }
        Event::Empty(e) if e.name().as_ref() == FILE_TAG => {
          found.push(vec![Event::Empty(e.into_owned())]);
        }
        _ => {}
      },
    }
  }
  Ok(found)
}
