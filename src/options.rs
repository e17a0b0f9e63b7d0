use crate::error::{ReportError, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Caller options for one render. Unknown JSON fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportOptions {
    pub file_name: Option<String>,
    pub include_metadata: bool,
    pub output_dir: Option<PathBuf>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            include_metadata: true,
            output_dir: None,
        }
    }
}

impl ReportOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| ReportError::InvalidInput(err.to_string()))
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.include_metadata = false;
        self
    }

    /// The caller's name when it is non-blank, else the dated default.
    pub fn resolved_file_name(&self, stamp: &RenderTimestamp) -> String {
        self.file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| stamp.default_file_name())
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
            .join(file_name)
    }
}

/// The instant a render is stamped with, captured once so the header,
/// footer, file name and PDF info all agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTimestamp(NaiveDateTime);

impl RenderTimestamp {
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    pub fn fixed(at: NaiveDateTime) -> Self {
        Self(at)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// `dd/mm/YYYY`, as shown in the page header.
    pub fn header_date(&self) -> String {
        self.0.format("%d/%m/%Y").to_string()
    }

    /// `dd/mm/YYYY HH:MM`, as shown in the page footer.
    pub fn footer_timestamp(&self) -> String {
        self.0.format("%d/%m/%Y %H:%M").to_string()
    }

    pub fn default_file_name(&self) -> String {
        format!("analyse-conformite-{}.pdf", self.0.format("%Y-%m-%d"))
    }

    pub(crate) fn pdf_date(&self) -> String {
        self.0.format("D:%Y%m%d%H%M%S").to_string()
    }
}
