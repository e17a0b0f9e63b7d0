mod adapter;
mod blocks;
mod canvas;
mod color;
mod composer;
mod debug;
mod error;
mod font;
mod frame;
mod layout;
mod metrics;
mod model;
mod options;
mod pdf;
mod pdfinspect;
mod types;

pub use adapter::{
    DocumentAnalysis, EMPTY_SUMMARY, SummaryResponse, compliance_score, extract_key_points,
    risk_level, suggested_actions, to_analysis_result,
};
pub use blocks::{
    BlockContext, ListResume, ProseResume, Progress, SectionSpec, compliance_score_card,
    footer_band, gauge_fill_width, header_band, list_section, metadata_card, prose_section,
    title_card,
};
pub use canvas::{Canvas, Command, Document, Page, Paint, TextStyle, wrap_text};
pub use color::{
    ColorToken, Rgb, ScoreTier, Theme, gradient_strips, hex_to_rgb, interpolate, rgb_to_hex,
    score_to_color,
};
pub use composer::{ACTIONS_TITLE, BlockKind, KEY_POINTS_TITLE, ReportComposer, SUMMARY_TITLE};
pub use error::{ReportError, Result};
pub use font::FontFace;
pub use frame::Frame;
pub use layout::{FontSizes, LayoutConfig};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use model::{
    AnalysisMetadata, AnalysisResult, ComplianceScore, DocumentInfo, MetadataEntries, ReportData,
};
pub use options::{RenderTimestamp, ReportOptions};
pub use pdfinspect::{
    PdfInspectError, PdfInspectErrorCode, PdfInspectReport, inspect_pdf_bytes, inspect_pdf_path,
};
pub use types::{Color, Margins, Pt, Rect, Size};

use chrono::NaiveDateTime;
use debug::DebugLogger;
use pdf::PdfOptions;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DOCUMENT_TITLE: &str = "Rapport d'Analyse de Conformité";

/// Renders analysis results into paginated PDF reports.
///
/// A generator holds only immutable configuration. Every call to
/// [`ReportGenerator::render`] builds its own composer and canvas, so one
/// generator may serve any number of renders, in sequence or from several
/// threads.
pub struct ReportGenerator {
    layout: LayoutConfig,
    theme: Theme,
    clock: Option<NaiveDateTime>,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Clone)]
pub struct ReportGeneratorBuilder {
    layout: LayoutConfig,
    theme: Theme,
    clock: Option<NaiveDateTime>,
    debug_path: Option<PathBuf>,
}

/// An encoded report held in memory.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub document: Document,
    pub pdf: Vec<u8>,
    pub metrics: DocumentMetrics,
    pub file_name: String,
}

/// Where a report was written and what was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub path: PathBuf,
    pub page_count: usize,
    pub bytes: usize,
    pub sha256: String,
}

impl ReportGenerator {
    pub fn builder() -> ReportGeneratorBuilder {
        ReportGeneratorBuilder::new()
    }

    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn timestamp(&self) -> RenderTimestamp {
        self.clock
            .map(RenderTimestamp::fixed)
            .unwrap_or_else(RenderTimestamp::now)
    }

    /// Validates the input, lays the report out and encodes it. Nothing is
    /// written to disk. Invalid input is rejected before any page exists.
    pub fn render(&self, analysis: &AnalysisResult, options: &ReportOptions) -> Result<RenderedReport> {
        let data = analysis.validate(options.include_metadata)?;
        let stamp = self.timestamp();
        let file_name = options.resolved_file_name(&stamp);

        let document = ReportComposer::new(&self.layout, &self.theme, stamp)
            .with_debug(self.debug.clone())
            .compose(&data)?;

        let pdf_options = PdfOptions {
            document_title: Some(DOCUMENT_TITLE.to_string()),
            creation_date: Some(stamp.pdf_date()),
        };
        let (pdf, metrics) = pdf::document_to_pdf_with_metrics(&document, pdf_options).map_err(
            |source| ReportError::Save {
                path: PathBuf::from(&file_name),
                source,
            },
        )?;

        self.emit_debug_summary("render");
        Ok(RenderedReport {
            document,
            pdf,
            metrics,
            file_name,
        })
    }

    /// Renders and writes `<outputDir>/<fileName>`. Filesystem failures
    /// surface as [`ReportError::Save`] and are not retried.
    pub fn generate_report(
        &self,
        analysis: &AnalysisResult,
        options: &ReportOptions,
    ) -> Result<SavedReport> {
        let rendered = self.render(analysis, options)?;
        let dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let saved = rendered.save_to(&dir)?;
        if let Some(logger) = self.debug.as_deref() {
            logger.event(
                "report.save",
                json!({
                    "path": saved.path.display().to_string(),
                    "bytes": saved.bytes,
                    "pages": saved.page_count,
                }),
            );
        }
        self.emit_debug_summary("save");
        Ok(saved)
    }

    fn emit_debug_summary(&self, context: &str) {
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary(context);
            logger.flush();
        }
    }
}

impl RenderedReport {
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub fn sha256_hex(&self) -> String {
        sha256_hex(&self.pdf)
    }

    pub fn save_to(&self, dir: &Path) -> Result<SavedReport> {
        let path = dir.join(&self.file_name);
        let save_error = |source| ReportError::Save {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(dir).map_err(save_error)?;
        std::fs::write(&path, &self.pdf).map_err(save_error)?;
        Ok(SavedReport {
            page_count: self.page_count(),
            bytes: self.pdf.len(),
            sha256: self.sha256_hex(),
            path,
        })
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

impl Default for ReportGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGeneratorBuilder {
    pub fn new() -> Self {
        Self {
            layout: LayoutConfig::default(),
            theme: Theme::default(),
            clock: None,
            debug_path: None,
        }
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Pins the render timestamp; output becomes byte-for-byte reproducible.
    pub fn clock(mut self, at: NaiveDateTime) -> Self {
        self.clock = Some(at);
        self
    }

    /// Writes JSONL layout events to `path`.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<ReportGenerator> {
        self.layout.validate()?;
        let debug = if let Some(path) = self.debug_path {
            Some(Arc::new(DebugLogger::new(path)?))
        } else {
            None
        };
        Ok(ReportGenerator {
            layout: self.layout,
            theme: self.theme,
            clock: self.clock,
            debug,
        })
    }
}
