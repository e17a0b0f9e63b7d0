use crate::blocks::{
    BlockContext, ListResume, ProseResume, Progress, SectionSpec, compliance_score_card,
    footer_band, header_band, list_section, metadata_card, prose_section, title_card,
};
use crate::canvas::{Canvas, Document};
use crate::color::{ColorToken, Theme};
use crate::debug::DebugLogger;
use crate::error::{ReportError, Result};
use crate::layout::LayoutConfig;
use crate::model::ReportData;
use crate::options::RenderTimestamp;
use crate::types::Pt;
use serde_json::json;
use std::sync::Arc;

pub const SUMMARY_TITLE: &str = "Résumé Exécutif";
pub const KEY_POINTS_TITLE: &str = "Points Clés Identifiés";
pub const ACTIONS_TITLE: &str = "Plan d'Actions Recommandées";

/// Flowing blocks in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    TitleCard,
    MetadataCard,
    ScoreCard,
    Summary,
    KeyPoints,
    SuggestedActions,
}

impl BlockKind {
    pub const ORDER: [BlockKind; 6] = [
        BlockKind::TitleCard,
        BlockKind::MetadataCard,
        BlockKind::ScoreCard,
        BlockKind::Summary,
        BlockKind::KeyPoints,
        BlockKind::SuggestedActions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::TitleCard => "title_card",
            BlockKind::MetadataCard => "metadata_card",
            BlockKind::ScoreCard => "score_card",
            BlockKind::Summary => "summary",
            BlockKind::KeyPoints => "key_points",
            BlockKind::SuggestedActions => "suggested_actions",
        }
    }

    fn next(self) -> Option<BlockKind> {
        let index = BlockKind::ORDER.iter().position(|k| *k == self)?;
        BlockKind::ORDER.get(index + 1).copied()
    }

    fn initial_state(self) -> BlockState {
        match self {
            BlockKind::TitleCard => BlockState::TitleCard,
            BlockKind::MetadataCard => BlockState::MetadataCard,
            BlockKind::ScoreCard => BlockState::ScoreCard,
            BlockKind::Summary => BlockState::Summary(ProseResume::default()),
            BlockKind::KeyPoints => BlockState::KeyPoints(ListResume::default()),
            BlockKind::SuggestedActions => BlockState::SuggestedActions(ListResume::default()),
        }
    }
}

/// The block being laid out together with where it resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    TitleCard,
    MetadataCard,
    ScoreCard,
    Summary(ProseResume),
    KeyPoints(ListResume),
    SuggestedActions(ListResume),
}

impl BlockState {
    fn kind(self) -> BlockKind {
        match self {
            BlockState::TitleCard => BlockKind::TitleCard,
            BlockState::MetadataCard => BlockKind::MetadataCard,
            BlockState::ScoreCard => BlockKind::ScoreCard,
            BlockState::Summary(_) => BlockKind::Summary,
            BlockState::KeyPoints(_) => BlockKind::KeyPoints,
            BlockState::SuggestedActions(_) => BlockKind::SuggestedActions,
        }
    }

    fn position(&self) -> serde_json::Value {
        match self {
            BlockState::TitleCard | BlockState::MetadataCard | BlockState::ScoreCard => json!(null),
            BlockState::Summary(state) => json!({ "line": state.next_line }),
            BlockState::KeyPoints(state) | BlockState::SuggestedActions(state) => {
                json!({ "item": state.next_item, "line": state.next_line })
            }
        }
    }
}

fn section_spec(theme: &Theme, kind: BlockKind) -> SectionSpec<'static> {
    let (title, token) = match kind {
        BlockKind::KeyPoints => (KEY_POINTS_TITLE, ColorToken::Secondary),
        BlockKind::SuggestedActions => (ACTIONS_TITLE, ColorToken::Accent),
        _ => (SUMMARY_TITLE, ColorToken::Primary),
    };
    SectionSpec {
        key: kind.name(),
        title,
        accent: theme.rgb(token),
    }
}

enum Phase {
    Rendering { cursor: Pt, state: BlockState },
    Finalizing,
    Done,
}

/// Drives one render: lays the blocks out top to bottom, opens pages on
/// overflow, then stamps every page's footer once the page count is known.
/// A composer owns its canvas and is consumed by [`ReportComposer::compose`].
pub struct ReportComposer<'a> {
    layout: &'a LayoutConfig,
    theme: &'a Theme,
    stamp: RenderTimestamp,
    debug: Option<Arc<DebugLogger>>,
    canvas: Canvas,
}

impl<'a> ReportComposer<'a> {
    pub fn new(layout: &'a LayoutConfig, theme: &'a Theme, stamp: RenderTimestamp) -> Self {
        Self {
            layout,
            theme,
            stamp,
            debug: None,
            canvas: Canvas::new(layout.page_size),
        }
    }

    pub(crate) fn with_debug(mut self, debug: Option<Arc<DebugLogger>>) -> Self {
        self.debug = debug;
        self
    }

    pub fn compose(mut self, data: &ReportData) -> Result<Document> {
        let ctx = BlockContext::new(self.layout, self.theme);
        let header_date = self.stamp.header_date();
        let footer_timestamp = self.stamp.footer_timestamp();

        header_band(&mut self.canvas, &ctx, 1, &header_date);
        let mut phase = Phase::Rendering {
            cursor: ctx.frame.top(),
            state: BlockKind::ORDER[0].initial_state(),
        };

        loop {
            phase = match phase {
                Phase::Rendering { cursor, state } => {
                    let kind = state.kind();
                    match self.render_block(&ctx, cursor, data, state) {
                        Progress::Continued(next_cursor) => {
                            self.log_block(kind, cursor, next_cursor);
                            match kind.next() {
                                Some(next) => Phase::Rendering {
                                    cursor: next_cursor,
                                    state: next.initial_state(),
                                },
                                None => Phase::Finalizing,
                            }
                        }
                        Progress::Overflowed(next_state) => {
                            if ctx.frame.is_fresh(cursor) && next_state == state {
                                return Err(ReportError::OverflowMisconfiguration(format!(
                                    "{} made no progress on a fresh page",
                                    kind.name()
                                )));
                            }
                            let from_page = self.canvas.current_page_index() + 1;
                            let to_page = self.canvas.add_page() + 1;
                            header_band(&mut self.canvas, &ctx, to_page, &header_date);
                            self.log_page_break(kind, from_page, to_page, next_state);
                            Phase::Rendering {
                                cursor: ctx.frame.top(),
                                state: next_state,
                            }
                        }
                    }
                }
                Phase::Finalizing => {
                    let total = self.canvas.page_count();
                    for index in 0..total {
                        if self.canvas.select_page(index) {
                            footer_band(&mut self.canvas, &ctx, index + 1, total, &footer_timestamp);
                        }
                    }
                    if let Some(logger) = self.debug.as_deref() {
                        logger.event("report.finalize", json!({ "pages": total }));
                    }
                    Phase::Done
                }
                Phase::Done => return Ok(self.canvas.finish()),
            };
        }
    }

    fn render_block(
        &mut self,
        ctx: &BlockContext<'_>,
        cursor: Pt,
        data: &ReportData,
        state: BlockState,
    ) -> Progress<BlockState> {
        let canvas = &mut self.canvas;
        let section = section_spec(self.theme, state.kind());
        match state {
            BlockState::TitleCard => title_card(canvas, ctx, cursor).map_resume(|()| state),
            BlockState::MetadataCard => {
                metadata_card(canvas, ctx, cursor, data.metadata.as_ref()).map_resume(|()| state)
            }
            BlockState::ScoreCard => {
                compliance_score_card(canvas, ctx, cursor, data.score, &data.risk_level)
                    .map_resume(|()| state)
            }
            BlockState::Summary(resume) => {
                prose_section(canvas, ctx, cursor, section, &data.summary, resume)
                    .map_resume(BlockState::Summary)
            }
            BlockState::KeyPoints(resume) => {
                list_section(canvas, ctx, cursor, section, &data.key_points, resume)
                    .map_resume(BlockState::KeyPoints)
            }
            BlockState::SuggestedActions(resume) => {
                list_section(canvas, ctx, cursor, section, &data.suggested_actions, resume)
                    .map_resume(BlockState::SuggestedActions)
            }
        }
    }

    fn log_block(&self, kind: BlockKind, before: Pt, after: Pt) {
        if let Some(logger) = self.debug.as_deref() {
            logger.event(
                "report.block",
                json!({
                    "block": kind.name(),
                    "page": self.canvas.current_page_index() + 1,
                    "cursor_before": before.to_f32(),
                    "cursor_after": after.to_f32(),
                }),
            );
        }
    }

    fn log_page_break(&self, kind: BlockKind, from_page: usize, to_page: usize, state: BlockState) {
        if let Some(logger) = self.debug.as_deref() {
            logger.event(
                "report.page_break",
                json!({
                    "reason": "block_overflow",
                    "block": kind.name(),
                    "from_page": from_page,
                    "to_page": to_page,
                    "resume": state.position(),
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockContext, META_BLOCK_KEY, item_lines, prose_lines};
    use crate::canvas::Command;
    use crate::model::{AnalysisResult, MetadataEntries};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    struct Placed {
        page: usize,
        block: String,
        y: Pt,
        text: String,
    }

    fn stamp() -> RenderTimestamp {
        let at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .unwrap();
        RenderTimestamp::fixed(at)
    }

    fn data(summary: String, key_points: Vec<String>, score: f64) -> ReportData {
        AnalysisResult {
            summary,
            key_points,
            suggested_actions: vec!["Réviser le contenu du document".to_string()],
            risk_level: "Faible".to_string(),
            compliance_score: score,
            metadata: None,
        }
        .validate(true)
        .unwrap()
    }

    fn compose(layout: &LayoutConfig, data: &ReportData) -> Result<Document> {
        let theme = Theme::default();
        ReportComposer::new(layout, &theme, stamp()).compose(data)
    }

    fn placed_strings(doc: &Document) -> Vec<Placed> {
        let mut out = Vec::new();
        for (index, page) in doc.pages.iter().enumerate() {
            let mut block = String::new();
            for cmd in &page.commands {
                match cmd {
                    Command::Meta { key, value } if key == META_BLOCK_KEY => block = value.clone(),
                    Command::DrawString { y, text, .. } => out.push(Placed {
                        page: index,
                        block: block.clone(),
                        y: *y,
                        text: text.clone(),
                    }),
                    _ => {}
                }
            }
        }
        out
    }

    fn long_summary(words: usize) -> String {
        (0..words)
            .map(|i| format!("mot{i:05}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Summary wrapping to exactly enough lines to fill page 1, all of page 2
    // and a few lines of page 3.
    fn three_page_summary(layout: &LayoutConfig, ctx: &BlockContext<'_>) -> String {
        let frame = layout.content_frame();
        let line = layout.body_line_height();
        let start = frame.top()
            + layout.title_card_height
            + layout.section_spacing
            + layout.score_card_height
            + layout.section_spacing
            + layout.section_title_height
            + layout.item_spacing;
        let lines_from = |top: Pt| {
            let mut count = 0;
            while frame.fits(top, line * (count + 1)) {
                count += 1;
            }
            count as usize
        };
        let first_page = lines_from(start);
        let full_page = lines_from(frame.top());
        let target = first_page + full_page + 5;

        let canvas = Canvas::new(layout.page_size);
        let mut words = 0;
        loop {
            words += 1;
            let summary = long_summary(words);
            if prose_lines(ctx, &canvas, &summary).len() == target {
                return summary;
            }
        }
    }

    #[test]
    fn summary_spanning_three_pages_loses_and_repeats_nothing() {
        let layout = LayoutConfig::default();
        let theme = Theme::default();
        let ctx = BlockContext::new(&layout, &theme);
        let summary = three_page_summary(&layout, &ctx);
        let doc = compose(&layout, &data(summary.clone(), vec!["Point".to_string()], 75.0)).unwrap();
        assert_eq!(doc.page_count(), 3);

        let expected = prose_lines(&ctx, &Canvas::new(layout.page_size), &summary);
        let expected_set: HashSet<&str> = expected.iter().map(String::as_str).collect();
        let placed = placed_strings(&doc);
        let body: Vec<&Placed> = placed
            .iter()
            .filter(|p| p.block == "summary" && expected_set.contains(p.text.as_str()))
            .collect();
        let drawn: Vec<&str> = body.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(drawn, expected.iter().map(String::as_str).collect::<Vec<_>>());

        let pages: Vec<usize> = body.iter().map(|p| p.page).collect::<HashSet<_>>().into_iter().collect();
        assert_eq!(pages.len(), 3);
        assert_eq!(body.iter().filter(|p| p.page == 2).count(), 5);
        let frame = layout.content_frame();
        for line in &body {
            assert!(line.y >= frame.top());
            assert!(line.y + layout.body_line_height() <= frame.bottom());
        }
    }

    #[test]
    fn list_items_are_never_split_across_pages() {
        let layout = LayoutConfig::default();
        let theme = Theme::default();
        let items: Vec<String> = (0..40)
            .map(|i| {
                let words: Vec<String> = (0..25).map(|w| format!("p{i:02}w{w:02}")).collect();
                format!("Point {i:02}: {}", words.join(" "))
            })
            .collect();
        let doc = compose(&layout, &data("Résumé court.".to_string(), items.clone(), 65.0)).unwrap();
        assert!(doc.page_count() >= 2);

        let ctx = BlockContext::new(&layout, &theme);
        let canvas = Canvas::new(layout.page_size);
        let placed = placed_strings(&doc);
        for item in &items {
            let lines = item_lines(&ctx, &canvas, item);
            assert!(lines.len() > 1);
            let pages: HashSet<usize> = placed
                .iter()
                .filter(|p| p.block == "key_points" && lines.contains(&p.text))
                .map(|p| p.page)
                .collect();
            assert_eq!(pages.len(), 1, "item {item:?} split over {pages:?}");
        }
    }

    #[test]
    fn short_report_fits_one_page_without_metadata_card() {
        let layout = LayoutConfig::default();
        let doc = compose(
            &layout,
            &data("Synthèse brève.".to_string(), vec!["Un point".to_string()], 92.0),
        )
        .unwrap();
        assert_eq!(doc.page_count(), 1);
        let blocks: Vec<&str> = doc.pages[0].meta_values(META_BLOCK_KEY).collect();
        assert_eq!(
            blocks,
            vec![
                "header",
                "title_card",
                "score_card",
                "summary",
                "key_points",
                "suggested_actions",
                "footer"
            ]
        );
        let texts: Vec<&str> = doc.pages[0].strings().collect();
        assert!(texts.contains(&"92%"));
        assert!(texts.contains(&"1/1"));
        assert!(texts.contains(&"Page 1"));
        assert!(texts.contains(&"19/10/2026"));
        assert!(texts.contains(&"19/10/2026 10:30"));
    }

    #[test]
    fn metadata_card_is_drawn_when_present() {
        let layout = LayoutConfig::default();
        let mut report = data("Synthèse.".to_string(), vec!["Un point".to_string()], 50.0);
        report.metadata = Some(MetadataEntries {
            model: Some("Modèle IA: llama3".to_string()),
            ..MetadataEntries::default()
        });
        let doc = compose(&layout, &report).unwrap();
        let texts: Vec<&str> = doc.pages[0].strings().collect();
        assert!(texts.contains(&"INFORMATIONS TECHNIQUES"));
        assert!(texts.contains(&"Modèle IA: llama3"));
    }

    #[test]
    fn every_page_has_header_and_page_of_total_footer() {
        let layout = LayoutConfig::default();
        let doc = compose(&layout, &data(long_summary(1800), vec!["Point".to_string()], 40.0)).unwrap();
        let total = doc.page_count();
        for (index, page) in doc.pages.iter().enumerate() {
            let texts: Vec<&str> = page.strings().collect();
            let page_label = format!("Page {}", index + 1);
            let indicator = format!("{}/{}", index + 1, total);
            assert!(texts.contains(&page_label.as_str()));
            assert_eq!(texts.iter().filter(|t| **t == indicator).count(), 1);
            let blocks: Vec<&str> = page.meta_values(META_BLOCK_KEY).collect();
            assert_eq!(blocks.first(), Some(&"header"));
            assert_eq!(blocks.last(), Some(&"footer"));
        }
    }

    #[test]
    fn separate_composers_do_not_share_state() {
        let layout = LayoutConfig::default();
        let theme = Theme::default();
        let long = data(long_summary(900), vec!["Point".to_string()], 81.0);
        let short = data("Synthèse brève.".to_string(), vec!["Autre point".to_string()], 35.0);
        let long_alone = compose(&layout, &long).unwrap();
        let short_alone = compose(&layout, &short).unwrap();
        assert_ne!(long_alone, short_alone);

        let first = ReportComposer::new(&layout, &theme, stamp());
        let second = ReportComposer::new(&layout, &theme, stamp());
        assert_eq!(first.compose(&long).unwrap(), long_alone);
        assert_eq!(second.compose(&short).unwrap(), short_alone);

        let (left, right) = std::thread::scope(|scope| {
            let a = scope.spawn(|| ReportComposer::new(&layout, &theme, stamp()).compose(&short));
            let b = scope.spawn(|| ReportComposer::new(&layout, &theme, stamp()).compose(&long));
            (a.join().unwrap().unwrap(), b.join().unwrap().unwrap())
        });
        assert_eq!(left, short_alone);
        assert_eq!(right, long_alone);
    }

    #[test]
    fn block_states_follow_drawing_order() {
        let mut kinds = vec![BlockKind::TitleCard];
        while let Some(next) = kinds.last().and_then(|k| k.next()) {
            kinds.push(next);
        }
        assert_eq!(kinds, BlockKind::ORDER.to_vec());
        for kind in BlockKind::ORDER {
            assert_eq!(kind.initial_state().kind(), kind);
        }
        assert_eq!(
            BlockState::KeyPoints(ListResume::default()).kind(),
            BlockKind::KeyPoints
        );
    }

    #[test]
    fn block_taller_than_a_fresh_page_is_a_misconfiguration() {
        let layout = LayoutConfig {
            score_card_height: Pt::from_mm(400.0),
            ..LayoutConfig::default()
        };
        let err = compose(&layout, &data("S.".to_string(), vec![], 90.0)).unwrap_err();
        assert!(matches!(err, ReportError::OverflowMisconfiguration(_)));
        assert!(err.to_string().contains("score_card"));
    }
}
