use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::model::types::{ResultItem, ResultSet, ResultStatus, entity_label};
use crate::search::routes::item_route;
use crate::ui::components::theme::{ThemePalette, score_style};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusRegion {
    Query,
    Results,
}

impl FocusRegion {
    pub fn toggle(self) -> Self {
        match self {
            FocusRegion::Query => FocusRegion::Results,
            FocusRegion::Results => FocusRegion::Query,
        }
    }
}

/// Split `text` into spans, emphasising case-insensitive occurrences of `query`.
///
/// Matching runs on a per-char lowercase copy that remembers which source char
/// every byte came from, so spans always start and end on char boundaries of `text`.
pub fn highlight_terms(text: &str, query: &str, base: Style, palette: ThemePalette) -> Vec<Span<'static>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return vec![Span::styled(text.to_string(), base)];
    }
    let mut lower = String::with_capacity(text.len());
    // (start, end) of the source char for each byte of `lower`.
    let mut origin: Vec<(usize, usize)> = Vec::with_capacity(text.len());
    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        for lc in ch.to_lowercase() {
            lower.push(lc);
            origin.resize(lower.len(), (start, end));
        }
    }

    let mut spans = Vec::new();
    let mut emitted = 0;
    let mut search_from = 0;
    while let Some(pos) = lower[search_from..].find(&needle) {
        let hit = search_from + pos;
        search_from = hit + needle.len();
        let start = origin[hit].0;
        let end = origin[search_from - 1].1;
        // Overlaps a char that was already emphasised.
        if start < emitted {
            continue;
        }
        if start > emitted {
            spans.push(Span::styled(text[emitted..start].to_string(), base));
        }
        spans.push(Span::styled(
            text[start..end].to_string(),
            base.patch(palette.highlight_style()),
        ));
        emitted = end;
    }
    if emitted < text.len() {
        spans.push(Span::styled(text[emitted..].to_string(), base));
    }
    spans
}

/// Single result row: entity label, title with matches, score.
pub fn result_line(item: &ResultItem, query: &str, palette: ThemePalette) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("{:<22}", entity_label(&item.entity_type)),
            palette.entity_style(&item.entity_type),
        ),
        Span::raw(" "),
    ];
    spans.extend(highlight_terms(
        &item.title,
        query,
        Style::default().fg(palette.fg),
        palette,
    ));
    spans.push(Span::styled(
        format!("  {:.2}", item.relevance_score),
        score_style(item.relevance_score, palette),
    ));
    Line::from(spans)
}

/// Detail lines for the highlighted item.
pub fn detail_lines(item: &ResultItem, palette: ThemePalette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(item.title.clone(), palette.title()))];
    if let Some(description) = &item.description {
        lines.push(Line::from(description.clone()));
    }
    if let Some(snippet) = item.snippet.as_ref().filter(|s| Some(*s) != item.description.as_ref()) {
        lines.push(Line::from(Span::styled(snippet.clone(), palette.hint_style())));
    }
    if let Some(manufacturer) = &item.manufacturer {
        lines.push(Line::from(format!("Manufacturer: {manufacturer}")));
    }
    match item_route(item) {
        Some(route) => lines.push(Line::from(vec![
            Span::styled("Enter → ", palette.hint_style()),
            Span::raw(route),
        ])),
        None => lines.push(Line::from(Span::styled(
            "no navigable action",
            palette.hint_style(),
        ))),
    }
    lines
}

/// Prompt shown while the query is below the surface's minimum length.
pub fn query_prompt(min_query_len: usize) -> String {
    match min_query_len {
        0 | 1 => "Type to search".to_string(),
        n => format!("Type at least {n} characters to search"),
    }
}

/// One-line summary of the displayed set for the status bar.
pub fn status_summary(set: Option<&ResultSet>, min_query_len: usize) -> String {
    let Some(set) = set else {
        return query_prompt(min_query_len);
    };
    match &set.status {
        ResultStatus::NoQuery => query_prompt(min_query_len),
        ResultStatus::Matches if set.is_empty() => "No matches".to_string(),
        ResultStatus::Matches => match set.page {
            Some(page) => format!(
                "{} of {} results ({} ms)",
                set.len(),
                page.total_results,
                page.execution_time_ms
            ),
            None => format!("{} results", set.len()),
        },
        ResultStatus::Degraded { advisory } => advisory.clone(),
    }
}
