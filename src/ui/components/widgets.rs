use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::components::theme::{ThemePalette, chip_style};

/// Query input box. The cursor glyph only shows while the box has focus.
pub fn search_bar(
    query: &str,
    palette: ThemePalette,
    focused: bool,
    shortcut_hint: &str,
    searching: bool,
) -> Paragraph<'static> {
    let title = if searching {
        format!("Search hardware ({shortcut_hint}) … searching")
    } else {
        format!("Search hardware ({shortcut_hint})")
    };
    let border = if focused {
        palette.border_focus_style()
    } else {
        palette.border_style()
    };
    let mut spans = vec![Span::styled(query.to_string(), ratatui::style::Style::default().fg(palette.fg))];
    if focused {
        spans.push(Span::styled("▏", palette.title()));
    } else if query.is_empty() {
        spans.push(Span::styled(
            "type to search panels, boards, inputs, outputs…",
            palette.hint_style(),
        ));
    }
    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled(title, palette.title()))
            .borders(Borders::ALL)
            .border_style(border),
    )
}

/// One chip per entity category, with facet counts when available.
pub fn entity_chips(
    chips: &[(String, Option<u64>)],
    palette: ThemePalette,
) -> Line<'static> {
    let mut spans = Vec::with_capacity(chips.len() * 2);
    for (label, count) in chips {
        let text = match count {
            Some(n) => format!("[{label}:{n}]"),
            None => format!("[{label}]"),
        };
        spans.push(Span::styled(text, chip_style(palette)));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}
