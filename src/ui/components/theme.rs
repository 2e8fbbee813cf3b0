//! Theme definitions for the search surface.
//!
//! Muted, low-saturation base colors with accents used sparingly; entity
//! types get the same hues the web console uses for their chips.

use ratatui::style::{Color, Modifier, Style};

use crate::model::types::entity_color;

pub mod colors {
    use ratatui::style::Color;

    // ═══════════════════════════════════════════════════════════════════════════
    // BASE COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deep background - primary canvas color
    pub const BG_DEEP: Color = Color::Rgb(26, 27, 38); // #1a1b26

    /// Elevated surface - cards, modals, popups
    pub const BG_SURFACE: Color = Color::Rgb(36, 40, 59); // #24283b

    /// Subtle surface - hover states, selected items
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42

    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261

    /// Border accent - focused/active elements
    pub const BORDER_FOCUS: Color = Color::Rgb(125, 145, 200); // #7d91c8

    // ═══════════════════════════════════════════════════════════════════════════
    // TEXT COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const TEXT_PRIMARY: Color = Color::Rgb(192, 202, 245); // #c0caf5
    pub const TEXT_SECONDARY: Color = Color::Rgb(169, 177, 214); // #a9b1d6

    /// Muted text - hints, placeholders
    pub const TEXT_MUTED: Color = Color::Rgb(105, 114, 158); // #696e9e

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCENT + STATUS COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const ACCENT_PRIMARY: Color = Color::Rgb(122, 162, 247); // #7aa2f7
    pub const ACCENT_SECONDARY: Color = Color::Rgb(187, 154, 247); // #bb9af7

    pub const STATUS_SUCCESS: Color = Color::Rgb(115, 218, 202); // #73daca
    pub const STATUS_WARNING: Color = Color::Rgb(224, 175, 104); // #e0af68
    pub const STATUS_ERROR: Color = Color::Rgb(247, 118, 142); // #f7768e

    /// Unknown entity types
    pub const ENTITY_FALLBACK: Color = Color::Rgb(117, 117, 117); // #757575
}

#[derive(Clone, Copy)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub bg: Color,
    pub fg: Color,
    pub surface: Color,
    pub hint: Color,
    pub border: Color,
    pub warning: Color,
    /// Alternating stripe colors for zebra-striping results
    pub stripe_even: Color,
    pub stripe_odd: Color,
}

impl ThemePalette {
    /// Light theme - clean, minimal, professional
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(47, 107, 231),       // Rich blue
            accent_alt: Color::Rgb(124, 93, 198),   // Purple
            bg: Color::Rgb(250, 250, 252),          // Off-white
            fg: Color::Rgb(36, 41, 46),             // Near-black
            surface: Color::Rgb(240, 241, 245),     // Light gray
            hint: Color::Rgb(125, 134, 144),        // Medium gray
            border: Color::Rgb(216, 222, 228),      // Border gray
            warning: Color::Rgb(177, 133, 41),      // Amber
            stripe_even: Color::Rgb(250, 250, 252), // Same as bg
            stripe_odd: Color::Rgb(240, 241, 245),  // Slightly darker
        }
    }

    /// Dark theme - default
    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            bg: colors::BG_DEEP,
            fg: colors::TEXT_PRIMARY,
            surface: colors::BG_SURFACE,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
            warning: colors::STATUS_WARNING,
            stripe_even: colors::BG_DEEP,
            stripe_odd: Color::Rgb(30, 32, 48), // #1e2030
        }
    }

    pub fn title(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn border_style(self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focus_style(self) -> Style {
        Style::default().fg(colors::BORDER_FOCUS)
    }

    /// Selected item style - for list selections
    pub fn selected_style(self) -> Style {
        Style::default()
            .bg(colors::BG_HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Matched query text inside titles
    pub fn highlight_style(self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Degraded-search advisory line
    pub fn advisory_style(self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn stripe(self, idx: usize) -> Style {
        let bg = if idx % 2 == 0 {
            self.stripe_even
        } else {
            self.stripe_odd
        };
        Style::default().bg(bg)
    }

    /// Label color for an entity type, matching the console chip colors.
    pub fn entity_style(self, entity_type: &str) -> Style {
        let color = hex_color(entity_color(entity_type)).unwrap_or(colors::ENTITY_FALLBACK);
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

/// Parse `#rrggbb` into a terminal color.
pub fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Creates a subtle badge/chip style for filter indicators
pub fn chip_style(palette: ThemePalette) -> Style {
    Style::default()
        .fg(palette.accent_alt)
        .add_modifier(Modifier::BOLD)
}

/// Creates a keyboard shortcut style (for help text)
pub fn kbd_style(palette: ThemePalette) -> Style {
    Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD)
}

/// Style for relevance scores (0..=1)
pub fn score_style(score: f32, palette: ThemePalette) -> Style {
    if score >= 0.8 {
        Style::default()
            .fg(colors::STATUS_SUCCESS)
            .add_modifier(Modifier::BOLD)
    } else if score >= 0.5 {
        Style::default().fg(palette.accent)
    } else {
        Style::default()
            .fg(palette.hint)
            .add_modifier(Modifier::DIM)
    }
}
