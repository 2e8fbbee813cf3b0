//! Keyboard shortcuts: legend constants and the global focus shortcut.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

pub const HELP: &str = "F1";
pub const THEME: &str = "F2";
pub const QUIT: &str = "Esc/Ctrl+C";
pub const FOCUS_QUERY: &str = "Ctrl+K";
pub const FOCUS_QUERY_FROM_RESULTS: &str = "/";
pub const TAB_FOCUS: &str = "Tab";
pub const CLEAR_QUERY: &str = "Esc";

// Navigation
pub const MOVE: &str = "Up/Down";
pub const JUMP_TOP: &str = "Home";
pub const JUMP_BOTTOM: &str = "End";
pub const OPEN: &str = "Enter";

/// Modifier + letter, e.g. `Ctrl+K`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyCombo {
    pub modifiers: KeyModifiers,
    pub key: char,
}

impl Default for KeyCombo {
    fn default() -> Self {
        Self {
            modifiers: KeyModifiers::CONTROL,
            key: 'k',
        }
    }
}

impl FromStr for KeyCombo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (modifier, key) = s
            .trim()
            .rsplit_once('+')
            .ok_or_else(|| format!("shortcut '{s}' must look like ctrl+k"))?;
        let modifiers = match modifier.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "cmd" | "super" | "meta" => KeyModifiers::SUPER,
            "alt" | "option" => KeyModifiers::ALT,
            other => return Err(format!("unsupported shortcut modifier '{other}'")),
        };
        let mut chars = key.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(Self {
                modifiers,
                key: c.to_ascii_lowercase(),
            }),
            _ => Err(format!("shortcut key '{key}' must be a single letter")),
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifier = if self.modifiers.contains(KeyModifiers::SUPER) {
            "Cmd"
        } else if self.modifiers.contains(KeyModifiers::ALT) {
            "Alt"
        } else {
            "Ctrl"
        };
        write!(f, "{modifier}+{}", self.key.to_ascii_uppercase())
    }
}

/// What to do with a key event after the listener saw it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutAction {
    /// The combination matched: focus the query field and swallow the event.
    FocusQuery,
    /// Not ours; hand it to whatever has focus.
    PassThrough,
}

/// Watches every key event, whatever currently has focus.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShortcutListener {
    combo: KeyCombo,
}

impl ShortcutListener {
    pub fn new(combo: KeyCombo) -> Self {
        Self { combo }
    }

    pub fn combo(&self) -> KeyCombo {
        self.combo
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.kind != KeyEventKind::Press {
            return false;
        }
        let KeyCode::Char(c) = event.code else {
            return false;
        };
        if !c.eq_ignore_ascii_case(&self.combo.key) {
            return false;
        }
        // Ctrl and Cmd are interchangeable, as on the web console.
        let accepted = if self.combo.modifiers == KeyModifiers::CONTROL
            || self.combo.modifiers == KeyModifiers::SUPER
        {
            KeyModifiers::CONTROL | KeyModifiers::SUPER
        } else {
            self.combo.modifiers
        };
        event.modifiers.intersects(accepted)
    }

    /// Matching events are always consumed so they never reach the query text.
    pub fn observe(&self, event: &KeyEvent) -> ShortcutAction {
        if self.matches(event) {
            ShortcutAction::FocusQuery
        } else {
            ShortcutAction::PassThrough
        }
    }

    /// Try to focus now; if the target is not mounted yet, hand back a
    /// retry schedule instead of dropping the request.
    pub fn focus<T: FocusTarget>(
        &self,
        target: &mut T,
        policy: FocusRetry,
        now: Instant,
    ) -> Option<PendingFocus> {
        if target.try_focus() {
            return None;
        }
        debug!("query field not mounted; scheduling focus retry");
        let mut pending = PendingFocus {
            policy,
            attempts: 0,
            next_at: now,
        };
        pending.backoff(now);
        Some(pending)
    }
}

/// A widget that can take keyboard focus once it exists.
pub trait FocusTarget {
    /// Returns false while the target is not mounted.
    fn try_focus(&mut self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusRetry {
    pub initial: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for FocusRetry {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(50),
            max_delay: Duration::from_millis(400),
            max_attempts: 20,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusPoll {
    Focused,
    Waiting,
    GaveUp,
}

/// Focus request waiting for its target to mount.
#[derive(Clone, Debug)]
pub struct PendingFocus {
    policy: FocusRetry,
    attempts: u32,
    next_at: Instant,
}

impl PendingFocus {
    pub fn next_at(&self) -> Instant {
        self.next_at
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn poll<T: FocusTarget>(&mut self, now: Instant, target: &mut T) -> FocusPoll {
        if now < self.next_at {
            return FocusPoll::Waiting;
        }
        if target.try_focus() {
            return FocusPoll::Focused;
        }
        if self.attempts >= self.policy.max_attempts {
            warn!(attempts = self.attempts, "query field never mounted; focus request dropped");
            return FocusPoll::GaveUp;
        }
        self.backoff(now);
        FocusPoll::Waiting
    }

    fn backoff(&mut self, now: Instant) {
        let factor = 1u32 << self.attempts.min(16);
        let delay = self
            .policy
            .initial
            .saturating_mul(factor)
            .min(self.policy.max_delay);
        self.attempts += 1;
        self.next_at = now + delay;
    }
}
