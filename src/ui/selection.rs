//! Highlighted-result tracking for the search dropdown.
//!
//! Result sets arrive asynchronously and replace each other wholesale; the
//! controller keeps a highlighted index that is always in range and resets
//! whenever a set with a new identity (generation) arrives. Commands that
//! make no sense in the current state are silently ignored: they happen
//! naturally when key presses race the network.

use crate::model::types::{ResultItem, ResultSet, ResultStatus};
use crate::search::routes::item_route;
use crate::ui::navigate::Navigator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPhase {
    /// No query; nothing to select.
    Idle,
    /// The service answered; zero or more items.
    Loaded,
    /// The last search failed and the set is a fallback.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionCommand {
    MoveNext,
    MovePrevious,
    MoveFirst,
    MoveLast,
    Commit,
    Clear,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Nothing changed.
    Ignored,
    /// Highlight moved (or stayed clamped at an edge).
    Moved { index: usize },
    /// An item was committed; the query input must be emptied.
    Committed { route: Option<String> },
    /// Selection was reset; the query input must be emptied.
    Cleared,
}

impl CommandOutcome {
    pub fn clears_query(&self) -> bool {
        matches!(self, Self::Committed { .. } | Self::Cleared)
    }
}

#[derive(Debug, Default)]
pub struct SelectionController {
    results: Option<ResultSet>,
    index: usize,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed set. A different generation resets the highlight.
    pub fn apply(&mut self, set: ResultSet) {
        let same_identity = self
            .results
            .as_ref()
            .is_some_and(|current| current.generation == set.generation);
        if !same_identity || self.index >= set.len() {
            self.index = 0;
        }
        self.results = Some(set);
    }

    pub fn phase(&self) -> SelectionPhase {
        match self.results.as_ref().map(|set| &set.status) {
            None | Some(ResultStatus::NoQuery) => SelectionPhase::Idle,
            Some(ResultStatus::Matches) => SelectionPhase::Loaded,
            Some(ResultStatus::Degraded { .. }) => SelectionPhase::Error,
        }
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn items(&self) -> &[ResultItem] {
        self.results.as_ref().map_or(&[], |set| set.items.as_slice())
    }

    /// Highlighted index; `None` whenever there is nothing to highlight.
    pub fn index(&self) -> Option<usize> {
        (!self.items().is_empty()).then_some(self.index)
    }

    pub fn highlighted(&self) -> Option<&ResultItem> {
        self.index().and_then(|idx| self.items().get(idx))
    }

    pub fn advisory(&self) -> Option<&str> {
        self.results.as_ref().and_then(ResultSet::advisory)
    }

    pub fn handle(&mut self, command: SelectionCommand, navigator: &mut impl Navigator) -> CommandOutcome {
        let len = self.items().len();
        match command {
            SelectionCommand::Clear => {
                self.clear();
                CommandOutcome::Cleared
            }
            _ if len == 0 => CommandOutcome::Ignored,
            SelectionCommand::MoveNext => self.move_to(self.index.saturating_add(1)),
            SelectionCommand::MovePrevious => self.move_to(self.index.saturating_sub(1)),
            SelectionCommand::MoveFirst => self.move_to(0),
            SelectionCommand::MoveLast => self.move_to(len - 1),
            SelectionCommand::Commit => {
                let Some(item) = self.highlighted() else {
                    return CommandOutcome::Ignored;
                };
                let route = item_route(item);
                if let Some(route) = &route {
                    tracing::info!(route = %route, item = %item.id, "search_commit");
                    navigator.navigate(route);
                }
                self.clear();
                CommandOutcome::Committed { route }
            }
        }
    }

    fn move_to(&mut self, target: usize) -> CommandOutcome {
        let last = self.items().len().saturating_sub(1);
        self.index = target.min(last);
        CommandOutcome::Moved { index: self.index }
    }

    fn clear(&mut self) {
        let generation = self.results.as_ref().map_or(0, |set| set.generation);
        self.results = Some(ResultSet::no_query(generation));
        self.index = 0;
    }
}
