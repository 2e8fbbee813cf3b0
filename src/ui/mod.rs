pub mod components;
pub mod data;
pub mod navigate;
pub mod selection;
pub mod shortcuts;
pub mod tui;
