//! Search layer facade.
//!
//! - **[`gateway`]**: the remote search boundary ([`gateway::SearchGateway`]) and its errors.
//! - **[`http`]**: reqwest implementation of the gateway against the console API.
//! - **[`pipeline`]**: debounced, cancellation-safe query → result-set stream.
//! - **[`fallback`]**: degraded-mode substitutes (canned sample, entity catalog).
//! - **[`routes`]**: resource locator → console route resolution.

pub mod fallback;
pub mod gateway;
pub mod http;
pub mod pipeline;
pub mod routes;
