//! Search entities shared by the gateway, pipeline and presenter.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Sort keys understood by the search service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Relevance,
    Title,
    CreatedDate,
    UpdatedDate,
    EntityType,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Title => "title",
            SortBy::CreatedDate => "createdDate",
            SortBy::UpdatedDate => "updatedDate",
            SortBy::EntityType => "entityType",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "relevance" => Ok(SortBy::Relevance),
            "title" => Ok(SortBy::Title),
            "createddate" | "created" => Ok(SortBy::CreatedDate),
            "updateddate" | "updated" => Ok(SortBy::UpdatedDate),
            "entitytype" | "type" => Ok(SortBy::EntityType),
            other => Err(format!(
                "unknown sort key '{other}' (expected relevance, title, createdDate, updatedDate or entityType)"
            )),
        }
    }
}

/// Every filter the search endpoint recognises, each with a defined default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Restrict to one entity category (e.g. `HardwarePanel`).
    pub entity_type: Option<String>,
    pub limit: usize,
    pub offset: usize,
    /// Relevance floor in 0..=1.
    pub min_score: f32,
    pub include_inactive: bool,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Exact-match manufacturer filter.
    pub manufacturer: Option<String>,
    pub sort_by: SortBy,
    pub include_facets: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            entity_type: None,
            limit: 20,
            offset: 0,
            min_score: 0.1,
            include_inactive: false,
            from_date: None,
            to_date: None,
            manufacturer: None,
            sort_by: SortBy::Relevance,
            include_facets: true,
        }
    }
}

impl SearchFilters {
    /// Query-string pairs for `GET /api/search`, `q` first.
    pub fn to_params(&self, text: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", text.to_string()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
            ("minScore", self.min_score.to_string()),
            ("includeInactive", self.include_inactive.to_string()),
            ("includeFacets", self.include_facets.to_string()),
            ("sortBy", self.sort_by.as_str().to_string()),
        ];
        if let Some(kind) = &self.entity_type {
            params.push(("type", kind.clone()));
        }
        if let Some(from) = self.from_date {
            params.push(("fromDate", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to_date {
            params.push(("toDate", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(manufacturer) = &self.manufacturer {
            params.push(("manufacturer", manufacturer.clone()));
        }
        params
    }
}

/// Search text plus filters. Never mutated in place: every change builds a new value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Query {
    pub text: String,
    pub filters: SearchFilters,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filters: SearchFilters::default(),
        }
    }

    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filters: self.filters.clone(),
        }
    }

    pub fn with_filters(&self, filters: SearchFilters) -> Self {
        Self {
            text: self.text.clone(),
            filters,
        }
    }

    /// Length used by the minimum-length gate (trimmed, in chars).
    pub fn effective_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultAction {
    pub name: String,
    /// Opaque resource locator from the search service.
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub requires_confirmation: bool,
}

fn default_method() -> String {
    "GET".to_string()
}

/// One search hit. Built once from a gateway response and never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub entity_type: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default, deserialize_with = "clamped_score")]
    pub relevance_score: f32,
    #[serde(default)]
    pub actions: Vec<ResultAction>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ResultItem {
    pub fn new(
        id: impl Into<String>,
        entity_type: impl Into<String>,
        title: impl Into<String>,
        relevance_score: f32,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            title: title.into(),
            description: None,
            snippet: None,
            manufacturer: None,
            relevance_score: clamp_score(relevance_score),
            actions: Vec::new(),
            metadata: serde_json::Map::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_action(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.actions.push(ResultAction {
            name: name.into(),
            url: url.into(),
            method: default_method(),
            requires_confirmation: false,
        });
        self
    }

    /// Case-insensitive substring match over title, entity type and description.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.entity_type.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

fn clamped_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f32>::deserialize(deserializer)?;
    Ok(raw.map(clamp_score).unwrap_or(0.0))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Count breakdowns by categorical dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Facets {
    pub entity_types: BTreeMap<String, u64>,
    pub manufacturers: BTreeMap<String, u64>,
    pub hardware_types: BTreeMap<String, u64>,
    pub simulator_sdk_types: BTreeMap<String, u64>,
    pub date_ranges: BTreeMap<String, u64>,
}

impl Facets {
    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty()
            && self.manufacturers.is_empty()
            && self.hardware_types.is_empty()
            && self.simulator_sdk_types.is_empty()
            && self.date_ranges.is_empty()
    }
}

/// Wire response of `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub total_results: u64,
    pub page: u32,
    pub total_pages: u32,
    pub execution_time_ms: u64,
    pub is_success: bool,
    pub error_message: Option<String>,
    pub results: Vec<ResultItem>,
    pub facets: Facets,
}

impl Default for SearchResponse {
    fn default() -> Self {
        Self {
            query: String::new(),
            total_results: 0,
            page: 1,
            total_pages: 1,
            execution_time_ms: 0,
            is_success: true,
            error_message: None,
            results: Vec::new(),
            facets: Facets::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub total_results: u64,
    pub page: u32,
    pub total_pages: u32,
    pub execution_time_ms: u64,
}

/// Why a result set looks the way it does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultStatus {
    /// No query yet, or the query is under the minimum length.
    NoQuery,
    /// The gateway answered; may hold zero items.
    Matches,
    /// The gateway failed; items (if any) are a fallback substitute.
    Degraded { advisory: String },
}

/// Ordered outcome of a single completed (or failed) search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    /// Generation of the query that produced this set; doubles as its identity.
    pub generation: u64,
    pub items: Vec<ResultItem>,
    #[serde(flatten)]
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Facets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageSummary>,
}

impl ResultSet {
    pub fn no_query(generation: u64) -> Self {
        Self {
            generation,
            items: Vec::new(),
            status: ResultStatus::NoQuery,
            facets: None,
            page: None,
        }
    }

    pub fn matches(generation: u64, items: Vec<ResultItem>) -> Self {
        Self {
            generation,
            items,
            status: ResultStatus::Matches,
            facets: None,
            page: None,
        }
    }

    pub fn degraded(generation: u64, items: Vec<ResultItem>, advisory: impl Into<String>) -> Self {
        Self {
            generation,
            items,
            status: ResultStatus::Degraded {
                advisory: advisory.into(),
            },
            facets: None,
            page: None,
        }
    }

    /// Builds a set from a full search response, keeping facets and paging.
    pub fn from_response(generation: u64, response: SearchResponse) -> Self {
        let page = PageSummary {
            total_results: response.total_results,
            page: response.page,
            total_pages: response.total_pages,
            execution_time_ms: response.execution_time_ms,
        };
        let facets = (!response.facets.is_empty()).then_some(response.facets);
        Self {
            generation,
            items: response.results,
            status: ResultStatus::Matches,
            facets,
            page: Some(page),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn advisory(&self) -> Option<&str> {
        match &self.status {
            ResultStatus::Degraded { advisory } => Some(advisory),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ResultStatus::Degraded { .. })
    }
}

/// Searchable category, used for filter chips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchStatistics {
    pub total_searches: u64,
    pub average_query_length: f64,
    pub most_searched_terms: Vec<String>,
    pub search_success_rate: f64,
    pub average_response_time: f64,
}

/// Presentation hints for an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTypeInfo {
    pub icon: &'static str,
    /// `#rrggbb`
    pub color: &'static str,
    pub label: &'static str,
}

pub fn entity_type_info(entity_type: &str) -> Option<EntityTypeInfo> {
    let (icon, color, label) = match entity_type {
        "AircraftModel" => ("airplanemode_active", "#2196f3", "Aircraft Model"),
        "HardwarePanel" => ("dashboard", "#1976d2", "Hardware Panel"),
        "HardwareBoard" => ("memory", "#9c27b0", "Hardware Board"),
        "HardwareInput" => ("login", "#4caf50", "Hardware Input"),
        "HardwareOutput" => ("logout", "#ff9800", "Hardware Output"),
        "HardwareInputType" => ("input", "#4caf50", "Hardware Input Type"),
        "HardwareOutputType" => ("output", "#ff9800", "Hardware Output Type"),
        "SimulatorEvent" => ("laptop", "#e91e63", "Simulator Event"),
        _ => return None,
    };
    Some(EntityTypeInfo { icon, color, label })
}

/// Color for an entity type, falling back to neutral grey.
pub fn entity_color(entity_type: &str) -> &'static str {
    entity_type_info(entity_type).map_or("#757575", |info| info.color)
}

/// Label for an entity type; unknown types display their raw id.
pub fn entity_label(entity_type: &str) -> String {
    entity_type_info(entity_type).map_or_else(|| entity_type.to_string(), |info| info.label.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_params_skip_unset_optionals() {
        let params = SearchFilters::default().to_params("led");
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "q",
                "limit",
                "offset",
                "minScore",
                "includeInactive",
                "includeFacets",
                "sortBy"
            ]
        );
        assert!(params.contains(&("minScore", "0.1".to_string())));
        assert!(params.contains(&("sortBy", "relevance".to_string())));
    }

    #[test]
    fn filter_params_include_set_optionals() {
        let filters = SearchFilters {
            entity_type: Some("HardwarePanel".into()),
            from_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            manufacturer: Some("OpenA3XX".into()),
            sort_by: SortBy::UpdatedDate,
            ..SearchFilters::default()
        };
        let params = filters.to_params("x");
        assert!(params.contains(&("type", "HardwarePanel".to_string())));
        assert!(params.contains(&("fromDate", "2024-01-31".to_string())));
        assert!(params.contains(&("manufacturer", "OpenA3XX".to_string())));
        assert!(params.contains(&("sortBy", "updatedDate".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "toDate"));
    }

    #[test]
    fn query_changes_produce_new_values() {
        let base = Query::new("pan");
        let next = base.with_text("panel");
        assert_eq!(base.text, "pan");
        assert_eq!(next.text, "panel");
        assert_eq!(next.filters, base.filters);
        assert_eq!(Query::new("  a ").effective_len(), 1);
    }

    #[test]
    fn result_item_accepts_numeric_ids_and_clamps_scores() {
        let raw = r#"{"id": 42, "entityType": "HardwarePanel", "title": "Overhead", "relevanceScore": 1.7}"#;
        let item: ResultItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.id, "42");
        assert_eq!(item.relevance_score, 1.0);
        assert!(item.actions.is_empty());
    }

    #[test]
    fn sort_by_parses_wire_and_loose_names() {
        assert_eq!("createdDate".parse::<SortBy>().unwrap(), SortBy::CreatedDate);
        assert_eq!("entity-type".parse::<SortBy>().unwrap(), SortBy::EntityType);
        assert!("bogus".parse::<SortBy>().is_err());
    }

    #[test]
    fn unknown_entity_types_fall_back_to_raw_label() {
        assert_eq!(entity_label("HardwareBoard"), "Hardware Board");
        assert_eq!(entity_label("Gizmo"), "Gizmo");
        assert_eq!(entity_color("Gizmo"), "#757575");
    }
}
