use crate::employees::types::EmployeeSummary;
use serde::{Deserialize, Serialize};

/// Body of the exact and suggest endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search_key: String,
}

/// Body of the ranked (full) search endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct RankedSearchRequest {
    pub search_key: String,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub employees: Vec<EmployeeSummary>,
}
