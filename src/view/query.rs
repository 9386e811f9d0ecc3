use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parses `"header desc, status"` into specs; direction defaults to ascending
    pub fn parse_list(s: &str) -> Result<Vec<SortSpec>, ValidationError> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                validate_column(col)?;
                let direction = match it.next() {
                    None => SortDirection::Asc,
                    Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                    Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                    Some(dir) => {
                        return Err(ValidationError::InvalidValue { field: "sort", value: dir.to_string() })
                    }
                };
                if let Some(extra) = it.next() {
                    return Err(ValidationError::InvalidValue { field: "sort", value: extra.to_string() });
                }
                out.push(SortSpec { column: col.to_string(), direction });
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: String,
    pub value: String,
}

impl ColumnFilter {
    /// Parses `column=value`
    pub fn parse(s: &str) -> Result<ColumnFilter, ValidationError> {
        let (column, value) = s
            .split_once('=')
            .ok_or_else(|| ValidationError::InvalidValue { field: "filter", value: s.to_string() })?;
        let column = column.trim();
        validate_column(column)?;
        if is_reserved(column) {
            return Err(ValidationError::InvalidValue { field: "filter", value: column.to_string() });
        }
        Ok(ColumnFilter { column: column.to_string(), value: value.trim().to_string() })
    }
}

/// Query parameters owned by pagination and sorting
const RESERVED_PARAMS: [&str; 3] = ["page", "limit", "sort"];

fn is_reserved(column: &str) -> bool {
    RESERVED_PARAMS.iter().any(|p| p.eq_ignore_ascii_case(column))
}

fn validate_column(column: &str) -> Result<(), ValidationError> {
    let mut chars = column.chars();
    let valid_start = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
    if !valid_start || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidValue { field: "column", value: column.to_string() });
    }
    Ok(())
}

/// Everything that determines which rows a view shows, apart from the tenant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewQuery {
    /// 1-based
    pub page: u32,
    pub page_size: u32,
    pub sort: Vec<SortSpec>,
    pub filters: Vec<ColumnFilter>,
}

impl ViewQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            sort: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn first_page(&self) -> Self {
        Self { page: 1, ..self.clone() }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.page_size.to_string()),
        ];

        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|s| format!("{}:{}", s.column, s.direction.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("sort".to_string(), sort));
        }

        for filter in self.filters.iter().filter(|f| !is_reserved(&f.column)) {
            params.push((filter.column.clone(), filter.value.clone()));
        }

        params
    }
}

/// Identity of one fetch: the tenant plus the full query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub tenant: String,
    pub query: ViewQuery,
}

/// `None` without an active tenant: nothing tenant-scoped may be fetched
pub fn request_key(tenant: Option<&str>, query: &ViewQuery) -> Option<RequestKey> {
    tenant.map(|tenant| RequestKey {
        tenant: tenant.to_string(),
        query: query.clone(),
    })
}
