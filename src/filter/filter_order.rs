use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse an order spec like `"entry_date desc, symbol"` into ordered
    /// column/direction pairs. Direction defaults to ascending.
    pub fn parse(spec: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                Self::validate_column(col)?;
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        Ok(out)
    }

    /// Render the `order` query value, e.g. `entry_date.desc,symbol.asc`.
    pub fn generate(infos: &[FilterOrderInfo]) -> Option<String> {
        if infos.is_empty() {
            return None;
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{}.{}", i.column, i.sort.to_param()))
            .collect();
        Some(parts.join(","))
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        let mut chars = column.chars();
        let leading_ok = chars
            .next()
            .map(|c| c.is_alphabetic() || c == '_')
            .unwrap_or(false);
        if !leading_ok || !column.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidColumn(column.to_string()));
        }
        Ok(())
    }
}
