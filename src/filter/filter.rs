use std::fmt::Display;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{FilterOp, FilterOrderInfo, FilterWhereInfo};

/// Builder for a single gateway table read, rendered as query pairs rather
/// than executed locally. Table and column names are validated up front so a
/// malformed identifier fails before a request is issued.
pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    embeds: Vec<String>,
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i32>,
    offset: Option<i32>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            select_columns: vec![],
            embeds: vec![],
            where_data: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn table(&self) -> &str {
        &self.table_name
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        Self::validate_select_columns(&columns)?;
        self.select_columns = columns;
        Ok(self)
    }

    /// Embed a related table's columns into each row, e.g.
    /// `embed("categories", &["name", "color"])` renders as
    /// `categories(name,color)` in the select list.
    pub fn embed(&mut self, table: &str, columns: &[&str]) -> Result<&mut Self, FilterError> {
        Self::validate_table_name(table)?;
        for column in columns {
            Self::validate_column_name(column)?;
        }
        self.embeds.push(format!("{}({})", table, columns.join(",")));
        Ok(self)
    }

    pub fn eq(&mut self, column: &str, value: impl Display) -> Result<&mut Self, FilterError> {
        self.push_where(column, FilterOp::Eq, value)
    }

    pub fn neq(&mut self, column: &str, value: impl Display) -> Result<&mut Self, FilterError> {
        self.push_where(column, FilterOp::Neq, value)
    }

    pub fn gt(&mut self, column: &str, value: impl Display) -> Result<&mut Self, FilterError> {
        self.push_where(column, FilterOp::Gt, value)
    }

    pub fn gte(&mut self, column: &str, value: impl Display) -> Result<&mut Self, FilterError> {
        self.push_where(column, FilterOp::Gte, value)
    }

    pub fn lt(&mut self, column: &str, value: impl Display) -> Result<&mut Self, FilterError> {
        self.push_where(column, FilterOp::Lt, value)
    }

    pub fn lte(&mut self, column: &str, value: impl Display) -> Result<&mut Self, FilterError> {
        self.push_where(column, FilterOp::Lte, value)
    }

    pub fn eq_any<V: Display>(
        &mut self,
        column: &str,
        values: &[V],
    ) -> Result<&mut Self, FilterError> {
        let list = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.push_where(column, FilterOp::In, format!("({})", list))
    }

    fn push_where(
        &mut self,
        column: &str,
        operator: FilterOp,
        value: impl Display,
    ) -> Result<&mut Self, FilterError> {
        Self::validate_column_name(column)?;
        self.where_data.push(FilterWhereInfo {
            column: column.to_string(),
            operator,
            value: value.to_string(),
        });
        Ok(self)
    }

    /// Order spec in string form, e.g. `"entry_date desc"` or
    /// `"date desc, id"`.
    pub fn order(&mut self, spec: &str) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::parse(spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i32, offset: Option<i32>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }

        // Apply max limit from config
        let max_limit = crate::config::CONFIG.filter.max_limit.unwrap_or(i32::MAX);
        let applied_limit = if limit > max_limit {
            if crate::config::CONFIG.filter.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            }
            max_limit
        } else {
            limit
        };

        self.limit = Some(applied_limit);
        self.offset = offset;
        Ok(self)
    }

    /// Render the filter as gateway query pairs.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if !self.select_columns.is_empty() || !self.embeds.is_empty() {
            let mut parts: Vec<String> = if self.select_columns.is_empty() {
                vec!["*".to_string()]
            } else {
                self.select_columns.clone()
            };
            parts.extend(self.embeds.iter().cloned());
            pairs.push(("select".to_string(), parts.join(",")));
        }

        for info in &self.where_data {
            pairs.push((
                info.column.clone(),
                format!("{}.{}", info.operator.prefix(), info.value),
            ));
        }

        if let Some(order) = FilterOrder::generate(&self.order_data) {
            pairs.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }

        pairs
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string()));
        }
        let leading = name.chars().next().unwrap();
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_')
            || (!leading.is_alphabetic() && leading != '_')
        {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn validate_column_name(column: &str) -> Result<(), FilterError> {
        if column.is_empty() {
            return Err(FilterError::InvalidColumn("Column name cannot be empty".to_string()));
        }
        let leading = column.chars().next().unwrap();
        if !column.chars().all(|c| c.is_alphanumeric() || c == '_')
            || (!leading.is_alphabetic() && leading != '_')
        {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
        }
        Ok(())
    }

    fn validate_select_columns(columns: &[String]) -> Result<(), FilterError> {
        for column in columns {
            if column == "*" {
                continue;
            }
            Self::validate_column_name(column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(filter: &Filter) -> Vec<(String, String)> {
        filter.to_query_pairs()
    }

    #[test]
    fn renders_where_order_and_limit() {
        let mut filter = Filter::new("trades").unwrap();
        filter
            .eq("user_id", "abc")
            .unwrap()
            .order("entry_date desc")
            .unwrap()
            .limit(50, None)
            .unwrap();

        assert_eq!(
            pairs(&filter),
            vec![
                ("user_id".to_string(), "eq.abc".to_string()),
                ("order".to_string(), "entry_date.desc".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn renders_range_window() {
        let mut filter = Filter::new("transactions").unwrap();
        filter
            .gte("date", "2024-01-01")
            .unwrap()
            .lt("date", "2024-02-01")
            .unwrap();

        assert_eq!(
            pairs(&filter),
            vec![
                ("date".to_string(), "gte.2024-01-01".to_string()),
                ("date".to_string(), "lt.2024-02-01".to_string()),
            ]
        );
    }

    #[test]
    fn embed_joins_into_select() {
        let mut filter = Filter::new("transactions").unwrap();
        filter.embed("categories", &["name", "color"]).unwrap();

        assert_eq!(
            pairs(&filter),
            vec![("select".to_string(), "*,categories(name,color)".to_string())]
        );
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(Filter::new("1trades").is_err());
        assert!(Filter::new("trades; drop").is_err());

        let mut filter = Filter::new("trades").unwrap();
        assert!(filter.eq("user id", "x").is_err());
        assert!(filter.order("entry-date desc").is_err());
    }

    #[test]
    fn rejects_negative_limit_and_offset() {
        let mut filter = Filter::new("trades").unwrap();
        assert!(filter.limit(-1, None).is_err());
        assert!(filter.limit(10, Some(-5)).is_err());
    }
}
