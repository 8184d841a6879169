use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterOrderInfo, FilterValue, FilterWhereInfo, SortDirection, SqlResult};

/// Builder for a single-table SELECT with typed bind parameters.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_identifier(&table_name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", table_name)));
        }
        Ok(Self {
            table_name,
            where_data: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn condition(
        mut self,
        column: &str,
        operator: FilterOp,
        data: Option<FilterValue>,
    ) -> Result<Self, FilterError> {
        self.where_data.push(Self::make_condition(column, operator, data)?);
        Ok(self)
    }

    pub fn eq(self, column: &str, value: impl Into<FilterValue>) -> Result<Self, FilterError> {
        self.condition(column, FilterOp::Eq, Some(value.into()))
    }

    pub fn gte(self, column: &str, value: impl Into<FilterValue>) -> Result<Self, FilterError> {
        self.condition(column, FilterOp::Gte, Some(value.into()))
    }

    pub fn is_in(self, column: &str, values: Vec<FilterValue>) -> Result<Self, FilterError> {
        self.condition(column, FilterOp::In, Some(FilterValue::List(values)))
    }

    /// Apply `column = value` only when a value is present.
    pub fn eq_opt<V: Into<FilterValue>>(self, column: &str, value: Option<V>) -> Result<Self, FilterError> {
        match value {
            Some(v) => self.eq(column, v),
            None => Ok(self),
        }
    }

    /// Case-insensitive substring match against any of `columns`.
    pub fn search(mut self, columns: &[&str], term: &str) -> Result<Self, FilterError> {
        let pattern = format!("%{}%", escape_like(term));
        let mut alternatives = Vec::with_capacity(columns.len());
        for column in columns {
            alternatives.push(vec![Self::make_condition(
                column,
                FilterOp::ILike,
                Some(FilterValue::Text(pattern.clone())),
            )?]);
        }
        self.where_data.push(FilterWhereInfo::Any(alternatives));
        Ok(self)
    }

    pub fn order(mut self, column: &str, sort: SortDirection) -> Result<Self, FilterError> {
        if !is_identifier(column) {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
        }
        self.order_data.push(FilterOrderInfo { column: column.to_string(), sort });
        Ok(self)
    }

    pub fn order_spec(mut self, spec: &str, allowed: &[&str]) -> Result<Self, FilterError> {
        self.order_data.extend(FilterOrder::parse(spec, allowed)?);
        Ok(self)
    }

    pub fn limit(mut self, limit: i64, offset: Option<i64>) -> Result<Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0)?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT * FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// COUNT(*) over the same predicate, ignoring order and pagination.
    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0)?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        Ok(SqlResult { query, params })
    }

    fn make_condition(column: &str, operator: FilterOp, data: Option<FilterValue>) -> Result<FilterWhereInfo, FilterError> {
        if !is_identifier(column) {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
        }
        Ok(FilterWhereInfo::Condition { column: column.to_string(), operator, data })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CourseStatus;

    #[test]
    fn builds_catalog_query() {
        let filter = Filter::new("courses")
            .unwrap()
            .eq("status", CourseStatus::Published)
            .unwrap()
            .search(&["title", "description"], "rust")
            .unwrap()
            .order("created_at", SortDirection::Desc)
            .unwrap()
            .limit(12, Some(12))
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"courses\" WHERE \"status\" = $1 AND ((\"title\" ILIKE $2) OR (\"description\" ILIKE $3)) ORDER BY \"created_at\" DESC LIMIT 12 OFFSET 12"
        );
        assert_eq!(sql.params[0], FilterValue::Text("PUBLISHED".to_string()));
        assert_eq!(sql.params[1], FilterValue::Text("%rust%".to_string()));
    }

    #[test]
    fn count_ignores_order_and_limit() {
        let filter = Filter::new("enrollments")
            .unwrap()
            .eq("status", "ACTIVE")
            .unwrap()
            .order("enrolled_at", SortDirection::Desc)
            .unwrap()
            .limit(10, None)
            .unwrap();
        let sql = filter.to_count_sql().unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) AS count FROM \"enrollments\" WHERE \"status\" = $1");
    }

    #[test]
    fn unfiltered_count() {
        let sql = Filter::new("users").unwrap().to_count_sql().unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) AS count FROM \"users\"");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn rejects_bad_identifiers() {
        assert!(Filter::new("users; DROP TABLE users").is_err());
        assert!(Filter::new("1users").is_err());
        assert!(Filter::new("users").unwrap().eq("name\"", "x").is_err());
    }

    #[test]
    fn optional_equality_is_skipped() {
        let none: Option<&str> = None;
        let sql = Filter::new("reviews").unwrap().eq_opt("user_id", none).unwrap().to_sql().unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"reviews\"");
    }

    #[test]
    fn search_escapes_wildcards() {
        let sql = Filter::new("courses").unwrap().search(&["title"], "100%_off").unwrap().to_sql().unwrap();
        assert_eq!(sql.params[0], FilterValue::Text("%100\\%\\_off%".to_string()));
    }

    #[test]
    fn negative_limit_rejected() {
        assert!(Filter::new("courses").unwrap().limit(-1, None).is_err());
        assert!(Filter::new("courses").unwrap().limit(5, Some(-5)).is_err());
    }
}
