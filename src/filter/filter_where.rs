use super::error::FilterError;
use super::types::{FilterOp, FilterValue, FilterWhereInfo};

pub struct FilterWhere {
    param_values: Vec<FilterValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Render conditions as an AND-joined predicate. An empty list yields an
    /// empty string so callers can omit the WHERE keyword.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<FilterValue>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build_group(conditions)?;
        Ok((sql, filter_where.param_values))
    }

    fn build_group(&mut self, conditions: &[FilterWhereInfo]) -> Result<String, FilterError> {
        let mut parts = Vec::with_capacity(conditions.len());
        for condition in conditions {
            if let Some(sql) = self.build_sql_condition(condition)? {
                parts.push(sql);
            }
        }
        Ok(parts.join(" AND "))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<Option<String>, FilterError> {
        match condition {
            FilterWhereInfo::Any(alternatives) => {
                let mut sql_parts = Vec::new();
                for group in alternatives {
                    let sql = self.build_group(group)?;
                    if !sql.is_empty() {
                        sql_parts.push(format!("({})", sql));
                    }
                }
                if sql_parts.is_empty() {
                    return Ok(None);
                }
                Ok(Some(format!("({})", sql_parts.join(" OR "))))
            }
            FilterWhereInfo::Condition { column, operator, data } => {
                let quoted_column = format!("\"{}\"", column);
                let value = || {
                    data.clone()
                        .ok_or_else(|| FilterError::InvalidOperatorData(format!("{:?} on {} requires a value", operator, column)))
                };
                let sql = match operator {
                    FilterOp::Eq => format!("{} = {}", quoted_column, self.param(value()?)),
                    FilterOp::Gte => format!("{} >= {}", quoted_column, self.param(value()?)),
                    FilterOp::ILike => format!("{} ILIKE {}", quoted_column, self.param(value()?)),
                    FilterOp::In => match value()? {
                        FilterValue::List(values) => {
                            if values.is_empty() {
                                return Ok(Some("1=0".to_string()));
                            }
                            let params: Vec<String> = values.into_iter().map(|v| self.param(v)).collect();
                            format!("{} IN ({})", quoted_column, params.join(", "))
                        }
                        single => format!("{} = {}", quoted_column, self.param(single)),
                    },
                };
                Ok(Some(sql))
            }
        }
    }

    fn param(&mut self, value: FilterValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn cond(column: &str, operator: FilterOp, data: Option<FilterValue>) -> FilterWhereInfo {
        FilterWhereInfo::Condition { column: column.to_string(), operator, data }
    }

    #[test]
    fn numbers_params_in_order() {
        let conditions = vec![
            cond("status", FilterOp::Eq, Some("PUBLISHED".into())),
            cond("level", FilterOp::Eq, Some("BEGINNER".into())),
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(sql, "\"status\" = $1 AND \"level\" = $2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn or_groups_are_parenthesized() {
        let conditions = vec![
            cond("status", FilterOp::Eq, Some("PUBLISHED".into())),
            FilterWhereInfo::Any(vec![
                vec![cond("title", FilterOp::ILike, Some("%rust%".into()))],
                vec![cond("description", FilterOp::ILike, Some("%rust%".into()))],
            ]),
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(sql, "\"status\" = $1 AND ((\"title\" ILIKE $2) OR (\"description\" ILIKE $3))");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let conditions = vec![cond("category_id", FilterOp::In, Some(FilterValue::List(vec![])))];
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn in_list_expands_each_value() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let conditions = vec![cond("id", FilterOp::In, Some(ids.into()))];
        let (sql, params) = FilterWhere::generate(&conditions, 3).unwrap();
        assert_eq!(sql, "\"id\" IN ($4, $5)");
        assert!(matches!(params[0], FilterValue::Uuid(_)));
    }

    #[test]
    fn gte_binds_its_value() {
        let conditions = vec![cond("created_at", FilterOp::Gte, Some(FilterValue::Int(30)))];
        let (sql, params) = FilterWhere::generate(&conditions, 1).unwrap();
        assert_eq!(sql, "\"created_at\" >= $2");
        assert_eq!(params, vec![FilterValue::Int(30)]);
    }

    #[test]
    fn missing_value_is_an_error() {
        let conditions = vec![cond("rating", FilterOp::Gte, None)];
        assert!(FilterWhere::generate(&conditions, 0).is_err());
    }
}
