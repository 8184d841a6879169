use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    ILike,
    In,
}

/// A bind parameter with its Postgres type fixed up front, so `$n` binds
/// never rely on implicit text casts (uuid = text does not resolve).
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Uuid(Uuid),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    List(Vec<FilterValue>),
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<Uuid> for FilterValue {
    fn from(v: Uuid) -> Self {
        FilterValue::Uuid(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v as i64)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(v)
    }
}

impl From<Vec<Uuid>> for FilterValue {
    fn from(v: Vec<Uuid>) -> Self {
        FilterValue::List(v.into_iter().map(FilterValue::Uuid).collect())
    }
}

impl From<crate::types::CourseStatus> for FilterValue {
    fn from(v: crate::types::CourseStatus) -> Self {
        FilterValue::Text(v.as_str().to_string())
    }
}

impl From<crate::types::CourseLevel> for FilterValue {
    fn from(v: crate::types::CourseLevel) -> Self {
        FilterValue::Text(v.as_str().to_string())
    }
}

impl From<crate::types::EnrollmentStatus> for FilterValue {
    fn from(v: crate::types::EnrollmentStatus) -> Self {
        FilterValue::Text(v.as_str().to_string())
    }
}

impl From<crate::types::UserRole> for FilterValue {
    fn from(v: crate::types::UserRole) -> Self {
        FilterValue::Text(v.as_str().to_string())
    }
}

#[derive(Debug, Clone)]
pub enum FilterWhereInfo {
    Condition {
        column: String,
        operator: FilterOp,
        data: Option<FilterValue>,
    },
    /// Alternatives joined with OR; each alternative is itself AND-joined.
    Any(Vec<Vec<FilterWhereInfo>>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FilterValue>,
}
