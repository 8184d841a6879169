use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse an order spec like `"created_at desc, title"`. Only columns in
    /// `allowed` are accepted so user input never reaches the ORDER BY clause
    /// unchecked.
    pub fn parse(spec: &str, allowed: &[&str]) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let (Some(col), dir, None) = (it.next(), it.next(), it.next()) else {
                return Err(FilterError::InvalidOrder(format!("Expected `column [asc|desc]`, got {}", trimmed)));
            };
            if !allowed.contains(&col) {
                return Err(FilterError::InvalidColumn(format!("Cannot order by {}", col)));
            }
            let sort = match dir {
                None => SortDirection::Asc,
                Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(d) => return Err(FilterError::InvalidOrder(format!("Unknown sort direction {}", d))),
            };
            out.push(FilterOrderInfo { column: col.to_string(), sort });
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directions() {
        let infos = FilterOrder::parse("created_at desc, title", &["created_at", "title"]).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(infos[1].sort, SortDirection::Asc);
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"created_at\" DESC, \"title\" ASC");
    }

    #[test]
    fn rejects_unknown_columns() {
        assert!(FilterOrder::parse("password_hash", &["title"]).is_err());
    }

    #[test]
    fn rejects_unknown_directions_and_trailing_tokens() {
        let allowed = ["title"];
        assert!(matches!(FilterOrder::parse("title sideways", &allowed), Err(FilterError::InvalidOrder(_))));
        assert!(matches!(FilterOrder::parse("title asc desc", &allowed), Err(FilterError::InvalidOrder(_))));
        assert!(FilterOrder::parse("title DESC", &allowed).is_ok());
    }

    #[test]
    fn empty_spec_generates_nothing() {
        let infos = FilterOrder::parse(" , ", &["title"]).unwrap();
        assert!(infos.is_empty());
        assert_eq!(FilterOrder::generate(&infos), "");
    }
}
