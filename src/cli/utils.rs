use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a payload: pretty JSON, or the text rendering from `text`.
pub fn output_value(
    output_format: &OutputFormat,
    data: &Value,
    text: impl FnOnce(&Value) -> String,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => println!("{}", text(data)),
    }
    Ok(())
}

/// String field or a dash
pub fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("-")
}

/// Left-aligned columns sized to their widest cell
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let render = |cells: Vec<String>| {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(headers.iter().map(|h| h.to_string()).collect())];
    lines.extend(rows.iter().map(|r| render(r.clone())));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns() {
        let out = table(&["ID", "TITLE"], &[vec!["1".into(), "Rust".into()], vec!["22".into(), "Go".into()]]);
        assert_eq!(out, "ID  TITLE\n1   Rust\n22  Go");
    }

    #[test]
    fn field_defaults_to_dash() {
        let v = json!({"title": "Rust"});
        assert_eq!(field(&v, "title"), "Rust");
        assert_eq!(field(&v, "missing"), "-");
    }
}
