use serde_json::Value;

use crate::schema::MetricQuery;
use crate::{Error, Result};

/// Metadata key holding a literal PromQL expression.
pub const RAW_QUERY_KEY: &str = "query";

/// Builds the PromQL expression for a query.
///
/// A non-empty string under `metadata["query"]` is used verbatim. Otherwise the
/// structured expression is rendered as `metric{filters,scope}`, wrapped in the
/// aggregation function and followed by `by (...)` when grouping labels are
/// given alongside it.
pub fn build_promql(query: &MetricQuery) -> Result<String> {
    if let Some(Value::String(raw)) = query.metadata.get(RAW_QUERY_KEY) {
        if !raw.is_empty() {
            return Ok(raw.clone());
        }
    }

    let expression = query.expression.as_ref().ok_or(Error::MissingExpression)?;

    let matchers: Vec<String> = expression
        .filters
        .iter()
        .map(|f| format!("{}{}{}", f.label, f.operator, quote(&f.value)))
        .chain(
            query
                .scope
                .label_pairs()
                .into_iter()
                .map(|(label, value)| format!("{}={}", label, quote(value))),
        )
        .collect();

    let mut expr = expression.metric_name.clone();
    if !matchers.is_empty() {
        expr.push('{');
        expr.push_str(&matchers.join(","));
        expr.push('}');
    }

    if let Some(aggregation) = expression.aggregation.as_deref().filter(|a| !a.is_empty()) {
        expr = format!("{}({})", aggregation, expr);
        if !expression.group_by.is_empty() {
            expr.push_str(&format!(" by ({})", expression.group_by.join(",")));
        }
    }

    Ok(expr)
}

/// Renders a PromQL double-quoted string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
