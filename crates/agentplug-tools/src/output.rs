use serde_json::Value;

use agentplug_core::error::ToolError;

/// Reduce a `tools/call` result to what the model sees.
///
/// Structured content wins when present; otherwise text blocks are joined.
/// A result flagged `isError` becomes [`ToolError::Reported`].
pub fn call_output(tool: &str, result: Value) -> Result<Value, ToolError> {
    let text = result
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    if result.get("isError").and_then(Value::as_bool).unwrap_or(false) {
        return Err(ToolError::Reported { tool: tool.to_string(), message: text });
    }
    if let Some(structured) = result.get("structuredContent").filter(|v| !v.is_null()) {
        return Ok(structured.clone());
    }
    Ok(Value::String(text))
}
