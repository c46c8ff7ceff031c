use crate::error::Result;
use crate::scan::ScanResult;

/// Render a scan result as pretty-printed JSON. Per-file results are not
/// part of the document.
pub fn render(result: &ScanResult) -> Result<String> {
    let json = serde_json::to_string_pretty(result)?;
    Ok(json)
}
