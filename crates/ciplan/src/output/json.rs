use ciplan_engine::Decision;

use super::Renderer;
use crate::error::Result;

pub(crate) struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, decision: &Decision) -> Result<String> {
        let mut document = serde_json::to_string_pretty(decision)?;
        document.push('\n');
        Ok(document)
    }
}
