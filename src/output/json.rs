use crate::model::AnalysisResult;
use crate::output::OutputFormatter;
use std::io::Write;

/// Pretty-printed JSON of the whole analysis result.
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, result: &AnalysisResult, writer: &mut W) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(result).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}
