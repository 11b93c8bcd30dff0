mod json;
mod markdown;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;

use crate::model::AnalysisResult;
use std::io::Write;

pub trait OutputFormatter {
    fn format<W: Write>(&self, result: &AnalysisResult, writer: &mut W) -> std::io::Result<()>;
}

/// Render a result into a string with any formatter.
pub fn render<F: OutputFormatter>(formatter: &F, result: &AnalysisResult) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    formatter.format(result, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
