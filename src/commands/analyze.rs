use crate::api::{self, AnalysisOptions, RepoAuditError};
use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::config::Config;
use crate::fs::{FileSystem, default_fs};
use crate::model::AnalysisResult;
use crate::output::{JsonOutput, MarkdownOutput, render};
use crate::style;
use std::io::{self, Write};

/// Run `analyze`. Exit code 1 when the root is invalid, output fails, or a
/// critical finding failed, so the command can gate CI.
pub fn cmd_analyze(args: AnalyzeArgs) -> i32 {
    cmd_analyze_with_fs(args, default_fs())
}

fn options_from(args: &AnalyzeArgs) -> AnalysisOptions {
    AnalysisOptions {
        stack: args.stack.clone(),
        languages: args.lang.clone().unwrap_or_default(),
        exclude: args.exclude.clone(),
        max_files: args.max_files,
        coupling_threshold: args.coupling_threshold,
    }
}

fn run(args: &AnalyzeArgs, fs: &dyn FileSystem) -> Result<AnalysisResult, RepoAuditError> {
    let root = api::resolve_root(&args.path)?;
    let options = options_from(args);

    let config = match api::load_config(&root, &options) {
        Ok(config) => config,
        Err(RepoAuditError::Config(e)) => {
            style::warning(&format!("Failed to load config: {}. Using defaults.", e));
            api::with_overrides(Config::default(), &options)
        }
        Err(e) => return Err(e),
    };

    Ok(api::analyze_root(&root, &config, &options, fs))
}

pub fn cmd_analyze_with_fs(args: AnalyzeArgs, fs: &dyn FileSystem) -> i32 {
    let result = match run(&args, fs) {
        Ok(result) => result,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    if result.truncated {
        style::warning(&format!(
            "file limit reached after {} files; results are partial",
            result.files_scanned
        ));
    }

    let rendered = match args.format {
        OutputFormat::Markdown => render(&MarkdownOutput::new(!args.failures_only), &result),
        OutputFormat::Json => render(&JsonOutput::new(), &result),
    };
    let rendered = match rendered {
        Ok(text) => text,
        Err(e) => {
            style::error(&format!("Failed to format output: {}", e));
            return 1;
        }
    };

    let write_result = match &args.output {
        Some(path) => fs.write(path, &rendered).map(|_| {
            style::success(&format!("Report written to {}", style::path(path)));
        }),
        None if args.format == OutputFormat::Markdown => {
            style::render_markdown(&rendered, &mut io::stdout())
        }
        None => write!(io::stdout(), "{}", rendered),
    };

    if let Err(e) = write_result {
        style::error(&format!("Failed to write output: {}", e));
        return 1;
    }

    if result.has_critical_failures() { 1 } else { 0 }
}
