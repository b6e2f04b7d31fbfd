//! Show the inline dependencies declared by source files.

use anyhow::Result;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::core::FileOps;
use crate::decl::DeclRef;
use crate::modules::InlineExtractor;

/// How `extract` prints its findings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One entity key per line
    #[default]
    Text,
    /// A JSON array of `{ file, deps }` objects
    Json,
}

/// Arguments of `bemdeps extract`.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// Source files to inspect
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Registration keyword, overriding the configured one
    #[arg(short, long)]
    keyword: Option<String>,
}

impl ExtractCommand {
    /// Print the dependencies of every file on stdout.
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let keyword = match &self.keyword {
            Some(keyword) => keyword.clone(),
            None => BuildConfig::discover(Path::new("."), config_path)?.keyword,
        };
        let extractor = InlineExtractor::new(&keyword)?;

        let mut found = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let content = FileOps::read_with_context(file, "extracting inline dependencies", "extract")
                .await?;
            found.push((file.clone(), extractor.extract(&content)));
        }

        print!("{}", self.render(&found)?);
        Ok(())
    }

    fn render(&self, found: &[(PathBuf, Vec<DeclRef>)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<_> = found
                    .iter()
                    .map(|(file, deps)| {
                        serde_json::json!({
                            "file": file.display().to_string(),
                            "deps": deps,
                        })
                    })
                    .collect();
                Ok(format!("{}\n", serde_json::to_string_pretty(&entries)?))
            }
            OutputFormat::Text => {
                let mut out = String::new();
                let headers = found.len() > 1;
                for (file, deps) in found {
                    if headers {
                        out.push_str(&format!("{}:\n", file.display()));
                    }
                    for dep in deps {
                        if headers {
                            out.push_str("  ");
                        }
                        out.push_str(&dep.key());
                        out.push('\n');
                    }
                }
                Ok(out)
            }
        }
    }
}
