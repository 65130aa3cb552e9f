//! Minimal CLI: schema + query inputs → decoded JSON lines
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::context::DecodeOptions;
use crate::query::{QueryDecoder, QueryInput};
use crate::result::DecodeResult;
use crate::schema::Schema;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// decode query strings against a schema document
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// decode each input and print one JSON result per line
    Decode(DecodeOut),
    /// load a schema document and print its normalized form
    Check(SchemaSettings),
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// schema document (.json)
    #[arg(long, short)]
    schema: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// inline query input, e.g. 'a=1&b=x&b=y'
    #[arg(long, short)]
    query: Vec<String>,

    /// files with one input per line, as literal paths or quoted glob patterns.
    /// Lines starting with `{` or `[` are read as JSON mappings / pair lists.
    #[arg(long, short)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct DecodeOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// accept undecodable leaves as-is
    #[arg(long, default_value_t = false)]
    passthrough: bool,

    /// pretty-print each result
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn load(&self) -> Result<Schema> {
        let source = std::fs::read(&self.schema)
            .with_context(|| format!("failed to read schema file {}", self.schema.display()))?;
        crate::path_de::schema_from_slice(&source)
            .with_context(|| format!("invalid schema document {}", self.schema.display()))
    }
}

impl InputSettings {
    fn load(&self) -> Result<Vec<QueryInput>> {
        let mut out: Vec<QueryInput> = self.query.iter().map(|q| QueryInput::from(q.as_str())).collect();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read input file {}", source_path.display()))?;
            for (lineno, line) in source.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let input = parse_input_line(line)
                    .with_context(|| format!("{}:{}", source_path.display(), lineno + 1))?;
                out.push(input);
            }
        }
        Ok(out)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Returns `false` if any input failed to decode.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Check(target) => {
                let schema = target.load()?;
                println!("{}", serde_json::to_string_pretty(&schema)?);
                eprintln!("{} {} ({})", "ok".green(), target.schema.display(), schema.kind());
                Ok(true)
            }
            Command::Decode(target) => {
                let schema = target.schema_settings.load()?;
                let inputs = target.input_settings.load()?;
                let decoder = QueryDecoder::query(schema);
                let options = DecodeOptions { passthrough: target.passthrough };

                let results = inputs
                    .into_par_iter()
                    .map(|input| decoder.safe_decode(input, options))
                    .collect::<Result<Vec<DecodeResult>, _>>()?;

                let mut failed = 0usize;
                for result in &results {
                    if !result.is_success() {
                        failed += 1;
                    }
                    let json = result.to_json();
                    let line = if target.pretty {
                        serde_json::to_string_pretty(&json)?
                    } else {
                        serde_json::to_string(&json)?
                    };
                    println!("{line}");
                }

                let summary = format!("{} decoded, {} failed", results.len() - failed, failed);
                if failed == 0 {
                    eprintln!("{}", summary.green());
                } else {
                    eprintln!("{}", summary.red());
                }
                Ok(failed == 0)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn parse_input_line(line: &str) -> Result<QueryInput> {
    if line.starts_with('{') || line.starts_with('[') {
        let json = serde_json::from_str::<serde_json::Value>(line).context("invalid JSON input")?;
        QueryInput::from_json(json)
            .context("JSON input must be a string-keyed mapping of scalars or a list of [key, value] pairs")
    } else {
        Ok(QueryInput::from(line))
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(Path::new(pattern).to_path_buf());
        }
    }

    Ok(out)
}
