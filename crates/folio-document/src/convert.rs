// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document-to-markdown conversion.
//
// The converter is an external collaborator: a command (docling by default)
// that reads an image and produces markdown. Two calling conventions are
// supported:
//
// - stdout mode: the command prints markdown; `{input}` marks the image path.
// - directory mode: `{output_dir}` appears in the arguments; the command runs
//   against a scratch directory and the `<stem>.md` it writes there is read
//   back.

use std::path::{Path, PathBuf};
use std::process::Command;

use folio_core::config::ConverterConfig;
use folio_core::error::{FolioError, Result};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_DIR_PLACEHOLDER: &str = "{output_dir}";

/// Anything that turns a document image into markdown text.
pub trait MarkdownConverter: Send + Sync {
    fn to_markdown(&self, path: &Path) -> Result<String>;
}

impl<F> MarkdownConverter for F
where
    F: Fn(&Path) -> Result<String> + Send + Sync,
{
    fn to_markdown(&self, path: &Path) -> Result<String> {
        self(path)
    }
}

/// Runs an external conversion command per image.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn uses_output_dir(&self) -> bool {
        self.args.iter().any(|arg| arg.contains(OUTPUT_DIR_PLACEHOLDER))
    }

    /// Substitute placeholders; an argument list without `{input}` gets the
    /// path appended.
    fn render_args(&self, input: &Path, output_dir: Option<&Path>) -> Vec<String> {
        let input = input.to_string_lossy();
        let mut rendered: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                let arg = arg.replace(INPUT_PLACEHOLDER, &input);
                match output_dir {
                    Some(dir) => arg.replace(OUTPUT_DIR_PLACEHOLDER, &dir.to_string_lossy()),
                    None => arg,
                }
            })
            .collect();
        if !self.args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER)) {
            rendered.push(input.into_owned());
        }
        rendered
    }

    fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        debug!(program = %self.program.display(), ?args, "Running converter");
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|err| {
                FolioError::Conversion(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    err
                ))
            })?;
        if !output.status.success() {
            return Err(FolioError::Conversion(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output.stdout)
    }
}

impl MarkdownConverter for CommandConverter {
    #[instrument(skip(self), fields(program = %self.program.display()))]
    fn to_markdown(&self, path: &Path) -> Result<String> {
        let markdown = if self.uses_output_dir() {
            let scratch = TempDir::new()?;
            self.run(&self.render_args(path, Some(scratch.path())))?;
            read_converted(scratch.path(), path)?
        } else {
            let stdout = self.run(&self.render_args(path, None))?;
            String::from_utf8(stdout).map_err(|err| {
                FolioError::Conversion(format!("converter emitted invalid UTF-8: {}", err))
            })?
        };
        info!(bytes = markdown.len(), "Document converted to markdown");
        Ok(markdown)
    }
}

/// Find the markdown the converter left in `dir`: `<stem>.md` if present,
/// otherwise the only `.md` file.
fn read_converted(dir: &Path, input: &Path) -> Result<String> {
    let expected = input
        .file_stem()
        .map(|stem| dir.join(format!("{}.md", stem.to_string_lossy())));
    if let Some(expected) = expected.filter(|path| path.is_file()) {
        return Ok(std::fs::read_to_string(expected)?);
    }

    let candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    match candidates.as_slice() {
        [only] => Ok(std::fs::read_to_string(only)?),
        [] => Err(FolioError::Conversion(format!(
            "converter produced no markdown for {}",
            input.display()
        ))),
        many => {
            warn!(count = many.len(), "Converter produced several markdown files");
            Err(FolioError::Conversion(format!(
                "converter produced {} markdown files for {}",
                many.len(),
                input.display()
            )))
        }
    }
}
