//! `pygmentize` subprocess backend.

use super::{HighlightError, Highlighter, SupportedTags};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const HTML_ARGS: [&str; 4] = [
    "-f",
    "html",
    "-O",
    "linenos=table,style=colorful,encoding=utf-8",
];

/// Runs the Pygments command-line tool once per request.
#[derive(Debug, Clone)]
pub struct PygmentsHighlighter {
    program: String,
}

impl PygmentsHighlighter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> HighlightError {
        HighlightError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

#[async_trait]
impl Highlighter for PygmentsHighlighter {
    async fn list_supported_tags(&self) -> Result<BTreeSet<String>, HighlightError> {
        let output = self
            .command()
            .args(["-L", "lexers"])
            .output()
            .await
            .map_err(|err| self.spawn_error(err))?;
        let stdout = into_stdout(output)?;
        let tags = parse_lexer_list(&stdout);
        tracing::debug!("Pygments lexers: {:?}", tags);
        Ok(tags)
    }

    async fn render(&self, content: &str, tag: &str) -> Result<String, HighlightError> {
        let mut cmd = self.command();
        cmd.stdin(Stdio::piped()).args(lexer_args(tag)).args(HTML_ARGS);

        let mut child = cmd.spawn().map_err(|err| self.spawn_error(err))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| HighlightError::Io(std::io::Error::other("child stdin unavailable")))?;

        let feed = async move {
            stdin.write_all(content.as_bytes()).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if let Err(err) = fed {
            // A lexer error can close stdin early; the exit status explains it.
            tracing::debug!("Writing to pygmentize stdin failed: {}", err);
        }
        into_stdout(output)
    }
}

fn lexer_args(tag: &str) -> Vec<&str> {
    match tag {
        SupportedTags::AUTODETECT => vec!["-g"],
        "" | SupportedTags::PLAIN => vec!["-l", "text"],
        lexer => vec!["-l", lexer],
    }
}

fn into_stdout(output: Output) -> Result<String, HighlightError> {
    if !output.status.success() {
        return Err(HighlightError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8(output.stdout)?)
}

/// Parse `pygmentize -L lexers` output.
///
/// Each lexer starts with a line like `* python, py, sage:`; the first alias
/// is its canonical name. Description lines are indented and ignored.
fn parse_lexer_list(listing: &str) -> BTreeSet<String> {
    listing
        .lines()
        .filter_map(|line| line.strip_prefix('*'))
        .filter_map(|aliases| {
            let first = aliases.trim().trim_end_matches(':').split(',').next()?;
            let first = first.trim();
            (!first.is_empty()).then(|| first.to_string())
        })
        .collect()
}
