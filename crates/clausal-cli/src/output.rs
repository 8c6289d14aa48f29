//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use clausal_domain::{Answer, Chunk};
use clausal_pipeline::assembler::{HIGH_CONFIDENCE, MEDIUM_CONFIDENCE};
use clausal_pipeline::BatchOutcome;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style, Width},
};

const PREVIEW_CHARS: usize = 60;
const CELL_WIDTH: usize = 50;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the result of an `ask` run.
    pub fn format_outcome(&self, outcome: &BatchOutcome, detailed: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json if detailed => Ok(serde_json::to_string_pretty(&outcome.detailed())?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&outcome.basic())?),
            OutputFormat::Table => Ok(self.format_answers_table(outcome, detailed)),
            OutputFormat::Quiet => Ok(outcome
                .answers
                .iter()
                .map(|a| a.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_answers_table(&self, outcome: &BatchOutcome, detailed: bool) -> String {
        if outcome.answers.is_empty() {
            return self.colorize("No questions asked.", "yellow");
        }

        let mut builder = Builder::default();
        if detailed {
            builder.push_record(["#", "Question", "Answer", "Confidence", "Source"]);
        } else {
            builder.push_record(["#", "Question", "Answer", "Confidence"]);
        }

        for (i, answer) in outcome.answers.iter().enumerate() {
            let index = (i + 1).to_string();
            let confidence = self.confidence_cell(answer);
            if detailed {
                let source = answer
                    .sources
                    .first()
                    .map(|s| preview(&s.text))
                    .unwrap_or_else(|| "-".to_string());
                builder.push_record([&index, &answer.question, &answer.text, &confidence, &source]);
            } else {
                builder.push_record([&index, &answer.question, &answer.text, &confidence]);
            }
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(CELL_WIDTH)))
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut output = table.to_string();
        if detailed {
            output.push('\n');
            output.push_str(&outcome.metrics.summary());
        }
        if let Some(kind) = outcome.failure {
            output.push('\n');
            output.push_str(&self.warning(&format!("Documents could not be prepared ({})", kind)));
        }
        output
    }

    fn confidence_cell(&self, answer: &Answer) -> String {
        let text = match answer.degraded {
            Some(kind) => format!("{:.2} ({})", answer.confidence, kind),
            None => format!("{:.2}", answer.confidence),
        };
        let color = if answer.confidence >= HIGH_CONFIDENCE {
            "green"
        } else if answer.confidence >= MEDIUM_CONFIDENCE {
            "yellow"
        } else {
            "red"
        };
        self.colorize(&text, color)
    }

    /// Format chunks of a document, flagging clause-like ones.
    pub fn format_chunks(&self, chunks: &[Chunk], is_clause: impl Fn(&str) -> bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(chunks)?),
            OutputFormat::Quiet => Ok(chunks
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("Document produced no chunks.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Seq", "Words", "Overlap", "Span", "Clause", "Preview"]);
                for chunk in chunks {
                    builder.push_record([
                        chunk.sequence.to_string(),
                        chunk.word_count.to_string(),
                        chunk.overlap_words.to_string(),
                        format!("{}..{}", chunk.start, chunk.end),
                        if is_clause(&chunk.text) { "yes" } else { "" }.to_string(),
                        preview(&chunk.text),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First line of `text`, cut to a short preview on a char boundary.
fn preview(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= PREVIEW_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", cut)
}
