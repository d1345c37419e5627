/*!
 * Token report rendering
 *
 * Turns a token counting run into console tables with the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::tokenizer::TokenReport;
use crate::utils::format_count;

/// Files listed in full up to this many; beyond it only the largest are shown
const FULL_LISTING_LIMIT: usize = 15;
const TOP_FILES: usize = 10;
const MAX_PATH_WIDTH: usize = 60;

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    /// Pretty-printed JSON
    Json,
}

/// Report generator for token counting runs
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Render `report`; `duration` is the wall time of the run
    pub fn generate_report(&self, report: &TokenReport, duration: Duration) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report, duration),
            ReportFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|e| e.to_string())
            }
        }
    }

    /// Print the report to stderr, leaving stdout for the document
    pub fn print_report(&self, report: &TokenReport, duration: Duration) {
        eprintln!("\n{}", self.generate_report(report, duration));
    }

    // Keep the trailing path segments that fit in `max_len`
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut kept = Vec::new();
        let mut width = 3;
        for part in path.split('/').rev() {
            let part_width = part.chars().count() + 1;
            if width + part_width > max_len {
                break;
            }
            kept.push(part);
            width += part_width;
        }

        if kept.is_empty() {
            let tail: String = path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        kept.reverse();
        format!(".../{}", kept.join("/"))
    }

    fn style(table: &mut Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_summary_table(&self, report: &TokenReport, duration: Duration) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "🤖 Model".to_string(),
                value: report.model.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", duration),
            },
            SummaryRow {
                key: "📄 Files Counted".to_string(),
                value: format_count(report.files.len()),
            },
            SummaryRow {
                key: "📦 Total Tokens".to_string(),
                value: format_count(report.total),
            },
        ];

        let (limit, usage) = match (report.max_tokens, report.context_usage()) {
            (Some(max), Some(usage)) => (format_count(max), format!("{:.1}%", usage)),
            _ => ("no limit".to_string(), "-".to_string()),
        };
        rows.push(SummaryRow {
            key: "📏 Max Context".to_string(),
            value: limit,
        });
        rows.push(SummaryRow {
            key: "📊 Context Used".to_string(),
            value: usage,
        });

        let lookups = report.cache.hits + report.cache.misses;
        if lookups > 0 {
            rows.push(SummaryRow {
                key: "🔄 Cache Hit Rate".to_string(),
                value: format!(
                    "{:.1}% ({} hits / {} total)",
                    report.cache.hit_rate(),
                    report.cache.hits,
                    lookups
                ),
            });
        }

        if report.stopped {
            rows.push(SummaryRow {
                key: "⏹️ Stopped".to_string(),
                value: "counting was cancelled, totals are partial".to_string(),
            });
        }

        Self::style(&mut Table::new(rows))
    }

    fn create_files_table(&self, report: &TokenReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Tokens")]
            tokens: String,
        }

        let mut files: Vec<_> = report.files.iter().collect();
        files.sort_by(|a, b| b.tokens.cmp(&a.tokens).then_with(|| a.path.cmp(&b.path)));
        if files.len() > FULL_LISTING_LIMIT {
            files.truncate(TOP_FILES);
        }

        let rows: Vec<FileRow> = files
            .iter()
            .map(|file| FileRow {
                path: self.format_path(&file.path.to_string_lossy(), MAX_PATH_WIDTH),
                tokens: format_count(file.tokens),
            })
            .collect();

        Self::style(&mut Table::new(rows))
    }

    fn generate_console_report(&self, report: &TokenReport, duration: Duration) -> String {
        let summary_table = self.create_summary_table(report, duration);
        let files_table = self.create_files_table(report);

        let files_title = if report.files.len() > FULL_LISTING_LIMIT {
            "📋  TOP 10 FILES BY TOKEN COUNT  📋"
        } else {
            "📋  COUNTED FILES"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, "✅  TOKEN COUNT", summary_table
        )
    }
}
