/*!
 * Configuration handling for promptmap
 */

use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;
use strum::IntoEnumIterator;

use crate::formatter::OutputOptions;
use crate::project::ProjectOptions;
use crate::report::ReportFormat;
use crate::scanner::ScanOptions;
use crate::sort::SortBy;
use crate::tokenizer::Model;

fn sort_keys_help() -> String {
    let keys: Vec<String> = SortBy::iter().map(|key| key.to_string()).collect();
    format!("Sort key: {}", keys.join(", "))
}

/// Command-line arguments for promptmap
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "promptmap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Render a folder as a file map plus fenced file contents for LLM prompts",
    long_about = "Scans a folder, drops hidden entries, .gitignore matches and virtualenv folders, and prints a <file_map> tree followed by a <file_contents> block with every selected file in a fenced code block."
)]
pub struct Args {
    /// Folder to render
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Include hidden files and folders
    #[clap(long)]
    pub hidden: bool,

    /// Traverse symlinked directories
    #[clap(long)]
    pub follow_symlinks: bool,

    /// Do not apply the root .gitignore
    #[clap(long)]
    pub no_gitignore: bool,

    /// Keep virtualenv folders (venv, .venv, env, virtualenv, venv-*)
    #[clap(long)]
    pub keep_venv: bool,

    /// Emit only the <file_map> section
    #[clap(long)]
    pub tree_only: bool,

    /// Comma-separated relative paths to select; folders select everything beneath them
    #[clap(long, value_delimiter = ',')]
    pub select: Vec<String>,

    #[clap(long, default_value = "name", help = sort_keys_help())]
    pub sort_by: String,

    /// Reverse the sort order
    #[clap(long)]
    pub reverse: bool,

    /// Model used for token counting
    #[clap(long, default_value_t = Model::default().to_string())]
    pub model: String,

    /// Print a token count table to stderr
    #[clap(long)]
    pub tokens: bool,

    /// Print the token report as JSON to stderr (implies --tokens)
    #[clap(long)]
    pub tokens_json: bool,

    /// Print the loaded entries as JSON instead of rendering
    #[clap(long)]
    pub list: bool,

    /// Print the model table and exit
    #[clap(long)]
    pub list_models: bool,

    /// Write the document to this file instead of stdout
    #[clap(short, long)]
    pub output: Option<String>,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Debug logging
    #[clap(short, long)]
    pub verbose: bool,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Folder to render
    pub target_dir: PathBuf,

    /// How the folder is loaded
    pub project: ProjectOptions,

    /// How the document is rendered
    pub output: OutputOptions,

    /// Relative paths to select (empty selects everything loaded)
    pub select: Vec<PathBuf>,

    /// Model name as given; unknown names are resolved by the tokenizer
    pub model: String,

    /// Whether to count tokens
    pub count_tokens: bool,

    /// Emit the token report as JSON instead of tables
    pub tokens_json: bool,

    /// Print entries as JSON instead of rendering
    pub list: bool,

    /// Output file (stdout when absent)
    pub output_file: Option<PathBuf>,

    pub verbose: bool,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        Self {
            target_dir: PathBuf::from(&args.directory_path),
            project: ProjectOptions {
                scan: ScanOptions {
                    follow_symlinks: args.follow_symlinks,
                    include_hidden: args.hidden,
                },
                apply_gitignore: !args.no_gitignore,
                keep_virtualenvs: args.keep_venv,
                sort_by: SortBy::parse_or_default(&args.sort_by),
                reverse: args.reverse,
            },
            output: OutputOptions {
                tree_only: args.tree_only,
            },
            select: args
                .select
                .iter()
                .filter(|s| !s.trim().is_empty())
                .map(|s| PathBuf::from(s.trim()))
                .collect(),
            model: args.model,
            count_tokens: args.tokens || args.tokens_json,
            tokens_json: args.tokens_json,
            list: args.list,
            output_file: args.output.map(PathBuf::from),
            verbose: args.verbose,
        }
    }

    /// Format of the token report
    pub fn report_format(&self) -> ReportFormat {
        if self.tokens_json {
            ReportFormat::Json
        } else {
            ReportFormat::ConsoleTable
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> io::Result<()> {
        if !self.target_dir.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Target directory not found: {}", self.target_dir.display()),
            ));
        }

        if !self.target_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Target is not a directory: {}", self.target_dir.display()),
            ));
        }

        // Check that the output file's directory exists
        if let Some(parent) = self.output_file.as_deref().and_then(Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Output directory not found: {}", parent.display()),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Config {
        let mut full = vec!["promptmap"];
        full.extend_from_slice(argv);
        Config::from_args(Args::parse_from(full))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.target_dir, PathBuf::from("."));
        assert_eq!(config.project, ProjectOptions::default());
        assert!(!config.output.tree_only);
        assert!(config.select.is_empty());
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.output_file.is_none());
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "proj",
            "--hidden",
            "--no-gitignore",
            "--keep-venv",
            "--tree-only",
            "--select",
            "src, README.md",
            "--sort-by",
            "SIZE",
            "--reverse",
            "-o",
            "out.md",
        ]);
        assert!(config.project.scan.include_hidden);
        assert!(!config.project.apply_gitignore);
        assert!(config.project.keep_virtualenvs);
        assert!(config.output.tree_only);
        assert_eq!(config.select, [PathBuf::from("src"), PathBuf::from("README.md")]);
        assert_eq!(config.project.sort_by, SortBy::Size);
        assert!(config.project.reverse);
        assert_eq!(config.output_file, Some(PathBuf::from("out.md")));
    }

    #[test]
    fn test_token_report_format() {
        let table = parse(&["--tokens"]);
        assert!(table.count_tokens);
        assert!(matches!(table.report_format(), ReportFormat::ConsoleTable));

        let json = parse(&["--tokens-json"]);
        assert!(json.count_tokens);
        assert!(matches!(json.report_format(), ReportFormat::Json));

        assert!(!parse(&[]).count_tokens);
    }

    #[test]
    fn test_unknown_sort_key_falls_back() {
        assert_eq!(parse(&["--sort-by", "colour"]).project.sort_by, SortBy::Name);
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();

        let ok = parse(&[dir.path().to_str().unwrap()]);
        assert!(ok.validate().is_ok());

        let missing = parse(&["/no/such/dir/anywhere"]);
        assert_eq!(missing.validate().unwrap_err().kind(), io::ErrorKind::NotFound);

        let not_dir = parse(&[file.to_str().unwrap()]);
        assert_eq!(not_dir.validate().unwrap_err().kind(), io::ErrorKind::InvalidInput);

        let bad_output = dir.path().join("nope").join("out.md");
        let bad = parse(&[dir.path().to_str().unwrap(), "-o", bad_output.to_str().unwrap()]);
        assert!(bad.validate().is_err());
    }
}
