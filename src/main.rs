/*!
 * Command-line interface for promptmap
 */

use std::fs;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use strum::IntoEnumIterator;

use promptmap::config::{Args, Config};
use promptmap::error::{PromptMapError, ResultExt};
use promptmap::formatter::OutputFormatter;
use promptmap::project::load_project_with_progress;
use promptmap::report::Reporter;
use promptmap::selection::Selection;
use promptmap::tokenizer::{count_selection_tokens, Model, TokenCache, Tokenizer};
use promptmap::utils::format_file_size;

fn print_models() {
    println!("{:<24} {:<12} MAX TOKENS", "MODEL", "ENCODING");
    for model in Model::iter() {
        let max = model
            .max_tokens()
            .map(|max| max.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<12} {}",
            model.name(),
            model.encoding().to_string(),
            max
        );
    }
}

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "promptmap", &mut io::stdout());
        return Ok(());
    }

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if args.list_models {
        print_models();
        return Ok(());
    }

    let config = Config::from_args(args);
    config.validate()?;
    let root = config.target_dir.canonicalize()?;

    // Spinner on stderr while the folder loads
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {prefix:.bold.cyan} {pos} entries {wide_msg:.dim}")
    {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📂 Scanning");

    let entries = load_project_with_progress(&root, &config.project, Arc::new(progress.clone()))?;
    progress.finish_and_clear();

    if config.list {
        let json = serde_json::to_string_pretty(&entries).map_err(PromptMapError::from)?;
        println!("{}", json);
        return Ok(());
    }

    let selection = if config.select.is_empty() {
        Selection::all(&entries)
    } else {
        Selection::from_paths(&entries, &config.select)
    };
    if selection.is_empty() {
        warn!("Nothing selected under {}", root.display());
    }
    info!(
        "Selected {} files and {} folders",
        selection.file_count(),
        selection.dir_count()
    );

    let formatter = OutputFormatter::new(&root, config.output);
    let document = formatter.generate_full_output(selection.items());

    match &config.output_file {
        Some(path) => {
            fs::write(path, &document)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(
                "Wrote {} ({})",
                path.display(),
                format_file_size(document.len() as u64)
            );
        }
        None => println!("{}", document),
    }

    if config.count_tokens {
        let tokenizer = Tokenizer::new(&config.model).map_err(PromptMapError::from)?;
        let stop = AtomicBool::new(false);
        let mut cache = TokenCache::new();

        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} {bar:30.green} {pos}/{len} {wide_msg:.dim}")
        {
            bar.set_style(style);
        }
        bar.set_prefix("📦 Counting");

        let start = Instant::now();
        let report = count_selection_tokens(&tokenizer, selection.items(), &mut cache, &stop, &bar);
        Reporter::new(config.report_format()).print_report(&report, start.elapsed());
    }

    Ok(())
}
