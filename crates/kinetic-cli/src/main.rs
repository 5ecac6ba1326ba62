//! Kinetic Search - command-line front end for the exercise search engine.
//!
//! Loads an exercise corpus from a JSON file, applies the given filters and query,
//! and prints one page of ranked results.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use kinetic_core::{
    FilterPatch, JsonFileSource, SearchConfig, SearchController, SearchOptions, SearchState,
};
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "kinetic-search")]
#[command(about = "Search an exercise corpus")]
struct Args {
    /// Search text; `-term` excludes, `a or b` matches either (use `--` before a
    /// leading `-term`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    query: Vec<String>,

    /// JSON file holding the exercise records
    #[arg(long)]
    corpus: PathBuf,

    /// Restrict to a category (repeatable)
    #[arg(long)]
    category: Vec<String>,

    /// Require one of these equipment values (repeatable)
    #[arg(long)]
    equipment: Vec<String>,

    /// Require one of these muscles, primary or secondary (repeatable)
    #[arg(long)]
    muscle: Vec<String>,

    /// Restrict to a difficulty level (repeatable)
    #[arg(long)]
    difficulty: Vec<String>,

    /// Index of the first result to print
    #[arg(long, default_value = "0")]
    offset: usize,

    /// Number of results to print
    #[arg(long, default_value_t = SearchConfig::DEFAULT_PAGE_SIZE)]
    limit: usize,

    /// Print the page as JSON
    #[arg(long)]
    json: bool,

    /// JSON file with search options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn filter_patch(&self) -> FilterPatch {
        let mut patch = FilterPatch::new();
        if !self.category.is_empty() {
            patch = patch.categories(self.category.iter());
        }
        if !self.equipment.is_empty() {
            patch = patch.equipment(self.equipment.iter());
        }
        if !self.muscle.is_empty() {
            patch = patch.muscles(self.muscle.iter());
        }
        if !self.difficulty.is_empty() {
            patch = patch.difficulty(self.difficulty.iter());
        }
        patch
    }

    fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

async fn load_options(path: Option<&PathBuf>) -> Result<SearchOptions> {
    match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            SearchOptions::from_json(&raw)
                .with_context(|| format!("Invalid config: {}", path.display()))
        }
        None => Ok(SearchOptions::default()),
    }
}

fn render_text(state: &SearchState, offset: usize, limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&state.summary);
    out.push('\n');

    for record in state.result.page(offset, limit) {
        out.push_str("  ");
        out.push_str(&record.name);
        if let Some(category) = &record.category {
            out.push_str(&format!(" [{}]", category));
        }
        if let Some(difficulty) = record.difficulty {
            out.push_str(&format!(" ({})", difficulty));
        }
        out.push('\n');
    }
    out
}

fn render_json(state: &SearchState, offset: usize, limit: usize) -> Result<String> {
    let page = serde_json::json!({
        "summary": state.summary,
        "total": state.total(),
        "offset": offset,
        "elapsedMs": state.elapsed_ms,
        "highlightTerms": state.result.highlight_terms,
        "records": state.result.page(offset, limit),
    });
    Ok(serde_json::to_string_pretty(&page)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let options = load_options(args.config.as_ref()).await?;
    debug!("Search options: {:?}", options);

    let controller = SearchController::builder(JsonFileSource::new(&args.corpus))
        .options(options)
        .build()
        .await;
    if let Some(failure) = controller.state().error {
        return Err(anyhow!("{}", failure.message));
    }
    info!(
        "Searching {} records from {}",
        controller.record_count().unwrap_or_default(),
        args.corpus.display()
    );

    controller.set_filters(args.filter_patch())?;
    controller.set_query(args.query_text());
    let state = controller.settled().await;
    controller.dispose();

    if let Some(failure) = &state.error {
        return Err(anyhow!("{}", failure.message));
    }

    if args.json {
        println!("{}", render_json(&state, args.offset, args.limit)?);
    } else {
        print!("{}", render_text(&state, args.offset, args.limit));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_core::{
        parse_query, run_search, Difficulty, ExerciseRecord, RecordStore, SearchFilters,
    };
    use std::sync::Arc;

    fn state_for(query: &str) -> SearchState {
        let store = RecordStore::from_records(vec![
            ExerciseRecord::new("1", "Bench Press")
                .with_category("strength")
                .with_difficulty(Difficulty::Intermediate),
            ExerciseRecord::new("2", "Push Up"),
        ]);
        let result = run_search(&store, &parse_query(query), &SearchFilters::default());
        let mut state = SearchState::default();
        state.summary = format!("{} results", result.total);
        state.result = Arc::new(result);
        state
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "kinetic-search",
            "--corpus",
            "exercises.json",
            "--equipment",
            "barbell",
            "--equipment",
            "dumbbell",
            "--limit",
            "5",
            "bench",
            "-incline",
        ])
        .unwrap();

        assert_eq!(args.corpus, PathBuf::from("exercises.json"));
        assert_eq!(args.equipment, vec!["barbell", "dumbbell"]);
        assert_eq!(args.limit, 5);
        assert_eq!(args.query_text(), "bench -incline");
    }

    #[test]
    fn test_default_limit_and_offset() {
        let args = Args::try_parse_from(["kinetic-search", "--corpus", "x.json"]).unwrap();
        assert_eq!(args.offset, 0);
        assert_eq!(args.limit, SearchConfig::DEFAULT_PAGE_SIZE);
        assert!(args.query_text().is_empty());
    }

    #[test]
    fn test_filter_patch_only_sets_given_dimensions() {
        let args = Args::try_parse_from([
            "kinetic-search",
            "--corpus",
            "x.json",
            "--difficulty",
            "beginner",
        ])
        .unwrap();

        let filters = SearchFilters::default().merged(&args.filter_patch()).unwrap();
        assert_eq!(filters.active_count(), 1);
        assert!(filters.difficulty.contains(&Difficulty::Beginner));
    }

    #[test]
    fn test_render_text_lists_page() {
        let text = render_text(&state_for("press"), 0, 10);
        assert_eq!(text, "1 results\n  Bench Press [strength] (intermediate)\n");
    }

    #[test]
    fn test_render_json_respects_offset() {
        let json = render_json(&state_for(""), 1, 10).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["records"].as_array().unwrap().len(), 1);
        assert_eq!(value["records"][0]["name"], "Push Up");
    }
}
