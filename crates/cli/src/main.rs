//! regscope CLI — terminal front end for the regulatory search backend.
//!
//! Thin presentation adapter over `regscope-core`: every command maps a
//! controller outcome or a metadata view to text (or JSON with `--json`).

use std::process::exit;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use regscope_client::{ClientConfig, HttpBackend, DEFAULT_BASE_URL};
use regscope_core::{
    FilterState, MetadataSnapshot, SearchController, SearchOutcome, SuggestionKind,
};

// ---------------------------------------------------------------------------
// CLI definition (clap derive)
// ---------------------------------------------------------------------------

/// regscope — search federal regulations from the terminal.
#[derive(Parser)]
#[command(name = "regs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Backend base URL
    #[arg(long, global = true, env = "REGSCOPE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List CFR titles with currency dates and the most recent amendment
    Titles,

    /// List agencies with their CFR references
    Agencies,

    /// Search regulations by keyword and optional facet filters
    Search {
        /// Search query (optional when a filter is set)
        #[arg(default_value = "")]
        query: String,

        /// Filter by agency slug (see `regs agencies`)
        #[arg(long)]
        agency: Option<String>,

        /// Filter by CFR title number
        #[arg(long)]
        title: Option<u32>,

        /// Search the historical version as of this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        as_of: Option<NaiveDate>,
    },

    /// Show classified autocomplete suggestions for a partial query
    Suggest {
        /// Partial query text
        partial: String,
    },

    /// List distinct historical version dates, newest first
    Versions,

    /// Word counts for a title or an agency
    Wordcount {
        #[command(subcommand)]
        target: WordcountTarget,
    },
}

#[derive(Subcommand)]
enum WordcountTarget {
    /// Word count for a CFR title
    Title { number: u32 },
    /// Word count for an agency, with per-reference breakdowns
    Agency { slug: String },
}

// ---------------------------------------------------------------------------
// eCFR link derivation
// ---------------------------------------------------------------------------

const ECFR_BASE: &str = "https://www.ecfr.gov/current";

fn title_url(number: u32) -> String {
    format!("{ECFR_BASE}/title-{number}")
}

fn chapter_url(title: u32, chapter: &str) -> String {
    format!("{ECFR_BASE}/title-{title}/chapter-{chapter}")
}

fn subtitle_url(title: u32, subtitle: &str) -> String {
    format!("{ECFR_BASE}/title-{title}/subtitle-{subtitle}")
}

/// Agencies whose chapter references are blank or broken upstream; their
/// display substitutes a known-good subtitle reference.
const SUBTITLE_OVERRIDES: &[(&str, u32, &str)] = &[
    ("federal-procurement-regulations-system", 41, "A"),
    ("federal-property-management-regulations-system", 41, "C"),
    ("federal-travel-regulation-system", 41, "F"),
    ("department-of-defense", 32, "A"),
    ("department-of-health-and-human-services", 45, "A"),
    ("office-of-management-and-budget", 2, "A"),
];

fn subtitle_override(slug: &str) -> Option<(u32, &'static str)> {
    SUBTITLE_OVERRIDES
        .iter()
        .find(|(s, _, _)| *s == slug)
        .map(|(_, title, subtitle)| (*title, *subtitle))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

async fn load_snapshot(backend: &HttpBackend) -> MetadataSnapshot {
    MetadataSnapshot::load(backend).await.unwrap_or_else(|e| {
        eprintln!("Could not load metadata: {e}");
        exit(1);
    })
}

fn date_or_na(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "N/A".to_string())
}

fn kind_tag(kind: SuggestionKind) -> &'static str {
    match kind {
        SuggestionKind::TitleReference => "title",
        SuggestionKind::SectionReference => "section",
        SuggestionKind::AgencyName => "agency",
        SuggestionKind::Generic => "query",
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("regscope=warn".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let backend = HttpBackend::new(ClientConfig::default().base_url(cli.base_url.clone()))
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            exit(1);
        });
    let backend = Arc::new(backend);

    match cli.command {
        Commands::Titles => run_titles(&backend, cli.json).await,
        Commands::Agencies => run_agencies(&backend, cli.json).await,
        Commands::Search { query, agency, title, as_of } => {
            let filters = FilterState {
                query,
                agency_slug: agency,
                title_number: title,
                version_date: as_of,
            };
            run_search(backend, filters, cli.json).await;
        }
        Commands::Suggest { partial } => run_suggest(backend, &partial, cli.json).await,
        Commands::Versions => run_versions(&backend, cli.json).await,
        Commands::Wordcount { target } => run_wordcount(&backend, target, cli.json).await,
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn run_titles(backend: &HttpBackend, json: bool) {
    let snapshot = load_snapshot(backend).await;
    let summary = snapshot.summary();

    if json {
        let output = serde_json::json!({
            "titles": snapshot.titles(),
            "total_titles": summary.total_titles,
            "total_agencies": summary.total_agencies,
            "most_recent_amendment": summary.most_recent_amendment.as_ref().map(|a| {
                serde_json::json!({
                    "title_number": a.title_number,
                    "title_name": a.title_name,
                    "amended_on": a.amended_on.to_string(),
                    "link": title_url(a.title_number),
                })
            }),
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return;
    }

    let mut titles: Vec<_> = snapshot.titles().to_vec();
    titles.sort_unstable_by_key(|t| t.number);

    println!("{:<58} {:>12} {:>12}", "", "up to date", "amended");
    for t in &titles {
        println!(
            "{:<58} {:>12} {:>12}",
            format!("Title {}: {}", t.number, t.name),
            date_or_na(t.up_to_date_as_of),
            date_or_na(t.latest_amended_on),
        );
    }

    println!("\n{} titles, {} agencies", summary.total_titles, summary.total_agencies);
    match &summary.most_recent_amendment {
        Some(a) => println!(
            "Most recently amended: Title {} - {} ({})\n  {}",
            a.title_number,
            a.title_name,
            a.amended_on,
            title_url(a.title_number),
        ),
        None => println!("Most recently amended: N/A"),
    }
}

async fn run_agencies(backend: &HttpBackend, json: bool) {
    let snapshot = load_snapshot(backend).await;

    let mut agencies: Vec<_> = snapshot.agencies().to_vec();
    agencies.sort_unstable_by(|a, b| a.name.cmp(&b.name));

    if json {
        println!("{}", serde_json::to_string_pretty(&agencies).unwrap());
        return;
    }

    for agency in &agencies {
        let slug = agency.slug_or_derived();
        println!("{}  ({slug})", agency.name);

        if let Some((title, subtitle)) = subtitle_override(&slug) {
            println!("    Title {title}, Subtitle {subtitle}  {}", subtitle_url(title, subtitle));
        } else if agency.cfr_references.is_empty() {
            println!("    No Titles Found");
        } else {
            for r in &agency.cfr_references {
                match &r.chapter {
                    Some(chapter) => println!(
                        "    Title {}, Chapter {chapter}  {}",
                        r.title,
                        chapter_url(r.title, chapter),
                    ),
                    None => println!("    Title {}, Chapter N/A", r.title),
                }
            }
        }
    }
    eprintln!("\n{} agencies", agencies.len());
}

async fn run_search(backend: Arc<HttpBackend>, filters: FilterState, json: bool) {
    // The controller rejects this too; checking first avoids fetching
    // metadata for a request that can never run.
    if filters.is_unconstrained() {
        eprintln!("Enter a search term or set at least one filter.");
        exit(2);
    }

    let snapshot = Arc::new(load_snapshot(&backend).await);
    let controller = SearchController::new(backend, snapshot);

    if filters.wants_scope_hint() && !json {
        eprintln!(
            "Tip: selecting a title or agency improves accuracy when searching historical versions."
        );
    }

    match controller.submit_search(&filters).await {
        SearchOutcome::ValidationFailed => {
            eprintln!("Enter a search term or set at least one filter.");
            exit(2);
        }
        SearchOutcome::Aborted => {
            println!("Search was stopped.");
        }
        SearchOutcome::BackendError(msg) => {
            eprintln!("Error retrieving search results: {msg}");
            exit(1);
        }
        SearchOutcome::NoMatches => {
            if json {
                println!("[]");
            } else {
                println!("No results found.");
            }
        }
        SearchOutcome::Results(hits) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&hits).unwrap());
                return;
            }
            println!("{} matches found.\n", hits.len());
            for (i, hit) in hits.iter().enumerate() {
                println!("{}. {}", i + 1, hit.label());
                if let Some(heading) = &hit.heading {
                    println!("   {heading}");
                }
                if let Some(match_type) = &hit.match_type {
                    println!("   Match type: {match_type}");
                }
                if let Some(issue_date) = &hit.issue_date {
                    println!("   Version: {issue_date}");
                }
                if let Some(excerpt) = &hit.excerpt {
                    println!("   {excerpt}");
                }
                if let Some(link) = &hit.link {
                    println!("   {link}");
                }
                println!();
            }
        }
    }
}

async fn run_suggest(backend: Arc<HttpBackend>, partial: &str, json: bool) {
    let snapshot = Arc::new(load_snapshot(&backend).await);
    let controller = SearchController::new(backend, snapshot);

    let suggestions = controller.suggestions(partial).await;
    if suggestions.is_empty() {
        eprintln!("No suggestions for '{partial}'");
        exit(1);
    }

    if json {
        let items: Vec<serde_json::Value> = suggestions
            .iter()
            .map(|s| serde_json::json!({ "label": s.label, "kind": kind_tag(s.kind) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items).unwrap());
    } else {
        for s in &suggestions {
            println!("{:<8} {}", kind_tag(s.kind), s.label);
        }
    }
}

async fn run_versions(backend: &HttpBackend, json: bool) {
    let snapshot = load_snapshot(backend).await;
    let dates = snapshot.version_dates();

    if json {
        let items: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
        println!("{}", serde_json::to_string_pretty(&items).unwrap());
        return;
    }

    if dates.is_empty() {
        println!("No version history available.");
        return;
    }
    for date in &dates {
        println!("Version from {date}");
    }
}

async fn run_wordcount(backend: &HttpBackend, target: WordcountTarget, json: bool) {
    match target {
        WordcountTarget::Title { number } => {
            let count = backend.title_word_count(number).await.unwrap_or_else(|e| {
                eprintln!("Word count failed: {e}");
                exit(1);
            });
            if json {
                println!("{}", serde_json::json!({ "title": number, "word_count": count }));
            } else {
                println!("Title {number}: {count} words");
            }
        }
        WordcountTarget::Agency { slug } => {
            let counts = backend.agency_word_count(&slug).await.unwrap_or_else(|e| {
                eprintln!("Word count failed: {e}");
                exit(1);
            });
            if json {
                let breakdowns: Vec<serde_json::Value> = counts
                    .breakdowns
                    .iter()
                    .map(|b| {
                        serde_json::json!({
                            "title": b.title,
                            "chapter": b.chapter,
                            "word_count": b.word_count,
                        })
                    })
                    .collect();
                let output = serde_json::json!({
                    "agency": slug,
                    "breakdowns": breakdowns,
                    "total": counts.total,
                });
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
                return;
            }
            for b in &counts.breakdowns {
                println!(
                    "Title {}, Chapter {}: {}",
                    b.title,
                    b.chapter.as_deref().unwrap_or("N/A"),
                    b.word_count,
                );
            }
            println!("Total: {}", counts.total);
        }
    }
}
