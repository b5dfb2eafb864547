mod config;
mod db;
mod diagram;
mod fetch;
mod generate;
mod parser;
mod prompt;
mod record;
mod render;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use config::Settings;
use diagram::CaseGraph;
use generate::GeminiClient;
use record::CaseRecord;

#[derive(Parser)]
#[command(name = "judgeman", about = "Structured extraction and reading view for HTML judgments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DiagramFormat {
    Json,
    Dot,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a judgment into case JSON
    Extract {
        /// Local HTML file or http(s) URL
        source: String,
        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the simplified reading view
    Simplify {
        /// Local HTML file or http(s) URL
        source: String,
        #[arg(short, long, default_value = "judgeman.html")]
        output: PathBuf,
        /// Embed the original page behind a toggle button
        #[arg(long)]
        embed_original: bool,
    },
    /// Facts rundown via the text-generation API
    Facts {
        /// Local HTML file or http(s) URL
        source: String,
        /// Model name (overrides JUDGEMAN_MODEL)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Case diagram (nodes + edges) via the text-generation API
    Diagram {
        /// Local HTML file or http(s) URL
        source: String,
        /// Model name (overrides JUDGEMAN_MODEL)
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long, value_enum, default_value = "json")]
        format: DiagramFormat,
    },
    /// Extract many judgments and archive them in the local database
    Ingest {
        /// Local HTML files or http(s) URLs
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Archived cases overview table
    List {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Print one archived case as JSON
    Show {
        id: i64,
    },
    /// Archive statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::from_env();

    let result = match cli.command {
        Commands::Extract { source, output } => {
            let (record, _) = extract_source(&source).await?;
            let json = serde_json::to_string_pretty(&record)?;
            match output {
                Some(path) => {
                    write_file(&path, &json)?;
                    println!("Wrote case JSON to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        Commands::Simplify {
            source,
            output,
            embed_original,
        } => {
            let (record, html) = extract_source(&source).await?;
            let original = embed_original.then_some(html.as_str());
            write_file(&output, &render::simplified_html(&record, original))?;
            println!(
                "Wrote reading view to {} ({} sections, {} lines)",
                output.display(),
                record.body.len(),
                record.line_count()
            );
            Ok(())
        }
        Commands::Facts { source, model } => {
            let client = GeminiClient::new(&settings.with_model(model))?;
            let (record, _) = extract_source(&source).await?;
            if record.facts_text.is_empty() {
                info!("No facts/background section found; prompting with metadata only");
            }
            let text = client.generate_text(&prompt::facts_prompt(&record)).await?;
            println!("{}", text);
            Ok(())
        }
        Commands::Diagram {
            source,
            model,
            format,
        } => {
            let client = GeminiClient::new(&settings.with_model(model))?;
            let (record, _) = extract_source(&source).await?;
            let text = client.generate_text(&prompt::diagram_prompt(&record)).await?;
            let graph = CaseGraph::parse(&text).map_err(generate::GenerateError::from)?;
            match format {
                DiagramFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
                DiagramFormat::Dot => print!("{}", graph.to_dot()),
            }
            Ok(())
        }
        Commands::Ingest { sources } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;

            let t_load = Instant::now();
            println!("Loading {} sources...", sources.len());
            let pages = fetch::load_all(sources).await?;
            let failed = pages.iter().filter(|p| p.error.is_some()).count();
            println!(
                "Loaded {} sources ({} errors) in {:.1}s",
                pages.len(),
                failed,
                t_load.elapsed().as_secs_f64()
            );

            let t_process = Instant::now();
            let counts = process_pages(&conn, &pages)?;
            println!("Processed in {:.1}s", t_process.elapsed().as_secs_f64());
            counts.print();
            Ok(())
        }
        Commands::List { limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, limit)?;
            if rows.is_empty() {
                println!("No cases archived. Run 'ingest' first.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<32} | {:<26} | {:<16} | {:>4} | {:>5} | {:<5}",
                "id", "Title", "Case number", "Date", "Secs", "Lines", "Facts"
            );
            println!("{}", "-".repeat(110));
            for r in &rows {
                println!(
                    "{:>4} | {:<32} | {:<26} | {:<16} | {:>4} | {:>5} | {:<5}",
                    r.id,
                    truncate(&r.title, 32),
                    truncate(&r.number, 26),
                    truncate(&r.date, 16),
                    r.section_count,
                    r.line_count,
                    if r.has_facts { "yes" } else { "-" },
                );
            }

            println!("\n--- Sources ---");
            for r in &rows {
                let court: &str = if r.tribunal_court.is_empty() { "-" } else { &r.tribunal_court };
                println!("  {:>4}: {} [{}]", r.id, truncate(&r.source, 60), court);
            }

            println!("\n{} cases | db: {}", rows.len(), settings.db_path.display());
            Ok(())
        }
        Commands::Show { id } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let Some(record) = db::fetch_record(&conn, id)? else {
                bail!("no archived case with id {}", id);
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Cases:      {}", s.total);
            println!("With facts: {}", s.with_facts);
            println!("No body:    {}", s.empty_body);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Load a source and extract it; the raw HTML is returned alongside.
async fn extract_source(source: &str) -> anyhow::Result<(CaseRecord, String)> {
    let client = fetch::client()?;
    let html = fetch::load(&client, source).await?;
    let record = parser::extract_case(&html);
    if record.is_empty() {
        warn!(source, "no judgment markup found; record is empty");
    }
    info!(
        source,
        title = %record.title,
        sections = record.body.len(),
        "extracted"
    );
    Ok((record, html))
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

struct ProcessCounts {
    cases: usize,
    sections: usize,
    lines: usize,
    with_facts: usize,
    failed: usize,
}

impl ProcessCounts {
    fn print(&self) {
        println!(
            "Saved {} cases ({} sections, {} lines, {} with facts), {} failed to load.",
            self.cases, self.sections, self.lines, self.with_facts, self.failed,
        );
    }
}

fn process_pages(
    conn: &rusqlite::Connection,
    pages: &[fetch::FetchedPage],
) -> anyhow::Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = ProcessCounts {
        cases: 0,
        sections: 0,
        lines: 0,
        with_facts: 0,
        failed: pages.iter().filter(|p| p.html.is_none()).count(),
    };

    for chunk in pages.chunks(200) {
        let rows: Vec<db::CaseRow> = chunk
            .par_iter()
            .filter_map(|page| {
                let html = page.html.as_deref()?;
                Some(db::CaseRow {
                    source: page.source.clone(),
                    record: parser::extract_case(html),
                })
            })
            .collect();

        for row in &rows {
            counts.sections += row.record.body.len();
            counts.lines += row.record.line_count();
            counts.with_facts += usize::from(!row.record.facts_text.is_empty());
        }
        counts.cases += db::save_cases(conn, &rows)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_long_titles() {
        assert_eq!(truncate("Tan v Lim", 32), "Tan v Lim");
        assert_eq!(truncate("Tan Ah Kow v Lim Bee Hoon", 10), "Tan Ah Kow...");
    }

    #[test]
    fn duration_formats() {
        use std::time::Duration;
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn process_pages_skips_failed_loads() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let html = std::fs::read_to_string("tests/fixtures/judgment.html").unwrap();
        let pages = vec![
            fetch::FetchedPage {
                source: "a.html".to_string(),
                html: Some(html),
                error: None,
                latency_ms: 1,
            },
            fetch::FetchedPage {
                source: "b.html".to_string(),
                html: None,
                error: Some("not found".to_string()),
                latency_ms: 1,
            },
        ];
        let counts = process_pages(&conn, &pages).unwrap();
        assert_eq!(counts.cases, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.sections, 4);
        assert_eq!(counts.with_facts, 1);
    }

    #[test]
    fn cli_parses_commands() {
        let cli = Cli::try_parse_from(["judgeman", "simplify", "a.html", "--embed-original"]).unwrap();
        assert!(matches!(cli.command, Commands::Simplify { embed_original: true, .. }));
        let cli = Cli::try_parse_from(["judgeman", "diagram", "a.html", "-f", "dot"]).unwrap();
        assert!(matches!(cli.command, Commands::Diagram { format: DiagramFormat::Dot, .. }));
        assert!(Cli::try_parse_from(["judgeman", "ingest"]).is_err());
    }
}
