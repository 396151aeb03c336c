//! TOC Forge CLI
//!
//! Finds a canonical book for a subject, extracts and validates its table
//! of contents from the web, expands it into per-section material via an
//! LLM, and saves the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use toc_forge::{
    config::Config,
    persistence::{DEFAULT_OUTPUT_DIR, material_path, material_size, save_material},
    pipeline::TocPipeline,
    title::TitleCandidate,
};

/// TOC Forge - book TOC extraction and expansion
#[derive(Parser)]
#[command(name = "toc-forge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive end-to-end run: pick a book, extract its TOC, expand and save
    Run {
        /// Subject to learn; prompted for when omitted
        subject: Option<String>,

        /// Output directory for the material file
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },

    /// Search a subject and list candidate book titles
    Titles {
        /// Subject to search for
        subject: String,
    },

    /// Extract and print a book's table of contents
    Toc {
        /// Book title to search a TOC page for
        #[arg(required_unless_present = "url")]
        title: Option<String>,

        /// Extract directly from this page instead of searching
        #[arg(long, conflicts_with = "title")]
        url: Option<String>,
    },

    /// Expand a TOC file (one chapter title per line) into section material
    Expand {
        /// Path to the titles file
        toc_file: PathBuf,

        /// Output directory for the material file
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Base name for the material file
        #[arg(short, long, default_value = "material")]
        name: String,
    },

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { subject, output } => cmd_run(subject, output).await,
        Commands::Titles { subject } => cmd_titles(subject).await,
        Commands::Toc { title, url } => cmd_toc(title, url).await,
        Commands::Expand {
            toc_file,
            output,
            name,
        } => cmd_expand(toc_file, output, name).await,
        Commands::Test => cmd_test().await,
    }
}

fn load_pipeline() -> Result<TocPipeline> {
    println!("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(TocPipeline::new(config))
}

async fn cmd_run(subject: Option<String>, output: PathBuf) -> Result<()> {
    let pipeline = load_pipeline()?;

    let subject = match subject {
        Some(s) => s,
        None => prompt("Subject to learn: ")?,
    };
    if subject.is_empty() {
        anyhow::bail!("Subject must not be empty");
    }

    println!("\nSearching for books about \"{subject}\"...");
    let candidates = pipeline
        .discover_titles(&subject)
        .await
        .context("Title discovery failed")?;

    println!("\nCandidate books:");
    for (i, candidate) in candidates.iter().enumerate() {
        match &candidate.author {
            Some(author) => println!("{:>2}. 《{}》 — {}", i + 1, candidate.title, author),
            None => println!("{:>2}. 《{}》", i + 1, candidate.title),
        }
    }

    let book = pick_candidate(&candidates)?;
    println!("\nSelected: 《{}》", book.title);

    println!("\nSearching for the TOC page...");
    let mut selection = pipeline
        .collect_toc(&book.title)
        .await
        .context("TOC collection failed")?;

    while selection.is_empty() {
        println!("\nNo candidate page yielded enough TOC entries.");
        let answer = prompt("Provide a TOC page URL manually? [y/N]: ")?;
        if !answer.eq_ignore_ascii_case("y") {
            anyhow::bail!("No eligible table of contents found");
        }
        let url = prompt("TOC page URL: ")?;
        match pipeline.extract_from_url(&url).await {
            Ok(result) => selection = result,
            Err(e) => println!("Extraction failed: {e}"),
        }
    }

    let toc = pipeline.require_selection(selection)?;
    let titles = toc.cleaned_titles();

    println!(
        "\nTOC selected from {} ({} entries, {:?} level)",
        toc.source_url,
        titles.len(),
        toc.level
    );
    if !toc.order_preserved {
        println!("Note: heading numbers in the source are not monotonic; keeping page order.");
    }

    println!("\nExpanding section descriptions via LLM...");
    let start = Instant::now();
    let material = pipeline
        .expand_material(&titles)
        .await
        .context("Expansion failed")?;
    println!("Expanded {} sections in {:.2?}", material.len(), start.elapsed());

    let path = material_path(&output, &subject);
    save_material(&material, &path).context("Failed to save material")?;

    let size = material_size(&path)?;
    println!("\nMaterial saved to: {}", path.display());
    println!("  File size: {:.1} KB", size as f64 / 1024.0);

    Ok(())
}

async fn cmd_titles(subject: String) -> Result<()> {
    let pipeline = load_pipeline()?;

    println!("Searching for books about \"{subject}\"...\n");
    let candidates = pipeline
        .discover_titles(&subject)
        .await
        .context("Title discovery failed")?;

    println!("Candidate books:");
    println!("{}", "─".repeat(60));
    for (i, candidate) in candidates.iter().enumerate() {
        match &candidate.author {
            Some(author) => println!("{:>2}. 《{}》 — {}", i + 1, candidate.title, author),
            None => println!("{:>2}. 《{}》", i + 1, candidate.title),
        }
        println!("    Source: {}", candidate.source_url);
    }

    Ok(())
}

async fn cmd_toc(title: Option<String>, url: Option<String>) -> Result<()> {
    let pipeline = load_pipeline()?;

    let selection = match (&title, &url) {
        (_, Some(url)) => {
            println!("Extracting TOC from {url}...");
            pipeline
                .extract_from_url(url)
                .await
                .context("Extraction failed")?
        }
        (Some(title), None) => {
            println!("Searching for the TOC of 《{title}》...");
            pipeline
                .collect_toc(title)
                .await
                .context("TOC collection failed")?
        }
        (None, None) => unreachable!("clap requires either a title or --url"),
    };

    let toc = pipeline.require_selection(selection)?;

    println!(
        "\nTOC from {} ({} entries, {:?} level)",
        toc.source_url,
        toc.len(),
        toc.level
    );
    println!("{}", "─".repeat(60));
    for (i, validated) in toc.entries.iter().enumerate() {
        match &validated.entry.number_prefix {
            Some(prefix) => println!("{:>3}. {} {}", i + 1, prefix, validated.entry.title),
            None => println!("{:>3}. {}", i + 1, validated.entry.title),
        }
    }

    Ok(())
}

async fn cmd_expand(toc_file: PathBuf, output: PathBuf, name: String) -> Result<()> {
    let pipeline = load_pipeline()?;

    let content = std::fs::read_to_string(&toc_file)
        .with_context(|| format!("Failed to read '{}'", toc_file.display()))?;
    let titles: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if titles.is_empty() {
        anyhow::bail!("'{}' contains no chapter titles", toc_file.display());
    }

    println!("Expanding {} chapter titles via LLM...", titles.len());
    let start = Instant::now();
    let material = pipeline
        .expand_material(&titles)
        .await
        .context("Expansion failed")?;
    println!("Expanded {} sections in {:.2?}", material.len(), start.elapsed());

    let path = material_path(&output, &name);
    save_material(&material, &path).context("Failed to save material")?;
    println!("Material saved to: {}", path.display());

    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Testing LLM connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        &config.llm.api_key[..config.llm.api_key.len().min(8)]
    );
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = toc_forge::LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}

fn pick_candidate(candidates: &[TitleCandidate]) -> Result<&TitleCandidate> {
    loop {
        let answer = prompt("\nPick a book by number: ")?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => return Ok(&candidates[n - 1]),
            _ => println!("Enter a number between 1 and {}.", candidates.len()),
        }
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
