//! pagestore - convert a PDF textbook to a page store and query it
//!
//! Usage: pagestore [--store PATH] [--strict] [--log PATH] [-v...] <COMMAND>
//!
//! Errors are printed as a single `Error: ...` line and exit with status 1.

use clap::{Parser, Subcommand};
use env_logger::Env;
use pdf_pagestore::extractors::source_for_path;
use pdf_pagestore::pipeline::document_title;
use pdf_pagestore::query::DEFAULT_PREVIEW_CHARS;
use pdf_pagestore::search::SearchOptions;
use pdf_pagestore::structure::{scan_sections, ChapterIndex};
use pdf_pagestore::{
    ConversionLog, ConversionPipeline, Error, QaExtraction, QueryEngine, RecordStore, Result,
    RuleCounts, RuleKind, SpacingConfig, SpacingRestorer, StoreConfig,
};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagestore")]
#[command(version, about = "PDF textbook page store", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Page store file
    #[arg(long, global = true, default_value = "pages.jsonl")]
    store: PathBuf,

    /// Abort loading on the first malformed store line
    #[arg(long, global = true)]
    strict: bool,

    /// Conversion log to update (JSON lines, one entry per document)
    #[arg(long, global = true, value_name = "PATH")]
    log: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SpacingArgs {
    /// Token that must never be split (repeatable)
    #[arg(long = "preserve", value_name = "TOKEN")]
    preserve: Vec<String>,

    /// Turn off one rule, e.g. camel-case (repeatable)
    #[arg(long = "disable", value_name = "RULE", value_parser = parse_rule)]
    disable: Vec<RuleKind>,
}

impl SpacingArgs {
    fn restorer(&self) -> SpacingRestorer {
        let mut config = SpacingConfig::new();
        for token in &self.preserve {
            config = config.with_preserved_token(token.clone());
        }
        for kind in &self.disable {
            config = config.with_rule(*kind, false);
        }
        SpacingRestorer::with_config(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF (or form-feed text file) into a page store
    Convert {
        /// Source document; `.pdf` is read as PDF, anything else as text
        input: PathBuf,

        /// Where to write the store (defaults to --store)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Keep extracted text as-is, without spacing restoration
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        spacing: SpacingArgs,
    },

    /// Search every page for a keyword
    Search {
        keyword: String,

        /// Match regardless of case
        #[arg(long, short = 'i')]
        ignore_case: bool,

        /// Match whole words only
        #[arg(long, short = 'w')]
        whole_word: bool,

        /// Characters of context around each match
        #[arg(long, default_value_t = 80)]
        context: usize,

        /// Stop after this many matches (0 = all)
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },

    /// Print one page
    Page { number: u32 },

    /// Print the start of one page
    Show {
        number: u32,

        /// Characters to show
        #[arg(long, default_value_t = DEFAULT_PREVIEW_CHARS)]
        chars: usize,
    },

    /// Print a range of pages
    Range { start: u32, end: u32 },

    /// Write a range of pages to a file
    Extract {
        start: u32,
        end: u32,
        output: PathBuf,
    },

    /// Store statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check page numbering and report malformed lines
    Check,

    /// Count spacing problems still present in the store
    Diagnose {
        /// Pages to list, most problems first
        #[arg(long, default_value_t = 10)]
        top: usize,

        #[command(flatten)]
        spacing: SpacingArgs,
    },

    /// List detected chapters and sections
    Outline,

    /// Print every page of a chapter
    Chapter { number: u32 },

    /// Extract practice questions and pair them with their solutions
    Questions {
        /// Book id used in problem keys (defaults to the store file name)
        #[arg(long)]
        book_id: Option<String>,

        /// Write questions/ and answers/ JSON-lines files under this directory
        #[arg(long, short, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print every question and its answer
        #[arg(long)]
        list: bool,
    },

    /// List documents recorded in the conversion log
    History,

    /// Restore spacing in a text file (or stdin) and print the result
    Restore {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        #[command(flatten)]
        spacing: SpacingArgs,
    },
}

fn parse_rule(name: &str) -> std::result::Result<RuleKind, String> {
    RuleKind::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = RuleKind::ALL.iter().map(|k| k.name()).collect();
        format!("unknown rule '{}' (expected one of: {})", name, names.join(", "))
    })
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let store_config = StoreConfig::new().with_strict(cli.strict);
    let load = || RecordStore::open(&cli.store, &store_config);

    match cli.command {
        Commands::Convert {
            input,
            output,
            raw,
            spacing,
        } => {
            let output = output.unwrap_or_else(|| cli.store.clone());
            let mut source = source_for_path(&input)?;
            let pipeline = ConversionPipeline::new(spacing.restorer()).with_restoration(!raw);
            let report = pipeline.convert_to_path(source.as_mut(), &output)?;
            if let Some(log_path) = &cli.log {
                ConversionLog::open(log_path)?.record_conversion(&input, &output, &report)?;
            }

            println!("Converted {} -> {}", input.display(), output.display());
            println!("  Pages:      {}", report.pages);
            println!("  Characters: {}", report.characters);
            println!("  Words:      {}", report.words);
            if !raw {
                println!("  Spacing fixes: {}", report.counts.total());
                print_counts(&report.counts, "    ");
                if !report.busiest_pages.is_empty() {
                    let pages: Vec<String> = report
                        .busiest_pages
                        .iter()
                        .map(|(page, n)| format!("{} ({})", page, n))
                        .collect();
                    println!("  Most fixes on pages: {}", pages.join(", "));
                }
            }
        },

        Commands::Search {
            keyword,
            ignore_case,
            whole_word,
            context,
            limit,
        } => {
            let store = load()?;
            let options = SearchOptions::new()
                .with_case_insensitive(ignore_case)
                .with_whole_word(whole_word)
                .with_context_chars(context)
                .with_max_results(limit);

            let mut found = 0;
            for hit in QueryEngine::new(&store).search(&keyword, &options)? {
                println!("Page {}: ...{}...", hit.page_number, hit.snippet);
                found += 1;
            }
            if found == 0 {
                println!("No matches for '{}'", keyword);
            } else {
                println!("\n{} matches", found);
            }
        },

        Commands::Page { number } => {
            let store = load()?;
            let record = QueryEngine::new(&store).get_page(number)?;
            println!("--- Page {} ({} characters) ---", number, record.text_length());
            println!("{}", record.text());
        },

        Commands::Show { number, chars } => {
            let store = load()?;
            let preview = QueryEngine::new(&store).preview(number, chars)?;
            println!(
                "--- Page {} ({} characters) ---",
                number,
                preview.record.text_length()
            );
            println!("{}", preview.text);
            if preview.truncated {
                println!(
                    "... [{} more characters]",
                    preview.record.text_length() - preview.text.chars().count()
                );
            }
        },

        Commands::Range { start, end } => {
            let store = load()?;
            print!("{}", QueryEngine::new(&store).range_text(start, end)?);
        },

        Commands::Extract { start, end, output } => {
            let store = load()?;
            let pages = QueryEngine::new(&store).extract(start, end, &output)?;
            println!("Wrote {} pages to {}", pages, output.display());
        },

        Commands::Stats { json } => {
            let store = load()?;
            let stats = QueryEngine::new(&store).stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Total pages:        {}", stats.total_pages);
                println!("Total characters:   {}", stats.total_characters);
                println!("Average chars/page: {:.1}", stats.average_chars_per_page);
                println!("Total words:        {}", stats.total_words);
                println!("Empty pages:        {}", stats.empty_pages);
            }
        },

        Commands::Check => {
            let store = load()?;
            let report = store.validate();
            for skipped in store.skipped() {
                println!("Line {}: {}", skipped.line, skipped.reason);
            }
            if !report.missing_pages.is_empty() {
                println!("Missing pages: {}", format_ranges(&report.missing_pages));
            }
            if report.is_clean() {
                println!("OK: {} pages numbered 1-{}", store.len(), store.max_page());
            } else {
                eprintln!(
                    "Error: {} lines skipped, {} pages missing",
                    report.skipped_lines,
                    report.missing_count()
                );
                std::process::exit(1);
            }
        },

        Commands::Diagnose { top, spacing } => {
            let store = load()?;
            let restorer = spacing.restorer();
            let mut total = RuleCounts::default();
            let mut pages: Vec<(u32, usize)> = Vec::new();

            for record in store.iter() {
                let counts = restorer.scan(record.text());
                if !counts.is_empty() {
                    pages.push((record.page_number(), counts.total()));
                }
                total.merge(&counts);
            }

            println!(
                "Residual spacing issues: {} on {} of {} pages",
                total.total(),
                pages.len(),
                store.len()
            );
            print_counts(&total, "  ");

            pages.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            for (page, n) in pages.iter().take(top) {
                println!("  page {:>5}: {}", page, n);
            }
        },

        Commands::Outline => {
            let store = load()?;
            let index = ChapterIndex::build(&store);
            let sections = scan_sections(&store);

            if index.is_empty() {
                println!("No chapters detected");
            }
            for chapter in index.chapters() {
                match &chapter.title {
                    Some(title) => println!(
                        "Chapter {}: {} (pages {}-{})",
                        chapter.number, title, chapter.start_page, chapter.end_page
                    ),
                    None => println!(
                        "Chapter {} (pages {}-{})",
                        chapter.number, chapter.start_page, chapter.end_page
                    ),
                }
                for section in sections.iter().filter(|s| chapter.contains(s.page_number)) {
                    let indent = "  ".repeat(section.level.saturating_sub(1));
                    println!(
                        "{}{} {} (page {})",
                        indent, section.number, section.title, section.page_number
                    );
                }
            }
        },

        Commands::Chapter { number } => {
            let store = load()?;
            let (start, end) = ChapterIndex::build(&store).range_of(number)?;
            print!("{}", QueryEngine::new(&store).range_text(start, end)?);
        },

        Commands::Questions {
            book_id,
            output,
            list,
        } => {
            let store = load()?;
            let chapters = ChapterIndex::build(&store);
            let stem = document_title(&cli.store);
            let book_id = book_id.unwrap_or_else(|| stem.clone());
            let qa = QaExtraction::from_store(&store, &chapters, &book_id);

            let summary = qa.summary;
            println!("Questions:           {}", summary.questions);
            println!("Answers:             {}", summary.answers);
            println!("Matched:             {}", summary.matched);
            println!("Unmatched questions: {}", summary.unmatched_questions);
            println!("Unmatched answers:   {}", summary.unmatched_answers);

            if list {
                for question in &qa.questions {
                    let answer = qa.answers.iter().find(|a| a.qa_id == question.qa_id);
                    match answer {
                        Some(answer) => println!(
                            "{} (page {}): ({})",
                            question.problem_key,
                            question.pages.first().copied().unwrap_or(0),
                            answer.answer_choice
                        ),
                        None => println!(
                            "{} (page {}): no answer",
                            question.problem_key,
                            question.pages.first().copied().unwrap_or(0)
                        ),
                    }
                }
            }

            if let Some(dir) = output {
                let (questions_path, answers_path) = qa.save(&dir, &stem)?;
                println!("Wrote {}", questions_path.display());
                println!("Wrote {}", answers_path.display());
            }
            if let Some(log_path) = &cli.log {
                let log = ConversionLog::open(log_path)?;
                if !log.set_question_count(&cli.store, qa.questions.len())? {
                    log::warn!("No conversion log entry for {}", cli.store.display());
                }
            }
        },

        Commands::History => {
            let Some(log_path) = &cli.log else {
                return Err(Error::InvalidQuery("history needs --log PATH".to_string()));
            };
            let entries = ConversionLog::open(log_path)?.entries()?;
            if entries.is_empty() {
                println!("No documents logged");
            }
            for entry in entries {
                let status = if entry.converted { "converted" } else { "pending" };
                let count = |n: Option<usize>| n.map_or("-".to_string(), |n| n.to_string());
                println!(
                    "{:<30} {:<10} pages {:>6}  words {:>8}  questions {:>5}",
                    entry.document_title,
                    status,
                    count(entry.page_count),
                    count(entry.word_count),
                    count(entry.question_count)
                );
            }
        },

        Commands::Restore { input, spacing } => {
            let text = match input {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                },
            };
            let restoration = spacing.restorer().restore(&text);
            print!("{}", restoration.text);
            eprintln!("Spacing fixes: {}", restoration.issues_found);
            for (kind, n) in restoration.counts.iter().filter(|(_, n)| *n > 0) {
                eprintln!("  {:<20} {}", kind.name(), n);
            }
        },
    }

    Ok(())
}

fn print_counts(counts: &RuleCounts, indent: &str) {
    for (kind, n) in counts.iter().filter(|(_, n)| *n > 0) {
        println!("{}{:<20} {}", indent, kind.name(), n);
    }
}

/// "3, 7-9, 12"
fn format_ranges(ranges: &[(u32, u32)]) -> String {
    ranges
        .iter()
        .map(|&(first, last)| {
            if first == last {
                first.to_string()
            } else {
                format!("{}-{}", first, last)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
