use clap::{Parser, Subcommand};
use recall_core::*;
use std::path::PathBuf;

mod revlog;
mod store;

use store::Collection;

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Spaced-repetition flashcard scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new card to the collection
    Add {
        /// Question side
        front: String,
        /// Answer side
        back: String,
    },

    /// List all cards
    List,

    /// Grade a card (again, hard, good, easy or 1-4)
    Answer {
        /// Card id or unique id prefix
        card: String,
        /// Grade
        grade: String,
    },

    /// Show the interval each grade would give
    Preview {
        /// Card id or unique id prefix
        card: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    recall_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Add { front, back } => cmd_add(data_dir, front, back, &config),
        Commands::List => cmd_list(data_dir),
        Commands::Answer { card, grade } => cmd_answer(data_dir, &card, &grade, &config),
        Commands::Preview { card } => cmd_preview(data_dir, &card, &config),
    }
}

fn collection_path(data_dir: &PathBuf) -> PathBuf {
    data_dir.join("cards.json")
}

fn revlog_path(data_dir: &PathBuf) -> PathBuf {
    data_dir.join("reviews.csv")
}

fn cmd_add(data_dir: PathBuf, front: String, back: String, config: &Config) -> Result<()> {
    let path = collection_path(&data_dir);
    let mut collection = Collection::load(&path)?;

    let id = collection.add_card(front, back);

    // Let the deck's strategy seed any per-card state it keeps
    let mut ctx = ReviewContext::new(collection.created_at);
    let card = &mut collection
        .cards
        .last_mut()
        .expect("card was just added")
        .state;
    let seeded = initialize_new(card, &config.deck, &mut ctx);
    seeded.apply_to(card);

    collection.save(&path)?;

    println!("Added card {}", id);
    Ok(())
}

fn cmd_list(data_dir: PathBuf) -> Result<()> {
    let collection = Collection::load(&collection_path(&data_dir))?;

    if collection.cards.is_empty() {
        println!("No cards yet. Add one with `recall add <front> <back>`.");
        return Ok(());
    }

    println!(
        "{:<10} {:<12} {:>6}  {}",
        "id", "state", "ivl", "front"
    );
    for stored in &collection.cards {
        let card = &stored.state;
        let short_id = &card.id.to_string()[..8];
        println!(
            "{:<10} {:<12} {:>5}d  {}",
            short_id,
            format!("{:?}", card.lifecycle).to_lowercase(),
            card.interval,
            stored.front
        );
    }
    println!("\n{} cards", collection.cards.len());
    Ok(())
}

fn cmd_answer(data_dir: PathBuf, card_ref: &str, grade_str: &str, config: &Config) -> Result<()> {
    let grade = parse_grade(grade_str)?;
    let path = collection_path(&data_dir);
    let mut collection = Collection::load(&path)?;
    let created_at = collection.created_at;

    let stored = collection
        .find_mut(card_ref)
        .ok_or_else(|| Error::Store(format!("No card matching {:?}", card_ref)))?;

    // Exactly one answer is scheduled and applied at a time; the store's
    // exclusive write lock keeps concurrent invocations serialized.
    let mut ctx = ReviewContext::new(created_at);
    let update = schedule_answer(&stored.state, grade, &config.deck, &mut ctx);
    update.apply_to(&mut stored.state);

    let card_after = stored.state.clone();
    let card_id = card_after.id;
    collection.save(&path)?;

    revlog::append(&revlog_path(&data_dir), card_id, grade, &card_after)?;

    println!("✓ Answered {}", grade.as_str());
    println!("  {}", describe_due(&card_after, &ctx));
    Ok(())
}

fn cmd_preview(data_dir: PathBuf, card_ref: &str, config: &Config) -> Result<()> {
    let collection = Collection::load(&collection_path(&data_dir))?;

    let stored = collection
        .find(card_ref)
        .ok_or_else(|| Error::Store(format!("No card matching {:?}", card_ref)))?;

    let ctx = ReviewContext::new(collection.created_at);
    let intervals = preview_intervals(&stored.state, &config.deck, &ctx);

    println!("{}", stored.front);
    for (grade, interval) in Grade::ALL.iter().zip(intervals) {
        let shown = if interval == 0 {
            "<1d".to_string()
        } else {
            format_interval(interval)
        };
        println!("  {:<6} {}", grade.as_str(), shown);
    }
    Ok(())
}

fn parse_grade(s: &str) -> Result<Grade> {
    if let Ok(n) = s.parse::<u8>() {
        return Grade::try_from(n);
    }
    match s.to_lowercase().as_str() {
        "again" => Ok(Grade::Again),
        "hard" => Ok(Grade::Hard),
        "good" => Ok(Grade::Good),
        "easy" => Ok(Grade::Easy),
        other => Err(Error::Other(format!(
            "Unknown grade {:?} (expected again/hard/good/easy or 1-4)",
            other
        ))),
    }
}

/// Human description of when the card comes back
fn describe_due(card: &Card, ctx: &ReviewContext) -> String {
    match card.lifecycle {
        Lifecycle::Review => format!("next review in {}", format_interval(card.interval)),
        Lifecycle::Learning | Lifecycle::Relearning => {
            let mins = ((card.due - ctx.now_secs()) / 60).max(1);
            format!("next step in {}min", mins)
        }
        Lifecycle::New => "not yet studied".to_string(),
    }
}

/// Format an interval in days to a human-readable string
fn format_interval(days: i64) -> String {
    if days < 1 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
