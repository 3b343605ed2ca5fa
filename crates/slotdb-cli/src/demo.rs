//! The `demo` command: fill a page with random words, then empty it again.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use slotdb_buffer::ByteBuffer;
use slotdb_common::PageConfig;
use slotdb_page::{CompactionStats, SlottedPage};
use tracing::info;

const BUILTIN_WORDS: &[&str] = &[
    "anchor", "basalt", "cobalt", "dune", "ember", "fjord", "granite", "harbor", "iris", "juniper",
    "kelp", "lantern", "meadow", "nectar", "obsidian", "pebble", "quartz", "river", "saffron",
    "tundra", "umber", "velvet", "willow", "xenon", "yarrow", "zephyr", "atoll", "bramble",
    "cinder", "delta", "estuary", "fennel", "glacier", "heron", "inlet", "jasper",
];

/// Arguments for `slotdb demo`.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Seed for the word generator
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Read words from a file, one per line, instead of the built-in list
    #[arg(long, value_name = "FILE")]
    pub words: Option<PathBuf>,
}

/// What a demo run did to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub page_size: usize,
    pub initial_free: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub should_compact: bool,
    pub compaction: CompactionStats,
    pub free_after_compaction: usize,
    pub dropped_slots: usize,
    pub free_after_shrink: usize,
}

impl DemoReport {
    /// True when the page ended up as empty as it started.
    pub fn fully_reclaimed(&self) -> bool {
        self.free_after_shrink == self.initial_free
    }
}

/// Loads the word list to draw records from.
fn load_words(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(BUILTIN_WORDS.iter().map(|word| (*word).to_string()).collect());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading word list {}", path.display()))?;
    let words: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if words.is_empty() {
        bail!("word list {} has no words", path.display());
    }
    Ok(words)
}

/// Runs the demo and prints each step.
pub fn run(config: &PageConfig, args: &DemoArgs) -> Result<DemoReport> {
    let words = load_words(args.words.as_deref())?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut buffer = ByteBuffer::new(config.page_size);
    let mut page = SlottedPage::init(&mut buffer)?;
    let initial_free = page.free_space();
    println!(
        "Created a page of {} bytes with {} bytes free",
        config.page_size, initial_free
    );

    let greeting = page.insert(b"hello, world!")?;
    println!(
        "Slot {greeting} holds: {}",
        String::from_utf8_lossy(page.read(greeting)?)
    );

    let mut inserted = 1;
    loop {
        let Some(word) = words.choose(&mut rng) else {
            break;
        };
        if !page.can_fit(word.len()) {
            break;
        }
        let slot_id = page.insert(word.as_bytes())?;
        println!("Inserted {word:?} into slot {slot_id}");
        inserted += 1;
    }
    println!(
        "Fit {inserted} records into the page, {} bytes left",
        page.free_space()
    );

    let mut deleted = 0;
    for slot_id in (0..page.slot_count()).rev() {
        let record = String::from_utf8_lossy(page.read(slot_id)?).into_owned();
        page.delete(slot_id)?;
        println!("Deleted slot {slot_id} ({record:?})");
        deleted += 1;
    }
    let should_compact = page.should_compact(config.compaction_threshold);
    println!(
        "{} bytes are reclaimable by compaction (threshold {}: {})",
        page.reclaimable_space(),
        config.compaction_threshold,
        if should_compact { "compaction due" } else { "not due" }
    );

    let compaction = page.compact()?;
    let free_after_compaction = page.free_space();
    println!(
        "Compaction reclaimed {} bytes; {free_after_compaction} bytes free, {} tombstoned slots retained",
        compaction.reclaimed_bytes,
        page.tombstone_count()
    );

    let dropped_slots = page.shrink_directory();
    let free_after_shrink = page.free_space();
    println!("Dropped {dropped_slots} tombstoned slots; {free_after_shrink} bytes free");

    let report = DemoReport {
        page_size: config.page_size,
        initial_free,
        inserted,
        deleted,
        should_compact,
        compaction,
        free_after_compaction,
        dropped_slots,
        free_after_shrink,
    };
    if report.fully_reclaimed() {
        println!("The page is empty again");
    }
    info!(?report, "demo finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn demo_args() -> DemoArgs {
        DemoArgs {
            seed: 7,
            words: None,
        }
    }

    #[test]
    fn test_demo_reclaims_everything() {
        let config = PageConfig::default().with_page_size(1024);
        let report = run(&config, &demo_args()).unwrap();

        assert!(report.inserted > 1);
        assert_eq!(report.deleted, report.inserted);
        assert_eq!(report.compaction.live_records, 0);
        assert_eq!(
            report.free_after_compaction,
            report.initial_free - report.inserted * 9
        );
        assert_eq!(report.dropped_slots, report.inserted);
        assert!(report.fully_reclaimed());
    }

    #[test]
    fn test_demo_reports_threshold() {
        // Every heap byte is reclaimable once all records are deleted.
        let low = PageConfig::default()
            .with_page_size(256)
            .with_compaction_threshold(0.01);
        assert!(run(&low, &demo_args()).unwrap().should_compact);

        let full = low.with_compaction_threshold(1.0);
        assert!(!run(&full, &demo_args()).unwrap().should_compact);
    }

    #[test]
    fn test_demo_is_deterministic() {
        let config = PageConfig::default().with_page_size(512);
        let first = run(&config, &demo_args()).unwrap();
        let second = run(&config, &demo_args()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_words_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\n\n  beta  \ngamma").unwrap();

        let words = load_words(Some(file.path())).unwrap();
        assert_eq!(words, vec!["alpha", "beta", "gamma"]);

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(load_words(Some(empty.path())).is_err());
    }
}
