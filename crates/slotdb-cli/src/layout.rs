//! The `layout` command: apply operations to a fresh page and print its
//! header and slot directory.

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use slotdb_buffer::ByteBuffer;
use slotdb_common::{PageConfig, SlotId};
use slotdb_page::{SlotError, SlottedPage, SlottedPageRef};
use tracing::debug;

const PREVIEW_CHARS: usize = 24;

/// Arguments for `slotdb layout`.
#[derive(Args, Debug, Default)]
pub struct LayoutArgs {
    /// Insert a record (repeatable)
    #[arg(long = "insert", value_name = "TEXT")]
    pub inserts: Vec<String>,

    /// Replace a record after the inserts (repeatable)
    #[arg(long = "update", value_name = "ID=TEXT", value_parser = parse_update)]
    pub updates: Vec<(SlotId, String)>,

    /// Delete a slot after the updates (repeatable)
    #[arg(long = "delete", value_name = "ID")]
    pub deletes: Vec<SlotId>,

    /// Compact the page after the deletes
    #[arg(long)]
    pub compact: bool,

    /// Drop trailing tombstoned slots at the end
    #[arg(long)]
    pub shrink: bool,
}

fn parse_update(value: &str) -> std::result::Result<(SlotId, String), String> {
    let (id, text) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=TEXT, got {value:?}"))?;
    let id = id
        .trim()
        .parse::<SlotId>()
        .map_err(|err| format!("invalid slot id {id:?}: {err}"))?;
    Ok((id, text.to_string()))
}

/// Applies the requested operations to a fresh page and returns the page
/// bytes.
///
/// Operations that fail on the page (a full page, a deleted slot) are
/// reported and skipped so the rest of the layout can still be shown.
pub fn build(config: &PageConfig, args: &LayoutArgs) -> Result<ByteBuffer> {
    let mut buffer = ByteBuffer::new(config.page_size);
    let mut page = SlottedPage::init(&mut buffer)?;

    for text in &args.inserts {
        match page.insert(text.as_bytes()) {
            Ok(slot_id) => debug!(slot_id, "insert"),
            Err(err) => report_skipped("insert", &err),
        }
    }
    for (slot_id, text) in &args.updates {
        if let Err(err) = page.update(*slot_id, text.as_bytes()) {
            report_skipped("update", &err);
        }
    }
    for slot_id in &args.deletes {
        if let Err(err) = page.delete(*slot_id) {
            report_skipped("delete", &err);
        }
    }
    if args.compact {
        let stats = page.compact()?;
        debug!(?stats, "compact");
    }
    if args.shrink {
        let dropped = page.shrink_directory();
        debug!(dropped, "shrink");
    }

    Ok(buffer)
}

fn report_skipped(operation: &str, err: &SlotError) {
    eprintln!("Skipped {operation}: {err}");
}

/// Renders the header and slot directory of a page as two tables.
///
/// `should_compact` is judged against `config.compaction_threshold`.
pub fn render(page: &SlottedPageRef<'_, ByteBuffer>, config: &PageConfig) -> String {
    let header = page.header();

    let mut summary = new_table();
    summary.set_header(vec!["Field", "Value"]);
    summary.add_row(vec![Cell::new("capacity"), number(page.capacity())]);
    summary.add_row(vec![Cell::new("slot_count"), number(header.slot_count)]);
    summary.add_row(vec![
        Cell::new("free_space_start"),
        number(header.free_space_start),
    ]);
    summary.add_row(vec![
        Cell::new("free_space_end"),
        number(header.free_space_end),
    ]);
    summary.add_row(vec![Cell::new("free_space"), number(page.free_space())]);
    summary.add_row(vec![
        Cell::new("reclaimable_space"),
        number(page.reclaimable_space()),
    ]);
    summary.add_row(vec![
        Cell::new("fill_ratio"),
        Cell::new(format!("{:.3}", page.fill_ratio())).set_alignment(CellAlignment::Right),
    ]);
    summary.add_row(vec![
        Cell::new("should_compact"),
        Cell::new(page.should_compact(config.compaction_threshold)),
    ]);

    let mut directory = new_table();
    directory.set_header(vec!["Slot", "Offset", "Length", "State", "Data"]);
    for slot_id in 0..header.slot_count {
        let Ok(slot) = page.slot(slot_id) else {
            continue;
        };
        let (state, data) = match page.read(slot_id) {
            Ok(data) => ("live", preview(data)),
            Err(SlotError::DeletedRecord { .. }) => ("tombstoned", String::new()),
            Err(err) => ("corrupt", err.to_string()),
        };
        directory.add_row(vec![
            number(slot_id),
            number(slot.record_offset),
            number(slot.record_length),
            Cell::new(state),
            Cell::new(data),
        ]);
    }

    format!("{summary}\n{directory}")
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn number(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

fn preview(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    if text.chars().count() > PREVIEW_CHARS {
        let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.into_owned()
    }
}

/// Builds the page and prints its layout.
///
/// The finished page is reopened under `config`, so `verify_on_open` checks
/// it before anything is printed.
pub fn run(config: &PageConfig, args: &LayoutArgs) -> Result<()> {
    let mut buffer = build(config, args)?;
    let page = SlottedPage::open_with_config(&mut buffer, config)?;
    println!("{}", render(&page.view(), config));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> PageConfig {
        PageConfig::default().with_page_size(128)
    }

    #[test]
    fn test_parse_update() {
        assert_eq!(parse_update("3=hello"), Ok((3, "hello".to_string())));
        assert_eq!(parse_update("0=a=b"), Ok((0, "a=b".to_string())));
        assert!(parse_update("hello").is_err());
        assert!(parse_update("x=hello").is_err());
    }

    #[test]
    fn test_build_reference_layout() {
        let args = LayoutArgs {
            inserts: vec!["AB".into(), "CDE".into()],
            deletes: vec![0],
            compact: true,
            ..LayoutArgs::default()
        };
        let buffer = build(&small_config(), &args).unwrap();
        let page = SlottedPageRef::open(&buffer).unwrap();

        assert_eq!(page.slot_count(), 2);
        assert_eq!(page.read(1).unwrap(), b"CDE");
        assert_eq!(page.header().free_space_end, 125);

        let rendered = render(&page, &small_config());
        assert!(rendered.contains("tombstoned"));
        assert!(rendered.contains("CDE"));
        assert!(rendered.contains("free_space_end"));
    }

    #[test]
    fn test_build_skips_failed_operations() {
        let args = LayoutArgs {
            inserts: vec!["one".into(), "x".repeat(200)],
            updates: vec![(5, "nope".into()), (0, "uno".into())],
            deletes: vec![9],
            shrink: true,
            ..LayoutArgs::default()
        };
        let buffer = build(&small_config(), &args).unwrap();
        let page = SlottedPageRef::open(&buffer).unwrap();

        assert_eq!(page.slot_count(), 1);
        assert_eq!(page.read(0).unwrap(), b"uno");
    }

    #[test]
    fn test_render_follows_compaction_threshold() {
        let args = LayoutArgs {
            inserts: vec!["AB".into(), "CDE".into()],
            deletes: vec![0],
            ..LayoutArgs::default()
        };
        let buffer = build(&small_config(), &args).unwrap();
        let page = SlottedPageRef::open(&buffer).unwrap();
        assert_eq!(page.reclaimable_space(), 2);

        // 2 of 5 heap bytes are reclaimable.
        let lenient = small_config().with_compaction_threshold(0.5);
        let strict = small_config().with_compaction_threshold(0.25);
        let row = |config: &PageConfig| {
            render(&page, config)
                .lines()
                .find(|line| line.contains("should_compact"))
                .map(str::to_string)
                .unwrap()
        };
        assert!(row(&lenient).contains("false"));
        assert!(row(&strict).contains("true"));
    }

    #[test]
    fn test_run_verifies_on_open() {
        let args = LayoutArgs {
            inserts: vec!["AB".into()],
            shrink: true,
            ..LayoutArgs::default()
        };
        let config = small_config().with_verify_on_open(true);
        run(&config, &args).unwrap();
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview(b"short"), "short");
        let long = preview(&[b'a'; 40]);
        assert!(long.ends_with("..."));
        assert_eq!(long.len(), PREVIEW_CHARS + 3);
    }
}
