//! Tests for the exact and fuzzy single-file splitters.

use ironload::testing::{DataDir, sequential_rows, write_csv, write_jsonl, write_sql_dump};
use ironload::{SourceFormat, TableRegion, split_exact_regions, split_fuzzy_regions};
use std::fs;
use std::path::Path;

fn assert_tiling(regions: &[TableRegion], file_len: u64) {
    assert_eq!(regions[0].offset, 0);
    for pair in regions.windows(2) {
        assert_eq!(pair[0].end_offset(), pair[1].offset, "regions must be contiguous");
    }
    assert_eq!(regions.last().unwrap().end_offset(), file_len);
    assert!(regions.iter().all(|r| r.size > 0));
}

fn assert_boundaries_end_records(regions: &[TableRegion], content: &[u8], terminator: &[u8]) {
    for region in &regions[..regions.len() - 1] {
        let end = region.end_offset() as usize;
        assert!(
            content[..end].ends_with(terminator),
            "boundary at {end} does not end a record"
        );
    }
}

#[test]
fn exact_split_tiles_file_and_counts_rows() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.sql");
    write_sql_dump(&path, "t", &sequential_rows(40, 2), 4).unwrap();
    let content = fs::read(&path).unwrap();

    let regions =
        split_exact_regions("db", "t", &path, SourceFormat::SqlDump, 200).unwrap();
    assert!(regions.len() > 1, "expected multiple regions, got {}", regions.len());
    assert_tiling(&regions, content.len() as u64);
    assert_boundaries_end_records(&regions, &content, b";\n");

    // all but the final region reached the threshold
    for region in &regions[..regions.len() - 1] {
        assert!(region.size >= 200);
    }
    // row counts are exact and candidates are unnumbered
    assert_eq!(regions.iter().map(|r| r.rows.unwrap()).sum::<u64>(), 40);
    assert!(regions.iter().all(|r| r.id.is_none() && r.begin_row_id.is_none()));
}

#[test]
fn exact_split_small_file_yields_one_region() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.sql");
    write_sql_dump(&path, "t", &sequential_rows(10, 2), 5).unwrap();
    let len = fs::metadata(&path).unwrap().len();

    let regions =
        split_exact_regions("db", "t", &path, SourceFormat::SqlDump, 1 << 20).unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].offset, 0);
    assert_eq!(regions[0].size, len);
    assert_eq!(regions[0].rows, Some(10));
}

#[test]
fn exact_split_emits_no_empty_trailing_region() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.sql");
    let content = "INSERT INTO t VALUES (1);\n";
    fs::write(&path, content).unwrap();

    // threshold equals the file length exactly: the lone region closes at
    // the threshold and nothing is left over
    let regions = split_exact_regions(
        "db",
        "t",
        &path,
        SourceFormat::SqlDump,
        content.len() as u64,
    )
    .unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].size, content.len() as u64);
}

#[test]
fn exact_split_empty_file_yields_nothing() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.sql");
    fs::write(&path, "").unwrap();

    let regions =
        split_exact_regions("db", "t", &path, SourceFormat::SqlDump, 1024).unwrap();
    assert!(regions.is_empty());
}

#[test]
fn exact_split_comment_only_file_yields_nothing() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.sql");
    fs::write(&path, "-- schema dumped elsewhere\n/* no rows */\n").unwrap();

    let regions =
        split_exact_regions("db", "t", &path, SourceFormat::SqlDump, 1024).unwrap();
    assert!(regions.is_empty());
}

#[test]
fn exact_split_csv_covers_header_but_counts_only_data_rows() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.csv");
    write_csv(&path, Some(&["id", "qty"]), &sequential_rows(25, 2)).unwrap();
    let len = fs::metadata(&path).unwrap().len();

    let regions = split_exact_regions(
        "db",
        "t",
        &path,
        SourceFormat::Csv { has_header: true },
        64,
    )
    .unwrap();
    assert_tiling(&regions, len);
    assert_eq!(regions.iter().map(|r| r.rows.unwrap()).sum::<u64>(), 25);
}

#[test]
fn exact_split_keeps_giant_statements_whole() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.sql");
    // one statement dwarfs both the read block and the region threshold
    let mut content = String::from("INSERT INTO t VALUES (1);\n");
    let giant_start = content.len();
    content.push_str(&format!("INSERT INTO t VALUES ('{}');\n", "x".repeat(200 << 10)));
    let giant_end = content.len();
    content.push_str("INSERT INTO t VALUES (2);\n");
    content.push_str("INSERT INTO t VALUES (3);\n");
    fs::write(&path, &content).unwrap();

    let regions =
        split_exact_regions("db", "t", &path, SourceFormat::SqlDump, 1024).unwrap();
    assert!(regions.len() > 1, "expected multiple regions, got {}", regions.len());
    assert_tiling(&regions, content.len() as u64);
    assert_boundaries_end_records(&regions, content.as_bytes(), b";\n");
    for region in &regions[..regions.len() - 1] {
        let cut = region.end_offset() as usize;
        assert!(
            cut <= giant_start || cut >= giant_end,
            "cut at {cut} lands inside the giant statement"
        );
    }
    assert_eq!(regions.iter().map(|r| r.rows.unwrap()).sum::<u64>(), 4);
}

#[test]
fn exact_split_missing_file_is_an_error() {
    let regions = split_exact_regions(
        "db",
        "t",
        Path::new("/nonexistent/db.t.sql"),
        SourceFormat::SqlDump,
        1024,
    );
    assert!(regions.is_err());
}

#[test]
fn fuzzy_split_tiles_file_without_row_counts() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.jsonl");
    // large enough that several probe windows fit between region starts
    write_jsonl(&path, &sequential_rows(3000, 3)).unwrap();
    let content = fs::read(&path).unwrap();

    let regions =
        split_fuzzy_regions("db", "t", &path, SourceFormat::Jsonl, 8 << 10).unwrap();
    assert!(regions.len() > 1, "expected multiple regions, got {}", regions.len());
    assert_tiling(&regions, content.len() as u64);
    assert_boundaries_end_records(&regions, &content, b"\n");

    for region in &regions[..regions.len() - 1] {
        assert!(region.size >= 8 << 10);
    }
    assert!(regions.iter().all(|r| r.rows.is_none() && r.begin_row_id.is_none()));
}

#[test]
fn fuzzy_split_sql_cuts_after_terminators() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.sql");
    write_sql_dump(&path, "t", &sequential_rows(1500, 2), 3).unwrap();
    let content = fs::read(&path).unwrap();

    let regions =
        split_fuzzy_regions("db", "t", &path, SourceFormat::SqlDump, 8 << 10).unwrap();
    assert!(regions.len() > 1);
    assert_tiling(&regions, content.len() as u64);
    assert_boundaries_end_records(&regions, &content, b";\n");
}

#[test]
fn fuzzy_split_keeps_giant_lines_whole() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.jsonl");
    // one line dwarfs both the threshold and a single resync read
    let giant = format!("[\"{}\"]\n", "x".repeat(16 << 10));
    let mut content = giant.clone();
    for v in 1..=2000 {
        content.push_str(&format!("[{v}]\n"));
    }
    fs::write(&path, &content).unwrap();

    let regions =
        split_fuzzy_regions("db", "t", &path, SourceFormat::Jsonl, 512).unwrap();
    assert!(regions.len() > 1, "expected multiple regions, got {}", regions.len());
    assert_tiling(&regions, content.len() as u64);
    assert_boundaries_end_records(&regions, content.as_bytes(), b"\n");
    assert!(
        regions[0].size as usize >= giant.len(),
        "first cut lands inside the giant line"
    );
    assert!(regions.iter().all(|r| r.rows.is_none()));
}

#[test]
fn fuzzy_split_small_file_yields_one_region() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.jsonl");
    write_jsonl(&path, &sequential_rows(3, 1)).unwrap();
    let len = fs::metadata(&path).unwrap().len();

    let regions =
        split_fuzzy_regions("db", "t", &path, SourceFormat::Jsonl, 1 << 20).unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].offset, 0);
    assert_eq!(regions[0].size, len);
    assert_eq!(regions[0].rows, None);
}

#[test]
fn fuzzy_split_empty_file_yields_nothing() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.jsonl");
    fs::write(&path, "").unwrap();

    let regions =
        split_fuzzy_regions("db", "t", &path, SourceFormat::Jsonl, 256).unwrap();
    assert!(regions.is_empty());
}

#[test]
fn split_strategies_cover_the_same_bytes() {
    let dir = DataDir::new().unwrap();
    let path = dir.file_path("db.t.sql");
    write_sql_dump(&path, "t", &sequential_rows(80, 2), 4).unwrap();
    let len = fs::metadata(&path).unwrap().len();

    let exact =
        split_exact_regions("db", "t", &path, SourceFormat::SqlDump, 250).unwrap();
    let fuzzy =
        split_fuzzy_regions("db", "t", &path, SourceFormat::SqlDump, 250).unwrap();
    assert_eq!(exact.iter().map(|r| r.size).sum::<u64>(), len);
    assert_eq!(fuzzy.iter().map(|r| r.size).sum::<u64>(), len);
}
