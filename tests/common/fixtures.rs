//! Dataset fixtures

use std::path::{Path, PathBuf};

pub const HEADER: &str = "REPORT_REVIEW_DATE,PRE_APPROVED_DATE,PRODUCT,PRE_APPROVED_USER";

/// CSV text with the standard header and the given rows
pub fn dataset_csv(rows: &[String]) -> String {
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// `count` pending auto finance rows spread over several products
pub fn auto_finance_rows(count: usize) -> Vec<String> {
    const PRODUCTS: [&str; 3] = ["TRACTOR LEASE", "PLEDGE LOAN", "Murabaha"];
    (0..count)
        .map(|i| {
            format!(
                ",2026-01-{:02},{},officer{}",
                i % 28 + 1,
                PRODUCTS[i % PRODUCTS.len()],
                i % 3
            )
        })
        .collect()
}

/// `count` pending three wheeler rows
pub fn three_wheeler_rows(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!(",2026-02-{:02},CASH IN HAND,officer{}", i % 28 + 1, i % 2))
        .collect()
}

/// Rows that match neither category or are already reviewed
pub fn noise_rows() -> Vec<String> {
    vec![
        "2026-01-20,2026-01-02,TRACTOR LEASE,officer0".to_string(),
        ",,CASH IN HAND,officer1".to_string(),
        ",2026-01-03,GOLD LOAN,officer2".to_string(),
    ]
}

/// Write a dataset file into `dir`, creating it if needed
pub fn write_dataset(dir: &Path, name: &str, content: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("failed to create dataset dir");
    let path = dir.join(name);
    std::fs::write(&path, content).expect("failed to write dataset");
    path
}
