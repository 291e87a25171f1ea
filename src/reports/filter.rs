//! Record selection for category reports
//!
//! A record is in scope when its review-completed marker is blank and its
//! pre-approval marker is not. A category then keeps the in-scope records whose
//! product is one of its product names.

use crate::config::ColumnContract;
use crate::extraction::Table;

/// Required columns absent from a dataset
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required columns: {}", .0.join(", "))]
pub struct MissingColumns(pub Vec<String>);

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Indices of the rows that qualify for a category
///
/// Product names match exactly after trimming both sides; the comparison is
/// case-sensitive.
pub fn qualifying_rows(
    table: &Table,
    columns: &ColumnContract,
    products: &[String],
) -> Result<Vec<usize>, MissingColumns> {
    let missing = table.missing_columns(&columns.required());
    if !missing.is_empty() {
        return Err(MissingColumns(
            missing.into_iter().map(String::from).collect(),
        ));
    }

    let (Some(review), Some(pre_approval), Some(product)) = (
        table.column(&columns.review_completed),
        table.column(&columns.pre_approval),
        table.column(&columns.product),
    ) else {
        return Err(MissingColumns(Vec::new()));
    };

    let wanted: Vec<&str> = products.iter().map(|p| p.trim()).collect();

    Ok(table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            is_blank(&row[review])
                && !is_blank(&row[pre_approval])
                && wanted.contains(&row[product].trim())
        })
        .map(|(index, _)| index)
        .collect())
}

/// Human-readable description of the filter, for notifications and reports
pub fn describe_criteria(columns: &ColumnContract, products: &[String]) -> String {
    format!(
        "- Blank {}\n- Non-blank {}\n- Target products: {}",
        columns.review_completed,
        columns.pre_approval,
        products.join(", ")
    )
}
