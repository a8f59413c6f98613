//! The seam between the workflow and whatever serves ad performance rows.

use crate::domain::{Dataset, TableRef};
use crate::error::FetchError;

/// A remote source of ad performance rows.
///
/// One method, one attempt: implementations must not retry internally.
/// Tests substitute fakes that succeed, return nothing, or fail.
pub trait AdsDataSource {
    fn fetch(&self, table: &TableRef) -> Result<Dataset, FetchError>;
}

impl<S: AdsDataSource + ?Sized> AdsDataSource for &S {
    fn fetch(&self, table: &TableRef) -> Result<Dataset, FetchError> {
        (**self).fetch(table)
    }
}

/// Reject table references that cannot name a real table.
///
/// Project ids may contain `-`, `.` and `:` (domain-scoped projects); dataset
/// ids only letters, digits and `_`; table ids additionally `-`.
pub fn validate_table_ref(table: &TableRef) -> Result<(), FetchError> {
    check_identifier("project id", &table.project_id, &['-', '.', ':'])?;
    check_identifier("dataset id", &table.dataset_id, &[])?;
    check_identifier("table id", &table.table_id, &['-'])?;
    Ok(())
}

/// Column names must be plain SQL identifiers.
pub fn validate_column(name: &str) -> Result<(), FetchError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) => (c.is_ascii_alphabetic() || c == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FetchError::InvalidIdentifier(format!("column name `{name}`")))
    }
}

fn check_identifier(what: &str, value: &str, extra: &[char]) -> Result<(), FetchError> {
    if value.is_empty() {
        return Err(FetchError::InvalidIdentifier(format!("{what} is empty")));
    }
    let ok = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || extra.contains(&c));
    if ok {
        Ok(())
    } else {
        Err(FetchError::InvalidIdentifier(format!("{what} `{value}`")))
    }
}
