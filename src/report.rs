//! Batch results
//!
//! One [`MerchantRow`] per input merchant, written to and read back from the
//! enriched CSV. The API server serves searches over a [`ResultsStore`]
//! loaded from the same file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ReportError;
use crate::types::ResolvedIdentity;

/// One line of the enriched merchants CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantRow {
    pub merchant_name: String,
    pub abn: String,
    pub state: String,
    pub legal_name: String,
    pub score: String,
    /// "Yes" or "No"
    pub verified: String,
    /// "100.00" or "0.00"
    pub confidence: String,
}

impl MerchantRow {
    /// Row for a resolution outcome
    ///
    /// An unmatched merchant keeps its own name in the legal name column.
    pub fn from_resolution(merchant_name: &str, identity: Option<&ResolvedIdentity>) -> Self {
        match identity {
            Some(identity) => Self {
                merchant_name: merchant_name.to_string(),
                abn: identity.identifier.clone(),
                state: identity.jurisdiction.clone(),
                legal_name: identity.legal_name.clone(),
                score: identity.score_text(),
                verified: "Yes".to_string(),
                confidence: format!("{:.2}", 100.0),
            },
            None => Self {
                merchant_name: merchant_name.to_string(),
                abn: String::new(),
                state: String::new(),
                legal_name: merchant_name.to_string(),
                score: String::new(),
                verified: "No".to_string(),
                confidence: format!("{:.2}", 0.0),
            },
        }
    }

    pub fn is_found(&self) -> bool {
        !self.abn.is_empty()
    }
}

/// Write rows as CSV with a header line
pub fn write_csv(path: impl AsRef<Path>, rows: &[MerchantRow]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read rows back from a CSV written by [`write_csv`]
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<MerchantRow>, ReportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<MerchantRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(row = idx + 1, error = %e, "Skipping malformed results row"),
        }
    }
    Ok(rows)
}

/// Found / not-found tally over a batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    /// Percentage of merchants with an ABN, 0 for an empty batch
    pub success_rate: f64,
}

impl Summary {
    pub fn from_rows(rows: &[MerchantRow]) -> Self {
        let total = rows.len();
        let found = rows.iter().filter(|r| r.is_found()).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            found as f64 / total as f64 * 100.0
        };

        Self {
            total,
            found,
            not_found: total - found,
            success_rate,
        }
    }
}

/// Previously written batch results, searchable by merchant name
#[derive(Debug, Default, Clone)]
pub struct ResultsStore {
    rows: Vec<MerchantRow>,
}

impl ResultsStore {
    pub fn new(rows: Vec<MerchantRow>) -> Self {
        Self { rows }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        Ok(Self::new(read_csv(path)?))
    }

    /// Rows whose merchant name contains `query`, ignoring case
    ///
    /// `*` matches every row.
    pub fn search(&self, query: &str) -> Vec<&MerchantRow> {
        if query == "*" {
            return self.rows.iter().collect();
        }
        let needle = query.to_lowercase();
        self.rows
            .iter()
            .filter(|row| row.merchant_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
