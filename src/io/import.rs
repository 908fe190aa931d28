use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::io::Read;

use crate::application::TreasuryService;
use crate::domain::{parse_cents, TransactionKind};

/// Result of an import operation. Every skipped row has at least one
/// corresponding entry in `errors`; imported + skipped covers all data rows.
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
}

/// Importer for loading transactions into the treasury.
///
/// Expected CSV columns: date, type, amount, description, category, payee.
/// Unlike the lenient balance-sheet computation, import is a validated write
/// path: rows with a missing date, unrecognized type, or unparsable amount
/// are reported and skipped rather than stored half-formed.
pub struct Importer<'a> {
    service: &'a TreasuryService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a TreasuryService) -> Self {
        Self { service }
    }

    /// Import transactions from CSV.
    pub async fn import_transactions_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    skipped += 1;
                    continue;
                }
            };

            let date_str = record.get(0).unwrap_or("");
            let kind_str = record.get(1).unwrap_or("");
            let amount_str = record.get(2).unwrap_or("");
            let description = non_empty(record.get(3));
            let category = non_empty(record.get(4));
            let payee = non_empty(record.get(5));

            let kind = match TransactionKind::from_str(kind_str) {
                Some(k) => k,
                None => {
                    errors.push(ImportError {
                        line,
                        field: Some("type".to_string()),
                        error: format!("Unrecognized transaction type: '{}'", kind_str),
                    });
                    skipped += 1;
                    continue;
                }
            };

            let amount_cents = match parse_cents(amount_str) {
                Ok(a) if a > 0 => a,
                Ok(_) => {
                    errors.push(ImportError {
                        line,
                        field: Some("amount".to_string()),
                        error: "Amount must be positive".to_string(),
                    });
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("amount".to_string()),
                        error: format!("Invalid amount: {}", e),
                    });
                    skipped += 1;
                    continue;
                }
            };

            let date = match parse_timestamp(date_str) {
                Ok(d) => d,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("date".to_string()),
                        error: format!("Invalid date: {}", e),
                    });
                    skipped += 1;
                    continue;
                }
            };

            if options.dry_run {
                imported += 1;
                continue;
            }

            match self
                .service
                .record_transaction(kind, amount_cents, date, description, category, payee)
                .await
            {
                Ok(_) => imported += 1,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("Failed to record transaction: {}", e),
                    });
                    skipped += 1;
                }
            }
        }

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field.and_then(|s| {
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    })
}

// Accepts RFC 3339 timestamps or plain YYYY-MM-DD dates
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    anyhow::bail!("Invalid timestamp format: {}", s)
}
