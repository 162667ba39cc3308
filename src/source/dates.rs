//! TLD creation dates.
//!
//! The root zone database listing carries no dates; they live on the
//! individual delegation pages. Scraping every page on each rebuild is slow,
//! so dates are usually shipped as a `tld,YYYY-MM-DD` resource file that is
//! refreshed from the delegation pages now and then.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::types::Parsed;

const DATE_FORMAT: &str = "%Y-%m-%d";

static REGISTRATION_DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Registration\s+date\s*:?\s*(?:<[^>]*>\s*)*(\d{4}-\d{2}-\d{2})")
        .expect("REGISTRATION_DATE_PATTERN: hardcoded regex is invalid")
});

/// Parse a `tld,YYYY-MM-DD` creation date resource.
///
/// Blank lines and `#` comments are ignored, malformed lines are skipped and
/// counted. Later lines override earlier ones for the same TLD.
pub fn parse_creation_dates(text: &str) -> Result<Parsed<(String, NaiveDate)>> {
    let mut dates = Vec::new();
    let mut skipped = 0;

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = line.split_once(',').and_then(|(tld, date)| {
            let tld = tld.trim().trim_start_matches('.').to_lowercase();
            let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()?;
            (!tld.is_empty()).then_some((tld, date))
        });

        match parsed {
            Some(entry) => dates.push(entry),
            None => {
                debug!("skipping creation date line {}: {}", line_num + 1, line);
                skipped += 1;
            }
        }
    }

    info!(
        "parsed {} TLD creation dates ({} skipped)",
        dates.len(),
        skipped
    );
    Ok(Parsed::new(dates, skipped))
}

/// Collect parsed creation dates into a lookup map
pub fn creation_date_map(dates: Parsed<(String, NaiveDate)>) -> HashMap<String, NaiveDate> {
    dates.items.into_iter().collect()
}

/// Extract the registration date from an individual IANA delegation page
/// (`https://www.iana.org/domains/root/db/<tld>.html`).
pub fn parse_registration_date(page: &str) -> Option<NaiveDate> {
    let caps = REGISTRATION_DATE_PATTERN.captures(page)?;
    NaiveDate::parse_from_str(&caps[1], DATE_FORMAT).ok()
}
