//! Parser for the Public Suffix List.
//!
//! Rules are one per line, delimited into sections by marker comments:
//!
//! ```text
//! // ===BEGIN ICANN DOMAINS===
//! co.uk
//! *.ck
//! !www.ck
//! // ===END ICANN DOMAINS===
//! // ===BEGIN PRIVATE DOMAINS===
//! blogspot.com
//! // ===END PRIVATE DOMAINS===
//! ```

use std::collections::HashSet;

use log::{debug, info};

use crate::error::{Result, SuffixError};
use crate::name::is_punycode;
use crate::source::SourceKind;
use crate::types::{Parsed, RuleKind, Section, SuffixRule};

const BEGIN_ICANN: &str = "===BEGIN ICANN DOMAINS===";
const END_ICANN: &str = "===END ICANN DOMAINS===";
const BEGIN_PRIVATE: &str = "===BEGIN PRIVATE DOMAINS===";
const END_PRIVATE: &str = "===END PRIVATE DOMAINS===";

/// Parse the Public Suffix List into suffix rules.
///
/// Malformed and duplicate rules are skipped and counted; rules outside a
/// section are ignored. Fails only when no section marker is present.
pub fn parse_psl(text: &str) -> Result<Parsed<SuffixRule>> {
    let mut rules = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0;
    let mut outside = 0;
    let mut markers_found = false;
    let mut section: Option<Section> = None;
    // Punycode named by the comment line right above a rule
    let mut pending_hint: Option<String> = None;

    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();

        if let Some(comment) = line.strip_prefix("//") {
            let comment = comment.trim();
            match comment {
                BEGIN_ICANN => section = Some(Section::Icann),
                BEGIN_PRIVATE => section = Some(Section::Private),
                END_ICANN | END_PRIVATE => section = None,
                _ => {
                    pending_hint = comment
                        .split_whitespace()
                        .next()
                        .filter(|token| is_punycode(token))
                        .map(str::to_lowercase);
                    continue;
                }
            }
            markers_found = true;
            pending_hint = None;
            continue;
        }

        if line.is_empty() {
            pending_hint = None;
            continue;
        }

        let hint = pending_hint.take();

        let Some(section) = section else {
            outside += 1;
            continue;
        };

        // A rule ends at the first whitespace
        let token = line.split_whitespace().next().unwrap_or(line);

        let (labels, kind) = match parse_rule(token) {
            Ok(rule) => rule,
            Err(reason) => {
                debug!("skipping PSL line {}: {}", line_num, reason);
                skipped += 1;
                continue;
            }
        };

        if !seen.insert((labels.clone(), kind, section)) {
            debug!("skipping PSL line {}: duplicate rule {}", line_num, token);
            skipped += 1;
            continue;
        }

        let mut rule = SuffixRule::new(labels, kind, section);
        if rule.labels.len() == 1 {
            rule.punycode_hint = hint;
        }
        rules.push(rule);
    }

    if !markers_found {
        return Err(SuffixError::source_format(
            SourceKind::Psl,
            "no section markers found",
        ));
    }

    let private = rules
        .iter()
        .filter(|r| r.section == Section::Private)
        .count();
    info!(
        "parsed {} PSL rules ({} ICANN, {} PRIVATE, {} skipped, {} outside sections)",
        rules.len(),
        rules.len() - private,
        private,
        skipped,
        outside
    );

    Ok(Parsed::new(rules, skipped))
}

/// Classify a single rule token and split it into lowercased labels
fn parse_rule(token: &str) -> std::result::Result<(Vec<String>, RuleKind), String> {
    let (body, kind) = if let Some(rest) = token.strip_prefix("*.") {
        (rest, RuleKind::Wildcard)
    } else if let Some(rest) = token.strip_prefix('!') {
        (rest, RuleKind::Exception)
    } else {
        (token, RuleKind::Plain)
    };

    let labels: Vec<String> = body.split('.').map(str::to_lowercase).collect();

    if labels.iter().any(|l| l.is_empty()) {
        return Err(format!("empty label in rule: {}", token));
    }
    if labels.iter().any(|l| l.contains('*') || l.contains('!')) {
        return Err(format!("misplaced wildcard or exception marker: {}", token));
    }
    if kind == RuleKind::Exception && labels.len() < 2 {
        return Err(format!("exception rule needs at least two labels: {}", token));
    }

    Ok((labels, kind))
}
