use std::net::IpAddr;

use crate::error::Result;
use crate::name::split_labels;
use crate::types::{MatchResult, ParsedHost, RuleKind, Section, SuffixEntry};

use super::SuffixTable;

/// Where the public suffix starts in the input labels, and what produced it
enum Hit<'a> {
    Entry { start: usize, entry: &'a SuffixEntry },
    /// Bare root label backed only by an IANA record
    Tld { start: usize },
}

impl SuffixTable {
    /// Find the public suffix of a domain name.
    ///
    /// Returns `Ok(None)` when the name is well-formed but has no known
    /// suffix, and [`SuffixError::InvalidInput`](crate::SuffixError::InvalidInput)
    /// for empty names or empty labels.
    pub fn lookup(&self, fqdn: &str) -> Result<Option<MatchResult>> {
        let mut labels = split_labels(fqdn)?;

        let last = labels.len() - 1;
        let root = self.canonical_root(&labels[last]).to_string();
        labels[last] = root;

        let hit = self
            .match_kind(&labels, RuleKind::Exception)
            .or_else(|| self.match_kind(&labels, RuleKind::Wildcard))
            .or_else(|| self.match_kind(&labels, RuleKind::Plain))
            .or_else(|| self.match_tld(&labels));

        Ok(hit.map(|hit| self.to_result(labels, hit)))
    }

    /// Like [`lookup`](Self::lookup), but IP literals are returned as such
    /// instead of being matched as names.
    pub fn parse_host(&self, input: &str) -> Result<Option<ParsedHost>> {
        let literal = input
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(input);
        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(Some(ParsedHost::Ip(ip)));
        }
        Ok(self.lookup(input)?.map(ParsedHost::Domain))
    }

    /// Like [`parse_host`](Self::parse_host), but a leading `scheme://` is
    /// dropped first (`https://www.example.com` -> `www.example.com`).
    pub fn parse_host_with_scheme(&self, input: &str) -> Result<Option<ParsedHost>> {
        let host = input
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(input);
        self.parse_host(host)
    }

    /// Longest trailing subsequence matching an entry of `kind`
    fn match_kind<'a>(&'a self, labels: &[String], kind: RuleKind) -> Option<Hit<'a>> {
        let n = labels.len();
        let root = &labels[n - 1];
        let suffixes = self.roots.get(root)?;

        // rule length k, longest first
        let (min, max) = match kind {
            // `!x.y` needs at least two labels
            RuleKind::Exception => (2, n),
            // `*.y` needs one input label beyond the rule
            RuleKind::Wildcard => (1, n - 1),
            RuleKind::Plain => (1, n),
        };

        (min..=max).rev().find_map(|k| {
            let rule_start = n - k;
            let candidate = labels[rule_start..].join(".");
            let index = suffixes.get(&candidate)?.get(kind)?;
            let start = match kind {
                RuleKind::Exception => rule_start + 1,
                RuleKind::Wildcard => rule_start - 1,
                RuleKind::Plain => rule_start,
            };
            Some(Hit::Entry {
                start,
                entry: &self.entries[index],
            })
        })
    }

    fn match_tld(&self, labels: &[String]) -> Option<Hit<'_>> {
        let start = labels.len() - 1;
        self.tlds
            .contains_key(&labels[start])
            .then_some(Hit::Tld { start })
    }

    fn to_result(&self, mut labels: Vec<String>, hit: Hit<'_>) -> MatchResult {
        let (start, kind, section, metadata) = match hit {
            Hit::Entry { start, entry } => {
                (start, entry.kind, entry.section, entry.metadata.clone())
            }
            Hit::Tld { start } => (
                start,
                RuleKind::Plain,
                Section::IanaOnly,
                self.tlds.get(&labels[start]).cloned(),
            ),
        };

        let suffix_labels = labels.split_off(start);
        let suffix = suffix_labels.join(".");
        let registrable_domain = labels
            .last()
            .map(|host| format!("{}.{}", host, suffix));

        MatchResult {
            suffix,
            suffix_labels,
            registrable_domain,
            kind,
            section,
            metadata,
            host_labels: labels,
        }
    }
}
