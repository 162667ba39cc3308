use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use log::{debug, info};

use crate::error::{Result, SuffixError};
use crate::source::{iana, psl, SourceKind, SourceLoader};
use crate::table::SuffixTable;
use crate::types::{RuleKind, Section, SuffixEntry, SuffixRule, TldRecord};

/// Merged entries keyed by (labels, kind); the BTreeMap keeps builds deterministic
type EntryMap = BTreeMap<(Vec<String>, RuleKind), SuffixEntry>;

/// Build a suffix table from the raw IANA root zone database and Public Suffix List.
pub fn build_suffix_table(iana_text: &str, psl_text: &str) -> Result<SuffixTable> {
    SuffixTableBuilder::new().build_from_sources(iana_text, psl_text)
}

/// Merges IANA TLD records and Public Suffix List rules into a [`SuffixTable`].
#[derive(Debug, Clone)]
pub struct SuffixTableBuilder {
    records: Vec<TldRecord>,
    rules: Vec<SuffixRule>,
    /// Records not published by IANA (special-use names)
    extra_records: Vec<TldRecord>,
    creation_dates: HashMap<String, NaiveDate>,
    include_private: bool,
}

impl Default for SuffixTableBuilder {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rules: Vec::new(),
            extra_records: Vec::new(),
            creation_dates: HashMap::new(),
            include_private: true,
        }
    }
}

impl SuffixTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add parsed IANA TLD records
    pub fn with_records(mut self, records: impl IntoIterator<Item = TldRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Add parsed Public Suffix List rules
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = SuffixRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Add a TLD record that IANA does not publish.
    /// An IANA record with the same name takes precedence.
    pub fn with_record(mut self, record: TldRecord) -> Self {
        self.extra_records.push(record);
        self
    }

    /// Add the special-use TLDs (`onion`)
    pub fn with_special_use_tlds(self) -> Self {
        self.with_record(TldRecord::onion())
    }

    /// Fill in creation dates for records that have none, keyed by TLD name
    pub fn with_creation_dates(mut self, dates: HashMap<String, NaiveDate>) -> Self {
        self.creation_dates.extend(dates);
        self
    }

    /// Keep or drop rules from the PRIVATE section (kept by default)
    pub fn with_private_suffixes(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }

    /// Parse both source documents and build
    pub fn build_from_sources(self, iana_text: &str, psl_text: &str) -> Result<SuffixTable> {
        let records = iana::parse_iana(iana_text)?;
        let rules = psl::parse_psl(psl_text)?;
        self.with_records(records.items)
            .with_rules(rules.items)
            .build()
    }

    /// Load both source documents from a loader and build
    pub fn build_from_loader(self, loader: &dyn SourceLoader) -> Result<SuffixTable> {
        let iana_text = loader.load_source(SourceKind::Iana)?;
        let psl_text = loader.load_source(SourceKind::Psl)?;
        self.build_from_sources(&iana_text, &psl_text)
    }

    /// Merge records and rules into an immutable table
    pub fn build(self) -> Result<SuffixTable> {
        let rules: Vec<SuffixRule> = if self.include_private {
            self.rules
        } else {
            self.rules
                .into_iter()
                .filter(|r| r.section != Section::Private)
                .collect()
        };

        if self.records.is_empty() {
            return Err(SuffixError::Merge("no IANA TLD records".to_string()));
        }
        if rules.is_empty() {
            return Err(SuffixError::Merge("no public suffix rules".to_string()));
        }

        let records = merge_records(self.records, self.extra_records, &self.creation_dates);
        let index = index_records(&records);

        let mut entries = EntryMap::new();
        let mut covered = vec![false; records.len()];
        let mut attached = 0;
        let mut duplicates = 0;

        for rule in rules {
            let found = index.get(rule.root()).copied().or_else(|| {
                rule.punycode_hint
                    .as_ref()
                    .and_then(|hint| index.get(hint.as_str()).copied())
            });
            if let Some(i) = found {
                covered[i] = true;
                attached += 1;
            }

            let entry = SuffixEntry {
                labels: rule.labels,
                kind: rule.kind,
                section: rule.section,
                metadata: found.map(|i| records[i].clone()),
            };
            if insert_entry(&mut entries, entry) {
                duplicates += 1;
            }
        }

        // TLDs the Public Suffix List omits
        let mut synthesized = 0;
        for (record, _) in records.iter().zip(&covered).filter(|(_, c)| !**c) {
            debug!("synthesizing IANA-only entry for {}", record.name);
            let entry = SuffixEntry {
                labels: vec![record.name.clone()],
                kind: RuleKind::Plain,
                section: Section::IanaOnly,
                metadata: Some(record.clone()),
            };
            if insert_entry(&mut entries, entry) {
                duplicates += 1;
            }
            synthesized += 1;
        }

        info!(
            "built suffix table: {} entries ({} with IANA metadata, {} IANA-only, {} duplicates merged)",
            entries.len(),
            attached,
            synthesized,
            duplicates
        );

        SuffixTable::from_entries(entries.into_values().collect()).map_err(SuffixError::Merge)
    }
}

/// Append extra records not already published, then apply creation dates
fn merge_records(
    mut records: Vec<TldRecord>,
    extra: Vec<TldRecord>,
    creation_dates: &HashMap<String, NaiveDate>,
) -> Vec<TldRecord> {
    for record in extra {
        if records.iter().any(|r| r.name == record.name) {
            debug!("ignoring extra record {}: published by IANA", record.name);
            continue;
        }
        records.push(record);
    }

    for record in &mut records {
        if record.creation_date.is_some() {
            continue;
        }
        record.creation_date = creation_dates.get(&record.name).copied().or_else(|| {
            record
                .punycode
                .as_ref()
                .and_then(|p| creation_dates.get(p).copied())
        });
    }

    records
}

/// Index records by name and by punycode form; first record wins on collisions
fn index_records(records: &[TldRecord]) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(records.len() * 2);
    for (i, record) in records.iter().enumerate() {
        index.entry(record.name.as_str()).or_insert(i);
    }
    for (i, record) in records.iter().enumerate() {
        if let Some(ref punycode) = record.punycode {
            index.entry(punycode.as_str()).or_insert(i);
        }
    }
    index
}

/// Insert an entry, keeping the richer one on a (labels, kind) collision.
/// Returns true when a collision happened.
fn insert_entry(entries: &mut EntryMap, entry: SuffixEntry) -> bool {
    match entries.entry((entry.labels.clone(), entry.kind)) {
        Entry::Vacant(slot) => {
            slot.insert(entry);
            false
        }
        Entry::Occupied(mut slot) => {
            if outranks(&entry, slot.get()) {
                slot.insert(entry);
            }
            true
        }
    }
}

/// Present metadata beats absent; then ICANN beats PRIVATE beats IANA-only
fn outranks(candidate: &SuffixEntry, existing: &SuffixEntry) -> bool {
    match (candidate.metadata.is_some(), existing.metadata.is_some()) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate.section < existing.section,
    }
}
