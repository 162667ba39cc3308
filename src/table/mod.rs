//! Immutable suffix table and its root-keyed lookup index.

mod matcher;
mod shared;
mod snapshot;

use std::collections::HashMap;

use log::debug;

use crate::builder::SuffixTableBuilder;
use crate::error::Result;
use crate::source::SourceLoader;
use crate::types::{RuleKind, SuffixEntry, TldRecord};

pub use shared::SharedSuffixTable;
pub use snapshot::SNAPSHOT_VERSION;

/// Entry indices of one suffix, at most one per rule kind
#[derive(Debug, Clone, Copy, Default)]
struct KindSlots {
    plain: Option<usize>,
    wildcard: Option<usize>,
    exception: Option<usize>,
}

impl KindSlots {
    fn get(&self, kind: RuleKind) -> Option<usize> {
        match kind {
            RuleKind::Plain => self.plain,
            RuleKind::Wildcard => self.wildcard,
            RuleKind::Exception => self.exception,
        }
    }

    fn slot_mut(&mut self, kind: RuleKind) -> &mut Option<usize> {
        match kind {
            RuleKind::Plain => &mut self.plain,
            RuleKind::Wildcard => &mut self.wildcard,
            RuleKind::Exception => &mut self.exception,
        }
    }
}

/// Merged IANA and Public Suffix List data, ready for lookups.
///
/// Build one with [`SuffixTableBuilder`] or
/// [`build_suffix_table`](crate::build_suffix_table), or load a saved
/// snapshot with [`SuffixTable::load`].
#[derive(Debug, Clone)]
pub struct SuffixTable {
    /// Sorted by (labels, kind)
    entries: Vec<SuffixEntry>,
    /// root label -> dot-joined suffix -> entries of that suffix
    roots: HashMap<String, HashMap<String, KindSlots>>,
    /// root label -> IANA record of that root
    tlds: HashMap<String, TldRecord>,
    /// Alternate spelling (punycode or Unicode) of a root -> root as stored
    aliases: HashMap<String, String>,
}

impl SuffixTable {
    /// Index a set of entries. Shared by the builder and snapshot loading.
    pub(crate) fn from_entries(
        mut entries: Vec<SuffixEntry>,
    ) -> std::result::Result<Self, String> {
        if entries.is_empty() {
            return Err("suffix table has no entries".to_string());
        }
        entries.sort_by(|a, b| (&a.labels, a.kind).cmp(&(&b.labels, b.kind)));

        let mut roots: HashMap<String, HashMap<String, KindSlots>> = HashMap::new();
        let mut tlds: HashMap<String, TldRecord> = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            if entry.labels.is_empty() || entry.labels.iter().any(|l| l.is_empty()) {
                return Err(format!("entry with empty label: {:?}", entry.labels));
            }

            let root = entry.root().to_string();
            let slot = roots
                .entry(root.clone())
                .or_default()
                .entry(entry.suffix())
                .or_default()
                .slot_mut(entry.kind);
            if slot.is_some() {
                return Err(format!(
                    "duplicate {:?} entry for {}",
                    entry.kind,
                    entry.suffix()
                ));
            }
            *slot = Some(i);

            if let Some(ref record) = entry.metadata {
                tlds.entry(root).or_insert_with(|| record.clone());
            }
        }

        let mut aliases = HashMap::new();
        for (root, record) in &tlds {
            let forms = std::iter::once(&record.name).chain(record.punycode.as_ref());
            for form in forms {
                if form != root && !roots.contains_key(form) {
                    aliases.entry(form.clone()).or_insert_with(|| root.clone());
                }
            }
        }

        debug!(
            "indexed {} entries under {} roots ({} aliases)",
            entries.len(),
            roots.len(),
            aliases.len()
        );

        Ok(Self {
            entries,
            roots,
            tlds,
            aliases,
        })
    }

    /// Build a table with default options from a source loader
    pub fn from_loader(loader: &dyn SourceLoader) -> Result<Self> {
        SuffixTableBuilder::new().build_from_loader(loader)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, sorted by (labels, kind)
    pub fn entries(&self) -> &[SuffixEntry] {
        &self.entries
    }

    /// IANA records of all known top-level domains
    pub fn tlds(&self) -> impl Iterator<Item = &TldRecord> {
        self.tlds.values()
    }

    /// IANA record of a top-level domain, by Unicode or punycode name
    pub fn tld(&self, name: &str) -> Option<&TldRecord> {
        let name = name.to_lowercase();
        self.tlds
            .get(&name)
            .or_else(|| self.aliases.get(&name).and_then(|root| self.tlds.get(root)))
    }

    /// Entry for an exact dot-joined suffix and kind (`"ck"` + Wildcard for `*.ck`)
    pub fn get(&self, suffix: &str, kind: RuleKind) -> Option<&SuffixEntry> {
        let root = suffix.rsplit('.').next()?;
        self.slots(root, suffix)
            .and_then(|slots| slots.get(kind))
            .map(|i| &self.entries[i])
    }

    fn slots(&self, root: &str, suffix: &str) -> Option<&KindSlots> {
        self.roots.get(root).and_then(|suffixes| suffixes.get(suffix))
    }

    /// The root label as stored in the table, resolving punycode/Unicode aliases
    fn canonical_root<'a>(&'a self, root: &'a str) -> &'a str {
        if self.roots.contains_key(root) || self.tlds.contains_key(root) {
            return root;
        }
        self.aliases.get(root).map(String::as_str).unwrap_or(root)
    }
}

impl PartialEq for SuffixTable {
    /// Tables are equal when their entries are; the index is derived
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for SuffixTable {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, TldType};

    fn entry(suffix: &str, kind: RuleKind, metadata: Option<TldRecord>) -> SuffixEntry {
        SuffixEntry {
            labels: suffix.split('.').map(String::from).collect(),
            kind,
            section: Section::Icann,
            metadata,
        }
    }

    #[test]
    fn test_from_entries_sorts_and_indexes() {
        let uk = TldRecord::new("uk", TldType::CountryCode);
        let table = SuffixTable::from_entries(vec![
            entry("co.uk", RuleKind::Plain, Some(uk.clone())),
            entry("uk", RuleKind::Plain, Some(uk)),
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].suffix(), "co.uk");
        assert!(table.get("uk", RuleKind::Plain).is_some());
        assert!(table.get("uk", RuleKind::Wildcard).is_none());
        assert_eq!(table.tlds().count(), 1);
    }

    #[test]
    fn test_from_entries_rejects_invalid() {
        assert!(SuffixTable::from_entries(vec![]).is_err());
        assert!(SuffixTable::from_entries(vec![entry("co..uk", RuleKind::Plain, None)]).is_err());
        assert!(SuffixTable::from_entries(vec![
            entry("uk", RuleKind::Plain, None),
            entry("uk", RuleKind::Plain, None),
        ])
        .is_err());
    }

    #[test]
    fn test_idn_aliases() {
        let record = TldRecord::new("手机", TldType::Generic).with_punycode("xn--kput3i");
        let table =
            SuffixTable::from_entries(vec![entry("手机", RuleKind::Plain, Some(record))]).unwrap();

        assert_eq!(table.canonical_root("xn--kput3i"), "手机");
        assert_eq!(table.canonical_root("手机"), "手机");
        assert_eq!(table.canonical_root("com"), "com");
        assert_eq!(table.tld("XN--KPUT3I").unwrap().name, "手机");
    }
}
