use std::sync::Arc;

use log::info;
use parking_lot::RwLock;

use crate::builder::SuffixTableBuilder;
use crate::error::Result;
use crate::source::SourceLoader;
use crate::types::MatchResult;

use super::SuffixTable;

/// A suffix table that can be swapped while readers keep matching.
///
/// Readers take a cheap `Arc` clone and match against that version without
/// holding the lock; a rebuild replaces the pointer only once the new table
/// is complete.
#[derive(Debug)]
pub struct SharedSuffixTable {
    current: RwLock<Arc<SuffixTable>>,
}

impl SharedSuffixTable {
    pub fn new(table: SuffixTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// The table version visible right now
    pub fn current(&self) -> Arc<SuffixTable> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new table, returning the previous one
    pub fn replace(&self, table: SuffixTable) -> Arc<SuffixTable> {
        let table = Arc::new(table);
        std::mem::replace(&mut *self.current.write(), table)
    }

    /// Look up against the current table
    pub fn lookup(&self, fqdn: &str) -> Result<Option<MatchResult>> {
        self.current().lookup(fqdn)
    }

    /// Build a new table from a loader and swap it in.
    /// On failure the current table stays in place.
    pub fn rebuild(&self, builder: SuffixTableBuilder, loader: &dyn SourceLoader) -> Result<()> {
        let table = builder.build_from_loader(loader)?;
        let entries = table.len();
        self.replace(table);
        info!("suffix table replaced ({} entries)", entries);
        Ok(())
    }
}

impl From<SuffixTable> for SharedSuffixTable {
    fn from(table: SuffixTable) -> Self {
        Self::new(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceLoader;

    const IANA: &str = r#"<table id="tld-table"><tbody>
<tr><td><span class="domain tld"><a href="/domains/root/db/com.html">.com</a></span></td><td>generic</td><td>VeriSign Global Registry Services</td></tr>
<tr><td><span class="domain tld"><a href="/domains/root/db/net.html">.net</a></span></td><td>generic</td><td>VeriSign Global Registry Services</td></tr>
</tbody></table>"#;

    const PSL_V1: &str = "// ===BEGIN ICANN DOMAINS===\ncom\n// ===END ICANN DOMAINS===\n";
    const PSL_V2: &str = "// ===BEGIN ICANN DOMAINS===\ncom\nnet\n// ===END ICANN DOMAINS===\n// ===BEGIN PRIVATE DOMAINS===\nblogspot.com\n// ===END PRIVATE DOMAINS===\n";

    #[test]
    fn test_rebuild_swaps_table() {
        let shared = SharedSuffixTable::new(
            SuffixTable::from_loader(&MemorySourceLoader::new(IANA, PSL_V1)).unwrap(),
        );
        let before = shared.current();
        assert_eq!(
            shared.lookup("a.blogspot.com").unwrap().unwrap().suffix,
            "com"
        );

        shared
            .rebuild(
                SuffixTableBuilder::new(),
                &MemorySourceLoader::new(IANA, PSL_V2),
            )
            .unwrap();

        assert_eq!(
            shared.lookup("a.blogspot.com").unwrap().unwrap().suffix,
            "blogspot.com"
        );
        // readers holding the old version are unaffected
        assert_eq!(before.lookup("a.blogspot.com").unwrap().unwrap().suffix, "com");
    }

    #[test]
    fn test_failed_rebuild_keeps_table() {
        let table = SuffixTable::from_loader(&MemorySourceLoader::new(IANA, PSL_V1)).unwrap();
        let shared = SharedSuffixTable::from(table);

        let broken = MemorySourceLoader::new(IANA, "com\nnet\n");
        assert!(shared.rebuild(SuffixTableBuilder::new(), &broken).is_err());
        assert!(shared.lookup("example.com").unwrap().is_some());
    }

    #[test]
    fn test_concurrent_readers() {
        let shared = Arc::new(SharedSuffixTable::new(
            SuffixTable::from_loader(&MemorySourceLoader::new(IANA, PSL_V2)).unwrap(),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let result = shared.lookup("www.example.net").unwrap().unwrap();
                        assert_eq!(result.suffix, "net");
                    }
                })
            })
            .collect();

        shared.replace(SuffixTable::from_loader(&MemorySourceLoader::new(IANA, PSL_V2)).unwrap());

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
