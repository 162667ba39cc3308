//! Domain Suffixes - public suffix lookup with IANA TLD metadata
//!
//! This library merges the IANA root zone database and the Public Suffix List
//! into one suffix table and finds the longest public suffix of a domain name:
//! - Plain, wildcard (`*.ck`) and exception (`!www.ck`) rules
//! - ICANN / PRIVATE / IANA-only sections
//! - TLD type, registry, creation date and punycode for every known TLD
//! - Internationalized TLDs in Unicode or punycode form
//! - JSON snapshots and auto-downloaded sources
//!
//! # Example
//!
//! ```rust
//! use domain_suffixes::{build_suffix_table, TldType};
//!
//! let iana = r#"<table id="tld-table"><tbody>
//! <tr><td><a href="/domains/root/db/uk.html">.uk</a></td><td>country-code</td><td>Nominet UK</td></tr>
//! </tbody></table>"#;
//!
//! let psl = "
//! // ===BEGIN ICANN DOMAINS===
//! uk
//! co.uk
//! // ===END ICANN DOMAINS===
//! ";
//!
//! let table = build_suffix_table(iana, psl).unwrap();
//!
//! let result = table.lookup("www.bbc.co.uk").unwrap().unwrap();
//! assert_eq!(result.suffix, "co.uk");
//! assert_eq!(result.registrable_domain.as_deref(), Some("bbc.co.uk"));
//! assert_eq!(result.tld_type(), Some(TldType::CountryCode));
//!
//! // Well-formed names without a known suffix are not errors
//! assert!(table.lookup("printer.local").unwrap().is_none());
//! ```
//!
//! # Matching
//!
//! | Rule | Example input | Public suffix |
//! |------|---------------|---------------|
//! | `co.uk` | `www.bbc.co.uk` | `co.uk` |
//! | `*.ck` | `foo.bar.ck` | `bar.ck` |
//! | `!www.ck` | `www.ck` | `ck` |
//! | (none, IANA TLD `zz`) | `a.zz` | `zz` |
//!
//! Exception rules beat wildcard rules, which beat plain rules; within a
//! kind the longest rule wins.

pub mod builder;
pub mod error;
pub mod name;
pub mod source;
pub mod table;
pub mod types;

// Re-export commonly used items
pub use builder::{build_suffix_table, SuffixTableBuilder};
pub use error::{LoadErrorKind, Result, SuffixError};
pub use source::{
    parse_creation_dates, parse_iana, parse_psl, FileSourceLoader, MemorySourceLoader, SourceKind,
    SourceLoader, DEFAULT_UPDATE_INTERVAL,
};
pub use table::{SharedSuffixTable, SuffixTable};
pub use types::{
    MatchResult, Parsed, ParsedHost, RuleKind, Section, SuffixEntry, SuffixRule, TldRecord,
    TldType,
};

#[cfg(feature = "download")]
pub use source::AutoSourceLoader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_workflow() {
        let iana = r#"
<table class="iana-table" id="tld-table">
<thead><tr><th>Domain</th><th>Type</th><th>TLD Manager</th></tr></thead>
<tbody>
<tr><td><span class="domain tld"><a href="/domains/root/db/ck.html">.ck</a></span></td><td>country-code</td><td>Telecom Cook Islands Ltd.</td></tr>
<tr><td><span class="domain tld"><a href="/domains/root/db/com.html">.com</a></span></td><td>generic</td><td>VeriSign Global Registry Services</td></tr>
<tr><td><span class="domain tld"><a href="/domains/root/db/zz.html">.zz</a></span></td><td>test</td><td>Example Registry</td></tr>
<tr><td><span class="domain tld"><a href="/domains/root/db/xn--kput3i.html">.手机</a></span></td><td>generic</td><td>Beijing RITT-Net Technology Development Co., Ltd</td></tr>
</tbody>
</table>"#;

        let psl = r#"
// ===BEGIN ICANN DOMAINS===
com
*.ck
!www.ck
手机
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
blogspot.com
// ===END PRIVATE DOMAINS===
"#;

        // Build
        let table = SuffixTableBuilder::new()
            .with_special_use_tlds()
            .build_from_sources(iana, psl)
            .unwrap();

        // Plain
        let result = table.lookup("www.example.com").unwrap().unwrap();
        assert_eq!(result.suffix, "com");
        assert_eq!(result.registrable_domain.as_deref(), Some("example.com"));
        assert_eq!(result.tld_type(), Some(TldType::Generic));

        // Wildcard and exception
        assert_eq!(table.lookup("foo.bar.ck").unwrap().unwrap().suffix, "bar.ck");
        assert_eq!(table.lookup("www.ck").unwrap().unwrap().suffix, "ck");

        // Private
        let result = table.lookup("me.blogspot.com").unwrap().unwrap();
        assert_eq!(result.section, Section::Private);
        assert_eq!(result.registry(), Some("VeriSign Global Registry Services"));

        // IANA-only
        let result = table.lookup("a.zz").unwrap().unwrap();
        assert_eq!(result.section, Section::IanaOnly);
        assert_eq!(result.tld_type(), Some(TldType::Test));

        // Special-use
        let result = table.lookup("duckduckgogg42xjoc72x3sjasowoarfbgcmvfimaftt6twagswzczad.onion").unwrap().unwrap();
        assert_eq!(result.suffix, "onion");
        assert_eq!(result.tld_type(), Some(TldType::HostSuffix));

        // Punycode input for a Unicode TLD
        let result = table.lookup("shop.xn--kput3i").unwrap().unwrap();
        assert_eq!(result.tld(), "手机");
        assert_eq!(result.punycode(), Some("xn--kput3i"));

        // No suffix
        assert_eq!(table.lookup("a.b.c").unwrap(), None);

        // Invalid
        assert!(matches!(table.lookup(""), Err(SuffixError::InvalidInput(_))));
    }
}
