use std::fmt;
use std::net::IpAddr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Base URL of the per-TLD delegation pages in the IANA root zone database
pub const DELEGATION_LINK_BASE: &str = "https://www.iana.org/domains/root/db";

/// Public Suffix List rule kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// `co.uk` - the listed name itself is a public suffix
    Plain,
    /// `*.ck` - every direct child of the listed name is a public suffix
    Wildcard,
    /// `!www.ck` - carves the listed name out of a wildcard
    Exception,
}

/// Where a suffix comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    /// ICANN section of the Public Suffix List
    Icann,
    /// PRIVATE section of the Public Suffix List
    Private,
    /// Delegated by IANA but absent from the Public Suffix List
    IanaOnly,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Icann => "ICANN",
            Section::Private => "PRIVATE",
            Section::IanaOnly => "IANA-only",
        };
        f.write_str(name)
    }
}

/// TLD type as published in the IANA root zone database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TldType {
    Sponsored,
    GenericRestricted,
    Generic,
    CountryCode,
    Test,
    Infrastructure,
    /// Special-use name outside the IANA root (e.g. `onion`)
    HostSuffix,
}

impl TldType {
    /// Parse the type column of the IANA root zone database
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sponsored" => Some(TldType::Sponsored),
            "generic-restricted" => Some(TldType::GenericRestricted),
            "generic" => Some(TldType::Generic),
            "country-code" => Some(TldType::CountryCode),
            "test" => Some(TldType::Test),
            "infrastructure" => Some(TldType::Infrastructure),
            "host-suffix" | "host_suffix" => Some(TldType::HostSuffix),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TldType::Sponsored => "sponsored",
            TldType::GenericRestricted => "generic-restricted",
            TldType::Generic => "generic",
            TldType::CountryCode => "country-code",
            TldType::Test => "test",
            TldType::Infrastructure => "infrastructure",
            TldType::HostSuffix => "host-suffix",
        }
    }
}

impl fmt::Display for TldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One TLD from the IANA root zone database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldRecord {
    /// TLD label, lowercased (Unicode form for internationalized TLDs)
    pub name: String,
    pub tld_type: TldType,
    /// Registry / TLD manager
    pub registry: Option<String>,
    pub creation_date: Option<NaiveDate>,
    /// ASCII-compatible (`xn--`) form, only for internationalized TLDs
    pub punycode: Option<String>,
}

impl TldRecord {
    pub fn new(name: impl Into<String>, tld_type: TldType) -> Self {
        Self {
            name: name.into().to_lowercase(),
            tld_type,
            registry: None,
            creation_date: None,
            punycode: None,
        }
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn with_creation_date(mut self, date: NaiveDate) -> Self {
        self.creation_date = Some(date);
        self
    }

    pub fn with_punycode(mut self, punycode: impl Into<String>) -> Self {
        self.punycode = Some(punycode.into().to_lowercase());
        self
    }

    /// The Tor `.onion` special-use name, which IANA does not delegate.
    pub fn onion() -> Self {
        let record = Self::new("onion", TldType::HostSuffix).with_registry("Tor");
        match NaiveDate::from_ymd_opt(2015, 9, 15) {
            Some(date) => record.with_creation_date(date),
            None => record,
        }
    }

    /// Link to the IANA delegation record for this TLD
    pub fn delegation_link(&self) -> String {
        let label = self.punycode.as_deref().unwrap_or(&self.name);
        format!("{}/{}.html", DELEGATION_LINK_BASE, label)
    }
}

/// One rule from the Public Suffix List
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRule {
    /// Labels in domain order, root label last (`co.uk` -> `["co", "uk"]`).
    /// Wildcard rules exclude the `*`; exception rules exclude the `!`.
    pub labels: Vec<String>,
    pub kind: RuleKind,
    pub section: Section,
    /// Punycode form from a `// xn--...` comment preceding a single-label rule
    pub punycode_hint: Option<String>,
}

impl SuffixRule {
    pub fn new(labels: Vec<String>, kind: RuleKind, section: Section) -> Self {
        Self {
            labels,
            kind,
            section,
            punycode_hint: None,
        }
    }

    /// The top-level label of the rule
    pub fn root(&self) -> &str {
        self.labels.last().map(String::as_str).unwrap_or("")
    }
}

/// Merged, queryable unit of a suffix table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixEntry {
    /// Labels in domain order, root label last
    pub labels: Vec<String>,
    pub kind: RuleKind,
    pub section: Section,
    /// IANA record of the root label, when one exists
    pub metadata: Option<TldRecord>,
}

impl SuffixEntry {
    /// Dot-joined suffix
    pub fn suffix(&self) -> String {
        self.labels.join(".")
    }

    pub fn root(&self) -> &str {
        self.labels.last().map(String::as_str).unwrap_or("")
    }
}

/// Result of a suffix lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Public suffix, dot-joined
    pub suffix: String,
    /// Public suffix labels, root label last
    pub suffix_labels: Vec<String>,
    /// Public suffix plus one label to its left; `None` when the input is the suffix
    pub registrable_domain: Option<String>,
    /// Kind of the entry that produced the match
    pub kind: RuleKind,
    pub section: Section,
    pub metadata: Option<TldRecord>,
    /// Input labels left of the public suffix
    pub(crate) host_labels: Vec<String>,
}

impl MatchResult {
    /// The actual top-level domain (root label of the suffix)
    pub fn tld(&self) -> &str {
        self.suffix_labels
            .last()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// False only for suffixes from the PRIVATE section
    pub fn is_public(&self) -> bool {
        self.section != Section::Private
    }

    /// Whether the public suffix has more than one label (e.g. `co.uk`)
    pub fn is_multi_label(&self) -> bool {
        self.suffix_labels.len() > 1
    }

    /// Input labels left of the public suffix
    pub fn host_labels(&self) -> &[String] {
        &self.host_labels
    }

    /// The label directly left of the public suffix
    pub fn registrable_domain_host(&self) -> Option<&str> {
        self.host_labels.last().map(String::as_str)
    }

    /// Everything left of the registrable domain; `None` when there is nothing
    pub fn subdomain(&self) -> Option<String> {
        if self.host_labels.len() < 2 {
            return None;
        }
        Some(self.host_labels[..self.host_labels.len() - 1].join("."))
    }

    pub fn tld_type(&self) -> Option<TldType> {
        self.metadata.as_ref().map(|m| m.tld_type)
    }

    pub fn registry(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.registry.as_deref())
    }

    pub fn creation_date(&self) -> Option<NaiveDate> {
        self.metadata.as_ref().and_then(|m| m.creation_date)
    }

    pub fn punycode(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.punycode.as_deref())
    }

    pub fn is_punycode(&self) -> bool {
        self.punycode().is_some()
    }

    pub fn delegation_link(&self) -> Option<String> {
        self.metadata.as_ref().map(TldRecord::delegation_link)
    }
}

/// A parsed host: either an IP literal or a domain with its public suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedHost {
    Ip(IpAddr),
    Domain(MatchResult),
}

impl ParsedHost {
    pub fn is_ip(&self) -> bool {
        matches!(self, ParsedHost::Ip(_))
    }

    pub fn as_domain(&self) -> Option<&MatchResult> {
        match self {
            ParsedHost::Domain(m) => Some(m),
            ParsedHost::Ip(_) => None,
        }
    }

    /// `Some(true)` for loopback and RFC 1918 IPv4 addresses, `None` for non-IPv4 hosts
    pub fn is_private_ipv4(&self) -> Option<bool> {
        match self {
            ParsedHost::Ip(IpAddr::V4(ip)) => Some(ip.is_private() || ip.is_loopback()),
            _ => None,
        }
    }
}

/// Output of a best-effort source parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub items: Vec<T>,
    /// Rows or lines that were malformed and ignored
    pub skipped: usize,
}

impl<T> Parsed<T> {
    pub fn new(items: Vec<T>, skipped: usize) -> Self {
        Self { items, skipped }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
