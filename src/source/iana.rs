//! Parser for the IANA root zone database.
//!
//! The database is published as an HTML page (`https://www.iana.org/domains/root/db`)
//! holding a single `tld-table`, one TLD per row:
//!
//! ```text
//! <tr>
//!     <td><span class="domain tld"><a href="/domains/root/db/xn--kput3i.html">.手机</a></span></td>
//!     <td>generic</td>
//!     <td>Beijing RITT-Net Technology Development Co., Ltd</td>
//! </tr>
//! ```

use std::collections::HashSet;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, SuffixError};
use crate::name::is_punycode;
use crate::source::SourceKind;
use crate::types::{Parsed, TldRecord, TldType};

/// Manager text IANA uses for TLDs that were delegated once and since removed
const RETIRED_MANAGER: &str = "Not assigned";

// CSS selector strings
const TABLE_SELECTOR_STR: &str = "table#tld-table";
const ROW_SELECTOR_STR: &str = "tr";
const CELL_SELECTOR_STR: &str = "td";
const LINK_SELECTOR_STR: &str = "a[href]";

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(TABLE_SELECTOR_STR).expect("TABLE_SELECTOR: hardcoded selector is invalid")
});

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(ROW_SELECTOR_STR).expect("ROW_SELECTOR: hardcoded selector is invalid")
});

static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(CELL_SELECTOR_STR).expect("CELL_SELECTOR: hardcoded selector is invalid")
});

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(LINK_SELECTOR_STR).expect("LINK_SELECTOR: hardcoded selector is invalid")
});

/// Delegation link of an internationalized TLD: `/domains/root/db/xn--kput3i.html`
static PUNY_HREF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)/domains/root/db/(xn--[^./]+)\.html$")
        .expect("PUNY_HREF_PATTERN: hardcoded regex is invalid")
});

/// Parse the IANA root zone database page into TLD records.
///
/// Malformed rows are skipped and counted; retired TLDs are dropped.
/// Fails only when the document is empty or has no `tld-table`.
pub fn parse_iana(text: &str) -> Result<Parsed<TldRecord>> {
    if text.trim().is_empty() {
        return Err(SuffixError::source_format(
            SourceKind::Iana,
            "empty document",
        ));
    }

    let document = Html::parse_document(text);
    let table = document
        .select(&TABLE_SELECTOR)
        .next()
        .ok_or_else(|| SuffixError::source_format(SourceKind::Iana, "tld-table not found"))?;

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0;
    let mut retired = 0;

    for (row_num, row) in table.select(&ROW_SELECTOR).enumerate() {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();

        // Header rows only have <th> cells
        if cells.is_empty() {
            continue;
        }

        match parse_row(&cells) {
            Ok(Some(record)) => {
                if seen.insert(record.name.clone()) {
                    records.push(record);
                } else {
                    debug!("skipping IANA row {}: duplicate TLD {}", row_num, record.name);
                    skipped += 1;
                }
            }
            Ok(None) => retired += 1,
            Err(reason) => {
                debug!("skipping IANA row {}: {}", row_num, reason);
                skipped += 1;
            }
        }
    }

    info!(
        "parsed {} IANA TLD records ({} skipped, {} retired)",
        records.len(),
        skipped,
        retired
    );

    Ok(Parsed::new(records, skipped))
}

/// Parse the three cells of a TLD row. `Ok(None)` is a retired TLD.
fn parse_row(cells: &[ElementRef]) -> std::result::Result<Option<TldRecord>, String> {
    let [domain, tld_type, manager] = cells else {
        return Err(format!("expected 3 cells, found {}", cells.len()));
    };

    let name: String = cell_text(domain)
        .chars()
        .filter(|c| !matches!(c, '\u{200e}' | '\u{200f}'))
        .collect::<String>()
        .trim()
        .trim_start_matches('.')
        .to_lowercase();
    if name.is_empty() {
        return Err("empty TLD name".to_string());
    }
    if name.contains('.') || name.chars().any(char::is_whitespace) {
        return Err(format!("malformed TLD name: {}", name));
    }

    let type_text = cell_text(tld_type);
    let tld_type =
        TldType::parse(&type_text).ok_or_else(|| format!("unknown TLD type: {}", type_text))?;

    let manager = cell_text(manager);
    if manager.eq_ignore_ascii_case(RETIRED_MANAGER) {
        debug!("dropping retired TLD {}", name);
        return Ok(None);
    }

    let punycode = domain
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| PUNY_HREF_PATTERN.captures(href))
        .map(|caps| caps[1].to_lowercase())
        .or_else(|| is_punycode(&name).then(|| name.clone()));

    let mut record = TldRecord::new(name, tld_type);
    if !manager.is_empty() {
        record = record.with_registry(manager);
    }
    if let Some(punycode) = punycode {
        record = record.with_punycode(punycode);
    }
    Ok(Some(record))
}

/// Visible text of a cell with whitespace collapsed
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
<table id="tld-table" class="iana-table">
    <thead>
        <tr><th>Domain</th><th>Type</th><th>TLD Manager</th></tr>
    </thead>
    <tbody>
{}
    </tbody>
</table>
</body></html>"#,
            rows
        )
    }

    fn row(href: &str, text: &str, tld_type: &str, manager: &str) -> String {
        format!(
            r#"<tr>
    <td><span class="domain tld"><a href="/domains/root/db/{}.html">{}</a></span></td>
    <td>{}</td>
    <td>{}</td>
</tr>"#,
            href, text, tld_type, manager
        )
    }

    #[test]
    fn test_puny_href_pattern() {
        let caps = PUNY_HREF_PATTERN
            .captures("/domains/root/db/XN--KPUT3I.html")
            .unwrap();
        assert_eq!(&caps[1], "XN--KPUT3I");
        assert!(PUNY_HREF_PATTERN.captures("/domains/root/db/com.html").is_none());
    }

    #[test]
    fn test_parse_ascii_tld() {
        let text = page(&row(
            "com",
            ".com",
            "generic",
            "VeriSign Global Registry Services",
        ));
        let parsed = parse_iana(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.skipped, 0);

        let com = &parsed.items[0];
        assert_eq!(com.name, "com");
        assert_eq!(com.tld_type, TldType::Generic);
        assert_eq!(
            com.registry.as_deref(),
            Some("VeriSign Global Registry Services")
        );
        assert!(com.punycode.is_none());
        assert!(com.creation_date.is_none());
    }

    #[test]
    fn test_parse_idn_tld() {
        let text = page(&row(
            "xn--kput3i",
            ".手机",
            "generic",
            "Beijing RITT-Net Technology Development Co., Ltd",
        ));
        let parsed = parse_iana(&text).unwrap();
        let record = &parsed.items[0];
        assert_eq!(record.name, "手机");
        assert_eq!(record.punycode.as_deref(), Some("xn--kput3i"));
    }

    #[test]
    fn test_parse_strips_bidi_marks() {
        let text = page(&row(
            "xn--mgbaam7a8h",
            "\u{200f}.امارات\u{200e}",
            "country-code",
            "Telecommunications and Digital Government Regulatory Authority (TDRA)",
        ));
        let parsed = parse_iana(&text).unwrap();
        let record = &parsed.items[0];
        assert_eq!(record.name, "امارات");
        assert_eq!(record.punycode.as_deref(), Some("xn--mgbaam7a8h"));
        assert_eq!(record.tld_type, TldType::CountryCode);
    }

    #[test]
    fn test_parse_punycode_only_name() {
        let text = page(&row("xn--90ais", ".xn--90ais", "country-code", "Reliable Software"));
        let parsed = parse_iana(&text).unwrap();
        let record = &parsed.items[0];
        assert_eq!(record.name, "xn--90ais");
        assert_eq!(record.punycode.as_deref(), Some("xn--90ais"));
    }

    #[test]
    fn test_parse_decodes_entities_and_uppercase() {
        let text = page(&row("att", ".ATT", "generic", "AT&amp;T Services, Inc."));
        let parsed = parse_iana(&text).unwrap();
        let record = &parsed.items[0];
        assert_eq!(record.name, "att");
        assert_eq!(record.registry.as_deref(), Some("AT&T Services, Inc."));
    }

    #[test]
    fn test_retired_tld_is_dropped_not_counted() {
        let rows = [
            row("mcd", ".mcd", "generic", "Not assigned"),
            row("mba", ".mba", "generic", "Binky Moon, LLC"),
        ]
        .join("\n");
        let parsed = parse_iana(&page(&rows)).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.items[0].name, "mba");
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let rows = [
            row("com", ".com", "generic", "VeriSign Global Registry Services"),
            // unknown type
            row("foo", ".foo", "brand", "Someone"),
            // wrong cell count
            "<tr><td>.bar</td><td>generic</td></tr>".to_string(),
            // empty name
            row("", ".", "generic", "Nobody"),
            // duplicate
            row("com", ".com", "generic", "VeriSign Global Registry Services"),
            row("jp", ".jp", "country-code", "Japan Registry Services Co., Ltd."),
        ]
        .join("\n");
        let parsed = parse_iana(&page(&rows)).unwrap();
        let names: Vec<&str> = parsed.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["com", "jp"]);
        assert_eq!(parsed.skipped, 4);
    }

    #[test]
    fn test_empty_manager_is_absent() {
        let parsed = parse_iana(&page(&row("test", ".test", "test", ""))).unwrap();
        assert_eq!(parsed.items[0].registry, None);
        assert_eq!(parsed.items[0].tld_type, TldType::Test);
    }

    #[test]
    fn test_table_without_tbody() {
        let text = format!(
            r#"<table class="iana-table" id="tld-table">{}</table>"#,
            row("arpa", ".arpa", "infrastructure", "Internet Architecture Board (IAB)")
        );
        let parsed = parse_iana(&text).unwrap();
        assert_eq!(parsed.items[0].name, "arpa");
        assert_eq!(parsed.items[0].tld_type, TldType::Infrastructure);
    }

    #[test]
    fn test_empty_document_is_format_error() {
        let err = parse_iana("  \n ").unwrap_err();
        assert!(matches!(
            err,
            SuffixError::SourceFormat {
                kind: SourceKind::Iana,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_table_is_format_error() {
        let err = parse_iana("<html><body><p>maintenance</p></body></html>").unwrap_err();
        assert!(matches!(
            err,
            SuffixError::SourceFormat {
                kind: SourceKind::Iana,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_numeric_entities() {
        let text = page(&row("xn--p1ai", ".&#x0440;&#1092;", "country-code", "A&#38;B"));
        let parsed = parse_iana(&text).unwrap();
        assert_eq!(parsed.items[0].name, "рф");
        assert_eq!(parsed.items[0].registry.as_deref(), Some("A&B"));
    }

    #[test]
    fn test_decode_named_entities() {
        let text = page(&row(
            "fr",
            ".fr",
            "country-code",
            "Association Fran&ccedil;aise pour le Nommage Internet en Coop&eacute;ration (A.F.N.I.C.)",
        ));
        let parsed = parse_iana(&text).unwrap();
        assert_eq!(
            parsed.items[0].registry.as_deref(),
            Some("Association Française pour le Nommage Internet en Coopération (A.F.N.I.C.)")
        );
    }

    #[test]
    fn test_manager_markup_is_text_only() {
        let text = page(&row(
            "example",
            ".example",
            "test",
            "<span>Internet Assigned\n   Numbers Authority</span>",
        ));
        let parsed = parse_iana(&text).unwrap();
        assert_eq!(
            parsed.items[0].registry.as_deref(),
            Some("Internet Assigned Numbers Authority")
        );
    }
}
