//! Ordered name → code table behind a lock, so runtime registrations are safe
//! to make while lookups are in flight.
//!
//! Substring matching returns the first entry in table order. When several
//! entries could match (e.g. "苹果" is contained in both "苹果" and "苹果公司"),
//! the one listed first wins, so the table order is part of the behavior.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use serde::Deserialize;
use shared::models::{InstrumentClass, ListingType, StockList, StockListing};

use crate::error::EngineError;

const DEFAULT_TABLE: &str = include_str!("../../assets/symbols.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub code: String,
    /// Only set for entries the code shape cannot classify (indices).
    #[serde(default)]
    pub class: Option<InstrumentClass>,
}

impl SymbolEntry {
    pub fn new(name: &str, code: &str) -> Self {
        SymbolEntry {
            name: name.to_string(),
            code: code.to_string(),
            class: None,
        }
    }

    pub fn instrument_class(&self) -> InstrumentClass {
        self.class.unwrap_or_else(|| InstrumentClass::from_code(&self.code))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSymbol {
    pub matched_name: String,
    pub code: String,
    pub class: InstrumentClass,
}

impl From<&SymbolEntry> for ResolvedSymbol {
    fn from(entry: &SymbolEntry) -> Self {
        ResolvedSymbol {
            matched_name: entry.name.clone(),
            code: entry.code.clone(),
            class: entry.instrument_class(),
        }
    }
}

pub struct SymbolRegistry {
    entries: RwLock<Vec<SymbolEntry>>,
}

impl SymbolRegistry {
    pub fn new(entries: Vec<SymbolEntry>) -> Self {
        SymbolRegistry {
            entries: RwLock::new(entries),
        }
    }

    /// The built-in table of A-shares, HK shares, US shares and indices.
    pub fn load_default() -> Result<Self, EngineError> {
        Self::from_json(DEFAULT_TABLE)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("cannot read symbol table '{}': {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let entries: Vec<SymbolEntry> = serde_json::from_str(raw)
            .map_err(|e| EngineError::ConfigError(format!("invalid symbol table: {}", e)))?;
        if let Some(bad) = entries.iter().find(|e| e.name.is_empty() || e.code.is_empty()) {
            return Err(EngineError::ConfigError(format!(
                "symbol table entry has an empty name or code: {:?}",
                bad
            )));
        }
        tracing::debug!(count = entries.len(), "Loaded symbol table");
        Ok(Self::new(entries))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<SymbolEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exact name match first, then the first entry whose name contains the
    /// query or is contained in it. An empty query never matches.
    pub fn resolve(&self, name: &str) -> Option<ResolvedSymbol> {
        if name.is_empty() {
            return None;
        }
        let entries = self.read();
        entries
            .iter()
            .find(|e| e.name == name)
            .or_else(|| {
                entries
                    .iter()
                    .find(|e| e.name.contains(name) || name.contains(e.name.as_str()))
            })
            .map(ResolvedSymbol::from)
    }

    /// Registers a mapping. An existing name keeps its position and gets the new code.
    pub fn add_stock(&self, name: &str, code: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.code = code.to_string();
                entry.class = None;
            }
            None => entries.push(SymbolEntry::new(name, code)),
        }
        tracing::info!(name, code, "Registered stock mapping");
    }

    /// Case-insensitive keyword match against names and codes, in table order.
    pub fn search(&self, keyword: &str) -> Vec<StockListing> {
        let keyword = keyword.to_lowercase();
        self.read()
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&keyword) || e.code.to_lowercase().contains(&keyword))
            .map(|e| StockListing::new(&e.name, &e.code))
            .collect()
    }

    /// All entries sorted by listing type then name, optionally filtered.
    pub fn list(&self, search: Option<&str>, listing_type: Option<ListingType>) -> StockList {
        let mut listings = match search {
            Some(keyword) => self.search(keyword),
            None => self.read().iter().map(|e| StockListing::new(&e.name, &e.code)).collect(),
        };
        if let Some(wanted) = listing_type {
            listings.retain(|l| l.listing_type == wanted);
        }
        listings.sort_by(|a, b| (a.listing_type, &a.name).cmp(&(b.listing_type, &b.name)));
        StockList::from_listings(listings)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registry() -> SymbolRegistry {
        SymbolRegistry::load_default().unwrap()
    }

    #[test]
    fn test_exact_and_alias_resolve_to_same_code() {
        let reg = registry();
        assert_eq!(reg.resolve("贵州茅台").unwrap().code, "600519");
        assert_eq!(reg.resolve("茅台").unwrap().code, "600519");
        assert_eq!(reg.resolve("茅台").unwrap().matched_name, "茅台");
    }

    #[test]
    fn test_substring_match_both_directions() {
        let reg = registry();
        // query contained in a table name
        assert_eq!(reg.resolve("宁德").unwrap().code, "300750");
        // table name contained in the query
        let hit = reg.resolve("腾讯控股有限公司").unwrap();
        assert_eq!(hit.code, "00700");
        assert_eq!(hit.matched_name, "腾讯控股");
    }

    #[test]
    fn test_substring_match_takes_first_in_table_order() {
        let reg = SymbolRegistry::new(vec![
            SymbolEntry::new("Alpha One", "111111"),
            SymbolEntry::new("Alpha Two", "222222"),
        ]);
        assert_eq!(reg.resolve("Alpha").unwrap().code, "111111");
    }

    #[test]
    fn test_unknown_and_empty_names_not_found() {
        let reg = registry();
        assert!(reg.resolve("XYZ_NOT_A_STOCK").is_none());
        assert!(reg.resolve("").is_none());
    }

    #[test]
    fn test_resolved_class() {
        let reg = registry();
        assert_eq!(reg.resolve("五粮液").unwrap().class, InstrumentClass::DomesticEquity);
        assert_eq!(reg.resolve("腾讯").unwrap().class, InstrumentClass::HkEquity);
        assert_eq!(reg.resolve("特斯拉").unwrap().class, InstrumentClass::OtherEquity);
        assert_eq!(reg.resolve("上证指数").unwrap().class, InstrumentClass::Index);
    }

    #[test]
    fn test_add_stock_appends_or_updates_in_place() {
        let reg = SymbolRegistry::new(vec![SymbolEntry::new("Foo", "000001")]);
        reg.add_stock("Bar", "00005");
        reg.add_stock("Foo", "600000");
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.resolve("Foo").unwrap().code, "600000");
        assert_eq!(reg.resolve("Bar").unwrap().class, InstrumentClass::HkEquity);
        // Foo is still first in table order
        assert_eq!(reg.resolve("o").unwrap().code, "600000");
    }

    #[test]
    fn test_concurrent_registration_and_lookup() {
        let reg = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || {
                    reg.add_stock(&format!("Test{}", i), &format!("{:06}", i));
                    reg.resolve("茅台").map(|r| r.code)
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().as_deref(), Some("600519"));
        }
        assert_eq!(reg.len(), 27 + 8);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_code() {
        let reg = registry();
        let hits = reg.search("aapl");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.code == "AAPL" && h.listing_type == ListingType::UsShare));
        assert_eq!(reg.search("600519").len(), 2);
        assert!(reg.search("nothing-here").is_empty());
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let reg = registry();
        let all = reg.list(None, None);
        assert_eq!(all.count, 27);
        // indices classify by code shape in listings
        assert_eq!(all.types.a_share, 15);
        assert_eq!(all.types.hk_share, 5);
        assert_eq!(all.types.us_share, 7);
        let types: Vec<_> = all.data.iter().map(|l| l.listing_type).collect();
        let mut sorted = types.clone();
        sorted.sort();
        assert_eq!(types, sorted);

        let hk = reg.list(None, Some(ListingType::HkShare));
        assert_eq!(hk.count, 5);
        assert!(hk.data.iter().all(|l| l.listing_type == ListingType::HkShare));

        let searched = reg.list(Some("腾讯"), None);
        assert_eq!(searched.count, 2);
    }

    #[test]
    fn test_table_validation() {
        assert!(SymbolRegistry::from_json(r#"[{ "name": "", "code": "1" }]"#).is_err());
        assert!(SymbolRegistry::from_json("{}").is_err());
        let reg = SymbolRegistry::from_json(r#"[{ "name": "X", "code": "399001", "class": "index" }]"#).unwrap();
        assert_eq!(reg.resolve("X").unwrap().class, InstrumentClass::Index);
    }
}
