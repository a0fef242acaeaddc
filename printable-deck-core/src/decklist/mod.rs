use std::fmt;

/// One catalog entry to look up, as written on a line of the input list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemName(String);

impl ItemName {
    /// Trims the input; blank input is not a name.
    pub fn new(raw: &str) -> Option<ItemName> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ItemName(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split an item list into names, one per non-blank line, keeping input order
/// and duplicates (two lines of "Island" print two Islands).
pub fn parse_item_names(list: &str) -> Vec<ItemName> {
    let names: Vec<ItemName> = list.lines().filter_map(ItemName::new).collect();
    log::debug!("Parsed {} item names from input list", names.len());
    names
}
