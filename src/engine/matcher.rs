//! Resolves budget category labels against expense bucket labels.
//!
//! Labels are compared after lowercasing and trimming. Rather than re-normalizing on every lookup,
//! a `CategoryIndex` canonicalizes a bucket map's labels once and answers exact-match queries.

use crate::model::PeriodBucketMap;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

/// The one canonical form used for all category comparisons.
pub fn canonical(label: &str) -> String {
    label.to_lowercase().trim().to_string()
}

/// Returns the first key in `keys`, in the given order, whose canonical form equals that of
/// `budget_category`. No match is not an error.
pub fn match_category<'a, I, S>(budget_category: &str, keys: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    let wanted = canonical(budget_category);
    keys.into_iter()
        .map(<S as AsRef<str>>::as_ref)
        .find(|k| canonical(k) == wanted)
}

/// A bucket map keyed by canonical label.
///
/// When two labels canonicalize to the same key, the first one encountered wins and the later one
/// is dropped from the index with a warning. The source map is left untouched.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct CategoryIndex<'a> {
    by_key: HashMap<String, (&'a str, Decimal)>,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(map: &'a PeriodBucketMap) -> Self {
        let mut by_key: HashMap<String, (&'a str, Decimal)> = HashMap::with_capacity(map.len());
        for (label, value) in map.iter() {
            let key = canonical(label);
            match by_key.get(&key) {
                Some((kept, _)) => {
                    warn!("Category '{label}' collides with '{kept}' and will not be matched")
                }
                None => {
                    by_key.insert(key, (label, value));
                }
            }
        }
        Self { by_key }
    }

    /// The original label and amount matching `category`, if any.
    pub fn lookup(&self, category: &str) -> Option<(&'a str, Decimal)> {
        self.by_key.get(&canonical(category)).copied()
    }

    /// The amount matching `category`, or zero.
    pub fn amount_or_zero(&self, category: &str) -> Decimal {
        self.lookup(category).map(|(_, v)| v).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_ignores_case_and_whitespace() {
        assert_eq!(match_category("Food", ["  food  "].iter()), Some("  food  "));
        assert_eq!(match_category(" TRANSPORT", ["Food", "transport"].iter()), Some("transport"));
    }

    #[test]
    fn test_match_none() {
        assert_eq!(match_category("Rent", ["Food", "Bills"].iter()), None);
        let empty: Vec<String> = Vec::new();
        assert_eq!(match_category("Rent", empty.iter()), None);
    }

    #[test]
    fn test_match_first_wins() {
        let keys = vec!["FOOD".to_string(), "food ".to_string()];
        assert_eq!(match_category("food", keys.iter()), Some("FOOD"));
    }

    #[test]
    fn test_index_lookup() {
        let map: PeriodBucketMap = [("  Food ", Decimal::from(100)), ("Transport", Decimal::from(50))]
            .into_iter()
            .collect();
        let index = CategoryIndex::new(&map);
        assert_eq!(index.lookup("food"), Some(("  Food ", Decimal::from(100))));
        assert_eq!(index.amount_or_zero("TRANSPORT"), Decimal::from(50));
        assert_eq!(index.amount_or_zero("Rent"), Decimal::ZERO);
    }

    #[test]
    fn test_index_collision_first_write_wins() {
        let map: PeriodBucketMap = [("Food", Decimal::from(10)), ("food", Decimal::from(99))]
            .into_iter()
            .collect();
        let index = CategoryIndex::new(&map);
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup("FOOD"), Some(("Food", Decimal::from(10))));
        // agrees with the linear matcher
        assert_eq!(match_category("FOOD", map.labels().collect::<Vec<_>>()), Some("Food"));
    }
}
