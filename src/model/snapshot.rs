//! The snapshot payload fetched from the backend, with both period views and the KPI block.

use crate::model::de::null_as_default;
use crate::model::{Amount, Budget, KpiBlock};
use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Which pre-bucketed section of the snapshot is being looked at.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Monthly,
    Yearly,
}

serde_plain::derive_display_from_serialize!(Period);
serde_plain::derive_fromstr_from_deserialize!(Period);

impl Period {
    /// The other period. Switching is always allowed.
    pub fn toggled(self) -> Self {
        match self {
            Period::Monthly => Period::Yearly,
            Period::Yearly => Period::Monthly,
        }
    }
}

/// Category label to summed amount, in the order the backend sent them.
///
/// Labels are kept exactly as received (case and whitespace included). Values that were not
/// numeric on the wire have already been coerced to zero.
#[derive(Debug, Default, Clone)]
pub struct PeriodBucketMap {
    entries: Vec<(String, Decimal)>,
    /// Exact label to its position in `entries`.
    positions: HashMap<String, usize>,
}

impl PeriodBucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bucket. A repeated label replaces the earlier value in place, so labels stay
    /// unique and keep their first position.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<Decimal>) {
        let label = label.into();
        let value = value.into();
        match self.positions.get(&label) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.positions.insert(label.clone(), self.entries.len());
                self.entries.push((label, value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, label: &str) -> Option<Decimal> {
        self.positions.get(label).map(|&i| self.entries[i].1)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }
}

impl PartialEq for PeriodBucketMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for PeriodBucketMap {}

impl Hash for PeriodBucketMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state);
    }
}

impl<S, D> FromIterator<(S, D)> for PeriodBucketMap
where
    S: Into<String>,
    D: Into<Decimal>,
{
    fn from_iter<T: IntoIterator<Item = (S, D)>>(iter: T) -> Self {
        let mut map = PeriodBucketMap::new();
        for (label, value) in iter {
            map.insert(label, value);
        }
        map
    }
}

impl Serialize for PeriodBucketMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

struct BucketVisitor;

impl<'de> Visitor<'de> for BucketVisitor {
    type Value = PeriodBucketMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of category labels to amounts")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = PeriodBucketMap::new();
        while let Some((label, amount)) = access.next_entry::<String, Amount>()? {
            map.insert(label, amount.value());
        }
        Ok(map)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(PeriodBucketMap::new())
    }
}

impl<'de> Deserialize<'de> for PeriodBucketMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(BucketVisitor)
    }
}

/// One period's worth of pre-bucketed data.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodView {
    #[serde(default)]
    expenses: PeriodBucketMap,
    #[serde(default)]
    income: PeriodBucketMap,
    #[serde(default, deserialize_with = "null_as_default")]
    budget: Vec<Budget>,
}

impl PeriodView {
    pub fn new(expenses: PeriodBucketMap, income: PeriodBucketMap, budget: Vec<Budget>) -> Self {
        Self {
            expenses,
            income,
            budget,
        }
    }

    pub fn expenses(&self) -> &PeriodBucketMap {
        &self.expenses
    }

    pub fn income(&self) -> &PeriodBucketMap {
        &self.income
    }

    pub fn budget(&self) -> &[Budget] {
        &self.budget
    }

    pub(crate) fn expenses_mut(&mut self) -> &mut PeriodBucketMap {
        &mut self.expenses
    }

    pub(crate) fn income_mut(&mut self) -> &mut PeriodBucketMap {
        &mut self.income
    }

    pub(crate) fn budget_mut(&mut self) -> &mut Vec<Budget> {
        &mut self.budget
    }
}

/// The full payload fetched once per refresh. It is replaced wholesale on the next fetch, never
/// merged.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    monthly: PeriodView,
    #[serde(default, deserialize_with = "null_as_default")]
    yearly: PeriodView,
    #[serde(default, deserialize_with = "null_as_default")]
    kpis: KpiBlock,
}

impl PeriodSnapshot {
    pub fn new(monthly: PeriodView, yearly: PeriodView, kpis: KpiBlock) -> Self {
        Self {
            monthly,
            yearly,
            kpis,
        }
    }

    /// The view for the selected `period`.
    pub fn view(&self, period: Period) -> &PeriodView {
        match period {
            Period::Monthly => &self.monthly,
            Period::Yearly => &self.yearly,
        }
    }

    pub fn kpis(&self) -> &KpiBlock {
        &self.kpis
    }

    pub(crate) fn view_mut(&mut self, period: Period) -> &mut PeriodView {
        match period {
            Period::Monthly => &mut self.monthly,
            Period::Yearly => &mut self.yearly,
        }
    }

    pub(crate) fn kpis_mut(&mut self) -> &mut KpiBlock {
        &mut self.kpis
    }
}
