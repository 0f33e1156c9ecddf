use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::dates::iso_date;

/// One calendar day as logged in the diary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default)]
    pub meals: Vec<MealRecord>,
}

/// A named meal (breakfast, lunch, dinner, snacks) and what was logged in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<EntryRecord>,
}

/// A single logged food with its nutrient totals, keyed by nutrient name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub name: String,
    #[serde(default)]
    pub totals: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSample {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub value: f64,
}

impl DayRecord {
    pub fn entry_count(&self) -> usize {
        self.meals.iter().map(|m| m.entries.len()).sum()
    }
}
