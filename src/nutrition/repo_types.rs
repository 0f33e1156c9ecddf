use std::str::FromStr;

use serde::Serialize;
use time::Date;

/// Nutrient columns tracked by the dashboard, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Carbohydrates,
    Fat,
    Protein,
    Sodium,
    Fiber,
    Sugar,
}

impl Nutrient {
    pub const ALL: [Nutrient; 7] = [
        Nutrient::Calories,
        Nutrient::Carbohydrates,
        Nutrient::Fat,
        Nutrient::Protein,
        Nutrient::Sodium,
        Nutrient::Fiber,
        Nutrient::Sugar,
    ];

    /// Fat, carbohydrates and protein: the bars of the per-meal chart.
    pub const MACROS: [Nutrient; 3] = [Nutrient::Fat, Nutrient::Carbohydrates, Nutrient::Protein];

    pub fn as_str(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Fat => "fat",
            Nutrient::Protein => "protein",
            Nutrient::Sodium => "sodium",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
        }
    }
}

impl FromStr for Nutrient {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nutrient::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// One flattened diary line: an entry, or the zero placeholder of an empty meal.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub date: Date,
    pub meal: String,
    pub description: Option<String>,
    /// Aligned with `NutrientTable::columns`.
    pub values: Vec<f64>,
}

/// Normalized rows sharing one column set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NutrientTable {
    pub columns: Vec<Nutrient>,
    pub rows: Vec<NormalizedRow>,
}
