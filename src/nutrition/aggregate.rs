//! Group/sum/mean rollups over a normalized table.
//!
//! Entries are first summed per (date, meal); day totals and per-meal means are
//! both computed from those meal totals, never from raw entries.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use time::Date;

use super::repo_types::{Nutrient, NutrientTable};
use crate::dates::iso_date;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealTotals {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meal: String,
    pub totals: BTreeMap<Nutrient, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub totals: BTreeMap<Nutrient, f64>,
}

impl DailyTotals {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.totals.get(&nutrient).copied().unwrap_or(0.0)
    }
}

/// Average macros of one meal across the dates it appears on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealMacros {
    pub meal: String,
    pub fat: f64,
    pub carbohydrates: f64,
    pub protein: f64,
}

fn add_into(acc: &mut [f64], values: &[f64]) {
    for (a, v) in acc.iter_mut().zip(values) {
        *a += v;
    }
}

fn labelled(columns: &[Nutrient], values: &[f64]) -> BTreeMap<Nutrient, f64> {
    columns.iter().copied().zip(values.iter().copied()).collect()
}

/// Per-(date, meal) sums, in first-seen order.
pub fn sum_by_date_and_meal(table: &NutrientTable) -> Vec<MealTotals> {
    let width = table.columns.len();
    let mut order: Vec<(Date, &str)> = Vec::new();
    let mut sums: HashMap<(Date, &str), Vec<f64>> = HashMap::new();

    for row in &table.rows {
        let key = (row.date, row.meal.as_str());
        let acc = sums.entry(key).or_insert_with(|| {
            order.push(key);
            vec![0.0; width]
        });
        add_into(acc, &row.values);
    }

    order
        .into_iter()
        .map(|key| MealTotals {
            date: key.0,
            meal: key.1.to_string(),
            totals: labelled(&table.columns, &sums[&key]),
        })
        .collect()
}

/// Day totals across all meals; exactly one entry per distinct date, ascending.
pub fn aggregate_by_date(table: &NutrientTable) -> Vec<DailyTotals> {
    let mut by_date: BTreeMap<Date, BTreeMap<Nutrient, f64>> = BTreeMap::new();
    for meal in sum_by_date_and_meal(table) {
        let day = by_date.entry(meal.date).or_insert_with(|| {
            table.columns.iter().map(|c| (*c, 0.0)).collect()
        });
        for (nutrient, value) in meal.totals {
            *day.entry(nutrient).or_insert(0.0) += value;
        }
    }

    by_date
        .into_iter()
        .map(|(date, totals)| DailyTotals { date, totals })
        .collect()
}

/// Mean fat/carbohydrates/protein per meal over its per-date meal totals.
///
/// Meals keep first-seen order. A macro column dropped by normalization reads as zero.
pub fn aggregate_mean_by_meal(table: &NutrientTable) -> Vec<MealMacros> {
    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, ([f64; 3], usize)> = HashMap::new();

    for meal in sum_by_date_and_meal(table) {
        let macros = Nutrient::MACROS.map(|n| meal.totals.get(&n).copied().unwrap_or(0.0));
        let slot = acc.entry(meal.meal.clone()).or_insert_with(|| {
            order.push(meal.meal.clone());
            ([0.0; 3], 0)
        });
        add_into(&mut slot.0, &macros);
        slot.1 += 1;
    }

    order
        .into_iter()
        .map(|meal| {
            let (sums, count) = acc[&meal];
            let n = count as f64;
            MealMacros {
                meal,
                fat: sums[0] / n,
                carbohydrates: sums[1] / n,
                protein: sums[2] / n,
            }
        })
        .collect()
}
