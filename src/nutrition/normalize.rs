use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::repo_types::{NormalizedRow, Nutrient, NutrientTable};
use crate::diary::{DayRecord, EntryRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmptyMeals {
    ZeroRow,
    Skip,
}

/// Flattens days into one row per entry, with a zero row for each empty meal.
pub fn normalize(days: &[DayRecord]) -> NutrientTable {
    build_table(days, EmptyMeals::ZeroRow)
}

/// Same flattening for the detail view: empty meals contribute no rows.
pub fn normalize_detail(day: &DayRecord) -> NutrientTable {
    build_table(std::slice::from_ref(day), EmptyMeals::Skip)
}

/// Known nutrients reported by an entry. Unusable values count as not reported;
/// keys naming the same nutrient in different case are added together.
fn entry_values(entry: &EntryRecord) -> BTreeMap<Nutrient, f64> {
    let mut values = BTreeMap::new();
    for (key, value) in &entry.totals {
        let Ok(nutrient) = key.parse::<Nutrient>() else {
            debug!(nutrient = %key, entry = %entry.name, "ignoring untracked nutrient");
            continue;
        };
        if value.is_finite() {
            *values.entry(nutrient).or_insert(0.0) += value.max(0.0);
        }
    }
    values
}

fn build_table(days: &[DayRecord], empty_meals: EmptyMeals) -> NutrientTable {
    let parsed: Vec<Vec<Vec<BTreeMap<Nutrient, f64>>>> = days
        .iter()
        .map(|day| {
            day.meals
                .iter()
                .map(|meal| meal.entries.iter().map(entry_values).collect())
                .collect()
        })
        .collect();

    let reported: BTreeSet<Nutrient> = parsed
        .iter()
        .flatten()
        .flatten()
        .flat_map(|values| values.keys().copied())
        .collect();
    // Nutrient::ALL order, columns nobody reported are dropped
    let columns: Vec<Nutrient> = Nutrient::ALL
        .into_iter()
        .filter(|n| reported.contains(n))
        .collect();

    let mut rows = Vec::new();
    for (day, day_values) in days.iter().zip(&parsed) {
        for (meal, meal_values) in day.meals.iter().zip(day_values) {
            if meal.entries.is_empty() {
                if empty_meals == EmptyMeals::ZeroRow {
                    rows.push(NormalizedRow {
                        date: day.date,
                        meal: meal.name.clone(),
                        description: None,
                        values: vec![0.0; columns.len()],
                    });
                }
                continue;
            }
            for (entry, values) in meal.entries.iter().zip(meal_values) {
                rows.push(NormalizedRow {
                    date: day.date,
                    meal: meal.name.clone(),
                    description: Some(entry.name.clone()),
                    values: columns
                        .iter()
                        .map(|c| values.get(c).copied().unwrap_or(0.0))
                        .collect(),
                });
            }
        }
    }

    NutrientTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::fake::{day, entry, meal};
    use time::macros::date;

    #[test]
    fn one_row_per_entry_in_input_order() {
        let days = vec![day(
            date!(2024 - 01 - 01),
            vec![
                meal(
                    "breakfast",
                    vec![
                        entry("Oats", &[("calories", 150.0), ("protein", 5.0)]),
                        entry("Coffee", &[("calories", 5.0)]),
                    ],
                ),
                meal("lunch", vec![entry("Soup", &[("calories", 220.0), ("sodium", 800.0)])]),
            ],
        )];
        let table = normalize(&days);

        assert_eq!(
            table.columns,
            vec![Nutrient::Calories, Nutrient::Protein, Nutrient::Sodium]
        );
        let descriptions: Vec<_> = table
            .rows
            .iter()
            .map(|r| r.description.as_deref().unwrap())
            .collect();
        assert_eq!(descriptions, ["Oats", "Coffee", "Soup"]);
        // coffee reports no protein or sodium
        assert_eq!(table.rows[1].values, vec![5.0, 0.0, 0.0]);
        assert_eq!(table.rows[2].values, vec![220.0, 0.0, 800.0]);
    }

    #[test]
    fn empty_meal_yields_a_zero_row() {
        let days = vec![
            day(
                date!(2024 - 01 - 01),
                vec![meal("breakfast", vec![entry("Eggs", &[("protein", 12.0)])])],
            ),
            day(date!(2024 - 01 - 02), vec![meal("breakfast", vec![])]),
        ];
        let table = normalize(&days);

        assert_eq!(table.rows.len(), 2);
        let zero = &table.rows[1];
        assert_eq!(zero.date, date!(2024 - 01 - 02));
        assert_eq!(zero.meal, "breakfast");
        assert_eq!(zero.description, None);
        assert_eq!(zero.values, vec![0.0]);
    }

    #[test]
    fn columns_absent_everywhere_are_dropped() {
        let days = vec![day(
            date!(2024 - 01 - 01),
            vec![
                meal("dinner", vec![entry("Rice", &[("carbohydrates", 45.0), ("potassium", 35.0)])]),
                meal("snacks", vec![]),
            ],
        )];
        let table = normalize(&days);
        assert_eq!(table.columns, vec![Nutrient::Carbohydrates]);
        assert!(table.rows.iter().all(|r| r.values.len() == 1));
    }

    #[test]
    fn all_empty_days_have_no_columns() {
        let days = vec![day(date!(2024 - 01 - 01), vec![meal("lunch", vec![])])];
        let table = normalize(&days);
        assert!(table.columns.is_empty());
        assert_eq!(table.rows.len(), 1);
        assert!(table.rows[0].values.is_empty());
    }

    #[test]
    fn negative_and_non_finite_values_are_cleaned() {
        let days = vec![day(
            date!(2024 - 01 - 01),
            vec![meal(
                "lunch",
                vec![entry("Odd", &[("fat", -3.0), ("sugar", f64::NAN)])],
            )],
        )];
        let table = normalize(&days);
        assert_eq!(table.columns, vec![Nutrient::Fat]);
        assert_eq!(table.rows[0].values, vec![0.0]);
    }

    #[test]
    fn same_nutrient_in_different_case_is_summed() {
        let days = vec![day(
            date!(2024 - 01 - 01),
            vec![meal(
                "dinner",
                vec![entry("Chili", &[("Protein", 12.0), ("protein", 8.0)])],
            )],
        )];
        let table = normalize(&days);
        assert_eq!(table.columns, vec![Nutrient::Protein]);
        assert_eq!(table.rows[0].values, vec![20.0]);
    }

    #[test]
    fn detail_skips_empty_meals() {
        let d = day(
            date!(2024 - 01 - 05),
            vec![
                meal(
                    "breakfast",
                    vec![
                        entry("Toast", &[("calories", 90.0)]),
                        entry("Jam", &[("calories", 40.0)]),
                    ],
                ),
                meal("lunch", vec![]),
            ],
        );
        let table = normalize_detail(&d);
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|r| r.meal == "breakfast"));
    }
}
