use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use super::aggregate::{DailyTotals, MealMacros};
use super::repo_types::{Nutrient, NutrientTable};
use crate::dates::{format_day, iso_date};
use crate::diary::WeightSample;

/// Date range as typed by the user; parsed by the handler so bad input gets our message.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub calories: f64,
    pub totals: BTreeMap<Nutrient, f64>,
}

impl From<DailyTotals> for DailyPoint {
    fn from(d: DailyTotals) -> Self {
        Self {
            date: d.date,
            calories: d.get(Nutrient::Calories),
            totals: d.totals,
        }
    }
}

/// Everything the calorie/weight chart and the per-meal macro chart need.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
    pub columns: Vec<Nutrient>,
    pub daily: Vec<DailyPoint>,
    pub weight: Vec<WeightSample>,
    pub macros_by_meal: Vec<MealMacros>,
    pub missing_days: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub id: String,
}

impl ColumnDef {
    fn named(name: &str) -> Self {
        Self {
            name: name.into(),
            id: name.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DetailRow {
    pub date: String,
    pub meal: String,
    pub description: String,
    #[serde(flatten)]
    pub nutrients: BTreeMap<Nutrient, f64>,
}

/// Table rows for one day: `date, meal, description, <nutrients>`.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<DetailRow>,
}

impl From<NutrientTable> for DetailResponse {
    fn from(table: NutrientTable) -> Self {
        let columns = ["date", "meal", "description"]
            .into_iter()
            .map(ColumnDef::named)
            .chain(table.columns.iter().map(|n| ColumnDef::named(n.as_str())))
            .collect();

        let rows = table
            .rows
            .into_iter()
            .map(|row| DetailRow {
                date: format_day(row.date),
                meal: row.meal,
                description: row.description.unwrap_or_default(),
                nutrients: table.columns.iter().copied().zip(row.values).collect(),
            })
            .collect();

        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::repo_types::NormalizedRow;
    use time::macros::date;

    #[test]
    fn detail_columns_lead_with_row_identity() {
        let table = NutrientTable {
            columns: vec![Nutrient::Calories, Nutrient::Protein],
            rows: vec![NormalizedRow {
                date: date!(2024 - 02 - 10),
                meal: "lunch".into(),
                description: Some("Wrap".into()),
                values: vec![410.0, 22.0],
            }],
        };
        let detail = DetailResponse::from(table);
        let names: Vec<&str> = detail.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["date", "meal", "description", "calories", "protein"]);

        let json = serde_json::to_value(&detail.rows[0]).unwrap();
        assert_eq!(json["date"], "2024-02-10");
        assert_eq!(json["description"], "Wrap");
        assert_eq!(json["calories"], 410.0);
        assert_eq!(json["protein"], 22.0);
    }

    #[test]
    fn daily_point_serializes_calories_and_date() {
        let point = DailyPoint::from(DailyTotals {
            date: date!(2024 - 02 - 10),
            totals: [(Nutrient::Calories, 1800.0), (Nutrient::Fat, 60.0)].into(),
        });
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["date"], "2024-02-10");
        assert_eq!(json["calories"], 1800.0);
        assert_eq!(json["totals"]["fat"], 60.0);
    }
}
