//! Entry table domain logic for the money box.
//!
//! Turns stored incomes and investments into list-ready rows and derives the
//! sorted income view. Storage order is never touched: sorting always works
//! on a copy.
//!
//! ## Key Responsibilities
//!
//! - **Sorted View**: Ordering incomes by date, profit or category
//! - **Amount Formatting**: `$12.50` style amounts
//! - **Date Formatting**: Short (`01/20/2025`), ISO, or long dates
//! - **Placeholders**: `N/A` for missing comments

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use shared::{FormattedIncome, FormattedInvestment, Income, Investment, SortField, SortOrder};
use std::cmp::Ordering;

/// Date formatting options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// "01/20/2025"
    #[default]
    ShortDate,
    /// "2025-01-20"
    Iso,
    /// "January 20, 2025"
    MonthDayYear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryTableConfig {
    pub date_format: DateFormat,
    pub currency_symbol: String,
}

impl Default for EntryTableConfig {
    fn default() -> Self {
        Self {
            date_format: DateFormat::ShortDate,
            currency_symbol: "$".to_string(),
        }
    }
}

/// Sort a copy of `incomes` for display. Ties keep storage order.
pub fn sort_incomes(incomes: &[Income], field: SortField, order: SortOrder) -> Vec<Income> {
    let mut sorted = incomes.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare_incomes(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

fn compare_incomes(a: &Income, b: &Income, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Profit => a.profit.total_cmp(&b.profit),
        SortField::Category => a.category.label().cmp(b.category.label()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryTableService {
    config: EntryTableConfig,
}

impl EntryTableService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EntryTableConfig) -> Self {
        Self { config }
    }

    pub fn format_incomes(&self, incomes: &[Income]) -> Vec<FormattedIncome> {
        incomes.iter().map(|i| self.format_income(i)).collect()
    }

    pub fn format_income(&self, income: &Income) -> FormattedIncome {
        let comments = income
            .comments
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("N/A");

        FormattedIncome {
            id: income.id.clone(),
            formatted_date: self.format_date(&income.date),
            category: income.category.label().to_string(),
            formatted_profit: self.format_amount(income.profit),
            owner: income.owner.clone(),
            comments: comments.to_string(),
            raw_profit: income.profit,
        }
    }

    pub fn format_investments(&self, investments: &[Investment]) -> Vec<FormattedInvestment> {
        investments
            .iter()
            .map(|i| FormattedInvestment {
                id: i.id.clone(),
                formatted_date: self.format_date(&i.date),
                stock_name: i.stock_name.clone(),
                formatted_price: self.format_amount(i.stock_price),
                raw_price: i.stock_price,
            })
            .collect()
    }

    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        match self.config.date_format {
            DateFormat::ShortDate => {
                format!("{:02}/{:02}/{}", date.month(), date.day(), date.year())
            }
            DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
            DateFormat::MonthDayYear => date.format("%B %-d, %Y").to_string(),
        }
    }

    pub fn format_amount(&self, amount: f64) -> String {
        if amount < 0.0 {
            format!("-{}{:.2}", self.config.currency_symbol, amount.abs())
        } else {
            format!("{}{:.2}", self.config.currency_symbol, amount)
        }
    }
}
