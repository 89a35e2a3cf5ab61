use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Income category, serialized by its display label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Second-hand Sell")]
    SecondHandSell,
    #[serde(rename = "Fruit Sell")]
    FruitSell,
    Cashback,
    Investment,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::SecondHandSell,
        Category::FruitSell,
        Category::Cashback,
        Category::Investment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::SecondHandSell => "Second-hand Sell",
            Category::FruitSell => "Fruit Sell",
            Category::Cashback => "Cashback",
            Category::Investment => "Investment",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::SecondHandSell
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// A single logged income entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    /// Unique, stable identifier
    pub id: String,
    /// When the income was earned (RFC 3339 when persisted)
    pub date: DateTime<Utc>,
    pub category: Category,
    /// Signed amount; the app treats it as non-negative
    pub profit: f64,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Running total snapshot taken when the entry was saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_income_at_time: Option<f64>,
}

/// A single logged investment entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub date: DateTime<Utc>,
    pub stock_name: String,
    pub stock_price: f64,
    /// Ids of the incomes that funded this investment. Ids that no longer
    /// resolve to an income are kept as-is.
    #[serde(default)]
    pub related_incomes: Vec<String>,
}

/// Column the income list is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Profit,
    Category,
}

impl Default for SortField {
    fn default() -> Self {
        SortField::Date
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "profit" => Ok(SortField::Profit),
            "category" => Ok(SortField::Category),
            other => Err(format!("Unknown sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Full state of the income store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeState {
    /// Records in insertion order (never sort order)
    pub incomes: Vec<Income>,
    /// Running total since the last threshold crossing
    pub total_income: f64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// Runtime-only; never persisted
    #[serde(skip)]
    pub is_hydrated: bool,
}

impl Default for IncomeState {
    fn default() -> Self {
        Self {
            incomes: Vec::new(),
            total_income: 0.0,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            is_hydrated: false,
        }
    }
}

/// Full state of the investment store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestmentState {
    pub investments: Vec<Investment>,
    #[serde(skip)]
    pub is_hydrated: bool,
}

/// Signal raised when the running income total crosses the investment threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentOpportunity {
    pub threshold: f64,
    /// Running total right after the triggering entry, before the threshold was consumed
    pub total_before: f64,
    /// Running total left after the threshold was consumed
    pub carried_over: f64,
    pub title: String,
    pub body: String,
}

/// Raw input from the income form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeFormInput {
    pub profit: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub owner: String,
    pub comments: String,
}

/// Raw input from the investment form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentFormInput {
    pub stock_name: String,
    pub stock_price: String,
    pub date: DateTime<Utc>,
    pub related_incomes: Vec<String>,
}

/// Validation result for the income form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeFormValidation {
    pub is_valid: bool,
    pub errors: Vec<IncomeValidationError>,
    pub cleaned_profit: Option<f64>,
    pub cleaned_category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IncomeValidationError {
    EmptyProfit,
    InvalidProfit(String),
    UnknownCategory(String),
    UnknownOwner(String),
}

/// Validation result for the investment form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentFormValidation {
    pub is_valid: bool,
    pub errors: Vec<InvestmentValidationError>,
    pub cleaned_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvestmentValidationError {
    EmptyStockName,
    EmptyStockPrice,
    InvalidStockPrice(String),
    PriceNotPositive,
}

/// An income row formatted for list display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedIncome {
    pub id: String,
    pub formatted_date: String,
    pub category: String,
    pub formatted_profit: String,
    pub owner: String,
    pub comments: String,
    pub raw_profit: f64,
}

/// An investment row formatted for list display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedInvestment {
    pub id: String,
    pub formatted_date: String,
    pub stock_name: String,
    pub formatted_price: String,
    pub raw_price: f64,
}
