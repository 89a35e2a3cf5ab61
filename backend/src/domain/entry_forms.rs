//! Entry form domain logic for the money box.
//!
//! Validates raw form input and builds the records the stores consume. The
//! stores assume validated input, so a record that fails here is never
//! constructed.

use chrono::{DateTime, Utc};
use shared::{
    Category, Income, IncomeFormInput, IncomeFormValidation, IncomeValidationError, Investment,
    InvestmentFormInput, InvestmentFormValidation, InvestmentValidationError,
};
use uuid::Uuid;

pub const DEFAULT_OWNERS: [&str; 2] = ["DD", "RR"];

/// Generate an entry id: `<kind>::<epoch_millis>-<8 hex chars>`
pub fn generate_entry_id(kind: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}::{}-{}", kind, now.timestamp_millis(), &suffix[..8])
}

/// Strip currency symbols, thousands separators and spaces, then parse.
/// Only finite numbers are accepted.
pub fn parse_amount(input: &str) -> Result<f64, String> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();

    if cleaned.is_empty() {
        return Err("Empty amount after cleaning".to_string());
    }

    let amount = cleaned
        .parse::<f64>()
        .map_err(|e| format!("Invalid number format: {}", e))?;
    if !amount.is_finite() {
        return Err("Amount must be a finite number".to_string());
    }
    Ok(amount)
}

#[derive(Debug, Clone)]
pub struct IncomeFormService {
    owners: Vec<String>,
    default_owner: String,
}

impl Default for IncomeFormService {
    fn default() -> Self {
        Self::new(
            DEFAULT_OWNERS.iter().map(|o| o.to_string()).collect(),
            DEFAULT_OWNERS[0].to_string(),
        )
    }
}

impl IncomeFormService {
    pub fn new(owners: Vec<String>, default_owner: String) -> Self {
        Self {
            owners,
            default_owner,
        }
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    /// A blank form, as shown when adding a new income
    pub fn blank_input(&self, now: DateTime<Utc>) -> IncomeFormInput {
        IncomeFormInput {
            profit: String::new(),
            category: Category::default().label().to_string(),
            date: now,
            owner: self.default_owner.clone(),
            comments: String::new(),
        }
    }

    /// Prefill the form from an existing income for editing
    pub fn input_from_income(income: &Income) -> IncomeFormInput {
        IncomeFormInput {
            profit: income.profit.to_string(),
            category: income.category.label().to_string(),
            date: income.date,
            owner: income.owner.clone(),
            comments: income.comments.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self, input: &IncomeFormInput) -> IncomeFormValidation {
        let mut errors = Vec::new();

        let cleaned_profit = if input.profit.trim().is_empty() {
            errors.push(IncomeValidationError::EmptyProfit);
            None
        } else {
            match parse_amount(&input.profit) {
                Ok(profit) => Some(profit),
                Err(e) => {
                    errors.push(IncomeValidationError::InvalidProfit(e));
                    None
                }
            }
        };

        let cleaned_category = match input.category.parse::<Category>() {
            Ok(category) => Some(category),
            Err(_) => {
                errors.push(IncomeValidationError::UnknownCategory(input.category.clone()));
                None
            }
        };

        if !self.owners.iter().any(|o| o == input.owner.trim()) {
            errors.push(IncomeValidationError::UnknownOwner(input.owner.clone()));
        }

        IncomeFormValidation {
            is_valid: errors.is_empty(),
            errors,
            cleaned_profit,
            cleaned_category,
        }
    }

    /// Validate and build an income. `existing_id` keeps the id when editing;
    /// a fresh id is generated otherwise. The snapshot total is
    /// `current_total + profit`.
    pub fn build(
        &self,
        input: &IncomeFormInput,
        current_total: f64,
        existing_id: Option<&str>,
    ) -> Result<Income, Vec<IncomeValidationError>> {
        let validation = self.validate(input);
        let (Some(profit), Some(category)) = (validation.cleaned_profit, validation.cleaned_category)
        else {
            return Err(validation.errors);
        };
        if !validation.is_valid {
            return Err(validation.errors);
        }

        let comments = Some(input.comments.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Income {
            id: existing_id
                .map(str::to_string)
                .unwrap_or_else(|| generate_entry_id("income", Utc::now())),
            date: input.date,
            category,
            profit,
            owner: input.owner.trim().to_string(),
            comments,
            total_income_at_time: Some(current_total + profit),
        })
    }

    pub fn error_message(&self, error: &IncomeValidationError) -> String {
        match error {
            IncomeValidationError::EmptyProfit | IncomeValidationError::InvalidProfit(_) => {
                "Profit is required and must be a valid number.".to_string()
            }
            IncomeValidationError::UnknownCategory(category) => {
                format!("Unknown category: {}", category)
            }
            IncomeValidationError::UnknownOwner(owner) => {
                format!("Owner must be one of {}, got {:?}", self.owners.join(", "), owner)
            }
        }
    }

    /// Get the first error message (for displaying a single inline error)
    pub fn first_error_message(&self, errors: &[IncomeValidationError]) -> Option<String> {
        errors.first().map(|e| self.error_message(e))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvestmentFormService;

impl InvestmentFormService {
    pub fn new() -> Self {
        Self
    }

    pub fn blank_input(now: DateTime<Utc>) -> InvestmentFormInput {
        InvestmentFormInput {
            stock_name: String::new(),
            stock_price: String::new(),
            date: now,
            related_incomes: Vec::new(),
        }
    }

    pub fn input_from_investment(investment: &Investment) -> InvestmentFormInput {
        InvestmentFormInput {
            stock_name: investment.stock_name.clone(),
            stock_price: investment.stock_price.to_string(),
            date: investment.date,
            related_incomes: investment.related_incomes.clone(),
        }
    }

    pub fn validate(&self, input: &InvestmentFormInput) -> InvestmentFormValidation {
        let mut errors = Vec::new();

        if input.stock_name.trim().is_empty() {
            errors.push(InvestmentValidationError::EmptyStockName);
        }

        let cleaned_price = if input.stock_price.trim().is_empty() {
            errors.push(InvestmentValidationError::EmptyStockPrice);
            None
        } else {
            match parse_amount(&input.stock_price) {
                Ok(price) if price <= 0.0 => {
                    errors.push(InvestmentValidationError::PriceNotPositive);
                    None
                }
                Ok(price) => Some(price),
                Err(e) => {
                    errors.push(InvestmentValidationError::InvalidStockPrice(e));
                    None
                }
            }
        };

        InvestmentFormValidation {
            is_valid: errors.is_empty(),
            errors,
            cleaned_price,
        }
    }

    /// Validate and build an investment. Related income ids are kept in
    /// order with duplicates removed; they are not checked against the
    /// income store.
    pub fn build(
        &self,
        input: &InvestmentFormInput,
        existing_id: Option<&str>,
    ) -> Result<Investment, Vec<InvestmentValidationError>> {
        let validation = self.validate(input);
        let Some(stock_price) = validation.cleaned_price.filter(|_| validation.is_valid) else {
            return Err(validation.errors);
        };

        let mut related_incomes: Vec<String> = Vec::with_capacity(input.related_incomes.len());
        for id in &input.related_incomes {
            if !related_incomes.contains(id) {
                related_incomes.push(id.clone());
            }
        }

        Ok(Investment {
            id: existing_id
                .map(str::to_string)
                .unwrap_or_else(|| generate_entry_id("investment", Utc::now())),
            date: input.date,
            stock_name: input.stock_name.trim().to_string(),
            stock_price,
            related_incomes,
        })
    }

    pub fn error_message(&self, error: &InvestmentValidationError) -> String {
        match error {
            InvestmentValidationError::EmptyStockName | InvestmentValidationError::EmptyStockPrice => {
                "Please enter stock name and price.".to_string()
            }
            InvestmentValidationError::InvalidStockPrice(_) => {
                "Stock price must be a valid number.".to_string()
            }
            InvestmentValidationError::PriceNotPositive => {
                "Stock price must be greater than 0.".to_string()
            }
        }
    }
}
