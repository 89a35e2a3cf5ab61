//! Domain-level actions and mutation results.
//! Actions are the only legal way to change a store's state; each one is
//! applied by a pure reducer in [`super::reducers`].

pub mod income {
    use serde::{Deserialize, Serialize};
    use shared::{Income, InvestmentOpportunity, SortField};

    #[derive(Debug, Clone, PartialEq)]
    pub enum IncomeAction {
        Add(Income),
        /// Replace the record sharing this record's id
        Edit(Income),
        Delete(String),
        SetSorting(SortField),
    }

    /// How deleting an income affects the running total
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DeletePolicy {
        /// Leave the running total untouched
        #[default]
        KeepTotal,
        /// Deduct the removed profit, never going below zero
        DeductProfit,
    }

    /// Result of a successful income mutation.
    #[derive(Debug, Clone, PartialEq)]
    pub struct IncomeMutation {
        /// Running total after the mutation
        pub total_income: f64,
        /// Set when this mutation crossed the investment threshold
        pub opportunity: Option<InvestmentOpportunity>,
    }
}

pub mod investment {
    use shared::Investment;

    #[derive(Debug, Clone, PartialEq)]
    pub enum InvestmentAction {
        Add(Investment),
        Update(Investment),
        Remove(String),
    }

    /// Related income ids of one investment, split by whether they still resolve
    #[derive(Debug, Clone, PartialEq)]
    pub struct RelatedIncomes {
        pub found: Vec<shared::Income>,
        pub dangling: Vec<String>,
    }
}
