//! Pure state reducers: `(state, action) -> next state`.
//!
//! Reducers never perform I/O and never mutate their input. The stores
//! replace their whole state with the returned one and persist it separately.

pub mod income {
    use shared::IncomeState;

    use crate::domain::commands::income::{DeletePolicy, IncomeAction, IncomeMutation};
    use crate::domain::errors::StoreError;
    use crate::domain::threshold::ThresholdPolicy;

    /// Rules applied by the income reducer
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct IncomePolicy {
        pub threshold: ThresholdPolicy,
        pub delete: DeletePolicy,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct IncomeTransition {
        pub state: IncomeState,
        pub mutation: IncomeMutation,
    }

    pub fn reduce(
        state: &IncomeState,
        action: IncomeAction,
        policy: &IncomePolicy,
    ) -> Result<IncomeTransition, StoreError> {
        let mut next = state.clone();

        let opportunity = match action {
            IncomeAction::Add(income) => {
                if next.incomes.iter().any(|i| i.id == income.id) {
                    return Err(StoreError::DuplicateId {
                        kind: "income",
                        id: income.id,
                    });
                }
                let outcome = policy.threshold.apply(next.total_income, income.profit);
                next.total_income = outcome.total;
                next.incomes.push(income);
                outcome.opportunity
            }
            IncomeAction::Edit(updated) => {
                let index = position(&next, &updated.id)?;
                // Reverse the old entry first so the threshold is checked
                // against the new profit only once
                let reversed = next.total_income - next.incomes[index].profit;
                let outcome = policy.threshold.apply(reversed, updated.profit);
                next.total_income = outcome.total;
                next.incomes[index] = updated;
                outcome.opportunity
            }
            IncomeAction::Delete(id) => {
                let index = position(&next, &id)?;
                let removed = next.incomes.remove(index);
                match policy.delete {
                    DeletePolicy::KeepTotal => None,
                    DeletePolicy::DeductProfit => {
                        // A negative profit raises the total, so it can cross too
                        let outcome = policy.threshold.apply(next.total_income, -removed.profit);
                        next.total_income = match outcome.opportunity {
                            Some(_) => outcome.total,
                            None => outcome.total.max(0.0),
                        };
                        outcome.opportunity
                    }
                }
            }
            IncomeAction::SetSorting(field) => {
                next.sort_by = field;
                next.sort_order = next.sort_order.toggled();
                None
            }
        };

        Ok(IncomeTransition {
            mutation: IncomeMutation {
                total_income: next.total_income,
                opportunity,
            },
            state: next,
        })
    }

    fn position(state: &IncomeState, id: &str) -> Result<usize, StoreError> {
        state
            .incomes
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "income",
                id: id.to_string(),
            })
    }

}

pub mod investment {
    use shared::InvestmentState;

    use crate::domain::commands::investment::InvestmentAction;
    use crate::domain::errors::StoreError;

    pub fn reduce(
        state: &InvestmentState,
        action: InvestmentAction,
    ) -> Result<InvestmentState, StoreError> {
        let mut next = state.clone();
        match action {
            InvestmentAction::Add(investment) => {
                if next.investments.iter().any(|i| i.id == investment.id) {
                    return Err(StoreError::DuplicateId {
                        kind: "investment",
                        id: investment.id,
                    });
                }
                next.investments.push(investment);
            }
            InvestmentAction::Update(updated) => {
                let index = position(&next, &updated.id)?;
                next.investments[index] = updated;
            }
            InvestmentAction::Remove(id) => {
                let index = position(&next, &id)?;
                next.investments.remove(index);
            }
        }
        Ok(next)
    }

    fn position(state: &InvestmentState, id: &str) -> Result<usize, StoreError> {
        state
            .investments
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "investment",
                id: id.to_string(),
            })
    }

}
