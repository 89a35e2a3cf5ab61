//! # Domain Module
//!
//! Business logic for the money box, independent of storage and of any
//! presentation layer.
//!
//! ## Stores
//!
//! - [`IncomeStore`]: income entries, the running total toward the next
//!   investment and the list sort preferences
//! - [`InvestmentStore`]: investment entries and the incomes that funded them
//!
//! Both stores change state only through the pure reducers in [`reducers`]
//! and queue every new state for persistence.
//!
//! ## Services
//!
//! - **Forms** ([`entry_forms`]): validate raw input and build records
//! - **Tables** ([`entry_table`]): sort and format entries for list display
//! - **Notifications** ([`notification_service`]): deliver investment prompts
//! - **Threshold** ([`threshold`]): when and how the running total is consumed

pub mod commands;
pub mod entry_forms;
pub mod entry_table;
pub mod errors;
pub mod income_store;
pub mod investment_store;
pub mod notification_service;
pub mod reducers;
pub mod threshold;

pub use entry_forms::{IncomeFormService, InvestmentFormService};
pub use entry_table::{DateFormat, EntryTableConfig, EntryTableService};
pub use errors::{EntryError, StoreError};
pub use income_store::{IncomeStore, INCOME_STORAGE_KEY};
pub use investment_store::{InvestmentStore, INVESTMENT_STORAGE_KEY};
pub use notification_service::{ChannelNotifier, InvestmentNotifier, LogNotifier};
pub use threshold::{ThresholdPolicy, ThresholdReset, DEFAULT_INVESTMENT_THRESHOLD};
