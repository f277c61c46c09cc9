//! Types that represent the core data model, such as `CostRow` and `ReportWindow`.
mod amount;
mod costs;
mod row;
mod selector;
mod window;

pub use amount::{Amount, AmountError, DISPLAY_PLACES};
pub use costs::{
    CostAndUsage, CostQuery, GroupCost, PeriodCosts, COST_METRIC, SERVICE_DIMENSION,
};
pub use row::{CostRow, CostRows, UntaggedLabel, HEADERS, NO_TAG};
pub use selector::TagSelector;
pub use window::{ReportWindow, DATE_FORMAT};
