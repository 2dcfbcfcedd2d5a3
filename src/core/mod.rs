mod engine;
mod input;
mod tax;
mod types;

pub use engine::{run_comparison, simulate_projection};
pub use input::{
    ComparisonInput, ComparisonParams, CountryParams, InputError, MAX_HORIZON_YEARS,
    ScenarioParams,
};
pub use tax::compute_tax_breakdown;
pub use types::{
    CapitalGainsRule, ComparisonResult, Country, CountryId, CountrySummary, IncomeType,
    ProjectionOutcome, Scenario, ScenarioBand, ScenarioId, SocialSecurityMode, SocialSecurityRule,
    TaxBreakdown, YearPoint,
};
