use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use super::types::{
    CapitalGainsRule, Country, CountryId, IncomeType, Scenario, ScenarioId, SocialSecurityMode,
    SocialSecurityRule,
};

pub const MAX_HORIZON_YEARS: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NonFinite { field: String },

    #[error("{field} must be > 0, got {value}")]
    NotPositive { field: String, value: f64 },

    #[error("{field} must be >= 0, got {value}")]
    Negative { field: String, value: f64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("timeHorizon must be between 1 and {max} years, got {years}")]
    InvalidHorizon { years: u32, max: u32 },

    #[error("at least one {kind} is required")]
    Empty { kind: &'static str },

    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
}

/// Unchecked country rules as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryParams {
    pub name: String,
    pub tax_rate: f64,
    pub social_security_rate: f64,
    pub social_security_mode: SocialSecurityMode,
    pub dividend_tax_rate: f64,
    pub is_isk: bool,
    pub isk_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioParams {
    pub name: String,
    pub annual_return_rate: f64,
}

/// Unchecked comparison request. `annual_income` is already a yearly figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonParams {
    pub annual_income: f64,
    pub income_type: IncomeType,
    pub investment_percentage: f64,
    pub starting_investment: f64,
    pub time_horizon_years: u32,
    pub countries: Vec<CountryParams>,
    pub scenarios: Vec<ScenarioParams>,
    pub include_extra_costs: bool,
    pub extra_costs: BTreeMap<String, f64>,
    pub selected_scenario: String,
    pub currency_label: String,
}

/// A comparison request that passed validation. Only obtainable through
/// [`ComparisonInput::new`], so the engine never re-checks bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonInput {
    annual_income: f64,
    income_type: IncomeType,
    investment_percentage: f64,
    starting_investment: f64,
    time_horizon_years: u32,
    countries: Vec<Country>,
    scenarios: Vec<Scenario>,
    selected_scenario: Option<ScenarioId>,
    currency_label: String,
}

impl ComparisonInput {
    pub fn new(params: ComparisonParams) -> Result<Self, InputError> {
        check_finite("annualIncome", params.annual_income)?;
        if params.annual_income <= 0.0 {
            return Err(InputError::NotPositive {
                field: "annualIncome".to_string(),
                value: params.annual_income,
            });
        }
        check_percent("investmentPercentage", params.investment_percentage)?;
        check_non_negative("startingInvestment", params.starting_investment)?;

        if params.time_horizon_years == 0 || params.time_horizon_years > MAX_HORIZON_YEARS {
            return Err(InputError::InvalidHorizon {
                years: params.time_horizon_years,
                max: MAX_HORIZON_YEARS,
            });
        }

        if params.countries.is_empty() {
            return Err(InputError::Empty { kind: "country" });
        }
        if params.scenarios.is_empty() {
            return Err(InputError::Empty { kind: "scenario" });
        }
        check_unique_names("country", params.countries.iter().map(|c| c.name.as_str()))?;
        check_unique_names("scenario", params.scenarios.iter().map(|s| s.name.as_str()))?;

        for (name, cost) in &params.extra_costs {
            check_non_negative(&format!("extraCosts.{name}"), *cost)?;
        }

        let countries = params
            .countries
            .iter()
            .map(|country| {
                let extra_cost = if params.include_extra_costs {
                    params.extra_costs.get(&country.name).copied().unwrap_or(0.0)
                } else {
                    0.0
                };
                build_country(country, extra_cost)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let scenarios = params
            .scenarios
            .into_iter()
            .map(|scenario| {
                check_percent(
                    &format!("{}.rate", scenario.name),
                    scenario.annual_return_rate,
                )?;
                Ok(Scenario {
                    name: scenario.name,
                    annual_return_rate: scenario.annual_return_rate,
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        let selected_scenario = scenarios
            .iter()
            .position(|s| s.name == params.selected_scenario)
            .map(ScenarioId::new);

        Ok(Self {
            annual_income: params.annual_income,
            income_type: params.income_type,
            investment_percentage: params.investment_percentage,
            starting_investment: params.starting_investment,
            time_horizon_years: params.time_horizon_years,
            countries,
            scenarios,
            selected_scenario,
            currency_label: params.currency_label,
        })
    }

    pub fn annual_income(&self) -> f64 {
        self.annual_income
    }

    pub fn income_type(&self) -> IncomeType {
        self.income_type
    }

    pub fn investment_percentage(&self) -> f64 {
        self.investment_percentage
    }

    pub fn starting_investment(&self) -> f64 {
        self.starting_investment
    }

    pub fn time_horizon_years(&self) -> u32 {
        self.time_horizon_years
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// `None` when the requested scenario name matched nothing.
    pub fn selected_scenario(&self) -> Option<ScenarioId> {
        self.selected_scenario
    }

    pub fn currency_label(&self) -> &str {
        &self.currency_label
    }

    pub fn country(&self, id: CountryId) -> Option<&Country> {
        self.countries.get(id.index())
    }

    pub fn scenario(&self, id: ScenarioId) -> Option<&Scenario> {
        self.scenarios.get(id.index())
    }
}

fn build_country(params: &CountryParams, extra_cost: f64) -> Result<Country, InputError> {
    let name = &params.name;
    check_percent(&format!("{name}.taxRate"), params.tax_rate)?;
    check_percent(&format!("{name}.dividendTaxRate"), params.dividend_tax_rate)?;

    let social_security = match params.social_security_mode {
        SocialSecurityMode::Percentage => {
            check_percent(
                &format!("{name}.socialSecurityRate"),
                params.social_security_rate,
            )?;
            SocialSecurityRule::Percentage {
                rate: params.social_security_rate,
            }
        }
        SocialSecurityMode::Fixed => {
            check_non_negative(
                &format!("{name}.socialSecurityRate"),
                params.social_security_rate,
            )?;
            SocialSecurityRule::Fixed {
                amount: params.social_security_rate,
            }
        }
    };

    let capital_gains = if params.is_isk {
        let rate = params.isk_rate.unwrap_or(0.0);
        check_percent(&format!("{name}.iskRate"), rate)?;
        CapitalGainsRule::WealthTax { rate }
    } else {
        CapitalGainsRule::DividendTax {
            rate: params.dividend_tax_rate,
        }
    };

    Ok(Country {
        name: name.clone(),
        tax_rate: params.tax_rate,
        social_security,
        capital_gains,
        extra_cost,
    })
}

fn check_finite(field: &str, value: f64) -> Result<(), InputError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InputError::NonFinite {
            field: field.to_string(),
        })
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), InputError> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(InputError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_percent(field: &str, value: f64) -> Result<(), InputError> {
    check_finite(field, value)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(InputError::OutOfRange {
            field: field.to_string(),
            value,
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

fn check_unique_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), InputError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(InputError::EmptyName { kind });
        }
        if !seen.insert(name) {
            return Err(InputError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
