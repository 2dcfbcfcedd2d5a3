use serde::Serialize;

/// Position of a country within a validated comparison.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CountryId(usize);

/// Position of a scenario within a validated comparison.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScenarioId(usize);

impl CountryId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl ScenarioId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IncomeType {
    Annual,
    Monthly,
}

impl IncomeType {
    /// Converts an amount expressed in this income type's period to a yearly figure.
    pub fn annualize(self, amount: f64) -> f64 {
        match self {
            IncomeType::Annual => amount,
            IncomeType::Monthly => amount * 12.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialSecurityMode {
    Percentage,
    Fixed,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SocialSecurityRule {
    /// Percent of gross annual income.
    Percentage { rate: f64 },
    /// Flat amount per income period (monthly amounts are scaled by 12).
    Fixed { amount: f64 },
}

impl SocialSecurityRule {
    pub fn mode(self) -> SocialSecurityMode {
        match self {
            SocialSecurityRule::Percentage { .. } => SocialSecurityMode::Percentage,
            SocialSecurityRule::Fixed { .. } => SocialSecurityMode::Fixed,
        }
    }
}

/// How investment returns are taxed each year.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CapitalGainsRule {
    /// Flat percent of the yearly gain.
    DividendTax { rate: f64 },
    /// ISK-style levy: percent of the capital base, independent of the gain.
    WealthTax { rate: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub tax_rate: f64,
    pub social_security: SocialSecurityRule,
    pub capital_gains: CapitalGainsRule,
    /// Yearly living cost taken out of capital; zero when extra costs are off.
    pub extra_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub annual_return_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBreakdown {
    pub social_security_contributions: f64,
    pub taxable_income: f64,
    pub income_tax: f64,
    pub net_income: f64,
    pub yearly_investment: f64,
    pub monthly_investment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionOutcome {
    pub investment_gains: f64,
    pub final_net_worth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub name: String,
    pub net_income: f64,
    pub social_security_contributions: f64,
    pub social_security_mode: SocialSecurityMode,
    pub yearly_investment: f64,
    pub monthly_investment: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_gains: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_net_worth: Option<f64>,
}

/// End-of-year net worth for every (country, scenario) pair, indexed
/// `[country][scenario]` in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct YearPoint {
    pub year: u32,
    pub net_worth: Vec<Vec<f64>>,
}

impl YearPoint {
    pub fn value(&self, country: CountryId, scenario: ScenarioId) -> Option<f64> {
        self.net_worth
            .get(country.index())
            .and_then(|row| row.get(scenario.index()))
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioBand {
    pub year: u32,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub countries: Vec<CountrySummary>,
    pub scenario_names: Vec<String>,
    pub outcomes: Vec<Vec<ProjectionOutcome>>,
    pub time_series: Vec<YearPoint>,
    pub selected_scenario: Option<ScenarioId>,
    pub currency_label: String,
    pub income_type: IncomeType,
}

impl ComparisonResult {
    pub fn country_ids(&self) -> impl Iterator<Item = CountryId> + '_ {
        (0..self.countries.len()).map(CountryId::new)
    }

    pub fn scenario_ids(&self) -> impl Iterator<Item = ScenarioId> + '_ {
        (0..self.scenario_names.len()).map(ScenarioId::new)
    }

    pub fn outcome(&self, country: CountryId, scenario: ScenarioId) -> Option<ProjectionOutcome> {
        self.outcomes
            .get(country.index())
            .and_then(|row| row.get(scenario.index()))
            .copied()
    }

    /// Country with the highest selected-scenario final net worth; ties keep input order.
    pub fn most_beneficial(&self) -> Option<&CountrySummary> {
        self.countries
            .iter()
            .filter_map(|summary| summary.final_net_worth.map(|worth| (summary, worth)))
            .fold(None, |best: Option<(&CountrySummary, f64)>, (summary, worth)| match best {
                Some((_, best_worth)) if best_worth >= worth => best,
                _ => Some((summary, worth)),
            })
            .map(|(summary, _)| summary)
    }

    pub fn series(&self, country: CountryId, scenario: ScenarioId) -> Vec<f64> {
        self.time_series
            .iter()
            .filter_map(|point| point.value(country, scenario))
            .collect()
    }

    /// Worst and best scenario net worth per year for one country.
    pub fn scenario_band(&self, country: CountryId) -> Vec<ScenarioBand> {
        self.time_series
            .iter()
            .filter_map(|point| {
                let row = point.net_worth.get(country.index())?;
                let min = row.iter().copied().reduce(f64::min)?;
                let max = row.iter().copied().reduce(f64::max)?;
                Some(ScenarioBand {
                    year: point.year,
                    min,
                    max,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, final_net_worth: Option<f64>) -> CountrySummary {
        CountrySummary {
            name: name.to_string(),
            net_income: 0.0,
            social_security_contributions: 0.0,
            social_security_mode: SocialSecurityMode::Percentage,
            yearly_investment: 0.0,
            monthly_investment: 0.0,
            investment_gains: final_net_worth.map(|_| 0.0),
            final_net_worth,
        }
    }

    fn result(countries: Vec<CountrySummary>, time_series: Vec<YearPoint>) -> ComparisonResult {
        ComparisonResult {
            countries,
            scenario_names: vec!["Bad".to_string(), "Good".to_string()],
            outcomes: Vec::new(),
            time_series,
            selected_scenario: Some(ScenarioId::new(0)),
            currency_label: "EUR".to_string(),
            income_type: IncomeType::Annual,
        }
    }

    #[test]
    fn annualize_scales_monthly_amounts_only() {
        assert_eq!(IncomeType::Annual.annualize(1_000.0), 1_000.0);
        assert_eq!(IncomeType::Monthly.annualize(1_000.0), 12_000.0);
    }

    #[test]
    fn most_beneficial_keeps_first_on_ties() {
        let r = result(
            vec![
                summary("A", Some(10.0)),
                summary("B", Some(12.0)),
                summary("C", Some(12.0)),
            ],
            Vec::new(),
        );
        assert_eq!(r.most_beneficial().map(|c| c.name.as_str()), Some("B"));
    }

    #[test]
    fn scenario_band_reads_min_and_max_per_year() {
        let r = result(
            vec![summary("A", Some(0.0))],
            vec![
                YearPoint {
                    year: 1,
                    net_worth: vec![vec![110.0, 90.0]],
                },
                YearPoint {
                    year: 2,
                    net_worth: vec![vec![120.0, 150.0]],
                },
            ],
        );
        let band = r.scenario_band(CountryId::new(0));
        assert_eq!(
            band,
            vec![
                ScenarioBand {
                    year: 1,
                    min: 90.0,
                    max: 110.0
                },
                ScenarioBand {
                    year: 2,
                    min: 120.0,
                    max: 150.0
                },
            ]
        );
        assert!(r.scenario_band(CountryId::new(5)).is_empty());
        assert_eq!(r.series(CountryId::new(0), ScenarioId::new(1)), vec![90.0, 150.0]);
    }
}
