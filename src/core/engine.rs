use tracing::{debug, trace};

use super::input::ComparisonInput;
use super::tax::compute_tax_breakdown;
use super::types::{
    CapitalGainsRule, ComparisonResult, Country, CountrySummary, ProjectionOutcome, Scenario,
    YearPoint,
};

#[derive(Debug, Clone, Copy)]
struct YearStep {
    yearly_gain: f64,
    taxed_gain: f64,
    end_investment: f64,
}

/// Runs every (country, scenario) projection and assembles the comparison.
///
/// The summary rows carry gains and final net worth for the selected scenario
/// only; the time series and `outcomes` keep every scenario.
pub fn run_comparison(input: &ComparisonInput) -> ComparisonResult {
    let horizon = input.time_horizon_years();
    let countries = input.countries();
    let scenarios = input.scenarios();
    debug!(
        countries = countries.len(),
        scenarios = scenarios.len(),
        horizon,
        "running comparison"
    );

    let mut table = YearTable::new(horizon, countries.len(), scenarios.len());
    let mut summaries = Vec::with_capacity(countries.len());
    let mut outcomes = Vec::with_capacity(countries.len());

    for (country_idx, country) in countries.iter().enumerate() {
        let breakdown = compute_tax_breakdown(
            input.annual_income(),
            input.investment_percentage(),
            input.income_type(),
            country,
        );

        let mut country_outcomes = Vec::with_capacity(scenarios.len());
        for (scenario_idx, scenario) in scenarios.iter().enumerate() {
            let mut trace = Vec::with_capacity(horizon as usize);
            let outcome = simulate_projection(
                input.starting_investment(),
                horizon,
                breakdown.yearly_investment,
                country,
                scenario,
                Some(&mut trace),
            );
            table.record(country_idx, scenario_idx, &trace);
            country_outcomes.push(outcome);
        }

        let selected = input
            .selected_scenario()
            .and_then(|id| country_outcomes.get(id.index()).copied());

        summaries.push(CountrySummary {
            name: country.name.clone(),
            net_income: breakdown.net_income,
            social_security_contributions: breakdown.social_security_contributions,
            social_security_mode: country.social_security.mode(),
            yearly_investment: breakdown.yearly_investment,
            monthly_investment: breakdown.monthly_investment,
            investment_gains: selected.map(|o| o.investment_gains),
            final_net_worth: selected.map(|o| o.final_net_worth),
        });
        outcomes.push(country_outcomes);
    }

    ComparisonResult {
        countries: summaries,
        scenario_names: scenarios.iter().map(|s| s.name.clone()).collect(),
        outcomes,
        time_series: table.into_points(),
        selected_scenario: input.selected_scenario(),
        currency_label: input.currency_label().to_string(),
        income_type: input.income_type(),
    }
}

/// Compounds `starting_investment` over `horizon` years for one pair.
///
/// When `path` is given, the end-of-year net worth for years `1..=horizon`
/// is appended to it in order.
pub fn simulate_projection(
    starting_investment: f64,
    horizon: u32,
    yearly_investment: f64,
    country: &Country,
    scenario: &Scenario,
    mut path: Option<&mut Vec<f64>>,
) -> ProjectionOutcome {
    let mut total_investment = starting_investment;
    let mut total_gains = 0.0;

    for year in 1..=horizon {
        let step = project_year(total_investment, yearly_investment, country, scenario);
        trace!(
            country = %country.name,
            scenario = %scenario.name,
            year,
            yearly_gain = step.yearly_gain,
            taxed_gain = step.taxed_gain,
            "projected year"
        );
        total_gains += step.taxed_gain;
        total_investment = step.end_investment;

        if let Some(points) = path.as_deref_mut() {
            points.push(total_investment);
        }
    }

    ProjectionOutcome {
        investment_gains: total_gains,
        final_net_worth: total_investment,
    }
}

fn project_year(
    total_investment: f64,
    yearly_investment: f64,
    country: &Country,
    scenario: &Scenario,
) -> YearStep {
    let yearly_gain = total_investment * (scenario.annual_return_rate / 100.0);
    let taxed_gain = apply_capital_gains_tax(country.capital_gains, total_investment, yearly_gain);
    // Extra costs come out of capital after the gain was taxed.
    let end_investment = total_investment + (yearly_investment + taxed_gain) - country.extra_cost;

    YearStep {
        yearly_gain,
        taxed_gain,
        end_investment,
    }
}

fn apply_capital_gains_tax(rule: CapitalGainsRule, capital: f64, yearly_gain: f64) -> f64 {
    match rule {
        // Levied on the capital base, so it can exceed a small gain.
        CapitalGainsRule::WealthTax { rate } => yearly_gain - capital * (rate / 100.0),
        CapitalGainsRule::DividendTax { rate } => yearly_gain * (1.0 - rate / 100.0),
    }
}

struct YearTable {
    rows: Vec<YearPoint>,
}

impl YearTable {
    fn new(horizon: u32, country_count: usize, scenario_count: usize) -> Self {
        let rows = (1..=horizon)
            .map(|year| YearPoint {
                year,
                net_worth: vec![vec![0.0; scenario_count]; country_count],
            })
            .collect();
        Self { rows }
    }

    fn record(&mut self, country_idx: usize, scenario_idx: usize, trace: &[f64]) {
        for (row, value) in self.rows.iter_mut().zip(trace) {
            row.net_worth[country_idx][scenario_idx] = *value;
        }
    }

    fn into_points(self) -> Vec<YearPoint> {
        self.rows
    }
}
