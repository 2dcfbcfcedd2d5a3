use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    ComparisonInput, ComparisonParams, ComparisonResult, CountryParams, CountrySummary,
    IncomeType, ScenarioBand, ScenarioParams, SocialSecurityMode, run_comparison,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum ApiIncomeType {
    #[serde(alias = "yearly")]
    Annual,
    Monthly,
}

impl From<ApiIncomeType> for IncomeType {
    fn from(value: ApiIncomeType) -> Self {
        match value {
            ApiIncomeType::Annual => IncomeType::Annual,
            ApiIncomeType::Monthly => IncomeType::Monthly,
        }
    }
}

impl From<IncomeType> for ApiIncomeType {
    fn from(value: IncomeType) -> Self {
        match value {
            IncomeType::Annual => ApiIncomeType::Annual,
            IncomeType::Monthly => ApiIncomeType::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiSocialSecurityMode {
    #[serde(alias = "percent")]
    Percentage,
    #[serde(alias = "fixedAmount", alias = "fixed-amount")]
    Fixed,
}

impl From<ApiSocialSecurityMode> for SocialSecurityMode {
    fn from(value: ApiSocialSecurityMode) -> Self {
        match value {
            ApiSocialSecurityMode::Percentage => SocialSecurityMode::Percentage,
            ApiSocialSecurityMode::Fixed => SocialSecurityMode::Fixed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryPayload {
    name: String,
    #[serde(default)]
    tax_rate: f64,
    #[serde(default)]
    social_security_rate: f64,
    #[serde(default, alias = "socialSecurityType")]
    social_security_mode: Option<ApiSocialSecurityMode>,
    #[serde(default)]
    dividend_tax_rate: f64,
    #[serde(default, rename = "isISK", alias = "isIsk")]
    is_isk: bool,
    #[serde(default)]
    isk_rate: Option<f64>,
}

impl CountryPayload {
    fn into_params(self, modes: &BTreeMap<String, ApiSocialSecurityMode>) -> CountryParams {
        let mode = self
            .social_security_mode
            .or_else(|| modes.get(&self.name).copied())
            .unwrap_or(ApiSocialSecurityMode::Percentage);
        CountryParams {
            name: self.name,
            tax_rate: self.tax_rate,
            social_security_rate: self.social_security_rate,
            social_security_mode: mode.into(),
            dividend_tax_rate: self.dividend_tax_rate,
            is_isk: self.is_isk,
            isk_rate: self.isk_rate,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioPayload {
    name: String,
    #[serde(alias = "annualReturnRate")]
    rate: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    /// Income in the unit given by `incomeType`.
    income: Option<f64>,
    /// Already-annualized income; wins over `income`.
    annual_income: Option<f64>,
    income_type: Option<ApiIncomeType>,
    investment_percentage: Option<f64>,
    starting_investment: Option<f64>,
    #[serde(alias = "timeHorizonYears")]
    time_horizon: Option<u32>,
    countries: Option<Vec<CountryPayload>>,
    scenarios: Option<Vec<ScenarioPayload>>,
    include_extra_costs: Option<bool>,
    extra_costs: Option<BTreeMap<String, f64>>,
    #[serde(alias = "selectedScenarioName")]
    selected_scenario: Option<String>,
    #[serde(alias = "currencyLabel")]
    currency: Option<String>,
    social_security_type: Option<BTreeMap<String, ApiSocialSecurityMode>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesValueResponse {
    country: String,
    scenario: String,
    net_worth: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YearPointResponse {
    year: u32,
    values: Vec<SeriesValueResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CountryBandResponse {
    country: String,
    band: Vec<ScenarioBand>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    currency: String,
    income_type: ApiIncomeType,
    selected_scenario: Option<String>,
    most_beneficial_country: Option<String>,
    scenarios: Vec<String>,
    countries: Vec<CountrySummary>,
    time_series: Vec<YearPointResponse>,
    scenario_bands: Vec<CountryBandResponse>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "comparison HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/compare");

    axum::serve(listener, app).await
}

/// Runs one comparison from a JSON payload and returns the response JSON.
pub fn compare_json(json: &str, pretty: bool) -> Result<String, String> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| format!("Invalid comparison JSON payload: {e}"))?;
    let input = input_from_payload(payload)?;
    let response = build_compare_response(&run_comparison(&input));
    let rendered = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    rendered.map_err(|e| format!("Failed to serialize comparison: {e}"))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload)
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload)
}

fn compare_handler_impl(payload: ComparePayload) -> Response {
    let input = match input_from_payload(payload) {
        Ok(input) => input,
        Err(msg) => {
            warn!(error = %msg, "rejected comparison request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let result = run_comparison(&input);
    json_response(StatusCode::OK, build_compare_response(&result))
}

fn with_cache_control(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)).into_response())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn input_from_payload(payload: ComparePayload) -> Result<ComparisonInput, String> {
    let mut params = default_params_for_api();

    if let Some(v) = payload.income_type {
        params.income_type = v.into();
    }
    if let Some(v) = payload.income {
        params.annual_income = params.income_type.annualize(v);
    }
    if let Some(v) = payload.annual_income {
        params.annual_income = v;
    }
    if let Some(v) = payload.investment_percentage {
        params.investment_percentage = v;
    }
    if let Some(v) = payload.starting_investment {
        params.starting_investment = v;
    }
    if let Some(v) = payload.time_horizon {
        params.time_horizon_years = v;
    }

    let modes = payload.social_security_type.unwrap_or_default();
    if let Some(countries) = payload.countries {
        params.countries = countries
            .into_iter()
            .map(|country| country.into_params(&modes))
            .collect();
    } else {
        for country in &mut params.countries {
            if let Some(mode) = modes.get(&country.name) {
                country.social_security_mode = (*mode).into();
            }
        }
    }

    if let Some(scenarios) = payload.scenarios {
        params.scenarios = scenarios
            .into_iter()
            .map(|s| ScenarioParams {
                name: s.name,
                annual_return_rate: s.rate,
            })
            .collect();
    }
    if let Some(v) = payload.include_extra_costs {
        params.include_extra_costs = v;
    }
    if let Some(v) = payload.extra_costs {
        params.extra_costs = v;
    }
    if let Some(v) = payload.selected_scenario {
        params.selected_scenario = v;
    }
    if let Some(v) = payload.currency {
        params.currency_label = v;
    }

    ComparisonInput::new(params).map_err(|e| e.to_string())
}

fn default_params_for_api() -> ComparisonParams {
    let country = |name: &str, tax: f64, social: f64, dividend: f64, isk_rate: Option<f64>| {
        CountryParams {
            name: name.to_string(),
            tax_rate: tax,
            social_security_rate: social,
            social_security_mode: SocialSecurityMode::Percentage,
            dividend_tax_rate: dividend,
            is_isk: isk_rate.is_some(),
            isk_rate,
        }
    };
    let scenario = |name: &str, rate: f64| ScenarioParams {
        name: name.to_string(),
        annual_return_rate: rate,
    };

    ComparisonParams {
        annual_income: 100_000.0,
        income_type: IncomeType::Annual,
        investment_percentage: 80.0,
        starting_investment: 0.0,
        time_horizon_years: 20,
        countries: vec![
            country("Poland", 19.0, 9.0, 19.0, None),
            country("Sweden", 30.0, 7.0, 30.0, Some(0.375)),
        ],
        scenarios: vec![
            scenario("Bad", 2.0),
            scenario("Expected", 5.0),
            scenario("Good", 8.0),
        ],
        include_extra_costs: false,
        extra_costs: BTreeMap::new(),
        selected_scenario: "Expected".to_string(),
        currency_label: "EUR".to_string(),
    }
}

fn build_compare_response(result: &ComparisonResult) -> CompareResponse {
    let time_series = result
        .time_series
        .iter()
        .map(|point| YearPointResponse {
            year: point.year,
            values: result
                .country_ids()
                .flat_map(move |country| {
                    result.scenario_ids().filter_map(move |scenario| {
                        Some(SeriesValueResponse {
                            country: result.countries[country.index()].name.clone(),
                            scenario: result.scenario_names[scenario.index()].clone(),
                            net_worth: point.value(country, scenario)?,
                        })
                    })
                })
                .collect(),
        })
        .collect();

    let scenario_bands = result
        .country_ids()
        .map(|country| CountryBandResponse {
            country: result.countries[country.index()].name.clone(),
            band: result.scenario_band(country),
        })
        .collect();

    CompareResponse {
        currency: result.currency_label.clone(),
        income_type: result.income_type.into(),
        selected_scenario: result
            .selected_scenario
            .map(|id| result.scenario_names[id.index()].clone()),
        most_beneficial_country: result.most_beneficial().map(|c| c.name.clone()),
        scenarios: result.scenario_names.clone(),
        countries: result.countries.clone(),
        time_series,
        scenario_bands,
    }
}
