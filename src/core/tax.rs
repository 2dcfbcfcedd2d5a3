use super::types::{Country, IncomeType, SocialSecurityRule, TaxBreakdown};

/// Splits one country's gross annual income into contributions, flat income
/// tax, net income and the share of net income that gets invested.
///
/// Nothing is clamped: a tax burden above the income yields a negative net
/// income and a negative (disinvesting) contribution.
pub fn compute_tax_breakdown(
    annual_income: f64,
    investment_percentage: f64,
    income_type: IncomeType,
    country: &Country,
) -> TaxBreakdown {
    let social_security_contributions =
        social_security_contribution(annual_income, income_type, country.social_security);
    let taxable_income = annual_income - social_security_contributions;
    let income_tax = taxable_income * (country.tax_rate / 100.0);
    let net_income = annual_income - income_tax - social_security_contributions;
    let yearly_investment = net_income * (investment_percentage / 100.0);

    TaxBreakdown {
        social_security_contributions,
        taxable_income,
        income_tax,
        net_income,
        yearly_investment,
        monthly_investment: yearly_investment / 12.0,
    }
}

fn social_security_contribution(
    annual_income: f64,
    income_type: IncomeType,
    rule: SocialSecurityRule,
) -> f64 {
    match rule {
        // Fixed amounts follow the period the income was entered in.
        SocialSecurityRule::Fixed { amount } => income_type.annualize(amount),
        SocialSecurityRule::Percentage { rate } => annual_income * (rate / 100.0),
    }
}
