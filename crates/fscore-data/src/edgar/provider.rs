//! Statement extraction from the SEC EDGAR Company Facts API.
//!
//! Company Facts returns every XBRL fact a company ever filed in one JSON
//! document. Extraction walks the 10-K/10-Q facts, groups them by fiscal
//! period, and maps XBRL tags onto the line items of the three statement
//! types.

use crate::edgar::client::EdgarClient;
use crate::error::{DataError, Result};
use crate::statements::{
    BalanceSheet, CashFlowStatement, IncomeStatement, PeriodType, StatementSet,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

/// Response from the SEC EDGAR Company Facts API.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct CompanyFactsResponse {
    /// CIK number
    cik: u64,
    /// Entity name
    #[serde(rename = "entityName")]
    entity_name: String,
    /// Facts organized by taxonomy and tag
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

/// Facts for a specific XBRL tag.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TagFacts {
    /// Label/description
    label: Option<String>,
    /// Description
    description: Option<String>,
    /// Units (USD, shares, etc.) containing the actual fact values
    units: Option<HashMap<String, Vec<FactValue>>>,
}

/// A single fact value with metadata.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
struct FactValue {
    /// End date of the period
    end: String,
    /// Value
    val: f64,
    /// Accession number
    #[serde(default)]
    accn: Option<String>,
    /// Fiscal year
    #[serde(default)]
    fy: Option<i32>,
    /// Fiscal period
    #[serde(default)]
    fp: Option<String>,
    /// Form type
    #[serde(default)]
    form: Option<String>,
    /// Filed date
    #[serde(default)]
    filed: Option<String>,
    /// Frame (instant or duration)
    #[serde(default)]
    frame: Option<String>,
}

/// Maps statement line items to their possible XBRL tags.
///
/// Different companies and even the same company across different periods
/// may use different XBRL tags for the same concept. This mapping handles
/// the most common variations.
#[derive(Debug)]
struct XbrlTagMapper {
    /// Map of concept name to list of possible XBRL tags
    tags: HashMap<String, Vec<String>>,
}

impl XbrlTagMapper {
    /// Create a new XBRL tag mapper with standard mappings.
    fn new() -> Self {
        let mut tags: HashMap<String, Vec<String>> = HashMap::new();

        // Balance sheet
        tags.insert("Assets".to_string(), vec!["Assets".to_string()]);

        tags.insert(
            "AssetsCurrent".to_string(),
            vec!["AssetsCurrent".to_string()],
        );

        tags.insert(
            "LiabilitiesCurrent".to_string(),
            vec!["LiabilitiesCurrent".to_string()],
        );

        tags.insert(
            "Liabilities".to_string(),
            vec!["Liabilities".to_string()],
        );

        tags.insert(
            "LongTermDebt".to_string(),
            vec![
                "LongTermDebt".to_string(),
                "LongTermDebtNoncurrent".to_string(),
                "LongTermDebtAndCapitalLeaseObligations".to_string(),
            ],
        );

        tags.insert(
            "StockholdersEquity".to_string(),
            vec![
                "StockholdersEquity".to_string(),
                "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest"
                    .to_string(),
            ],
        );

        // Income statement
        tags.insert(
            "Revenue".to_string(),
            vec![
                "Revenues".to_string(),
                "RevenueFromContractWithCustomerExcludingAssessedTax".to_string(),
                "SalesRevenueNet".to_string(),
                "RevenueFromContractWithCustomerIncludingAssessedTax".to_string(),
            ],
        );

        tags.insert(
            "CostOfRevenue".to_string(),
            vec![
                "CostOfRevenue".to_string(),
                "CostOfGoodsAndServicesSold".to_string(),
                "CostOfGoodsSold".to_string(),
            ],
        );

        tags.insert("GrossProfit".to_string(), vec!["GrossProfit".to_string()]);

        tags.insert(
            "NetIncome".to_string(),
            vec![
                "NetIncomeLoss".to_string(),
                "ProfitLoss".to_string(),
                "NetIncomeLossAvailableToCommonStockholdersBasic".to_string(),
            ],
        );

        // Cash flow
        tags.insert(
            "OperatingCashFlow".to_string(),
            vec![
                "NetCashProvidedByUsedInOperatingActivities".to_string(),
                "CashProvidedByUsedInOperatingActivities".to_string(),
            ],
        );

        tags.insert(
            "CapitalExpenditures".to_string(),
            vec![
                "PaymentsToAcquirePropertyPlantAndEquipment".to_string(),
                "PaymentsForCapitalImprovements".to_string(),
            ],
        );

        // Shares
        tags.insert(
            "SharesOutstanding".to_string(),
            vec![
                "CommonStockSharesOutstanding".to_string(),
                "CommonStockSharesIssued".to_string(),
                "EntityCommonStockSharesOutstanding".to_string(),
            ],
        );

        tags.insert(
            "WeightedAverageNumberOfSharesOutstandingBasic".to_string(),
            vec!["WeightedAverageNumberOfSharesOutstandingBasic".to_string()],
        );

        Self { tags }
    }

    /// Get possible XBRL tags for a concept.
    fn get_tags(&self, concept: &str) -> Option<&Vec<String>> {
        self.tags.get(concept)
    }
}

/// Provider for SEC EDGAR financial statements.
#[derive(Debug)]
pub struct EdgarStatementProvider {
    /// Rate-limited EDGAR client
    client: EdgarClient,
    /// XBRL tag mapper
    tag_mapper: XbrlTagMapper,
}

impl EdgarStatementProvider {
    /// Create a new statement provider around an existing client.
    pub fn new(client: EdgarClient) -> Self {
        Self {
            client,
            tag_mapper: XbrlTagMapper::new(),
        }
    }

    /// The underlying EDGAR client.
    pub const fn client(&self) -> &EdgarClient {
        &self.client
    }

    /// Fetch company facts from SEC EDGAR.
    async fn fetch_company_facts(&self, cik: &str) -> Result<CompanyFactsResponse> {
        let url = format!(
            "{}/api/xbrl/companyfacts/CIK{}.json",
            self.client.base_url(),
            cik
        );

        let response = self.client.get(&url).await?;

        let facts: CompanyFactsResponse = response
            .json()
            .await
            .map_err(|e| DataError::EdgarApi(format!("Failed to parse company facts: {}", e)))?;
        Ok(facts)
    }

    /// Fetch all available statement sets for a ticker.
    ///
    /// Resolves the CIK first; use [`fetch_statements_with_cik`] when the
    /// CIK is already known (e.g. from the cache).
    ///
    /// [`fetch_statements_with_cik`]: Self::fetch_statements_with_cik
    pub async fn fetch_statements(&self, symbol: &str) -> Result<Vec<StatementSet>> {
        let cik = self.client.get_company_cik(symbol).await?;
        self.fetch_statements_with_cik(symbol, &cik).await
    }

    /// Fetch all available statement sets for a ticker with a known CIK.
    ///
    /// Returns one [`StatementSet`] per fiscal period found in 10-K and
    /// 10-Q facts, sorted most recent first.
    pub async fn fetch_statements_with_cik(
        &self,
        symbol: &str,
        cik: &str,
    ) -> Result<Vec<StatementSet>> {
        let facts = self.fetch_company_facts(cik).await?;
        Ok(self.extract_statements(&facts, symbol, cik))
    }

    /// Extract statement sets from a company facts response.
    fn extract_statements(
        &self,
        facts: &CompanyFactsResponse,
        symbol: &str,
        cik: &str,
    ) -> Vec<StatementSet> {
        // Enumerate unique reporting periods from the facts
        let mut periods: HashMap<(i32, String, String), NaiveDate> = HashMap::new();

        for taxonomy_facts in facts.facts.values() {
            for tag_facts in taxonomy_facts.values() {
                if let Some(units) = &tag_facts.units {
                    for values in units.values() {
                        for value in values {
                            if let (Some(fy), Some(fp), Some(form)) =
                                (&value.fy, &value.fp, &value.form)
                                && (form == "10-Q" || form == "10-K")
                                && let Ok(end_date) =
                                    NaiveDate::parse_from_str(&value.end, "%Y-%m-%d")
                            {
                                let key = (*fy, fp.clone(), form.clone());
                                // The same fiscal period carries both instant and
                                // duration facts; keep the latest end date.
                                let entry = periods.entry(key).or_insert(end_date);
                                if end_date > *entry {
                                    *entry = end_date;
                                }
                            }
                        }
                    }
                }
            }
        }

        let mut statements: Vec<StatementSet> = periods
            .into_iter()
            .map(|((fy, fp, form), end_date)| {
                let period_type = PeriodType::from_form(&form).unwrap_or(PeriodType::Quarterly);
                let fiscal_quarter = if period_type == PeriodType::Quarterly {
                    // Extract quarter number from fiscal period (Q1, Q2, Q3, Q4)
                    fp.chars()
                        .nth(1)
                        .and_then(|c| c.to_digit(10))
                        .map(|d| d as i32)
                } else {
                    None
                };

                self.extract_statement_set(
                    facts,
                    symbol,
                    cik,
                    end_date,
                    period_type,
                    fy,
                    fiscal_quarter,
                    &fp,
                )
            })
            .collect();

        // Sort by period end date (most recent first)
        statements.sort_by(|a, b| b.period_end.cmp(&a.period_end));

        statements
    }

    /// Extract a fact value from a company facts response.
    ///
    /// Tries each candidate XBRL tag across the US-GAAP and DEI taxonomies
    /// and returns the most recent value matching the period filters.
    fn extract_fact(
        &self,
        facts: &CompanyFactsResponse,
        concept: &str,
        period_type: PeriodType,
        fiscal_year: i32,
        fiscal_period: &str,
    ) -> Option<f64> {
        let tags = self.tag_mapper.get_tags(concept)?;

        for taxonomy in ["us-gaap", "dei"] {
            if let Some(taxonomy_facts) = facts.facts.get(taxonomy) {
                for tag in tags {
                    if let Some(tag_facts) = taxonomy_facts.get(tag)
                        && let Some(units) = &tag_facts.units
                    {
                        // Try USD first for monetary values, then shares, then pure numbers
                        for unit_type in ["USD", "shares", "pure"] {
                            if let Some(values) = units.get(unit_type) {
                                let filtered: Vec<&FactValue> = values
                                    .iter()
                                    .filter(|v| {
                                        if let Some(form) = &v.form {
                                            let expected = match period_type {
                                                PeriodType::Quarterly => "10-Q",
                                                PeriodType::Annual => "10-K",
                                            };
                                            if form != expected {
                                                return false;
                                            }
                                        }

                                        if v.fy != Some(fiscal_year) {
                                            return false;
                                        }

                                        if let Some(v_fp) = &v.fp
                                            && v_fp != fiscal_period
                                        {
                                            return false;
                                        }

                                        true
                                    })
                                    .collect();

                                // Most recent value for this period
                                if let Some(fact) = filtered.last() {
                                    return Some(fact.val);
                                }
                            }
                        }
                    }
                }
            }
        }

        None
    }

    /// Extract one period's statement triple.
    #[allow(clippy::too_many_arguments)]
    fn extract_statement_set(
        &self,
        facts: &CompanyFactsResponse,
        symbol: &str,
        cik: &str,
        period_end: NaiveDate,
        period_type: PeriodType,
        fiscal_year: i32,
        fiscal_quarter: Option<i32>,
        fiscal_period: &str,
    ) -> StatementSet {
        let fact =
            |concept: &str| self.extract_fact(facts, concept, period_type, fiscal_year, fiscal_period);

        let income = IncomeStatement {
            revenue: fact("Revenue"),
            cost_of_revenue: fact("CostOfRevenue"),
            gross_profit: fact("GrossProfit"),
            net_income: fact("NetIncome"),
        };

        let balance = BalanceSheet {
            total_assets: fact("Assets"),
            current_assets: fact("AssetsCurrent"),
            current_liabilities: fact("LiabilitiesCurrent"),
            long_term_debt: fact("LongTermDebt"),
            total_liabilities: fact("Liabilities"),
            stockholders_equity: fact("StockholdersEquity"),
            shares_outstanding: fact("SharesOutstanding")
                .or_else(|| fact("WeightedAverageNumberOfSharesOutstandingBasic")),
        };

        let cash_flow = CashFlowStatement {
            operating_cash_flow: fact("OperatingCashFlow"),
            capital_expenditures: fact("CapitalExpenditures"),
        };

        StatementSet {
            symbol: symbol.to_string(),
            cik: cik.to_string(),
            period_end,
            period_type,
            fiscal_year,
            fiscal_quarter,
            income,
            balance,
            cash_flow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> EdgarStatementProvider {
        EdgarStatementProvider::new(EdgarClient::new().unwrap())
    }

    /// Two annual periods of facts in the Company Facts JSON shape.
    fn canned_facts() -> CompanyFactsResponse {
        let json = r#"{
            "cik": 1,
            "entityName": "Test Corp",
            "facts": {
                "us-gaap": {
                    "Assets": {
                        "label": "Assets",
                        "units": {
                            "USD": [
                                {"end": "2023-12-31", "val": 900000.0, "fy": 2023, "fp": "FY", "form": "10-K"},
                                {"end": "2024-12-31", "val": 1000000.0, "fy": 2024, "fp": "FY", "form": "10-K"}
                            ]
                        }
                    },
                    "NetIncomeLoss": {
                        "label": "Net Income (Loss)",
                        "units": {
                            "USD": [
                                {"end": "2023-12-31", "val": 40000.0, "fy": 2023, "fp": "FY", "form": "10-K"},
                                {"end": "2024-12-31", "val": 50000.0, "fy": 2024, "fp": "FY", "form": "10-K"}
                            ]
                        }
                    },
                    "RevenueFromContractWithCustomerExcludingAssessedTax": {
                        "label": "Revenue",
                        "units": {
                            "USD": [
                                {"end": "2023-12-31", "val": 400000.0, "fy": 2023, "fp": "FY", "form": "10-K"},
                                {"end": "2024-12-31", "val": 500000.0, "fy": 2024, "fp": "FY", "form": "10-K"}
                            ]
                        }
                    },
                    "NetCashProvidedByUsedInOperatingActivities": {
                        "label": "Operating cash flow",
                        "units": {
                            "USD": [
                                {"end": "2023-12-31", "val": 50000.0, "fy": 2023, "fp": "FY", "form": "10-K"},
                                {"end": "2024-12-31", "val": 60000.0, "fy": 2024, "fp": "FY", "form": "10-K"}
                            ]
                        }
                    },
                    "CommonStockSharesOutstanding": {
                        "label": "Shares outstanding",
                        "units": {
                            "shares": [
                                {"end": "2023-12-31", "val": 10000.0, "fy": 2023, "fp": "FY", "form": "10-K"},
                                {"end": "2024-12-31", "val": 10000.0, "fy": 2024, "fp": "FY", "form": "10-K"}
                            ]
                        }
                    }
                }
            }
        }"#;

        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_tag_mapper() {
        let mapper = XbrlTagMapper::new();

        assert!(mapper.get_tags("Assets").is_some());
        assert!(mapper.get_tags("Revenue").is_some());
        assert!(mapper.get_tags("NetIncome").is_some());
        assert!(mapper.get_tags("CostOfRevenue").is_some());
        assert!(mapper.get_tags("NonexistentConcept").is_none());
    }

    #[test]
    fn test_extract_statements_from_canned_facts() {
        let provider = provider();
        let facts = canned_facts();

        let statements = provider.extract_statements(&facts, "TEST", "0000000001");

        assert_eq!(statements.len(), 2);

        // Most recent first
        let current = &statements[0];
        assert_eq!(
            current.period_end,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
        assert_eq!(current.period_type, PeriodType::Annual);
        assert_eq!(current.fiscal_year, 2024);
        assert_eq!(current.fiscal_quarter, None);
        assert_eq!(current.balance.total_assets, Some(1_000_000.0));
        assert_eq!(current.income.net_income, Some(50_000.0));
        assert_eq!(current.income.revenue, Some(500_000.0));
        assert_eq!(current.cash_flow.operating_cash_flow, Some(60_000.0));
        assert_eq!(current.balance.shares_outstanding, Some(10_000.0));

        let prior = &statements[1];
        assert_eq!(prior.fiscal_year, 2023);
        assert_eq!(prior.balance.total_assets, Some(900_000.0));
    }

    #[test]
    fn test_extract_statements_missing_tags_stay_none() {
        let provider = provider();
        let facts = canned_facts();

        let statements = provider.extract_statements(&facts, "TEST", "0000000001");
        let current = &statements[0];

        // Not present in the canned facts
        assert_eq!(current.income.cost_of_revenue, None);
        assert_eq!(current.balance.long_term_debt, None);
        assert_eq!(current.balance.current_assets, None);
    }

    #[tokio::test]
    #[ignore = "hits the live EDGAR API"]
    async fn test_fetch_statements_live() {
        let provider = provider();
        let statements = provider.fetch_statements("AAPL").await.unwrap();

        assert!(statements.len() >= 2);
        assert!(statements[0].period_end > statements[1].period_end);
    }
}
