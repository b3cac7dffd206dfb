use std::collections::HashMap;
use std::sync::LazyLock;

use super::types::FundRecord;

const UNKNOWN: &str = "Unknown";

struct FundSpec {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    nav: f64,
    expense_ratio: f64,
    risk_level: &'static str,
    historical_return: f64,
    min_investment: f64,
    fund_manager: &'static str,
}

const BUILTIN_FUNDS: [FundSpec; 10] = [
    FundSpec {
        id: "HDFC_EQUITY",
        name: "HDFC Equity Fund",
        category: "Equity - Large Cap",
        nav: 845.67,
        expense_ratio: 1.65,
        risk_level: "Moderate to High",
        historical_return: 14.8,
        min_investment: 5_000.0,
        fund_manager: "Prashant Jain",
    },
    FundSpec {
        id: "ICICI_BLUECHIP",
        name: "ICICI Prudential Bluechip Fund",
        category: "Equity - Large Cap",
        nav: 58.23,
        expense_ratio: 1.78,
        risk_level: "Moderate to High",
        historical_return: 13.5,
        min_investment: 1_000.0,
        fund_manager: "Anish Tawakley",
    },
    FundSpec {
        id: "SBI_SMALLCAP",
        name: "SBI Small Cap Fund",
        category: "Equity - Small Cap",
        nav: 98.45,
        expense_ratio: 1.92,
        risk_level: "High",
        historical_return: 17.2,
        min_investment: 5_000.0,
        fund_manager: "R. Srinivasan",
    },
    FundSpec {
        id: "AXIS_MIDCAP",
        name: "Axis Midcap Fund",
        category: "Equity - Mid Cap",
        nav: 65.34,
        expense_ratio: 1.82,
        risk_level: "High",
        historical_return: 16.8,
        min_investment: 1_000.0,
        fund_manager: "Shreyash Devalkar",
    },
    FundSpec {
        id: "KOTAK_STANDARD",
        name: "Kotak Standard Multicap Fund",
        category: "Equity - Multi Cap",
        nav: 43.21,
        expense_ratio: 1.68,
        risk_level: "Moderate to High",
        historical_return: 15.4,
        min_investment: 5_000.0,
        fund_manager: "Harsha Upadhyaya",
    },
    FundSpec {
        id: "FRANKLIN_TAXSHIELD",
        name: "Franklin India Taxshield Fund",
        category: "Equity - ELSS",
        nav: 76.89,
        expense_ratio: 1.95,
        risk_level: "Moderate to High",
        historical_return: 13.9,
        min_investment: 500.0,
        fund_manager: "R. Janakiraman",
    },
    FundSpec {
        id: "ICICI_BALANCED",
        name: "ICICI Prudential Balanced Advantage Fund",
        category: "Hybrid - Dynamic Asset Allocation",
        nav: 45.67,
        expense_ratio: 1.72,
        risk_level: "Moderate",
        historical_return: 11.8,
        min_investment: 1_000.0,
        fund_manager: "Sankaran Naren",
    },
    FundSpec {
        id: "HDFC_HYBRID",
        name: "HDFC Hybrid Equity Fund",
        category: "Hybrid - Aggressive",
        nav: 67.23,
        expense_ratio: 1.85,
        risk_level: "Moderate",
        historical_return: 12.5,
        min_investment: 5_000.0,
        fund_manager: "Chirag Setalvad",
    },
    FundSpec {
        id: "SBI_DEBT",
        name: "SBI Magnum Income Fund",
        category: "Debt - Medium to Long Duration",
        nav: 52.19,
        expense_ratio: 1.52,
        risk_level: "Low to Moderate",
        historical_return: 8.2,
        min_investment: 5_000.0,
        fund_manager: "Dinesh Ahuja",
    },
    FundSpec {
        id: "ADITYA_CORPORATE_BOND",
        name: "Aditya Birla Sun Life Corporate Bond Fund",
        category: "Debt - Corporate Bond",
        nav: 87.65,
        expense_ratio: 1.38,
        risk_level: "Low",
        historical_return: 7.8,
        min_investment: 1_000.0,
        fund_manager: "Sunaina da Cunha",
    },
];

static BUILTIN: LazyLock<FundCatalog> = LazyLock::new(|| {
    FundCatalog::from_records(BUILTIN_FUNDS.iter().map(FundSpec::to_record))
});

impl FundSpec {
    fn to_record(&self) -> FundRecord {
        FundRecord {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category.to_string(),
            nav: self.nav,
            expense_ratio: self.expense_ratio,
            risk_level: self.risk_level.to_string(),
            historical_return: self.historical_return,
            min_investment: self.min_investment,
            fund_manager: self.fund_manager.to_string(),
        }
    }
}

/// Read-only fund table. Built once and shared between requests without
/// locking.
#[derive(Debug, Clone)]
pub struct FundCatalog {
    order: Vec<String>,
    records: HashMap<String, FundRecord>,
}

impl FundCatalog {
    pub fn builtin() -> &'static FundCatalog {
        &BUILTIN
    }

    /// Later records with the same normalized id replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = FundRecord>) -> Self {
        let mut order = Vec::new();
        let mut by_id = HashMap::new();
        for mut record in records {
            record.id = normalize_fund_id(&record.id);
            if !by_id.contains_key(&record.id) {
                order.push(record.id.clone());
            }
            by_id.insert(record.id.clone(), record);
        }
        Self {
            order,
            records: by_id,
        }
    }

    /// Stable identifier vocabulary, in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &FundRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(&normalize_fund_id(identifier))
    }

    /// Real records only.
    pub fn get(&self, identifier: &str) -> Option<&FundRecord> {
        self.records.get(&normalize_fund_id(identifier))
    }

    /// Never fails: unknown identifiers resolve to a placeholder with zeroed
    /// numbers and "Unknown" labels.
    pub fn lookup(&self, identifier: &str) -> FundRecord {
        let id = normalize_fund_id(identifier);
        match self.records.get(&id) {
            Some(record) => record.clone(),
            None => {
                tracing::debug!(fund_id = %id, "fund not in catalog, using placeholder");
                placeholder_record(id)
            }
        }
    }
}

pub fn normalize_fund_id(identifier: &str) -> String {
    identifier.to_uppercase().replace(' ', "_")
}

fn placeholder_record(id: String) -> FundRecord {
    FundRecord {
        name: id.replace('_', " "),
        id,
        category: UNKNOWN.to_string(),
        nav: 0.0,
        expense_ratio: 0.0,
        risk_level: UNKNOWN.to_string(),
        historical_return: 0.0,
        min_investment: 0.0,
        fund_manager: UNKNOWN.to_string(),
    }
}
