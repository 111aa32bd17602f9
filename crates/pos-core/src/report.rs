//! # Sales Report
//!
//! Read-only sales history returned by `getReportSales`.

use crate::money::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recorded sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub date: DateTime<Utc>,
    pub total: Amount,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
}

impl SalesReport {
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn grand_total(&self) -> Amount {
        self.sales.iter().map(|s| s.total).sum()
    }

    /// Totals keyed by sale status ("paid", "pending", ...)
    pub fn totals_by_status(&self) -> BTreeMap<&str, Amount> {
        let mut totals: BTreeMap<&str, Amount> = BTreeMap::new();
        for sale in &self.sales {
            let entry = totals.entry(sale.status.as_str()).or_default();
            *entry = *entry + sale.total;
        }
        totals
    }

    /// Newest sale first, the order the report screen shows them in
    pub fn sorted_newest_first(mut self) -> Self {
        self.sales.sort_by(|a, b| b.date.cmp(&a.date));
        self
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            count: self.len(),
            grand_total: self.grand_total(),
            by_status: self
                .totals_by_status()
                .into_iter()
                .map(|(status, total)| (status.to_string(), total))
                .collect(),
        }
    }
}

/// Aggregate figures shown above the sales table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub count: usize,
    pub grand_total: Amount,
    pub by_status: BTreeMap<String, Amount>,
}
