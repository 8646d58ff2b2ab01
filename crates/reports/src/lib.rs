//! `pipecrm-reports` — pure aggregate reporting.
//!
//! Every function here is a fold over already-fetched records; no I/O.
//! The api crate fetches the inputs and serializes the outputs.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use pipecrm_core::UserId;
use pipecrm_deals::Deal;
use pipecrm_leads::Lead;

/// Headline numbers for the caller's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub active_leads: usize,
    pub conversion_rate: f64,
    pub closed_deals: usize,
}

/// Dashboard stats over the caller's own leads and deals.
///
/// Revenue counts won deals only; active leads have a status other than
/// "lost"; the conversion rate is closed deals over total leads, as a
/// percentage rounded to two decimals.
pub fn dashboard_stats(leads: &[Lead], deals: &[Deal]) -> DashboardStats {
    let won: Vec<&Deal> = deals.iter().filter(|d| d.stage.is_won()).collect();
    let closed_deals = won.len();
    let total_revenue = won.iter().map(|d| d.value).sum();

    let active_leads = leads.iter().filter(|l| l.is_active()).count();

    let conversion_rate = if leads.is_empty() {
        0.0
    } else {
        round2(closed_deals as f64 / leads.len() as f64 * 100.0)
    };

    DashboardStats {
        total_revenue,
        active_leads,
        conversion_rate,
        closed_deals,
    }
}

/// Count of deals per stage.
pub fn deals_by_stage(deals: &[Deal]) -> BTreeMap<String, u64> {
    let mut stages = BTreeMap::new();
    for deal in deals {
        *stages.entry(deal.stage.to_string()).or_insert(0) += 1;
    }
    stages
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`.
    pub month: String,
    pub revenue: f64,
}

/// Won-deal revenue bucketed by close-date month, ascending.
///
/// Won deals without a close date cannot be bucketed and are skipped.
pub fn revenue_by_month(deals: &[Deal]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for deal in deals.iter().filter(|d| d.stage.is_won()) {
        let Some(close) = deal.close_date else {
            continue;
        };
        let key = format!("{:04}-{:02}", close.year(), close.month());
        *months.entry(key).or_insert(0.0) += deal.value;
    }

    months
        .into_iter()
        .map(|(month, revenue)| MonthlyRevenue { month, revenue })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesLeader {
    pub owner_id: UserId,
    pub deals_won: usize,
    pub revenue: f64,
}

/// Owners ranked by won revenue, best first, at most `limit` entries.
pub fn top_sales(deals: &[Deal], limit: usize) -> Vec<SalesLeader> {
    let mut by_owner: BTreeMap<UserId, (usize, f64)> = BTreeMap::new();
    for deal in deals.iter().filter(|d| d.stage.is_won()) {
        let entry = by_owner.entry(deal.owner_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += deal.value;
    }

    let mut leaders: Vec<SalesLeader> = by_owner
        .into_iter()
        .map(|(owner_id, (deals_won, revenue))| SalesLeader {
            owner_id,
            deals_won,
            revenue,
        })
        .collect();

    leaders.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    leaders.truncate(limit);
    leaders
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub leads: usize,
    pub deals: usize,
    pub won_deals: usize,
    pub conversion_rate: f64,
}

/// Funnel conversion: won deals over total leads, as a percentage.
pub fn conversion_rate(lead_count: usize, deals: &[Deal]) -> ConversionReport {
    let won_deals = deals.iter().filter(|d| d.stage.is_won()).count();
    let rate = if lead_count == 0 {
        0.0
    } else {
        won_deals as f64 / lead_count as f64 * 100.0
    };

    ConversionReport {
        leads: lead_count,
        deals: deals.len(),
        won_deals,
        conversion_rate: rate,
    }
}

/// The generate-report payload: one snapshot of the funnel.
///
/// Rendering (PDF/CSV) is an external concern; this is the data it would be
/// rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub title: &'static str,
    pub generated_at: DateTime<Utc>,
    pub total_leads: usize,
    pub total_deals: usize,
    pub closed_deals: usize,
    pub total_revenue: f64,
    pub conversion_rate: f64,
}

pub fn summary(lead_count: usize, deals: &[Deal]) -> ReportSummary {
    let won: Vec<&Deal> = deals.iter().filter(|d| d.stage.is_won()).collect();
    let conversion = if lead_count == 0 {
        0.0
    } else {
        round2(won.len() as f64 / lead_count as f64 * 100.0)
    };

    ReportSummary {
        title: "CRM Dashboard Report",
        generated_at: Utc::now(),
        total_leads: lead_count,
        total_deals: deals.len(),
        closed_deals: won.len(),
        total_revenue: won.iter().map(|d| d.value).sum(),
        conversion_rate: conversion,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pipecrm_deals::{DealStage, NewDeal};
    use pipecrm_leads::NewLead;

    use super::*;

    fn lead(status: Option<&str>) -> Lead {
        Lead::create(
            "jane@acme.io",
            NewLead {
                first_name: "A".into(),
                last_name: "B".into(),
                email: None,
                company: None,
                phone: None,
                source: None,
                status: status.map(Into::into),
                notes: None,
            },
        )
    }

    fn deal(owner: UserId, stage: DealStage, value: f64, close: Option<(i32, u32)>) -> Deal {
        let mut d = Deal::create(
            owner,
            NewDeal {
                title: "t".into(),
                value,
                stage: Some(stage),
                close_date: close.map(|(y, m)| NaiveDate::from_ymd_opt(y, m, 15).unwrap()),
            },
        );
        d.stage = stage;
        d
    }

    #[test]
    fn stats_count_won_revenue_and_active_leads() {
        let owner = UserId::new();
        let leads = vec![
            lead(Some("new")),
            lead(Some("Lost")),
            lead(None),
            lead(Some("contacted")),
        ];
        let deals = vec![
            deal(owner, DealStage::Won, 1_000.0, None),
            deal(owner, DealStage::Won, 500.0, None),
            deal(owner, DealStage::Proposal, 9_999.0, None),
        ];

        let stats = dashboard_stats(&leads, &deals);
        assert_eq!(stats.total_revenue, 1_500.0);
        assert_eq!(stats.active_leads, 2);
        assert_eq!(stats.closed_deals, 2);
        assert_eq!(stats.conversion_rate, 50.0);
    }

    #[test]
    fn stats_on_empty_inputs_are_zero() {
        let stats = dashboard_stats(&[], &[]);
        assert_eq!(stats.conversion_rate, 0.0);
        assert_eq!(stats.total_revenue, 0.0);
    }

    #[test]
    fn conversion_rate_rounds_to_two_decimals() {
        let owner = UserId::new();
        let leads: Vec<Lead> = (0..3).map(|_| lead(Some("new"))).collect();
        let deals = vec![deal(owner, DealStage::Won, 1.0, None)];

        // 1/3 → 33.333…% → 33.33
        assert_eq!(dashboard_stats(&leads, &deals).conversion_rate, 33.33);
    }

    #[test]
    fn deals_group_by_stage() {
        let owner = UserId::new();
        let deals = vec![
            deal(owner, DealStage::Won, 1.0, None),
            deal(owner, DealStage::Won, 1.0, None),
            deal(owner, DealStage::New, 1.0, None),
        ];

        let by_stage = deals_by_stage(&deals);
        assert_eq!(by_stage["won"], 2);
        assert_eq!(by_stage["new"], 1);
    }

    #[test]
    fn revenue_buckets_by_close_month_ascending() {
        let owner = UserId::new();
        let deals = vec![
            deal(owner, DealStage::Won, 100.0, Some((2026, 3))),
            deal(owner, DealStage::Won, 50.0, Some((2026, 1))),
            deal(owner, DealStage::Won, 25.0, Some((2026, 3))),
            deal(owner, DealStage::Lost, 999.0, Some((2026, 3))),
            deal(owner, DealStage::Won, 10.0, None), // no close date: skipped
        ];

        let months = revenue_by_month(&deals);
        assert_eq!(
            months,
            vec![
                MonthlyRevenue { month: "2026-01".into(), revenue: 50.0 },
                MonthlyRevenue { month: "2026-03".into(), revenue: 125.0 },
            ]
        );
    }

    #[test]
    fn top_sales_ranks_by_won_revenue() {
        let alice = UserId::new();
        let bob = UserId::new();
        let deals = vec![
            deal(alice, DealStage::Won, 100.0, None),
            deal(bob, DealStage::Won, 300.0, None),
            deal(alice, DealStage::Won, 50.0, None),
            deal(alice, DealStage::Proposal, 10_000.0, None),
        ];

        let leaders = top_sales(&deals, 5);
        assert_eq!(leaders.len(), 2);
        assert_eq!(leaders[0].owner_id, bob);
        assert_eq!(leaders[0].revenue, 300.0);
        assert_eq!(leaders[1].deals_won, 2);
        assert_eq!(leaders[1].revenue, 150.0);
    }

    #[test]
    fn funnel_conversion_handles_zero_leads() {
        let report = conversion_rate(0, &[]);
        assert_eq!(report.conversion_rate, 0.0);
    }

    #[test]
    fn summary_matches_its_inputs() {
        let owner = UserId::new();
        let deals = vec![
            deal(owner, DealStage::Won, 2_000.0, None),
            deal(owner, DealStage::New, 1.0, None),
        ];

        let report = summary(4, &deals);
        assert_eq!(report.total_leads, 4);
        assert_eq!(report.total_deals, 2);
        assert_eq!(report.closed_deals, 1);
        assert_eq!(report.total_revenue, 2_000.0);
        assert_eq!(report.conversion_rate, 25.0);
    }
}
