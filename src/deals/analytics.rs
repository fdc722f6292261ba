use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::deals::stage::{DealStage, CANONICAL_STAGES};
use crate::deals::Deal;

/// One slice of the pipeline funnel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageStats {
    pub stage: DealStage,
    pub count: i64,
    pub total_value: f64,
}

/// Dashboard rollup of the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSummary {
    pub total_pipeline_value: f64,
    pub active_deals_count: i64,
    pub monthly_closed_deals_count: i64,
    pub monthly_closed_deals_value: f64,
    pub win_rate: i32,
}

/// Count and total value per board stage, always in funnel order
/// regardless of how the input is ordered. `Closed Lost` deals appear in no
/// funnel row.
pub fn compute_funnel(deals: &[Deal]) -> Vec<StageStats> {
    CANONICAL_STAGES
        .iter()
        .map(|&stage| {
            let mut count = 0i64;
            let mut total_value = 0.0f64;
            for deal in deals.iter().filter(|d| d.stage == stage) {
                count += 1;
                total_value += deal.value;
            }
            StageStats {
                stage,
                count,
                total_value,
            }
        })
        .collect()
}

/// Pipeline rollup against a reference instant.
///
/// `now` decides which `Closed Won` deals count as closing this month;
/// passing it in keeps the computation reproducible for a given snapshot.
pub fn compute_summary(deals: &[Deal], now: DateTime<Utc>) -> PipelineSummary {
    let mut total_pipeline_value = 0.0f64;
    let mut active_deals_count = 0i64;
    let mut monthly_closed_deals_count = 0i64;
    let mut monthly_closed_deals_value = 0.0f64;
    let mut won = 0i64;
    let mut lost = 0i64;

    for deal in deals {
        match deal.stage {
            DealStage::ClosedWon => {
                won += 1;
                if same_month(deal.expected_close_date, now) {
                    monthly_closed_deals_count += 1;
                    monthly_closed_deals_value += deal.value;
                }
            }
            DealStage::ClosedLost => lost += 1,
            _ => {
                total_pipeline_value += deal.value;
                active_deals_count += 1;
            }
        }
    }

    let closed = won + lost;
    let win_rate = if closed > 0 {
        ((100.0 * won as f64) / closed as f64).round() as i32
    } else {
        0
    };

    PipelineSummary {
        total_pipeline_value,
        active_deals_count,
        monthly_closed_deals_count,
        monthly_closed_deals_value,
        win_rate,
    }
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
