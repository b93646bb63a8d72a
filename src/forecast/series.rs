use serde::{Deserialize, Serialize};

use crate::errors::CostScopeError;

/// One observed day of cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostPoint {
    pub day_index: i64,
    pub cost: f64,
}

/// An ordered daily cost time series with strictly increasing, contiguous
/// day indices. Validated on construction so the statistics downstream can
/// assume a well-formed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CostPoint>", into = "Vec<CostPoint>")]
pub struct CostSeries {
    points: Vec<CostPoint>,
}

impl CostSeries {
    pub fn new(points: Vec<CostPoint>) -> Result<Self, CostScopeError> {
        for pair in points.windows(2) {
            if pair[1].day_index != pair[0].day_index + 1 {
                return Err(CostScopeError::InvalidInput(format!(
                    "cost series must be contiguous: day {} followed by day {}",
                    pair[0].day_index, pair[1].day_index
                )));
            }
        }
        if let Some(bad) = points.iter().find(|p| !p.cost.is_finite()) {
            return Err(CostScopeError::InvalidInput(format!(
                "non-finite cost at day {}",
                bad.day_index
            )));
        }
        Ok(Self { points })
    }

    /// Build a series from consecutive daily costs starting at `start_day`.
    pub fn from_daily_costs(start_day: i64, costs: &[f64]) -> Result<Self, CostScopeError> {
        Self::new(
            costs
                .iter()
                .enumerate()
                .map(|(i, &cost)| CostPoint {
                    day_index: start_day + i as i64,
                    cost,
                })
                .collect(),
        )
    }

    pub fn points(&self) -> &[CostPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.cost).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<CostPoint>> for CostSeries {
    type Error = CostScopeError;

    fn try_from(points: Vec<CostPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<CostSeries> for Vec<CostPoint> {
    fn from(series: CostSeries) -> Self {
        series.points
    }
}
