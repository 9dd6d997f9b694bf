//! DTOs for the user statistics endpoint.

use serde::Serialize;
use serde_with::skip_serializing_none;
use time::Date;
use utoipa::ToSchema;

use crate::dao::models::UserStatsEntity;

/// Cumulative prediction statistics returned to the owning user.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Total points earned from correct predictions.
    pub points: u32,
    /// Number of correct predictions.
    pub wins: u32,
    /// Number of incorrect predictions.
    pub losses: u32,
    /// Percentage of correct predictions.
    pub accuracy: f32,
    /// Consecutive correct predictions.
    pub current_win_streak: u32,
    /// Highest win streak ever reached.
    pub best_win_streak: u32,
    /// Consecutive days with a resolved prediction.
    pub daily_streak: u32,
    /// Highest daily streak ever reached.
    pub best_daily_streak: u32,
    /// Date of the most recent resolved prediction.
    pub last_answered_date: Option<Date>,
}

impl From<UserStatsEntity> for StatsResponse {
    fn from(value: UserStatsEntity) -> Self {
        Self {
            points: value.points,
            wins: value.wins,
            losses: value.losses,
            accuracy: value.accuracy,
            current_win_streak: value.current_win_streak,
            best_win_streak: value.best_win_streak,
            daily_streak: value.daily_streak,
            best_daily_streak: value.best_daily_streak,
            last_answered_date: value.last_answered_date,
        }
    }
}
