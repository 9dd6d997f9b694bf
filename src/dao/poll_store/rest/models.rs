//! Row shapes exchanged with the remote table API.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::error::RestDaoError;
use crate::dao::models::{
    Correctness, QuestionEntity, UserStatsEntity, VoteRecordEntity, VoterIdentity,
};

/// Questions table.
pub const QUESTIONS_TABLE: &str = "poll_questions";
/// Vote records table.
pub const ANSWERS_TABLE: &str = "poll_answers";
/// User statistics table.
pub const STATS_TABLE: &str = "user_stats";

/// Row of the `poll_questions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRow {
    pub id: Uuid,
    pub question_text: String,
    pub options: Vec<String>,
    pub published_at: Date,
    pub results_unlock_date: Date,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<QuestionEntity> for QuestionRow {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            question_text: value.prompt,
            options: value.choices,
            published_at: value.published_at,
            results_unlock_date: value.results_unlock_date,
            image_url: value.image_url,
        }
    }
}

impl From<QuestionRow> for QuestionEntity {
    fn from(value: QuestionRow) -> Self {
        Self {
            id: value.id,
            published_at: value.published_at,
            prompt: value.question_text,
            choices: value.options,
            image_url: value.image_url,
            results_unlock_date: value.results_unlock_date,
        }
    }
}

/// Row of the `poll_answers` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRow {
    pub question_id: Uuid,
    pub user_id: Uuid,
    pub answer: String,
    pub prediction: String,
    pub correct: Option<bool>,
}

impl TryFrom<VoteRecordEntity> for AnswerRow {
    type Error = RestDaoError;

    fn try_from(value: VoteRecordEntity) -> Result<Self, Self::Error> {
        let user_id = value.voter.user_id().ok_or(RestDaoError::AnonymousVoter)?;
        Ok(Self {
            question_id: value.question_id,
            user_id,
            answer: value.answer,
            prediction: value.prediction,
            correct: value.correctness.as_flag(),
        })
    }
}

impl From<AnswerRow> for VoteRecordEntity {
    fn from(value: AnswerRow) -> Self {
        Self {
            question_id: value.question_id,
            voter: VoterIdentity::User(value.user_id),
            answer: value.answer,
            prediction: value.prediction,
            correctness: Correctness::from_flag(value.correct),
        }
    }
}

/// Row of the `user_stats` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRow {
    pub user_id: Uuid,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub accuracy: f32,
    pub current_win_streak: u32,
    pub best_win_streak: u32,
    pub daily_streak: u32,
    pub best_daily_streak: u32,
    #[serde(default)]
    pub last_answered_date: Option<Date>,
}

impl From<UserStatsEntity> for StatsRow {
    fn from(value: UserStatsEntity) -> Self {
        Self {
            user_id: value.user_id,
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

impl From<StatsRow> for UserStatsEntity {
    fn from(value: StatsRow) -> Self {
        Self {
            user_id: value.user_id,
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
