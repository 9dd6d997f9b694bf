//! Document shapes stored in MongoDB and their entity conversions.
//!
//! Civil dates are stored as `YYYY-MM-DD` strings so that range queries and
//! sorts over publication dates stay lexicographic.

use mongodb::bson::{Binary, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{Correctness, QuestionEntity, UserStatsEntity, VoteRecordEntity, VoterIdentity};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Render a civil date as the stored `YYYY-MM-DD` column value.
pub fn encode_date(date: Date) -> String {
    date.format(&DATE_FORMAT)
        .unwrap_or_else(|_| "invalid-date".into())
}

/// Parse a stored `YYYY-MM-DD` column value back into a civil date.
pub fn decode_date(value: &str) -> Result<Date, MongoDaoError> {
    Date::parse(value, &DATE_FORMAT).map_err(|source| MongoDaoError::DecodeDate {
        value: value.to_owned(),
        source,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    published_at: String,
    prompt: String,
    choices: Vec<String>,
    #[serde(default)]
    image_url: Option<String>,
    results_unlock_date: String,
}

impl From<QuestionEntity> for MongoQuestionDocument {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            published_at: encode_date(value.published_at),
            prompt: value.prompt,
            choices: value.choices,
            image_url: value.image_url,
            results_unlock_date: encode_date(value.results_unlock_date),
        }
    }
}

impl TryFrom<MongoQuestionDocument> for QuestionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoQuestionDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            published_at: decode_date(&value.published_at)?,
            prompt: value.prompt,
            choices: value.choices,
            image_url: value.image_url,
            results_unlock_date: decode_date(&value.results_unlock_date)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoVoteDocument {
    question_id: Uuid,
    voter: VoterIdentity,
    answer: String,
    prediction: String,
    #[serde(default)]
    correct: Option<bool>,
}

impl From<VoteRecordEntity> for MongoVoteDocument {
    fn from(value: VoteRecordEntity) -> Self {
        Self {
            question_id: value.question_id,
            voter: value.voter,
            answer: value.answer,
            prediction: value.prediction,
            correct: value.correctness.as_flag(),
        }
    }
}

impl From<MongoVoteDocument> for VoteRecordEntity {
    fn from(value: MongoVoteDocument) -> Self {
        Self {
            question_id: value.question_id,
            voter: value.voter,
            answer: value.answer,
            prediction: value.prediction,
            correctness: Correctness::from_flag(value.correct),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoStatsDocument {
    #[serde(rename = "_id")]
    user_id: Uuid,
    points: u32,
    wins: u32,
    losses: u32,
    accuracy: f32,
    current_win_streak: u32,
    best_win_streak: u32,
    daily_streak: u32,
    best_daily_streak: u32,
    #[serde(default)]
    last_answered_date: Option<String>,
}

impl From<UserStatsEntity> for MongoStatsDocument {
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
            last_answered_date: value.last_answered_date.map(encode_date),
        }
    }
}

impl TryFrom<MongoStatsDocument> for UserStatsEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoStatsDocument) -> Result<Self, Self::Error> {
        let last_answered_date = match value.last_answered_date {
            Some(ref stored) => Some(decode_date(stored)?),
            None => None,
        };
        Ok(Self {
            user_id: value.user_id,
            points: value.points,
            wins: value.wins,
            losses: value.losses,
            accuracy: value.accuracy,
            current_win_streak: value.current_win_streak,
            best_win_streak: value.best_win_streak,
            daily_streak: value.daily_streak,
            best_daily_streak: value.best_daily_streak,
            last_answered_date,
        })
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

/// Filter matching a document by its UUID primary key.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn dates_round_trip_through_the_stored_format() {
        let original = date!(2026 - 01 - 31);
        let encoded = encode_date(original);
        assert_eq!(encoded, "2026-01-31");
        assert_eq!(decode_date(&encoded).unwrap(), original);
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert!(decode_date("not-a-date").is_err());
        assert!(decode_date("2026-13-01").is_err());
    }
}
