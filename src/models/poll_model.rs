use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A poll prompt with a visibility window and an optional voting window.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub publication_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Question {
    pub fn new(text: &str, publication_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>) -> Self {
        Self {
            id: nanoid::nanoid!(),
            text: text.to_string(),
            publication_time,
            end_time,
        }
    }

    /// True once `now` has reached the publication time.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        now >= self.publication_time
    }

    /// True if the question was published within the last day, both ends inclusive.
    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) <= self.publication_time && self.publication_time <= now
    }

    /// True while `now` lies inside the voting window. An absent end time
    /// leaves the window open for as long as the question is published.
    pub fn can_vote(&self, now: DateTime<Utc>) -> bool {
        match self.end_time {
            None => self.is_published(now),
            Some(end_time) => self.publication_time <= now && now <= end_time,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Choice {
    pub id: String,
    pub question_id: String,
    pub text: String,
}

impl Choice {
    pub fn new(question_id: &str, text: &str) -> Self {
        Self {
            id: nanoid::nanoid!(),
            question_id: question_id.to_string(),
            text: text.to_string(),
        }
    }
}

/// One user's current selection for one question.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Vote {
    pub user_id: String,
    pub question_id: String,
    pub choice_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

/// The identity attached to a request by a valid session cookie.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub is_staff: bool,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        AuthUser {
            id: user.id.clone(),
            username: user.username.clone(),
            is_staff: user.is_staff,
        }
    }
}
