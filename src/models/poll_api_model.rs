use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::poll_model::{Choice, Question};

#[derive(Deserialize, Serialize, Debug)]
pub struct NewQuestionRequest {
    pub text: String,
    pub publication_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub choices: Vec<ChoiceRequest>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChoiceRequest {
    pub text: String,
}

/// Body of `POST /polls/{id}/vote/`.
#[derive(Deserialize, Debug)]
pub struct VoteForm {
    pub choice: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct NextParam {
    pub next: Option<String>,
}

/// A question as shown in listings, with its eligibility flags evaluated.
#[derive(Serialize, Deserialize, Debug)]
pub struct QuestionSummary {
    #[serde(flatten)]
    pub question: Question,
    pub is_published: bool,
    pub was_published_recently: bool,
    pub can_vote: bool,
}

impl QuestionSummary {
    pub fn from_question(question: Question, now: DateTime<Utc>) -> Self {
        Self {
            is_published: question.is_published(now),
            was_published_recently: question.was_published_recently(now),
            can_vote: question.can_vote(now),
            question,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QuestionList {
    pub latest_question_list: Vec<QuestionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Ballot context: the question, its choices and the caller's current pick.
#[derive(Serialize, Deserialize, Debug)]
pub struct QuestionDetail {
    pub question: Question,
    pub choices: Vec<Choice>,
    pub prev_vote: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PollOptionResult {
    pub id: String,
    pub text: String,
    pub votes_count: i64,
    pub votes_percentage: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PollResults {
    pub id: String,
    pub title: String,
    pub total_votes: i64,
    pub options: Vec<PollOptionResult>,
}
