use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use choices_repo::ChoiceRepo;
use log::{error, info};
use mongodb::Client;
use questions_repo::QuestionRepo;
use tokio::try_join;
use users_repo::UserRepo;
use votes_repo::VoteRepo;

use crate::{
    config::app_config::AppConfig,
    models::poll_model::{Choice, Question, User, Vote},
};
pub mod choices_repo;
pub mod memory_store;
pub mod questions_repo;
pub mod users_repo;
pub mod votes_repo;

/// Record store for questions, choices, votes and users.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Questions published at `now`, newest publication first, ties by id.
    async fn published_questions(&self, now: DateTime<Utc>) -> Result<Vec<Question>>;
    async fn all_questions(&self) -> Result<Vec<Question>>;
    async fn find_question(&self, id: &str) -> Result<Option<Question>>;
    async fn insert_question(&self, question: Question, choices: Vec<Choice>) -> Result<()>;
    /// Removes the question with its choices and their votes.
    async fn delete_question(&self, id: &str) -> Result<bool>;
    async fn choices_for(&self, question_id: &str) -> Result<Vec<Choice>>;
    async fn find_choice(&self, question_id: &str, choice_id: &str) -> Result<Option<Choice>>;
    async fn find_vote(&self, user_id: &str, question_id: &str) -> Result<Option<Vote>>;
    /// Creates or reassigns the single vote keyed by (user, question), atomically.
    async fn upsert_vote(&self, vote: Vote) -> Result<()>;
    /// Vote count per choice id.
    async fn tally(&self, question_id: &str) -> Result<HashMap<String, i64>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Returns `false` when the username is taken.
    async fn insert_user(&self, user: User) -> Result<bool>;
}

pub struct DB {
    pub questions: QuestionRepo,
    pub choices: ChoiceRepo,
    pub votes: VoteRepo,
    pub users: UserRepo,
}

impl DB {
    pub async fn init(app_config: &AppConfig) -> Result<Self> {
        let client = Client::with_uri_str(&app_config.db_url).await?;
        info!("Connected to database!");
        let database = client.database(&app_config.db_name);
        let (questions, choices, votes, users) = try_join!(
            QuestionRepo::init(&database),
            ChoiceRepo::init(&database),
            VoteRepo::init(&database),
            UserRepo::init(&database)
        )
        .map_err(|e| {
            error!("Error initializing collection: {}", e);
            anyhow!("Error initializing collection: {}", e)
        })?;
        Ok(DB {
            questions,
            choices,
            votes,
            users,
        })
    }
}

/// The choice insert failure is what the caller sees; a failed rollback is
/// only logged.
fn keep_insert_error(question_id: &str, insert_error: anyhow::Error, rollback: Result<bool>) -> anyhow::Error {
    if let Err(e) = rollback {
        error!("Error removing question {} after its choices failed {}", question_id, e);
    }
    insert_error
}

#[async_trait]
impl PollStore for DB {
    async fn published_questions(&self, now: DateTime<Utc>) -> Result<Vec<Question>> {
        self.questions.published(now).await
    }

    async fn all_questions(&self) -> Result<Vec<Question>> {
        self.questions.all().await
    }

    async fn find_question(&self, id: &str) -> Result<Option<Question>> {
        self.questions.get(id).await
    }

    async fn insert_question(&self, question: Question, choices: Vec<Choice>) -> Result<()> {
        let question_id = question.id.clone();
        self.questions.insert(question).await?;
        if let Err(e) = self.choices.insert_all(choices).await {
            // leave no question behind without its choices
            let rollback = self.questions.delete(&question_id).await;
            return Err(keep_insert_error(&question_id, e, rollback));
        }
        Ok(())
    }

    async fn delete_question(&self, id: &str) -> Result<bool> {
        if self.questions.get(id).await?.is_none() {
            return Ok(false);
        }
        self.votes.delete_for_question(id).await?;
        self.choices.delete_for_question(id).await?;
        self.questions.delete(id).await
    }

    async fn choices_for(&self, question_id: &str) -> Result<Vec<Choice>> {
        self.choices.for_question(question_id).await
    }

    async fn find_choice(&self, question_id: &str, choice_id: &str) -> Result<Option<Choice>> {
        self.choices.get(question_id, choice_id).await
    }

    async fn find_vote(&self, user_id: &str, question_id: &str) -> Result<Option<Vote>> {
        self.votes.find(user_id, question_id).await
    }

    async fn upsert_vote(&self, vote: Vote) -> Result<()> {
        self.votes.upsert(&vote).await
    }

    async fn tally(&self, question_id: &str) -> Result<HashMap<String, i64>> {
        self.votes.tally(question_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users.search_by_username(username).await
    }

    async fn insert_user(&self, user: User) -> Result<bool> {
        self.users.insert(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_rollback_keeps_the_insert_error() {
        let error = keep_insert_error("q1", anyhow!("choices rejected"), Err(anyhow!("delete failed")));
        assert_eq!(error.to_string(), "choices rejected");
        let error = keep_insert_error("q1", anyhow!("choices rejected"), Ok(true));
        assert_eq!(error.to_string(), "choices rejected");
    }
}
