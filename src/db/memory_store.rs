use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::PollStore;
use crate::models::poll_model::{Choice, Question, User, Vote};

#[derive(Default)]
struct Tables {
    questions: Vec<Question>,
    choices: Vec<Choice>,
    // keyed by (user_id, question_id)
    votes: HashMap<(String, String), Vote>,
    users: Vec<User>,
}

/// In-process store used by tests and `memory:` database URLs.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

fn newest_first(questions: &mut [Question]) {
    questions.sort_by(|a, b| {
        b.publication_time
            .cmp(&a.publication_time)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn published_questions(&self, now: DateTime<Utc>) -> Result<Vec<Question>> {
        let tables = self.lock()?;
        let mut questions: Vec<Question> = tables
            .questions
            .iter()
            .filter(|q| q.is_published(now))
            .cloned()
            .collect();
        newest_first(&mut questions);
        Ok(questions)
    }

    async fn all_questions(&self) -> Result<Vec<Question>> {
        let mut questions = self.lock()?.questions.clone();
        newest_first(&mut questions);
        Ok(questions)
    }

    async fn find_question(&self, id: &str) -> Result<Option<Question>> {
        Ok(self.lock()?.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn insert_question(&self, question: Question, choices: Vec<Choice>) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.questions.iter().any(|q| q.id == question.id) {
            return Err(anyhow!("question {} already exists", question.id));
        }
        tables.questions.push(question);
        tables.choices.extend(choices);
        Ok(())
    }

    async fn delete_question(&self, id: &str) -> Result<bool> {
        let mut tables = self.lock()?;
        let before = tables.questions.len();
        tables.questions.retain(|q| q.id != id);
        if tables.questions.len() == before {
            return Ok(false);
        }
        tables.choices.retain(|c| c.question_id != id);
        tables.votes.retain(|(_, question_id), _| question_id != id);
        Ok(true)
    }

    async fn choices_for(&self, question_id: &str) -> Result<Vec<Choice>> {
        Ok(self
            .lock()?
            .choices
            .iter()
            .filter(|c| c.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn find_choice(&self, question_id: &str, choice_id: &str) -> Result<Option<Choice>> {
        Ok(self
            .lock()?
            .choices
            .iter()
            .find(|c| c.question_id == question_id && c.id == choice_id)
            .cloned())
    }

    async fn find_vote(&self, user_id: &str, question_id: &str) -> Result<Option<Vote>> {
        let key = (user_id.to_string(), question_id.to_string());
        Ok(self.lock()?.votes.get(&key).cloned())
    }

    async fn upsert_vote(&self, vote: Vote) -> Result<()> {
        let key = (vote.user_id.clone(), vote.question_id.clone());
        self.lock()?.votes.insert(key, vote);
        Ok(())
    }

    async fn tally(&self, question_id: &str) -> Result<HashMap<String, i64>> {
        let tables = self.lock()?;
        let mut counts = HashMap::new();
        for vote in tables.votes.values().filter(|v| v.question_id == question_id) {
            *counts.entry(vote.choice_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: User) -> Result<bool> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Ok(false);
        }
        tables.users.push(user);
        Ok(true)
    }
}
