use std::error::Error;

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use log::error;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};

use crate::models::poll_model::Question;

#[derive(Deserialize, Serialize, Debug)]
pub struct QuestionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub publication_time: BsonDateTime,
    pub end_time: Option<BsonDateTime>,
}

impl From<Question> for QuestionDocument {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            text: question.text,
            publication_time: BsonDateTime::from_chrono(question.publication_time),
            end_time: question.end_time.map(BsonDateTime::from_chrono),
        }
    }
}

impl From<QuestionDocument> for Question {
    fn from(document: QuestionDocument) -> Self {
        Self {
            id: document.id,
            text: document.text,
            publication_time: document.publication_time.to_chrono(),
            end_time: document.end_time.map(|t| t.to_chrono()),
        }
    }
}

pub struct QuestionRepo {
    pub collection: Collection<QuestionDocument>,
}

impl QuestionRepo {
    pub async fn init(db: &Database) -> Result<Self, Box<dyn Error>> {
        let questions_collection: Collection<QuestionDocument> = db.collection("questions");

        let index = IndexModel::builder()
            .keys(doc! {"publication_time": -1, "_id": 1})
            .build();

        if let Err(e) = questions_collection.create_index(index).await {
            error!("Failed to create index on `publication_time`: {:?}", e);
        }

        Ok(Self {
            collection: questions_collection,
        })
    }

    pub async fn insert(&self, question: Question) -> Result<()> {
        self.collection
            .insert_one(QuestionDocument::from(question))
            .await
            .map_err(|e| {
                error!("Error inserting question {}", e);
                anyhow::Error::new(e)
            })?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Question>> {
        let result = self.collection.find_one(doc! {"_id": id}).await?;
        Ok(result.map(Question::from))
    }

    /// Published questions, newest first, ties broken by id.
    pub async fn published(&self, now: DateTime<Utc>) -> Result<Vec<Question>> {
        let filter = doc! {"publication_time": {"$lte": BsonDateTime::from_chrono(now)}};
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! {"publication_time": -1, "_id": 1})
            .await?;
        let documents: Vec<QuestionDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Question::from).collect())
    }

    pub async fn all(&self) -> Result<Vec<Question>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! {"publication_time": -1, "_id": 1})
            .await?;
        let documents: Vec<QuestionDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Question::from).collect())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! {"_id": id}).await.map_err(|e| {
            error!("Error deleting question {} {}", id, e);
            anyhow::Error::new(e)
        })?;
        Ok(result.deleted_count > 0)
    }
}
