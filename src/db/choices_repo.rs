use std::error::Error;

use anyhow::Result;
use futures::TryStreamExt;
use log::error;
use mongodb::{bson::doc, results::DeleteResult, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use crate::models::poll_model::Choice;

#[derive(Deserialize, Serialize, Debug)]
pub struct ChoiceDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub question_id: String,
    pub text: String,
    // keeps choices in the order they were created
    pub position: i32,
}

impl From<ChoiceDocument> for Choice {
    fn from(document: ChoiceDocument) -> Self {
        Self {
            id: document.id,
            question_id: document.question_id,
            text: document.text,
        }
    }
}

pub struct ChoiceRepo {
    pub collection: Collection<ChoiceDocument>,
}

impl ChoiceRepo {
    pub async fn init(db: &Database) -> Result<Self, Box<dyn Error>> {
        let choices_collection: Collection<ChoiceDocument> = db.collection("choices");

        let index = IndexModel::builder()
            .keys(doc! {"question_id": 1, "position": 1})
            .build();

        if let Err(e) = choices_collection.create_index(index).await {
            error!("Failed to create index on `question_id`: {:?}", e);
        }

        Ok(Self {
            collection: choices_collection,
        })
    }

    pub async fn insert_all(&self, choices: Vec<Choice>) -> Result<()> {
        if choices.is_empty() {
            return Ok(());
        }
        let documents = choices.into_iter().enumerate().map(|(position, choice)| ChoiceDocument {
            id: choice.id,
            question_id: choice.question_id,
            text: choice.text,
            position: position as i32,
        });
        self.collection.insert_many(documents).await.map_err(|e| {
            error!("Error inserting choices {}", e);
            anyhow::Error::new(e)
        })?;
        Ok(())
    }

    pub async fn for_question(&self, question_id: &str) -> Result<Vec<Choice>> {
        let cursor = self
            .collection
            .find(doc! {"question_id": question_id})
            .sort(doc! {"position": 1})
            .await?;
        let documents: Vec<ChoiceDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Choice::from).collect())
    }

    pub async fn get(&self, question_id: &str, choice_id: &str) -> Result<Option<Choice>> {
        let filter = doc! {"_id": choice_id, "question_id": question_id};
        let result = self.collection.find_one(filter).await?;
        Ok(result.map(Choice::from))
    }

    pub async fn delete_for_question(&self, question_id: &str) -> Result<DeleteResult> {
        let result = self
            .collection
            .delete_many(doc! {"question_id": question_id})
            .await
            .map_err(|e| {
                error!("Error deleting choices of {} {}", question_id, e);
                anyhow::Error::new(e)
            })?;
        Ok(result)
    }
}
