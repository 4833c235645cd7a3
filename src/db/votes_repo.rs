use std::{collections::HashMap, error::Error};

use anyhow::Result;
use futures::TryStreamExt;
use log::{debug, error};
use mongodb::{
    bson::{doc, Document},
    results::DeleteResult,
    Collection, Database, IndexModel,
};

use crate::models::poll_model::Vote;

pub struct VoteRepo {
    pub collection: Collection<Vote>,
}

impl VoteRepo {
    pub async fn init(db: &Database) -> Result<Self, Box<dyn Error>> {
        let votes_collection: Collection<Vote> = db.collection("votes");

        let index = IndexModel::builder()
            .keys(doc! {"user_id": 1, "question_id": 1})
            .options(
                mongodb::options::IndexOptions::builder()
                    .unique(true)
                    .name(Some("unique_user_question".to_string()))
                    .build(),
            )
            .build();

        // one vote per (user, question) rests on this index
        if let Err(e) = votes_collection.create_index(index).await {
            error!("Failed to create index on `user_id, question_id`: {:?}", e);
            return Err(e.into());
        }

        Ok(Self {
            collection: votes_collection,
        })
    }

    pub async fn find(&self, user_id: &str, question_id: &str) -> Result<Option<Vote>> {
        let filter = doc! {"user_id": user_id, "question_id": question_id};
        let result = self.collection.find_one(filter).await.map_err(|e| {
            error!("Error finding vote of {} on {} {}", user_id, question_id, e);
            anyhow::Error::new(e)
        })?;
        Ok(result)
    }

    /// Points the user's vote on the question at `choice_id`, creating it on
    /// the first vote. The unique index keeps this at one record per pair.
    pub async fn upsert(&self, vote: &Vote) -> Result<()> {
        let filter = doc! {"user_id": vote.user_id.as_str(), "question_id": vote.question_id.as_str()};
        let update = doc! {"$set": {"choice_id": vote.choice_id.as_str()}};
        let result = self
            .collection
            .update_one(filter, update)
            .upsert(true)
            .await
            .map_err(|e| {
                error!("Error saving vote {:?} {}", vote, e);
                anyhow::Error::new(e)
            })?;
        debug!(
            "vote saved: matched {} upserted {:?}",
            result.matched_count, result.upserted_id
        );
        Ok(())
    }

    pub async fn tally(&self, question_id: &str) -> Result<HashMap<String, i64>> {
        let pipeline = vec![
            doc! {"$match": {"question_id": question_id}},
            doc! {"$group": {"_id": "$choice_id", "count": {"$sum": 1}}},
        ];
        let cursor = self.collection.aggregate(pipeline).await?;
        let groups: Vec<Document> = cursor.try_collect().await?;

        let mut counts = HashMap::new();
        for group in groups {
            let choice_id = group.get_str("_id")?.to_string();
            let count = match group.get_i32("count") {
                Ok(count) => count as i64,
                Err(_) => group.get_i64("count")?,
            };
            counts.insert(choice_id, count);
        }
        Ok(counts)
    }

    pub async fn delete_for_question(&self, question_id: &str) -> Result<DeleteResult> {
        let result = self
            .collection
            .delete_many(doc! {"question_id": question_id})
            .await
            .map_err(|e| {
                error!("Error deleting votes of {} {}", question_id, e);
                anyhow::Error::new(e)
            })?;
        Ok(result)
    }
}
