use anyhow::Result;
use log::error;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    error::{ErrorKind, WriteFailure},
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use std::error::Error;

use crate::models::poll_model::User;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Serialize, Deserialize, Debug)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub date_joined: BsonDateTime,
}

impl From<User> for UserDocument {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
            date_joined: BsonDateTime::from_chrono(user.date_joined),
        }
    }
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        Self {
            id: document.id,
            username: document.username,
            password_hash: document.password_hash,
            is_staff: document.is_staff,
            date_joined: document.date_joined.to_chrono(),
        }
    }
}

pub struct UserRepo {
    collection: Collection<UserDocument>,
}

impl UserRepo {
    pub async fn init(db: &Database) -> Result<Self, Box<dyn Error>> {
        let users_collection: Collection<UserDocument> = db.collection("users");
        let index = IndexModel::builder()
            .keys(doc! {"username": 1})
            .options(
                mongodb::options::IndexOptions::builder()
                    .unique(true)
                    .name(Some("unique_username".to_string()))
                    .build(),
            )
            .build();

        if let Err(e) = users_collection.create_index(index).await {
            error!("Failed to create index on `username`: {:?}", e);
            return Err(e.into());
        }
        Ok(Self {
            collection: users_collection,
        })
    }

    pub async fn search_by_username(&self, username: &str) -> Result<Option<User>> {
        let filter = doc! {"username": username};
        let result = self.collection.find_one(filter).await?;
        Ok(result.map(User::from))
    }

    /// Returns `false` when the username is already taken.
    pub async fn insert(&self, new_user: User) -> Result<bool> {
        match self.collection.insert_one(UserDocument::from(new_user)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *e.kind {
                    if write_error.code == DUPLICATE_KEY {
                        return Ok(false);
                    }
                }
                error!("Error inserting user to db {}", e);
                Err(anyhow::Error::new(e))
            }
        }
    }
}
