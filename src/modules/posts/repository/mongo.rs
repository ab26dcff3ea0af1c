use async_trait::async_trait;
use futures::TryStreamExt;
use inkwell_db::Database;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::ReturnDocument,
    Collection,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{PostRepository, RepositoryError, RepositoryResult};
use crate::modules::posts::models::{now_millis, Post, PostCreate, PostPatch};

/// Shape of a post inside the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    content: String,
    created: DateTime,
}

impl TryFrom<PostDocument> for Post {
    type Error = RepositoryError;

    fn try_from(document: PostDocument) -> Result<Self, Self::Error> {
        let nanos = i128::from(document.created.timestamp_millis()) * 1_000_000;
        let created = OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|error| {
            RepositoryError::Corrupt {
                id: document.id.to_hex(),
                reason: error.to_string(),
            }
        })?;

        Ok(Post {
            id: document.id.to_hex(),
            title: document.title,
            content: document.content,
            created,
        })
    }
}

fn to_bson_datetime(value: OffsetDateTime) -> DateTime {
    let millis = value.unix_timestamp_nanos() / 1_000_000;
    DateTime::from_millis(millis as i64)
}

/// Escape regex metacharacters so the fragment matches literally.
fn escape_regex(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if "\\.+*?()|[]{}^$#&-~".contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Post repository backed by a MongoDB collection.
#[derive(Clone)]
pub struct MongoPostRepository {
    collection: Collection<PostDocument>,
}

impl MongoPostRepository {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }

    async fn find_sorted(&self, filter: Document) -> RepositoryResult<Vec<Post>> {
        let documents: Vec<PostDocument> = self
            .collection
            .find(filter)
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(Post::try_from).collect()
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn create(&self, input: PostCreate) -> RepositoryResult<Post> {
        let document = PostDocument {
            id: ObjectId::new(),
            title: input.title,
            content: input.content,
            created: to_bson_datetime(now_millis()),
        };

        self.collection.insert_one(&document).await?;
        tracing::debug!(post_id = %document.id, "post inserted");

        let stored = self
            .collection
            .find_one(doc! { "_id": document.id })
            .await?
            .ok_or_else(|| RepositoryError::Corrupt {
                id: document.id.to_hex(),
                reason: "not found after insert".to_string(),
            })?;

        Post::try_from(stored)
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Post>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        self.collection
            .find_one(doc! { "_id": oid })
            .await?
            .map(Post::try_from)
            .transpose()
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        self.find_sorted(doc! {}).await
    }

    async fn search_by_title(&self, fragment: &str) -> RepositoryResult<Vec<Post>> {
        self.find_sorted(doc! {
            "title": { "$regex": escape_regex(fragment), "$options": "i" }
        })
        .await
    }

    async fn patch(&self, id: &str, patch: PostPatch) -> RepositoryResult<Option<Post>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let mut set = Document::new();
        if let Some(title) = patch.title {
            set.insert("title", title);
        }
        if let Some(content) = patch.content {
            set.insert("content", content);
        }

        if set.is_empty() {
            return self.get(id).await;
        }

        self.collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .map(Post::try_from)
            .transpose()
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };

        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count == 1)
    }
}
