use std::collections::BTreeMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{PostRepository, RepositoryResult};
use crate::modules::posts::models::{now_millis, Post, PostCreate, PostPatch};

/// In-process post store for tests and database-less local runs.
///
/// Ids are real ObjectIds so clients see the same id format as with MongoDB,
/// and keying by them keeps iteration in creation order.
#[derive(Default)]
pub struct MemoryPostRepository {
    posts: RwLock<BTreeMap<ObjectId, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create(&self, input: PostCreate) -> RepositoryResult<Post> {
        let id = ObjectId::new();
        let post = Post {
            id: id.to_hex(),
            title: input.title,
            content: input.content,
            created: now_millis(),
        };

        self.posts.write().await.insert(id, post.clone());
        Ok(post)
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Post>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        Ok(self.posts.read().await.values().cloned().collect())
    }

    async fn search_by_title(&self, fragment: &str) -> RepositoryResult<Vec<Post>> {
        let needle = fragment.to_lowercase();
        Ok(self
            .posts
            .read()
            .await
            .values()
            .filter(|post| post.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn patch(&self, id: &str, patch: PostPatch) -> RepositoryResult<Option<Post>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            patch.apply_to(post);
            post.clone()
        }))
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, content: &str) -> PostCreate {
        PostCreate {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let repo = MemoryPostRepository::new();
        let first = repo.create(input("Hello", "World")).await.unwrap();
        let second = repo.create(input("Hello", "World")).await.unwrap();

        assert_eq!(first.id.len(), 24);
        assert_ne!(first.id, second.id);
        assert_eq!(repo.get(&first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn list_keeps_creation_order() {
        let repo = MemoryPostRepository::new();
        for title in ["one", "two", "three"] {
            repo.create(input(title, "body")).await.unwrap();
        }

        let titles: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let repo = MemoryPostRepository::new();
        repo.create(input("Learning Rust", "a")).await.unwrap();
        repo.create(input("rusty tools", "b")).await.unwrap();
        repo.create(input("Gardening", "c")).await.unwrap();

        let found = repo.search_by_title("RUST").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(repo.search_by_title("a.b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_and_patch_keep_identity() {
        let repo = MemoryPostRepository::new();
        let created = repo.create(input("Hello", "World")).await.unwrap();

        let patched = repo
            .patch(
                &created.id,
                PostPatch {
                    title: None,
                    content: Some("Rust".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.title, "Hello");
        assert_eq!(patched.content, "Rust");
        assert_eq!(patched.created, created.created);

        let replaced = repo
            .replace(&created.id, input("New", "Text"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.title, "New");
        assert_eq!(replaced.content, "Text");
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_absent() {
        let repo = MemoryPostRepository::new();
        let missing = ObjectId::new().to_hex();

        assert_eq!(repo.get(&missing).await.unwrap(), None);
        assert_eq!(repo.get("not-an-id").await.unwrap(), None);
        assert_eq!(
            repo.patch("not-an-id", PostPatch::default()).await.unwrap(),
            None
        );
        assert!(!repo.delete(&missing).await.unwrap());
        assert!(!repo.delete("not-an-id").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_post() {
        let repo = MemoryPostRepository::new();
        let created = repo.create(input("Hello", "World")).await.unwrap();

        assert!(repo.delete(&created.id).await.unwrap());
        assert_eq!(repo.get(&created.id).await.unwrap(), None);
        assert!(!repo.delete(&created.id).await.unwrap());
    }
}
