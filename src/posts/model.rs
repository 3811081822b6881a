use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{
        ownership::{ensure_owner, Owned},
        repo_types::Identity,
    },
    collections::{self, Keyed, Toggled},
    error::AppError,
};

/// Author name and avatar copied at write time, never re-synced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSnapshot {
    pub name: String,
    pub avatar: String,
}

impl AuthorSnapshot {
    pub fn of(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            avatar: identity.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner: Uuid,
    pub text: String,
    #[serde(flatten)]
    pub author: AuthorSnapshot,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Comment {
    pub fn new(owner: Uuid, text: String, author: AuthorSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            text,
            author,
            date: OffsetDateTime::now_utc(),
        }
    }
}

impl Keyed for Comment {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Owned for Comment {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner: Uuid,
    pub text: String,
    #[serde(flatten)]
    pub author: AuthorSnapshot,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Owned for Post {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

impl Post {
    pub fn new(owner: Uuid, text: String, author: AuthorSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            text,
            author,
            likes: Vec::new(),
            comments: Vec::new(),
            date: OffsetDateTime::now_utc(),
        }
    }

    /// Unlikes when `user` already liked the post, otherwise likes it at the head.
    pub fn toggle_like(&mut self, user: Uuid) -> Toggled {
        collections::toggle(&mut self.likes, |like| like.user == user, || Like { user })
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn add_comment(&mut self, comment: Comment) -> &Comment {
        collections::prepend(&mut self.comments, comment)
    }

    /// The comment keyed `comment_id`, provided `caller` wrote it. Missing
    /// comes before ownership.
    pub fn removable_comment(&self, comment_id: Uuid, caller: Uuid) -> Result<&Comment, AppError> {
        let comment = self
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| AppError::not_found("Comment does not exist"))?;
        ensure_owner(comment, caller)?;
        Ok(comment)
    }

    /// Removes exactly the comment keyed `comment_id`; ownership is checked
    /// beforehand with [`Post::removable_comment`].
    pub fn remove_comment(&mut self, comment_id: Uuid) -> Option<Comment> {
        collections::remove_by_key(&mut self.comments, comment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(name: &str) -> AuthorSnapshot {
        AuthorSnapshot {
            name: name.into(),
            avatar: format!("https://avatar/{name}"),
        }
    }

    fn post() -> Post {
        Post::new(Uuid::new_v4(), "hello".into(), author("Ann"))
    }

    #[test]
    fn toggle_like_twice_restores_membership_and_order() {
        let mut p = post();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        p.toggle_like(a);
        p.toggle_like(b);
        let before = p.likes.clone();

        assert_eq!(p.toggle_like(c), Toggled::Added);
        assert_eq!(p.likes[0].user, c);
        assert_eq!(p.toggle_like(c), Toggled::Removed);
        assert_eq!(p.likes, before);
    }

    #[test]
    fn like_never_duplicates() {
        let mut p = post();
        let a = Uuid::new_v4();
        p.toggle_like(a);
        p.toggle_like(a);
        p.toggle_like(a);
        assert_eq!(p.like_count(), 1);
    }

    fn comment(owner: Uuid, text: &str) -> Comment {
        Comment::new(owner, text.into(), author("Ann"))
    }

    #[test]
    fn add_then_remove_comment_restores_collection() {
        let mut p = post();
        let ann = Uuid::new_v4();
        p.add_comment(comment(Uuid::new_v4(), "first"));
        let before = p.comments.clone();

        let id = p.add_comment(comment(ann, "hi")).id;
        assert_eq!(p.comments[0].text, "hi");

        p.removable_comment(id, ann).expect("owner may remove");
        assert_eq!(p.remove_comment(id).unwrap().text, "hi");
        assert_eq!(p.comments, before);
    }

    #[test]
    fn removal_checks_existence_then_owner() {
        let mut p = post();
        let ann = Uuid::new_v4();
        let id = p.add_comment(comment(ann, "hi")).id;

        let err = p.removable_comment(Uuid::new_v4(), ann).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = p.removable_comment(id, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(p.comments.len(), 1);
    }

    #[test]
    fn remove_comment_leaves_other_comments_in_order() {
        let mut p = post();
        let ann = Uuid::new_v4();
        let bob = Uuid::new_v4();
        p.add_comment(comment(bob, "one"));
        let mine = p.add_comment(comment(ann, "two")).id;
        p.add_comment(comment(bob, "three"));

        p.remove_comment(mine).unwrap();
        assert!(p.remove_comment(mine).is_none());
        let texts: Vec<_> = p.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["three", "one"]);
    }

    #[test]
    fn serializes_with_flat_author_snapshot() {
        let p = post();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["name"], "Ann");
        assert_eq!(json["user"], p.owner.to_string());
        assert!(json["likes"].as_array().unwrap().is_empty());
    }
}
