//! Posts in the feed, with embedded likes and comments.
//!
//! Likes and comments are spliced in place: new entries go to the front of
//! their list, removals are by id. Every ownership check compares ids with
//! exact equality.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, user::User};

/// One user's like of a post. A user may like a post at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
  pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub user_id:    Uuid,
  pub text:       String,
  /// Author name and avatar, copied at comment time.
  pub name:       String,
  pub avatar:     String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:    Uuid,
  pub user_id:    Uuid,
  pub text:       String,
  /// Author name and avatar, copied at post time.
  pub name:       String,
  pub avatar:     String,
  #[serde(default)]
  pub likes:      Vec<Like>,
  #[serde(default)]
  pub comments:   Vec<Comment>,
  pub created_at: DateTime<Utc>,
}

/// Input for [`DevlinkStore::insert_post`](crate::store::DevlinkStore::insert_post).
#[derive(Debug, Clone)]
pub struct NewPost {
  pub user_id: Uuid,
  pub text:    String,
  pub name:    String,
  pub avatar:  String,
}

impl NewPost {
  pub fn by(author: &User, text: impl Into<String>) -> Self {
    Self {
      user_id: author.user_id,
      text:    text.into(),
      name:    author.name.clone(),
      avatar:  author.avatar.clone(),
    }
  }
}

impl Post {
  pub fn is_liked_by(&self, user_id: Uuid) -> bool {
    self.likes.iter().any(|l| l.user_id == user_id)
  }

  pub fn ensure_owner(&self, user_id: Uuid) -> Result<()> {
    if self.user_id == user_id {
      Ok(())
    } else {
      Err(Error::NotOwner(user_id))
    }
  }

  pub fn like(&mut self, user_id: Uuid) -> Result<()> {
    if self.is_liked_by(user_id) {
      return Err(Error::AlreadyLiked(self.post_id));
    }
    self.likes.insert(0, Like { user_id });
    Ok(())
  }

  pub fn unlike(&mut self, user_id: Uuid) -> Result<()> {
    let idx = self
      .likes
      .iter()
      .position(|l| l.user_id == user_id)
      .ok_or(Error::NotLiked(self.post_id))?;
    self.likes.remove(idx);
    Ok(())
  }

  pub fn add_comment(&mut self, author: &User, text: impl Into<String>) -> Uuid {
    let comment_id = Uuid::new_v4();
    self.comments.insert(0, Comment {
      comment_id,
      user_id: author.user_id,
      text: text.into(),
      name: author.name.clone(),
      avatar: author.avatar.clone(),
      created_at: Utc::now(),
    });
    comment_id
  }

  /// Remove a comment on behalf of `user_id`, who must be its author.
  pub fn remove_comment(&mut self, comment_id: Uuid, user_id: Uuid) -> Result<Comment> {
    let idx = self
      .comments
      .iter()
      .position(|c| c.comment_id == comment_id)
      .ok_or(Error::CommentNotFound(comment_id))?;
    if self.comments[idx].user_id != user_id {
      return Err(Error::NotOwner(user_id));
    }
    Ok(self.comments.remove(idx))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(name: &str) -> User {
    User {
      user_id:       Uuid::new_v4(),
      name:          name.into(),
      email:         format!("{name}@example.com"),
      password_hash: String::new(),
      avatar:        format!("https://avatar/{name}"),
      created_at:    Utc::now(),
    }
  }

  fn post_by(author: &User) -> Post {
    let input = NewPost::by(author, "hello");
    Post {
      post_id:    Uuid::new_v4(),
      user_id:    input.user_id,
      text:       input.text,
      name:       input.name,
      avatar:     input.avatar,
      likes:      vec![],
      comments:   vec![],
      created_at: Utc::now(),
    }
  }

  #[test]
  fn like_twice_is_rejected() {
    let alice = user("alice");
    let mut post = post_by(&alice);
    post.like(alice.user_id).unwrap();
    assert!(matches!(post.like(alice.user_id), Err(Error::AlreadyLiked(_))));
    assert_eq!(post.likes.len(), 1);
  }

  #[test]
  fn likes_are_prepended() {
    let alice = user("alice");
    let bob = user("bob");
    let mut post = post_by(&alice);
    post.like(alice.user_id).unwrap();
    post.like(bob.user_id).unwrap();
    assert_eq!(post.likes[0].user_id, bob.user_id);
  }

  #[test]
  fn unlike_removes_only_that_user() {
    let alice = user("alice");
    let bob = user("bob");
    let mut post = post_by(&alice);
    post.like(alice.user_id).unwrap();
    post.like(bob.user_id).unwrap();

    post.unlike(alice.user_id).unwrap();
    assert!(!post.is_liked_by(alice.user_id));
    assert!(post.is_liked_by(bob.user_id));
    assert!(matches!(post.unlike(alice.user_id), Err(Error::NotLiked(_))));
  }

  #[test]
  fn comment_author_copied() {
    let alice = user("alice");
    let bob = user("bob");
    let mut post = post_by(&alice);
    let id = post.add_comment(&bob, "nice");
    assert_eq!(post.comments[0].comment_id, id);
    assert_eq!(post.comments[0].name, "bob");
    assert_eq!(post.comments[0].user_id, bob.user_id);
  }

  #[test]
  fn only_author_removes_comment() {
    let alice = user("alice");
    let bob = user("bob");
    let mut post = post_by(&alice);
    let id = post.add_comment(&bob, "nice");

    assert!(matches!(
      post.remove_comment(id, alice.user_id),
      Err(Error::NotOwner(_))
    ));
    assert_eq!(post.comments.len(), 1);

    assert!(post.remove_comment(id, bob.user_id).is_ok());
    assert!(matches!(
      post.remove_comment(id, bob.user_id),
      Err(Error::CommentNotFound(_))
    ));
  }

  #[test]
  fn ownership_is_exact() {
    let alice = user("alice");
    let post = post_by(&alice);
    assert!(post.ensure_owner(alice.user_id).is_ok());
    assert!(post.ensure_owner(Uuid::new_v4()).is_err());
  }
}
