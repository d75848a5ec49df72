//! Integration tests for `SqliteStore` against an in-memory database.

use devlink_core::{
  Error as CoreError,
  post::NewPost,
  profile::{Profile, ProfileFields, parse_skills},
  store::DevlinkStore,
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(name: &str) -> NewUser {
  NewUser {
    name:          name.into(),
    email:         format!("{name}@example.com"),
    password_hash: "$argon2id$v=19$stub".into(),
    avatar:        format!("https://www.gravatar.com/avatar/{name}"),
  }
}

fn fields(status: &str) -> ProfileFields {
  ProfileFields {
    status: status.into(),
    skills: parse_skills("rust, sql"),
    company: Some("Acme".into()),
    ..Default::default()
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_user() {
  let s = store().await;

  let user = s.insert_user(new_user("alice")).await.unwrap();
  assert_eq!(user.email, "alice@example.com");

  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, user.user_id);
  assert_eq!(fetched.name, "alice");
  assert_eq!(fetched.password_hash, "$argon2id$v=19$stub");
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn email_lookup_is_case_insensitive() {
  let s = store().await;
  let mut input = new_user("bob");
  input.email = "Bob@Example.COM".into();
  let user = s.insert_user(input).await.unwrap();
  assert_eq!(user.email, "bob@example.com");

  let found = s.find_user_by_email("BOB@example.com").await.unwrap();
  assert_eq!(found.map(|u| u.user_id), Some(user.user_id));
  assert!(s.find_user_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_rejected() {
  let s = store().await;
  s.insert_user(new_user("carol")).await.unwrap();
  let err = s.insert_user(new_user("carol")).await.unwrap_err();
  assert!(matches!(err, Error::EmailTaken(ref e) if e == "carol@example.com"));
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_profile_refuses_a_second() {
  let s = store().await;
  let user = s.insert_user(new_user("erin")).await.unwrap();

  assert!(s.insert_profile(&Profile::new(user.user_id, fields("Junior"))).await.unwrap());
  assert!(!s.insert_profile(&Profile::new(user.user_id, fields("Senior"))).await.unwrap());

  let stored = s.get_profile(user.user_id).await.unwrap().unwrap();
  assert_eq!(stored.status, "Junior");
  assert_eq!(stored.skills, vec!["rust", "sql"]);
  assert_eq!(s.list_profile_views().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_profile_applies_and_persists() {
  let s = store().await;
  let user = s.insert_user(new_user("erin")).await.unwrap();
  s.insert_profile(&Profile::new(user.user_id, fields("Junior")))
    .await
    .unwrap();

  let updated = s
    .update_profile(user.user_id, |p| {
      p.apply(fields("Senior"));
      Ok(())
    })
    .await
    .unwrap()
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, "Senior");
  assert_eq!(s.get_profile(user.user_id).await.unwrap().unwrap(), updated);

  let missing = s.update_profile(Uuid::new_v4(), |_| Ok(())).await.unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn rejected_profile_update_leaves_store_untouched() {
  let s = store().await;
  let user = s.insert_user(new_user("ivy")).await.unwrap();
  s.insert_profile(&Profile::new(user.user_id, fields("Dev")))
    .await
    .unwrap();

  let outcome = s
    .update_profile(user.user_id, |p| {
      p.status = "changed".into();
      p.remove_experience(Uuid::new_v4()).map(|_| ())
    })
    .await
    .unwrap()
    .unwrap();
  assert!(matches!(outcome, Err(CoreError::ExperienceNotFound(_))));
  assert_eq!(s.get_profile(user.user_id).await.unwrap().unwrap().status, "Dev");
}

#[tokio::test]
async fn profile_view_joins_owner() {
  let s = store().await;
  let user = s.insert_user(new_user("frank")).await.unwrap();
  s.insert_profile(&Profile::new(user.user_id, fields("Dev")))
    .await
    .unwrap();

  let view = s.get_profile_view(user.user_id).await.unwrap().unwrap();
  assert_eq!(view.user.name, "frank");
  assert_eq!(view.user.avatar, user.avatar);
  assert_eq!(view.profile.user_id, user.user_id);

  assert!(s.get_profile_view(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_account_removes_user_profile_and_posts() {
  let s = store().await;
  let user = s.insert_user(new_user("gina")).await.unwrap();
  let other = s.insert_user(new_user("hank")).await.unwrap();
  s.insert_profile(&Profile::new(user.user_id, fields("Dev")))
    .await
    .unwrap();
  s.insert_post(NewPost::by(&user, "g1")).await.unwrap();
  s.insert_post(NewPost::by(&user, "g2")).await.unwrap();
  let keep = s.insert_post(NewPost::by(&other, "h1")).await.unwrap();

  assert_eq!(s.delete_account(user.user_id).await.unwrap(), 2);
  assert!(s.get_user(user.user_id).await.unwrap().is_none());
  assert!(s.get_profile(user.user_id).await.unwrap().is_none());
  let left = s.list_posts().await.unwrap();
  assert_eq!(left.len(), 1);
  assert_eq!(left[0].post_id, keep.post_id);

  // A second delete finds nothing to remove.
  assert_eq!(s.delete_account(user.user_id).await.unwrap(), 0);
}

// ─── Posts ───────────────────────────────────────────────────────────────────

async fn author(s: &SqliteStore, name: &str) -> User {
  s.insert_user(new_user(name)).await.unwrap()
}

#[tokio::test]
async fn insert_and_get_post() {
  let s = store().await;
  let alice = author(&s, "alice").await;

  let post = s.insert_post(NewPost::by(&alice, "hello")).await.unwrap();
  assert_eq!(post.name, "alice");
  assert!(post.likes.is_empty());

  let fetched = s.get_post(post.post_id).await.unwrap().unwrap();
  assert_eq!(fetched, post);
  assert!(s.get_post(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn posts_listed_newest_first() {
  let s = store().await;
  let alice = author(&s, "alice").await;

  let first = s.insert_post(NewPost::by(&alice, "one")).await.unwrap();
  let second = s.insert_post(NewPost::by(&alice, "two")).await.unwrap();
  let third = s.insert_post(NewPost::by(&alice, "three")).await.unwrap();

  let ids: Vec<Uuid> = s
    .list_posts()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.post_id)
    .collect();
  assert_eq!(ids, vec![third.post_id, second.post_id, first.post_id]);
}

#[tokio::test]
async fn update_post_persists_splices() {
  let s = store().await;
  let alice = author(&s, "alice").await;
  let bob = author(&s, "bob").await;

  let post = s.insert_post(NewPost::by(&alice, "hello")).await.unwrap();
  let commenter = bob.clone();
  let updated = s
    .update_post(post.post_id, move |p| {
      p.like(commenter.user_id)?;
      p.add_comment(&commenter, "hi alice");
      Ok(())
    })
    .await
    .unwrap()
    .unwrap()
    .unwrap();

  let stored = s.get_post(post.post_id).await.unwrap().unwrap();
  assert_eq!(stored, updated);
  assert!(stored.is_liked_by(bob.user_id));
  assert_eq!(stored.comments[0].text, "hi alice");

  // A second like is refused and nothing is written.
  let bob_id = bob.user_id;
  let again = s
    .update_post(post.post_id, move |p| p.like(bob_id))
    .await
    .unwrap()
    .unwrap();
  assert!(matches!(again, Err(CoreError::AlreadyLiked(_))));
  assert_eq!(s.get_post(post.post_id).await.unwrap().unwrap().likes.len(), 1);

  assert!(s.update_post(Uuid::new_v4(), |_| Ok(())).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_likes_are_all_kept() {
  let s = store().await;
  let alice = author(&s, "alice").await;
  let post_id = s
    .insert_post(NewPost::by(&alice, "popular"))
    .await
    .unwrap()
    .post_id;

  let mut handles = Vec::new();
  for _ in 0..20 {
    let s = s.clone();
    let liker = Uuid::new_v4();
    handles.push(tokio::spawn(async move {
      s.update_post(post_id, move |p| p.like(liker)).await
    }));
  }
  for h in handles {
    h.await.unwrap().unwrap().unwrap().unwrap();
  }

  assert_eq!(s.get_post(post_id).await.unwrap().unwrap().likes.len(), 20);
}

#[tokio::test]
async fn delete_post_reports_whether_removed() {
  let s = store().await;
  let alice = author(&s, "alice").await;
  let post = s.insert_post(NewPost::by(&alice, "bye")).await.unwrap();

  assert!(s.delete_post(post.post_id).await.unwrap());
  assert!(!s.delete_post(post.post_id).await.unwrap());
}
