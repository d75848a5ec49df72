//! Handlers for `/posts` endpoints. Every route here is protected.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/posts`                          | Newest first |
//! | `POST`   | `/posts`                          | Body: `{"text":"..."}` |
//! | `GET`    | `/posts/{id}`                     | 404 if not found |
//! | `DELETE` | `/posts/{id}`                     | Author only |
//! | `PUT`    | `/posts/like/{id}`                | 400 if already liked; returns likes |
//! | `PUT`    | `/posts/unlike/{id}`              | 400 if not liked; returns likes |
//! | `POST`   | `/posts/comment/{id}`             | Body: `{"text":"..."}`; returns comments |
//! | `DELETE` | `/posts/comment/{id}/{comment_id}`| Comment author only; returns comments |

use axum::{Json, extract::State};
use devlink_core::{
  post::{Comment, Like, NewPost, Post},
  store::DevlinkStore,
  user::User,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  extract::{JsonBody, Path, parse_id},
  validate::validated,
};

const POST_NOT_FOUND: &str = "Post not found";

/// JSON body for new posts and comments.
#[derive(Debug, Deserialize, Validate)]
pub struct TextBody {
  #[serde(default)]
  #[validate(length(min = 1, message = "Text is required"))]
  pub text: String,
}

async fn load_post<S>(state: &AppState<S>, id: Uuid) -> Result<Post, ApiError>
where
  S: DevlinkStore,
{
  state
    .store
    .get_post(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(POST_NOT_FOUND.into()))
}

async fn load_author<S>(state: &AppState<S>, id: Uuid) -> Result<User, ApiError>
where
  S: DevlinkStore,
{
  state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// Run `apply` against the stored post as one atomic store step.
async fn splice<S, F>(state: &AppState<S>, id: Uuid, apply: F) -> Result<Post, ApiError>
where
  S: DevlinkStore,
  F: FnOnce(&mut Post) -> devlink_core::Result<()> + Send + 'static,
{
  let post = state
    .store
    .update_post(id, apply)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(POST_NOT_FOUND.into()))??;
  Ok(post)
}

// ─── Posts ────────────────────────────────────────────────────────────────────

/// `POST /posts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  JsonBody(body): JsonBody<TextBody>,
) -> Result<Json<Post>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let body = validated(body)?;
  let author = load_author(&state, auth.user_id()?).await?;
  let post = state
    .store
    .insert_post(NewPost::by(&author, body.text))
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(post_id = %post.post_id, user_id = %author.user_id, "post created");
  Ok(Json(post))
}

/// `GET /posts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let posts = state.store.list_posts().await.map_err(ApiError::store)?;
  Ok(Json(posts))
}

/// `GET /posts/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Post>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let id = parse_id(&id, POST_NOT_FOUND)?;
  Ok(Json(load_post(&state, id).await?))
}

/// `DELETE /posts/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let id = parse_id(&id, POST_NOT_FOUND)?;
  let post = load_post(&state, id).await?;
  post.ensure_owner(user_id)?;

  state.store.delete_post(id).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "msg": "Post removed" })))
}

// ─── Likes ────────────────────────────────────────────────────────────────────

/// `PUT /posts/like/{id}`
pub async fn like<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let id = parse_id(&id, POST_NOT_FOUND)?;
  let post = splice(&state, id, move |post| post.like(user_id)).await?;
  Ok(Json(post.likes))
}

/// `PUT /posts/unlike/{id}`
pub async fn unlike<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let id = parse_id(&id, POST_NOT_FOUND)?;
  let post = splice(&state, id, move |post| post.unlike(user_id)).await?;
  Ok(Json(post.likes))
}

// ─── Comments ─────────────────────────────────────────────────────────────────

/// `POST /posts/comment/{id}`
pub async fn comment<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<TextBody>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let id = parse_id(&id, POST_NOT_FOUND)?;
  let body = validated(body)?;
  let author = load_author(&state, auth.user_id()?).await?;
  let post = splice(&state, id, move |post| {
    post.add_comment(&author, body.text);
    Ok(())
  })
  .await?;
  Ok(Json(post.comments))
}

/// `DELETE /posts/comment/{id}/{comment_id}`
pub async fn uncomment<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let id = parse_id(&id, POST_NOT_FOUND)?;
  let comment_id = parse_id(&comment_id, "Comment does not exist")?;
  let post = splice(&state, id, move |post| {
    post.remove_comment(comment_id, user_id).map(|_| ())
  })
  .await?;
  Ok(Json(post.comments))
}
