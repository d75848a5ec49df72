//! Handlers for `/profile` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/profile`                       | All profiles with owner name/avatar |
//! | `GET`    | `/profile/user/{user_id}`        | 404 if not found |
//! | `GET`    | `/profile/me`                    | Protected |
//! | `POST`   | `/profile`                       | Protected; create or update. Body: [`ProfileBody`] |
//! | `DELETE` | `/profile`                       | Protected; removes posts, profile and user |
//! | `PUT`    | `/profile/experience`            | Protected. Body: [`ExperienceBody`] |
//! | `DELETE` | `/profile/experience/{exp_id}`   | Protected |
//! | `PUT`    | `/profile/education`             | Protected. Body: [`EducationBody`] |
//! | `DELETE` | `/profile/education/{edu_id}`    | Protected |

use axum::{Json, extract::State};
use chrono::NaiveDate;
use devlink_core::{
  profile::{
    NewEducation, NewExperience, Profile, ProfileFields, ProfileView, Social,
    parse_skills,
  },
  store::DevlinkStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
  AppState,
  auth::AuthUser,
  error::{ApiError, FieldError},
  extract::{JsonBody, Path, parse_id},
  validate::validated,
};

const NO_PROFILE: &str = "There is no profile for this user";
const PROFILE_NOT_FOUND: &str = "Profile not found";

/// Run `apply` against the caller's stored profile as one atomic store step.
async fn update_own<S, F>(
  state: &AppState<S>,
  user_id: Uuid,
  apply: F,
) -> Result<Profile, ApiError>
where
  S: DevlinkStore,
  F: FnOnce(&mut Profile) -> devlink_core::Result<()> + Send + 'static,
{
  let profile = state
    .store
    .update_profile(user_id, apply)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(NO_PROFILE.into()))??;
  Ok(profile)
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /profile`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<ProfileView>>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let views = state
    .store
    .list_profile_views()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(views))
}

/// `GET /profile/user/{user_id}`
pub async fn get_by_user<S>(
  State(state): State<AppState<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = parse_id(&user_id, PROFILE_NOT_FOUND)?;
  let view = state
    .store
    .get_profile_view(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(PROFILE_NOT_FOUND.into()))?;
  Ok(Json(view))
}

/// `GET /profile/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
) -> Result<Json<ProfileView>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let view = state
    .store
    .get_profile_view(auth.user_id()?)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(NO_PROFILE.into()))?;
  Ok(Json(view))
}

// ─── Create / update ──────────────────────────────────────────────────────────

/// JSON body accepted by `POST /profile`.
///
/// `skills` is a comma-separated list, e.g. `"rust, sql, kubernetes"`.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileBody {
  pub company:         Option<String>,
  pub website:         Option<String>,
  pub location:        Option<String>,
  #[serde(default)]
  #[validate(length(min = 1, message = "Status is required"))]
  pub status:          String,
  #[serde(default)]
  #[validate(length(min = 1, message = "Skills is required"))]
  pub skills:          String,
  pub bio:             Option<String>,
  #[serde(alias = "githubusername")]
  pub github_username: Option<String>,
  pub youtube:         Option<String>,
  pub twitter:         Option<String>,
  pub facebook:        Option<String>,
  pub linkedin:        Option<String>,
  pub instagram:       Option<String>,
}

impl ProfileBody {
  fn into_fields(self) -> Result<ProfileFields, ApiError> {
    let skills = parse_skills(&self.skills);
    if skills.is_empty() {
      return Err(ApiError::Validation(vec![FieldError::new(
        "skills",
        "Skills is required",
      )]));
    }
    Ok(ProfileFields {
      company: self.company,
      website: self.website,
      location: self.location,
      status: self.status,
      skills,
      bio: self.bio,
      github_username: self.github_username,
      social: Social {
        youtube:   self.youtube,
        twitter:   self.twitter,
        facebook:  self.facebook,
        linkedin:  self.linkedin,
        instagram: self.instagram,
      },
    })
  }
}

/// `POST /profile`: creates the caller's profile, or updates it in place
/// keeping experience and education.
pub async fn upsert<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  JsonBody(body): JsonBody<ProfileBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let fields = validated(body)?.into_fields()?;

  let update = fields.clone();
  if let Some(profile) = state
    .store
    .update_profile(user_id, move |p| {
      p.apply(update);
      Ok(())
    })
    .await
    .map_err(ApiError::store)?
  {
    return Ok(Json(profile?));
  }

  state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

  let profile = Profile::new(user_id, fields.clone());
  let created = state
    .store
    .insert_profile(&profile)
    .await
    .map_err(ApiError::store)?;
  if created {
    return Ok(Json(profile));
  }

  // Another request created the profile first; update that one instead.
  let profile = update_own(&state, user_id, move |p| {
    p.apply(fields);
    Ok(())
  })
  .await?;
  Ok(Json(profile))
}

// ─── Delete account ───────────────────────────────────────────────────────────

/// `DELETE /profile`: removes the caller's posts, profile and account.
pub async fn delete_account<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
) -> Result<Json<Value>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let posts = state
    .store
    .delete_account(user_id)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(%user_id, posts, "account deleted");
  Ok(Json(json!({ "msg": "User deleted" })))
}

// ─── Experience ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ExperienceBody {
  #[serde(default)]
  #[validate(length(min = 1, message = "Title is required"))]
  pub title:       String,
  #[serde(default)]
  #[validate(length(min = 1, message = "Company is required"))]
  pub company:     String,
  pub location:    Option<String>,
  #[validate(required(message = "From date is required"))]
  pub from:        Option<NaiveDate>,
  pub to:          Option<NaiveDate>,
  #[serde(default)]
  pub current:     bool,
  pub description: Option<String>,
}

/// `PUT /profile/experience`: prepends an entry; returns the profile.
pub async fn add_experience<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  JsonBody(body): JsonBody<ExperienceBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let body = validated(body)?;
  let from = body
    .from
    .ok_or_else(|| ApiError::Validation(vec![FieldError::new("from", "From date is required")]))?;

  let input = NewExperience {
    title: body.title,
    company: body.company,
    location: body.location,
    from,
    to: body.to,
    current: body.current,
    description: body.description,
  };

  let profile = update_own(&state, user_id, move |p| {
    p.add_experience(input);
    Ok(())
  })
  .await?;
  Ok(Json(profile))
}

/// `DELETE /profile/experience/{exp_id}`
pub async fn remove_experience<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path(exp_id): Path<String>,
) -> Result<Json<Profile>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let exp_id = parse_id(&exp_id, "Experience not found")?;
  let profile =
    update_own(&state, user_id, move |p| p.remove_experience(exp_id).map(|_| ())).await?;
  Ok(Json(profile))
}

// ─── Education ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct EducationBody {
  #[serde(default)]
  #[validate(length(min = 1, message = "School is required"))]
  pub school:         String,
  #[serde(default)]
  #[validate(length(min = 1, message = "Degree is required"))]
  pub degree:         String,
  #[serde(default, alias = "fieldofstudy")]
  #[validate(length(min = 1, message = "Field of study is required"))]
  pub field_of_study: String,
  #[validate(required(message = "From date is required"))]
  pub from:           Option<NaiveDate>,
  pub to:             Option<NaiveDate>,
  #[serde(default)]
  pub current:        bool,
  pub description:    Option<String>,
}

/// `PUT /profile/education`: prepends an entry; returns the profile.
pub async fn add_education<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  JsonBody(body): JsonBody<EducationBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let body = validated(body)?;
  let from = body
    .from
    .ok_or_else(|| ApiError::Validation(vec![FieldError::new("from", "From date is required")]))?;

  let input = NewEducation {
    school: body.school,
    degree: body.degree,
    field_of_study: body.field_of_study,
    from,
    to: body.to,
    current: body.current,
    description: body.description,
  };

  let profile = update_own(&state, user_id, move |p| {
    p.add_education(input);
    Ok(())
  })
  .await?;
  Ok(Json(profile))
}

/// `DELETE /profile/education/{edu_id}`
pub async fn remove_education<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path(edu_id): Path<String>,
) -> Result<Json<Profile>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let user_id = auth.user_id()?;
  let edu_id = parse_id(&edu_id, "Education not found")?;
  let profile =
    update_own(&state, user_id, move |p| p.remove_education(edu_id).map(|_| ())).await?;
  Ok(Json(profile))
}
