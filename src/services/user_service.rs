//! Identity collaborator: registration, lookup by email and the persisted
//! "current user". No credentials are ever checked.

use tracing::{debug, info};
use validator::Validate;

use crate::{
    dto::user::{LoginRequest, RegisterRequest, UserPatch, UserSummary},
    error::ServiceError,
    state::{
        SharedState, World,
        model::{User, UserId},
    },
};

/// Create a member account. Emails are unique, compared case-insensitively.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<UserSummary, ServiceError> {
    request.validate()?;
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("name cannot be empty".into()));
    }
    let email = normalize_email(&request.email);

    state
        .with_world_mut(|world| {
            if find_user_by_email(world, &email).is_some() {
                return Err(ServiceError::InvalidInput(format!(
                    "email `{email}` is already registered"
                )));
            }

            let user = User {
                id: UserId::member(),
                name,
                email: Some(email),
                position: request.position,
                manual_rating: request.manual_rating,
                community_rating: None,
                heart_team: clean_optional(request.heart_team),
                dominant_foot: request.dominant_foot,
                photo: clean_optional(request.photo),
                is_guest: false,
            };
            info!(user_id = %user.id, "user registered");

            let summary = UserSummary::from(&user);
            world.users.insert(user.id.clone(), user);
            Ok(summary)
        })
        .await
}

/// Resolve `email` to a member and record them as the current user.
pub async fn login(state: &SharedState, request: LoginRequest) -> Result<UserSummary, ServiceError> {
    request.validate()?;
    let email = normalize_email(&request.email);

    state
        .with_world_mut(|world| {
            let user = find_user_by_email(world, &email)
                .ok_or_else(|| ServiceError::NotFound(format!("no user registered with `{email}`")))?;
            let summary = UserSummary::from(user);
            let id = user.id.clone();
            info!(user_id = %id, "user logged in");
            world.current_user = Some(id);
            Ok(summary)
        })
        .await
}

/// Forget the current user. Logging out twice is a no-op.
pub async fn logout(state: &SharedState) -> Result<(), ServiceError> {
    state
        .with_world_mut(|world| {
            match world.current_user.take() {
                Some(id) => info!(user_id = %id, "user logged out"),
                None => debug!("logout without a current user"),
            }
            Ok(())
        })
        .await
}

/// User recorded by the last login, if any.
pub async fn current_user(state: &SharedState) -> Option<UserSummary> {
    state
        .with_world(|world| {
            world
                .current_user
                .as_ref()
                .and_then(|id| world.users.get(id))
                .map(UserSummary::from)
        })
        .await
}

/// Look up one user.
pub async fn get_user(state: &SharedState, id: &UserId) -> Result<UserSummary, ServiceError> {
    state
        .with_world(|world| world.user(id).map(UserSummary::from))
        .await
}

/// Every member and guest, in registration order.
pub async fn list_users(state: &SharedState) -> Vec<UserSummary> {
    state
        .with_world(|world| world.users.values().map(UserSummary::from).collect())
        .await
}

/// Apply a profile patch. The community rating is only ever changed by
/// finalizing a session.
pub async fn edit_user(
    state: &SharedState,
    id: &UserId,
    patch: UserPatch,
) -> Result<UserSummary, ServiceError> {
    patch.validate()?;
    let name = match patch.name.as_deref().map(str::trim) {
        Some("") => return Err(ServiceError::InvalidInput("name cannot be empty".into())),
        other => other.map(str::to_string),
    };

    state
        .with_world_mut(|world| {
            let user = world.user_mut(id)?;
            if let Some(name) = name {
                user.name = name;
            }
            if let Some(position) = patch.position {
                user.position = position;
            }
            if let Some(rating) = patch.manual_rating {
                user.manual_rating = rating;
            }
            if let Some(heart_team) = patch.heart_team {
                user.heart_team = clean_optional(heart_team);
            }
            if let Some(foot) = patch.dominant_foot {
                user.dominant_foot = foot;
            }
            if let Some(photo) = patch.photo {
                user.photo = clean_optional(photo);
            }
            info!(user_id = %id, "user profile updated");
            Ok(UserSummary::from(&*user))
        })
        .await
}

/// Identity lookup. Guests have no email and never match.
pub fn find_user_by_email<'a>(world: &'a World, email: &str) -> Option<&'a User> {
    let email = normalize_email(email);
    world
        .users
        .values()
        .find(|user| user.email.as_deref().map(normalize_email).as_deref() == Some(email.as_str()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
