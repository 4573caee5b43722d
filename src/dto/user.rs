use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    services::rating::effective_rating,
    state::model::{DominantFoot, Position, User},
};

/// Profile submitted when a new member signs up.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: String,
    /// Login email; matched case-insensitively.
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    /// Preferred position, midfielder when omitted.
    #[serde(default)]
    pub position: Position,
    /// Self-declared rating in `[1, 5]`, 3 when omitted.
    #[serde(default = "default_manual_rating")]
    #[validate(range(min = 1.0, max = 5.0))]
    pub manual_rating: f64,
    /// Supported club, if any.
    #[serde(default)]
    pub heart_team: Option<String>,
    /// Preferred foot.
    #[serde(default)]
    pub dominant_foot: DominantFoot,
    /// Photo URL or data URI.
    #[serde(default)]
    pub photo: Option<String>,
}

fn default_manual_rating() -> f64 {
    3.0
}

/// Identity lookup performed on login. No credentials are checked.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    /// Email of a registered member.
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

/// Partial update of a user profile; omitted fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UserPatch {
    /// New display name.
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    /// New preferred position.
    pub position: Option<Position>,
    /// New self-declared rating in `[1, 5]`.
    #[validate(range(min = 1.0, max = 5.0))]
    pub manual_rating: Option<f64>,
    /// If not specified, does not change it.
    /// If null is specified, clears the heart team.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub heart_team: Option<Option<String>>,
    /// New preferred foot.
    pub dominant_foot: Option<DominantFoot>,
    /// Same semantics as `heart_team`.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub photo: Option<Option<String>>,
}

/// Public projection of a member or guest.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct UserSummary {
    /// User identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email; absent for guests.
    pub email: Option<String>,
    /// Preferred position.
    pub position: Position,
    /// Self-declared rating.
    pub manual_rating: f64,
    /// Peer-derived rating, once available.
    pub community_rating: Option<f64>,
    /// Rating used when balancing teams.
    pub effective_rating: f64,
    /// Supported club.
    pub heart_team: Option<String>,
    /// Preferred foot.
    pub dominant_foot: DominantFoot,
    /// Photo URL or data URI.
    pub photo: Option<String>,
    /// Whether the user was admitted as a guest.
    pub is_guest: bool,
}

impl From<&User> for UserSummary {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            email: value.email.clone(),
            position: value.position,
            manual_rating: value.manual_rating,
            community_rating: value.community_rating,
            effective_rating: effective_rating(value),
            heart_team: value.heart_team.clone(),
            dominant_foot: value.dominant_foot,
            photo: value.photo.clone(),
            is_guest: value.is_guest,
        }
    }
}
