//! Team assignment engine: partitions confirmed players into two sides under
//! one of four strategies, then orders each side by position.

use std::cmp::Ordering;

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    services::rating::effective_rating,
    state::model::{TeamSide, Teams, User},
};

/// Strategy used to split the confirmed players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Uniform shuffle, then alternate sides.
    Random,
    /// Snake split on the self-assigned rating.
    BalancedManual,
    /// Snake split on the effective (community when available) rating.
    BalancedCommunity,
    /// Cluster players by heart-team affiliation and cut at the midpoint.
    #[serde(alias = "heartTeam")]
    HeartTeam,
}

/// Split `players` into two teams according to `mode`.
///
/// Every player lands on exactly one side; each side is then ordered from
/// goalkeeper to forward, keeping the partition order among equal positions.
pub fn draw_teams<R>(players: &[User], mode: DrawMode, rng: &mut R) -> Teams
where
    R: Rng + ?Sized,
{
    let mut pool: Vec<&User> = players.iter().collect();

    let (mut team_a, mut team_b) = match mode {
        DrawMode::Random => {
            pool.shuffle(rng);
            split_alternating(pool)
        }
        DrawMode::BalancedManual => {
            sort_by_rating_desc(&mut pool, |user| user.manual_rating);
            split_snake(pool)
        }
        DrawMode::BalancedCommunity => {
            sort_by_rating_desc(&mut pool, effective_rating);
            split_snake(pool)
        }
        DrawMode::HeartTeam => {
            pool.sort_by(|a, b| heart_team_key(a).cmp(heart_team_key(b)));
            split_at_midpoint(pool)
        }
    };

    order_by_position(&mut team_a);
    order_by_position(&mut team_b);

    Teams {
        team_a: team_a.into_iter().map(|user| user.id.clone()).collect(),
        team_b: team_b.into_iter().map(|user| user.id.clone()).collect(),
    }
}

/// Side assigned to the player at `index` of a rating-sorted list: ranks 0 and
/// 3 of every group of four go to A, ranks 1 and 2 to B.
pub fn snake_side(index: usize) -> TeamSide {
    match index % 4 {
        0 | 3 => TeamSide::A,
        _ => TeamSide::B,
    }
}

fn sort_by_rating_desc<F>(pool: &mut [&User], rating: F)
where
    F: Fn(&User) -> f64,
{
    pool.sort_by(|a, b| rating(b).partial_cmp(&rating(a)).unwrap_or(Ordering::Equal));
}

fn heart_team_key(user: &User) -> &str {
    user.heart_team.as_deref().unwrap_or("")
}

fn split_alternating(pool: Vec<&User>) -> (Vec<&User>, Vec<&User>) {
    let (a, b): (Vec<_>, Vec<_>) = pool
        .into_iter()
        .enumerate()
        .partition(|(index, _)| index % 2 == 0);
    (strip_index(a), strip_index(b))
}

fn split_snake(pool: Vec<&User>) -> (Vec<&User>, Vec<&User>) {
    let (a, b): (Vec<_>, Vec<_>) = pool
        .into_iter()
        .enumerate()
        .partition(|(index, _)| snake_side(*index) == TeamSide::A);
    (strip_index(a), strip_index(b))
}

fn split_at_midpoint(mut pool: Vec<&User>) -> (Vec<&User>, Vec<&User>) {
    let upper = pool.split_off(pool.len().div_ceil(2));
    (pool, upper)
}

fn strip_index<'a>(entries: Vec<(usize, &'a User)>) -> Vec<&'a User> {
    entries.into_iter().map(|(_, user)| user).collect()
}

fn order_by_position(team: &mut [&User]) {
    team.sort_by_key(|user| user.position.priority());
}
