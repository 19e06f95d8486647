use profetas_types::api::{Medal, RankingRow};
use profetas_types::models::Profile;

/// Order profiles by points, highest first. The sort is stable, so profiles
/// with equal points keep the order they came in.
pub fn rank_profiles(mut profiles: Vec<Profile>) -> Vec<RankingRow> {
    profiles.sort_by(|a, b| b.total_points.cmp(&a.total_points));

    profiles
        .into_iter()
        .enumerate()
        .map(|(index, profile)| {
            let position = index + 1;
            RankingRow {
                position,
                medal: Medal::for_position(position),
                profile_id: profile.id,
                username: profile.username,
                total_points: profile.total_points,
            }
        })
        .collect()
}
