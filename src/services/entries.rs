//! Favorited and rated dishes merged into one list per user.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::entry::{EntryQuery, EntrySort, FavoriteRecord, MergedEntry, RatedRecord};
use crate::services::{favorites::FavoriteService, ratings::RatingService};

/// Merge favorites and rated dishes by dish id.
///
/// Each dish appears once, flagged as favorited iff it was in `favorites`,
/// stamped with the latest timestamp any of its records carries. Records
/// without timestamps fall back to the Unix epoch.
pub fn merge_entries(favorites: &[FavoriteRecord], rated: &[RatedRecord]) -> Vec<MergedEntry> {
    let mut merged: HashMap<&str, MergedEntry> = HashMap::new();

    for fav in favorites {
        let stamp = fav
            .updated_at
            .or(fav.created_at)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        merged
            .entry(fav.dish_id.as_str())
            .and_modify(|e| e.modified_at = e.modified_at.max(stamp))
            .or_insert_with(|| MergedEntry {
                dish_id: fav.dish_id.clone(),
                dish: fav.dish.clone(),
                is_favorited: true,
                rating: None,
                modified_at: stamp,
            });
    }

    for r in rated {
        let stamp = r.rated_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        merged
            .entry(r.dish_id.as_str())
            .and_modify(|e| {
                e.modified_at = e.modified_at.max(stamp);
                e.rating = Some(r.rating);
            })
            .or_insert_with(|| MergedEntry {
                dish_id: r.dish_id.clone(),
                dish: r.dish.clone(),
                is_favorited: false,
                rating: Some(r.rating),
                modified_at: stamp,
            });
    }

    merged.into_values().collect()
}

/// Apply the location filter, name search and sort order of `query`.
pub fn filter_and_sort(entries: Vec<MergedEntry>, query: &EntryQuery) -> Vec<MergedEntry> {
    let location = query
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "all");
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut kept: Vec<MergedEntry> = entries
        .into_iter()
        .filter(|e| location.map_or(true, |l| e.dish.restaurant_id.eq_ignore_ascii_case(l)))
        .filter(|e| {
            needle
                .as_deref()
                .map_or(true, |n| e.dish.name.to_lowercase().contains(n))
        })
        .collect();

    kept.sort_by(|a, b| compare(a, b, query.sort).then_with(|| a.dish_id.cmp(&b.dish_id)));
    kept
}

fn compare(a: &MergedEntry, b: &MergedEntry, sort: EntrySort) -> Ordering {
    match sort {
        EntrySort::Recent => b.modified_at.cmp(&a.modified_at),
        EntrySort::Oldest => a.modified_at.cmp(&b.modified_at),
        EntrySort::Alphabetical => a.dish.name.to_lowercase().cmp(&b.dish.name.to_lowercase()),
        EntrySort::MostRated => b.dish.num_ratings.cmp(&a.dish.num_ratings),
    }
}

pub struct EntryService;

impl EntryService {
    /// The user's favorited and rated dishes, merged, filtered and sorted.
    pub async fn list(
        pool: &PgPool,
        user_id: &str,
        query: &EntryQuery,
    ) -> anyhow::Result<Vec<MergedEntry>> {
        let favorites = FavoriteService::list(pool, user_id).await?;
        let rated = RatingService::list_rated(pool, user_id).await?;
        Ok(filter_and_sort(merge_entries(&favorites, &rated), query))
    }
}
