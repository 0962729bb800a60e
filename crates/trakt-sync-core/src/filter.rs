use std::path::PathBuf;
use trakt_sync_models::LocalMediaItem;

/// Keep items that can be synced: backed by a real file and outside every
/// excluded location.
pub fn syncable_items(items: Vec<LocalMediaItem>, excluded_locations: &[PathBuf]) -> Vec<LocalMediaItem> {
    items
        .into_iter()
        .filter(|item| item.has_real_file())
        .filter(|item| {
            item.path()
                .map(|path| !excluded_locations.iter().any(|prefix| path.starts_with(prefix)))
                .unwrap_or(false)
        })
        .collect()
}

/// Episodes grouped by series and numbering, then movies by name.
pub fn order_for_traversal(items: &mut [LocalMediaItem]) {
    items.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
}

fn sort_key(item: &LocalMediaItem) -> (u8, String, u32, u32) {
    match item {
        LocalMediaItem::Episode(episode) => (
            0,
            episode.series_name.to_lowercase(),
            episode.season_number.unwrap_or(0),
            episode.episode_number.unwrap_or(0),
        ),
        LocalMediaItem::Movie(movie) => (1, movie.name.to_lowercase(), 0, 0),
    }
}
