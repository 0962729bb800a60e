// Classification of local items against the user's Trakt snapshots

use crate::buckets::{BucketEpisode, BucketMovie, SyncBuckets};
use trakt_sync_models::{LocalEpisode, LocalMediaItem, LocalMovie, PlayState, RemoteSnapshots};
use tracing::trace;

/// Watch-state change an item needs on Trakt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchChange {
    MarkPlayed,
    MarkUnplayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub collect: bool,
    pub watch: Option<WatchChange>,
}

/// Why an item was left out of every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoIds,
    NoSeriesIds,
    NoEpisodeNumbering,
}

pub fn classify_movie(
    movie: &LocalMovie,
    play_state: &PlayState,
    snapshots: &RemoteSnapshots,
) -> Result<Classification, SkipReason> {
    if movie.ids.is_empty() {
        return Err(SkipReason::NoIds);
    }

    let collected = snapshots.find_collected_movie(&movie.ids);
    let collect = collected.map(|c| !c.has_metadata()).unwrap_or(true);

    let watched = snapshots.find_watched_movie(&movie.ids);
    let watch = if play_state.played {
        match watched {
            Some(remote) if remote.plays >= play_state.play_count => None,
            _ => Some(WatchChange::MarkPlayed),
        }
    } else if watched.is_some() {
        Some(WatchChange::MarkUnplayed)
    } else {
        None
    };

    Ok(Classification { collect, watch })
}

pub fn classify_episode(
    episode: &LocalEpisode,
    play_state: &PlayState,
    snapshots: &RemoteSnapshots,
) -> Result<Classification, SkipReason> {
    if episode.series_ids.is_empty() {
        return Err(SkipReason::NoSeriesIds);
    }
    let (Some(season), Some(number)) = (episode.season_number, episode.episode_number) else {
        return Err(SkipReason::NoEpisodeNumbering);
    };

    let remote_played = snapshots
        .find_watched_show(&episode.series_ids)
        .map(|show| show.is_episode_played(season, number))
        .unwrap_or(false);

    let watch = match (play_state.played, remote_played) {
        (true, false) => Some(WatchChange::MarkPlayed),
        (false, true) => Some(WatchChange::MarkUnplayed),
        _ => None,
    };

    let collect = !snapshots
        .find_collected_show(&episode.series_ids)
        .map(|show| show.has_episode(season, number))
        .unwrap_or(false);

    Ok(Classification { collect, watch })
}

/// Classify one item and push it into the matching buckets.
pub fn classify_into(
    item: &LocalMediaItem,
    play_state: PlayState,
    snapshots: &RemoteSnapshots,
    buckets: &mut SyncBuckets,
) -> Result<Classification, SkipReason> {
    match item {
        LocalMediaItem::Movie(movie) => {
            let classification = classify_movie(movie, &play_state, snapshots)?;
            trace!("movie {} ({}): {:?}", movie.name, movie.ids.describe(), classification);
            let entry = BucketMovie { movie: movie.clone(), play_state };
            match classification.watch {
                Some(WatchChange::MarkPlayed) => buckets.played_movies.push(entry.clone()),
                Some(WatchChange::MarkUnplayed) => buckets.unplayed_movies.push(entry.clone()),
                None => {}
            }
            if classification.collect {
                buckets.collect_movies.push(entry);
            }
            Ok(classification)
        }
        LocalMediaItem::Episode(episode) => {
            let classification = classify_episode(episode, &play_state, snapshots)?;
            trace!(
                "episode {} S{:?}E{:?}: {:?}",
                episode.series_name,
                episode.season_number,
                episode.episode_number,
                classification
            );
            let entry = BucketEpisode { episode: episode.clone(), play_state };
            match classification.watch {
                Some(WatchChange::MarkPlayed) => buckets.played_episodes.push(entry.clone()),
                Some(WatchChange::MarkUnplayed) => buckets.unplayed_episodes.push(entry.clone()),
                None => {}
            }
            if classification.collect {
                buckets.collect_episodes.push(entry);
            }
            Ok(classification)
        }
    }
}
