use std::collections::BTreeMap;
use trakt_sync_models::{
    LocalEpisode, LocalMovie, MediaIds, PlayState, SyncEpisode, SyncMovie, SyncRequest,
    SyncSeason, SyncShow,
};

/// What a flushed bucket asks Trakt to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Collect,
    MarkPlayed,
    MarkUnplayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKind {
    CollectMovies,
    MarkPlayedMovies,
    MarkUnplayedMovies,
    CollectEpisodes,
    MarkPlayedEpisodes,
    MarkUnplayedEpisodes,
}

impl BucketKind {
    /// Order in which buckets are flushed after traversal.
    pub const FLUSH_ORDER: [BucketKind; 6] = [
        BucketKind::CollectMovies,
        BucketKind::MarkPlayedMovies,
        BucketKind::MarkUnplayedMovies,
        BucketKind::CollectEpisodes,
        BucketKind::MarkPlayedEpisodes,
        BucketKind::MarkUnplayedEpisodes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BucketKind::CollectMovies => "collect_movies",
            BucketKind::MarkPlayedMovies => "mark_played_movies",
            BucketKind::MarkUnplayedMovies => "mark_unplayed_movies",
            BucketKind::CollectEpisodes => "collect_episodes",
            BucketKind::MarkPlayedEpisodes => "mark_played_episodes",
            BucketKind::MarkUnplayedEpisodes => "mark_unplayed_episodes",
        }
    }

    pub fn action(&self) -> SyncAction {
        match self {
            BucketKind::CollectMovies | BucketKind::CollectEpisodes => SyncAction::Collect,
            BucketKind::MarkPlayedMovies | BucketKind::MarkPlayedEpisodes => SyncAction::MarkPlayed,
            BucketKind::MarkUnplayedMovies | BucketKind::MarkUnplayedEpisodes => {
                SyncAction::MarkUnplayed
            }
        }
    }
}

impl std::fmt::Display for BucketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketMovie {
    pub movie: LocalMovie,
    pub play_state: PlayState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketEpisode {
    pub episode: LocalEpisode,
    pub play_state: PlayState,
}

/// The six per-user accumulators filled during one traversal.
#[derive(Debug, Default)]
pub struct SyncBuckets {
    pub collect_movies: Vec<BucketMovie>,
    pub played_movies: Vec<BucketMovie>,
    pub unplayed_movies: Vec<BucketMovie>,
    pub collect_episodes: Vec<BucketEpisode>,
    pub played_episodes: Vec<BucketEpisode>,
    pub unplayed_episodes: Vec<BucketEpisode>,
}

impl SyncBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, kind: BucketKind) -> usize {
        match kind {
            BucketKind::CollectMovies => self.collect_movies.len(),
            BucketKind::MarkPlayedMovies => self.played_movies.len(),
            BucketKind::MarkUnplayedMovies => self.unplayed_movies.len(),
            BucketKind::CollectEpisodes => self.collect_episodes.len(),
            BucketKind::MarkPlayedEpisodes => self.played_episodes.len(),
            BucketKind::MarkUnplayedEpisodes => self.unplayed_episodes.len(),
        }
    }

    pub fn total(&self) -> usize {
        BucketKind::FLUSH_ORDER.iter().map(|kind| self.len(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Build the Trakt payload for one bucket.
    pub fn request(&self, kind: BucketKind) -> SyncRequest {
        match kind {
            BucketKind::CollectMovies => movie_request(&self.collect_movies, kind.action()),
            BucketKind::MarkPlayedMovies => movie_request(&self.played_movies, kind.action()),
            BucketKind::MarkUnplayedMovies => movie_request(&self.unplayed_movies, kind.action()),
            BucketKind::CollectEpisodes => episode_request(&self.collect_episodes, kind.action()),
            BucketKind::MarkPlayedEpisodes => episode_request(&self.played_episodes, kind.action()),
            BucketKind::MarkUnplayedEpisodes => {
                episode_request(&self.unplayed_episodes, kind.action())
            }
        }
    }
}

fn movie_request(entries: &[BucketMovie], action: SyncAction) -> SyncRequest {
    let movies = entries
        .iter()
        .map(|entry| {
            let movie = &entry.movie;
            let mut sync_movie = SyncMovie {
                title: Some(movie.name.clone()),
                year: movie.year,
                ids: movie.ids.clone(),
                collected_at: None,
                watched_at: None,
                metadata: None,
            };
            match action {
                SyncAction::Collect => {
                    sync_movie.collected_at = movie.date_added;
                    sync_movie.metadata = movie.metadata.clone().filter(|m| !m.is_empty());
                }
                SyncAction::MarkPlayed => {
                    sync_movie.watched_at = entry.play_state.last_played_date;
                }
                SyncAction::MarkUnplayed => {}
            }
            sync_movie
        })
        .collect();

    SyncRequest { movies, shows: Vec::new() }
}

/// Episodes are sent nested under their show so Trakt can resolve them by
/// show ids plus season/episode numbers.
fn episode_request(entries: &[BucketEpisode], action: SyncAction) -> SyncRequest {
    let mut shows: Vec<(MediaIds, SyncShow, BTreeMap<u32, Vec<SyncEpisode>>)> = Vec::new();

    for entry in entries {
        let episode = &entry.episode;
        let (Some(season), Some(number)) = (episode.season_number, episode.episode_number) else {
            continue;
        };

        let mut sync_episode = SyncEpisode {
            number,
            collected_at: None,
            watched_at: None,
            metadata: None,
        };
        match action {
            SyncAction::Collect => {
                sync_episode.collected_at = episode.date_added;
                sync_episode.metadata = episode.metadata.clone().filter(|m| !m.is_empty());
            }
            SyncAction::MarkPlayed => {
                sync_episode.watched_at = entry.play_state.last_played_date;
            }
            SyncAction::MarkUnplayed => {}
        }

        let index = match shows.iter().position(|(ids, _, _)| *ids == episode.series_ids) {
            Some(index) => index,
            None => {
                shows.push((
                    episode.series_ids.clone(),
                    SyncShow {
                        title: Some(episode.series_name.clone()),
                        year: episode.series_year,
                        ids: episode.series_ids.clone(),
                        seasons: Vec::new(),
                    },
                    BTreeMap::new(),
                ));
                shows.len() - 1
            }
        };
        shows[index].2.entry(season).or_default().push(sync_episode);
    }

    let shows = shows
        .into_iter()
        .map(|(_, mut show, seasons)| {
            show.seasons = seasons
                .into_iter()
                .map(|(number, episodes)| SyncSeason { number, episodes })
                .collect();
            show
        })
        .collect();

    SyncRequest { movies: Vec::new(), shows }
}
