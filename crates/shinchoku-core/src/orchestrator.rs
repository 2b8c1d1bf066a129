use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use shinchoku_api::{CatalogueEntry, CatalogueService, ListStatus, MediaFormat, SearchQuery};
use shinchoku_parse::{parse_with_override, MediaKind, ParsedFilename};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, Fingerprint, ProgressCache};
use crate::config::{AppConfig, ResolverConfig, UpdatePolicy};
use crate::decision::{decide, DecisionInput};
use crate::error::CoreError;
use crate::matcher::pick_match;
use crate::models::{Confidence, DecisionAction, DecisionReason, ResolvedTarget};
use crate::resolver::resolve;
use crate::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Record the played episode on the list.
    Update,
    /// Open the entry's AniList page.
    Launch,
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update" => Ok(Self::Update),
            "launch" => Ok(Self::Launch),
            other => Err(CoreError::Config(format!("unknown action \"{other}\""))),
        }
    }
}

/// One request from the player.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub path: String,
    pub action: Action,
    /// Media title from the player, used instead of parsing the path.
    pub title_override: Option<String>,
    pub policy: UpdatePolicy,
}

/// A line for the player script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// Shown on the player's on-screen display.
    Osd(String),
    /// A URL the player script should open.
    Open(String),
    /// Plain diagnostic text.
    Note(String),
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Osd(text) => write!(f, "OSD: {text}"),
            Self::Open(url) => write!(f, "OPEN: {url}"),
            Self::Note(text) => f.write_str(text),
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Updated {
        title: String,
        progress: u32,
        low_confidence: bool,
    },
    Added {
        title: String,
        progress: u32,
        low_confidence: bool,
    },
    RewatchStarted {
        title: String,
    },
    Completed {
        title: String,
        progress: u32,
        low_confidence: bool,
    },
    /// Nothing to write.
    Skipped {
        title: String,
        reason: DecisionReason,
    },
    /// The played episode cannot belong to the entry.
    Rejected {
        title: String,
        reason: DecisionReason,
    },
    Launch {
        title: String,
        url: String,
    },
}

impl RunOutcome {
    pub fn lines(&self) -> Vec<OutputLine> {
        let guessed = |low: bool| if low { " (season guessed, please check)" } else { "" };
        match self {
            Self::Updated {
                title,
                progress,
                low_confidence,
            } => vec![OutputLine::Osd(format!(
                "Updated \"{title}\" to: {progress}{}",
                guessed(*low_confidence)
            ))],
            Self::Added {
                title,
                progress,
                low_confidence,
            } => vec![OutputLine::Osd(format!(
                "Added \"{title}\" to your list with progress: {progress}{}",
                guessed(*low_confidence)
            ))],
            Self::RewatchStarted { title } => vec![OutputLine::Osd(format!(
                "Updated \"{title}\" to REPEATING with progress: 1"
            ))],
            Self::Completed {
                title,
                progress,
                low_confidence,
            } => vec![OutputLine::Osd(format!(
                "Updated \"{title}\" to COMPLETED with progress: {progress}{}",
                guessed(*low_confidence)
            ))],
            Self::Skipped { title, reason } => {
                vec![OutputLine::Note(format!("Not updating \"{title}\": {reason}"))]
            }
            Self::Rejected { title, reason } => {
                vec![OutputLine::Osd(format!("Not updating \"{title}\": {reason}"))]
            }
            Self::Launch { url, .. } => vec![OutputLine::Open(url.clone())],
        }
    }
}

/// Formats worth searching for a parsed media kind. Empty means any.
fn formats_for(kind: MediaKind) -> Vec<MediaFormat> {
    match kind {
        MediaKind::Movie => vec![MediaFormat::Movie],
        MediaKind::Ova => vec![MediaFormat::Ova, MediaFormat::Ona, MediaFormat::Special],
        MediaKind::Special => vec![MediaFormat::Special, MediaFormat::Ova, MediaFormat::Ona],
        MediaKind::Tv | MediaKind::Unknown => Vec::new(),
    }
}

/// Runs invocations against a catalogue, with the progress cache loaded for
/// the lifetime of the updater.
pub struct Updater<S> {
    service: S,
    cache: ProgressCache,
    site_url: String,
    resolver: ResolverConfig,
    cooldown: chrono::Duration,
}

impl<S: CatalogueService> Updater<S> {
    pub fn new(service: S, cache: ProgressCache, config: &AppConfig) -> Self {
        Self {
            service,
            cache,
            site_url: config.anilist.site_url.trim_end_matches('/').to_string(),
            resolver: config.resolver.clone(),
            cooldown: chrono::Duration::from_std(config.session_cooldown())
                .unwrap_or_else(|_| chrono::Duration::weeks(52)),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn cache(&self) -> &ProgressCache {
        &self.cache
    }

    /// Handle one invocation. Every failure becomes a single OSD line; the
    /// cache is written back if the run changed it.
    pub async fn run(&mut self, invocation: &Invocation) -> Vec<OutputLine> {
        self.run_at(invocation, Utc::now()).await
    }

    #[tracing::instrument(
        name = "run",
        skip(self, invocation, now),
        fields(path = %invocation.path, action = ?invocation.action)
    )]
    pub async fn run_at(&mut self, invocation: &Invocation, now: DateTime<Utc>) -> Vec<OutputLine> {
        let lines = match self.execute(invocation, now).await {
            Ok(outcome) => {
                debug!(?outcome, "Run finished");
                outcome.lines()
            }
            Err(e) => {
                warn!(error = %e, "Run failed");
                vec![OutputLine::Osd(e.to_string())]
            }
        };

        if let Err(e) = self.cache.save_if_dirty() {
            warn!(error = %e, "Failed to write cache");
        }
        lines
    }

    /// Like [`Updater::run`], but at most once per session and not again
    /// within the cooldown. Launches are user-initiated and always run.
    pub async fn run_session(
        &mut self,
        session: &mut SessionContext,
        invocation: &Invocation,
    ) -> Vec<OutputLine> {
        let now = Utc::now();
        if invocation.action == Action::Update {
            if !session.should_run(now, self.cooldown) {
                debug!(path = %invocation.path, "Update already triggered for this session");
                return Vec::new();
            }
            session.mark_checked(now);
        }
        self.run_at(invocation, now).await
    }

    async fn execute(
        &mut self,
        invocation: &Invocation,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome, CoreError> {
        let parsed = parse_with_override(&invocation.path, invocation.title_override.as_deref())?;
        let search_title = parsed.search_title();
        let fingerprint = Fingerprint::for_parsed(&parsed);
        debug!(
            title = %search_title,
            season = ?parsed.season,
            episode = ?parsed.episode,
            from_folder = parsed.from_folder,
            "Parsed played file"
        );

        let cached = self
            .cache
            .get(&fingerprint, now)
            .filter(|entry| entry.guessed_name == search_title);

        if invocation.action == Action::Launch {
            let (media_id, title) = match cached {
                Some(entry) => (entry.anime_id, entry.anime_title),
                None => {
                    let entry = self.lookup(&parsed, &search_title, true).await?;
                    (entry.media_id, entry.title)
                }
            };
            let url = format!("{}/anime/{media_id}", self.site_url);
            info!(%title, %url, "Opening AniList page");
            return Ok(RunOutcome::Launch { title, url });
        }

        let episode = parsed.episode_or_first();
        let (target, from_cache) = match cached.and_then(|entry| cached_target(&entry, episode)) {
            Some(target) => {
                debug!(media_id = target.media_id, episode = target.episode_in_season, "Cache hit");
                (target, true)
            }
            None => {
                let add = invocation.policy.add_entry_if_missing;
                let entry = self.lookup(&parsed, &search_title, add).await?;
                (resolve(&parsed, &entry, &self.resolver)?, false)
            }
        };

        let decision = decide(&DecisionInput::from_target(&target), &invocation.policy);
        debug!(?decision, "Decided");
        let low_confidence = target.confidence == Confidence::Low;
        let title = target.title.clone();

        match decision.action {
            DecisionAction::Skip if decision.reason == DecisionReason::NotOnList => {
                Err(CoreError::NotInList { title })
            }
            DecisionAction::Skip => {
                info!(%title, reason = %decision.reason, "Not updating");
                // Only state fresh from AniList may restart the expiry clock.
                if !from_cache {
                    self.remember(
                        fingerprint,
                        search_title,
                        &target,
                        target.list_progress,
                        target.list_status,
                        now,
                    );
                }
                Ok(RunOutcome::Skipped {
                    title,
                    reason: decision.reason,
                })
            }
            DecisionAction::Error => Ok(RunOutcome::Rejected {
                title,
                reason: decision.reason,
            }),
            DecisionAction::Write => {
                let progress = decision.new_progress.unwrap_or(target.episode_in_season);
                let saved = if decision.reason == DecisionReason::RewatchStarted {
                    // Reset first so the restart shows up in the list history.
                    self.service
                        .mutate(target.media_id, 0, Some(ListStatus::Repeating))
                        .await
                        .map_err(|e| CoreError::api(&e))?;
                    self.service
                        .mutate(target.media_id, 1, None)
                        .await
                        .map_err(|e| CoreError::api(&e))?
                } else {
                    self.service
                        .mutate(target.media_id, progress, decision.new_status)
                        .await
                        .map_err(|e| CoreError::api(&e))?
                };
                info!(
                    %title,
                    progress = saved.progress,
                    status = %saved.status,
                    reason = %decision.reason,
                    "List entry saved"
                );
                self.remember(
                    fingerprint,
                    search_title,
                    &target,
                    saved.progress,
                    saved.status,
                    now,
                );

                Ok(match decision.reason {
                    DecisionReason::AddedToList => RunOutcome::Added {
                        title,
                        progress: saved.progress,
                        low_confidence,
                    },
                    DecisionReason::RewatchStarted => RunOutcome::RewatchStarted { title },
                    DecisionReason::Completed => RunOutcome::Completed {
                        title,
                        progress: saved.progress,
                        low_confidence,
                    },
                    _ => RunOutcome::Updated {
                        title,
                        progress: saved.progress,
                        low_confidence,
                    },
                })
            }
        }
    }

    /// Search the caller's list, then all of AniList when `include_off_list`
    /// and the list had nothing.
    async fn lookup(
        &self,
        parsed: &ParsedFilename,
        search_title: &str,
        include_off_list: bool,
    ) -> Result<CatalogueEntry, CoreError> {
        let query = SearchQuery::new(search_title)
            .year(parsed.year)
            .formats(formats_for(parsed.media_kind));

        let mut results = self.search(&query.clone().on_list(true)).await?;
        if results.is_empty() {
            if !include_off_list {
                return Err(CoreError::NotInList {
                    title: search_title.to_string(),
                });
            }
            debug!(search_title, "Nothing on the list, searching all entries");
            results = self.search(&query.on_list(false)).await?;
        }
        pick_match(results, search_title, parsed.year)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogueEntry>, CoreError> {
        self.service
            .search(query)
            .await
            .map_err(|e| CoreError::api(&e))
    }

    fn remember(
        &mut self,
        fingerprint: Fingerprint,
        search_title: String,
        target: &ResolvedTarget,
        progress: u32,
        status: ListStatus,
        now: DateTime<Utc>,
    ) {
        let entry = CacheEntry {
            guessed_name: search_title,
            anime_id: target.media_id,
            last_progress: progress,
            expires_at: now,
            anime_title: target.title.clone(),
            season: target.season,
            total_episodes: target.season_episodes,
            current_status: status,
            episode_offset: target.episode_offset(),
            low_confidence: target.confidence == Confidence::Low,
            last_used: 0,
        };
        self.cache.put(fingerprint, entry, now);
    }
}

/// Target for a cache hit, if the played episode falls inside the cached
/// season.
fn cached_target(entry: &CacheEntry, episode: u32) -> Option<ResolvedTarget> {
    let relative = entry.relative_episode(episode)?;
    Some(ResolvedTarget {
        media_id: entry.anime_id,
        title: entry.anime_title.clone(),
        season: entry.season,
        episode_in_season: relative,
        absolute_episode: episode,
        used_absolute_numbering: entry.episode_offset > 0,
        confidence: if entry.low_confidence {
            Confidence::Low
        } else {
            Confidence::High
        },
        season_episodes: entry.total_episodes,
        list_status: entry.current_status,
        list_progress: entry.last_progress,
    })
}
