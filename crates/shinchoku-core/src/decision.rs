//! List update rules.
//!
//! Pure function of the entry's current state, the played episode and the
//! user's policy. Rules are checked in order; the first that applies wins.

use shinchoku_api::ListStatus;

use crate::config::UpdatePolicy;
use crate::models::{Confidence, DecisionReason, ResolvedTarget, UpdateDecision};

/// Everything the rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionInput {
    pub status: ListStatus,
    pub progress: u32,
    pub episode: u32,
    /// Last episode of the season, if known.
    pub last_episode: Option<u32>,
    /// Whether `last_episode` can be trusted.
    pub confidence: Confidence,
}

impl DecisionInput {
    pub fn from_target(target: &ResolvedTarget) -> Self {
        Self {
            status: target.list_status,
            progress: target.list_progress,
            episode: target.episode_in_season,
            last_episode: target.season_episodes,
            confidence: target.confidence,
        }
    }
}

pub fn decide(input: &DecisionInput, policy: &UpdatePolicy) -> UpdateDecision {
    let DecisionInput {
        status,
        progress,
        episode,
        last_episode,
        confidence,
    } = *input;

    if let Some(last) = last_episode {
        if confidence == Confidence::High && episode > last {
            return UpdateDecision::error(DecisionReason::EpisodeOutOfRange { episode, last });
        }
    }

    if status == ListStatus::None {
        return if policy.add_entry_if_missing {
            UpdateDecision::write(Some(ListStatus::Current), episode, DecisionReason::AddedToList)
        } else {
            UpdateDecision::skip(DecisionReason::NotOnList)
        };
    }

    // The one write that moves progress backwards.
    if status == ListStatus::Completed
        && episode == 1
        && policy.set_completed_to_rewatching_on_first_episode
    {
        return UpdateDecision::write(Some(ListStatus::Repeating), 1, DecisionReason::RewatchStarted);
    }

    if status == ListStatus::Repeating && !policy.update_progress_when_rewatching {
        return UpdateDecision::skip(DecisionReason::RewatchTrackingDisabled);
    }

    if episode <= progress {
        return UpdateDecision::skip(DecisionReason::NotNewer { episode, progress });
    }

    let completes = last_episode == Some(episode)
        && match status {
            ListStatus::Current => policy.set_to_completed_after_last_episode_current,
            ListStatus::Repeating => policy.set_to_completed_after_last_episode_rewatching,
            _ => false,
        };
    if completes {
        return UpdateDecision::write(Some(ListStatus::Completed), episode, DecisionReason::Completed);
    }

    match status {
        ListStatus::Current | ListStatus::Repeating => {
            UpdateDecision::write(Some(status), episode, DecisionReason::ProgressUpdated)
        }
        ListStatus::Planning if policy.add_entry_if_missing => UpdateDecision::write(
            Some(ListStatus::Current),
            episode,
            DecisionReason::ProgressUpdated,
        ),
        ListStatus::Planning => UpdateDecision::skip(DecisionReason::PlanningNotStarted),
        other => UpdateDecision::skip(DecisionReason::StatusNotTracked(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DecisionAction;

    const ALL_STATUSES: [ListStatus; 7] = [
        ListStatus::Current,
        ListStatus::Planning,
        ListStatus::Repeating,
        ListStatus::Completed,
        ListStatus::Paused,
        ListStatus::Dropped,
        ListStatus::None,
    ];

    fn input(status: ListStatus, progress: u32, episode: u32, last: Option<u32>) -> DecisionInput {
        DecisionInput {
            status,
            progress,
            episode,
            last_episode: last,
            confidence: Confidence::High,
        }
    }

    fn all_policies() -> Vec<UpdatePolicy> {
        (0..32u8)
            .map(|bits| UpdatePolicy {
                set_completed_to_rewatching_on_first_episode: bits & 1 != 0,
                update_progress_when_rewatching: bits & 2 != 0,
                set_to_completed_after_last_episode_current: bits & 4 != 0,
                set_to_completed_after_last_episode_rewatching: bits & 8 != 0,
                add_entry_if_missing: bits & 16 != 0,
            })
            .collect()
    }

    #[test]
    fn test_current_advances() {
        let d = decide(&input(ListStatus::Current, 3, 4, Some(12)), &UpdatePolicy::default());
        assert_eq!(d.action, DecisionAction::Write);
        assert_eq!(d.new_status, Some(ListStatus::Current));
        assert_eq!(d.new_progress, Some(4));
        assert_eq!(d.reason, DecisionReason::ProgressUpdated);
    }

    #[test]
    fn test_not_newer_is_skipped() {
        let d = decide(&input(ListStatus::Current, 7, 5, Some(12)), &UpdatePolicy::default());
        assert_eq!(d.action, DecisionAction::Skip);
        assert_eq!(d.reason, DecisionReason::NotNewer { episode: 5, progress: 7 });
    }

    #[test]
    fn test_last_episode_completes() {
        let policy = UpdatePolicy {
            set_to_completed_after_last_episode_current: true,
            ..UpdatePolicy::default()
        };
        let d = decide(&input(ListStatus::Current, 11, 12, Some(12)), &policy);
        assert_eq!(d.new_status, Some(ListStatus::Completed));
        assert_eq!(d.new_progress, Some(12));
        assert_eq!(d.reason, DecisionReason::Completed);

        // Off by default for shows being watched the first time.
        let d = decide(&input(ListStatus::Current, 11, 12, Some(12)), &UpdatePolicy::default());
        assert_eq!(d.new_status, Some(ListStatus::Current));
    }

    #[test]
    fn test_rewatch_last_episode_completes() {
        let d = decide(&input(ListStatus::Repeating, 11, 12, Some(12)), &UpdatePolicy::default());
        assert_eq!(d.new_status, Some(ListStatus::Completed));
    }

    #[test]
    fn test_rewatch_start() {
        let policy = UpdatePolicy {
            set_completed_to_rewatching_on_first_episode: true,
            ..UpdatePolicy::default()
        };
        let d = decide(&input(ListStatus::Completed, 12, 1, Some(12)), &policy);
        assert_eq!(d.action, DecisionAction::Write);
        assert_eq!(d.new_status, Some(ListStatus::Repeating));
        assert_eq!(d.new_progress, Some(1));
        assert_eq!(d.reason, DecisionReason::RewatchStarted);

        // Off by default: a completed show is left alone.
        let d = decide(&input(ListStatus::Completed, 12, 1, Some(12)), &UpdatePolicy::default());
        assert_eq!(d.action, DecisionAction::Skip);
    }

    #[test]
    fn test_rewatch_tracking_disabled() {
        let policy = UpdatePolicy {
            update_progress_when_rewatching: false,
            ..UpdatePolicy::default()
        };
        let d = decide(&input(ListStatus::Repeating, 3, 4, Some(12)), &policy);
        assert_eq!(d.reason, DecisionReason::RewatchTrackingDisabled);
    }

    #[test]
    fn test_missing_entry() {
        let d = decide(&input(ListStatus::None, 0, 3, None), &UpdatePolicy::default());
        assert_eq!(d.reason, DecisionReason::NotOnList);

        let policy = UpdatePolicy {
            add_entry_if_missing: true,
            ..UpdatePolicy::default()
        };
        let d = decide(&input(ListStatus::None, 0, 3, None), &policy);
        assert_eq!(d.new_status, Some(ListStatus::Current));
        assert_eq!(d.new_progress, Some(3));
        assert_eq!(d.reason, DecisionReason::AddedToList);
    }

    #[test]
    fn test_planning_needs_add_enabled() {
        let d = decide(&input(ListStatus::Planning, 0, 1, Some(12)), &UpdatePolicy::default());
        assert_eq!(d.reason, DecisionReason::PlanningNotStarted);

        let policy = UpdatePolicy {
            add_entry_if_missing: true,
            ..UpdatePolicy::default()
        };
        let d = decide(&input(ListStatus::Planning, 0, 1, Some(12)), &policy);
        assert_eq!(d.new_status, Some(ListStatus::Current));
        assert_eq!(d.new_progress, Some(1));
    }

    #[test]
    fn test_paused_and_dropped_are_left_alone() {
        for status in [ListStatus::Paused, ListStatus::Dropped] {
            let d = decide(&input(status, 2, 3, Some(12)), &UpdatePolicy::default());
            assert_eq!(d.reason, DecisionReason::StatusNotTracked(status));
        }
    }

    #[test]
    fn test_episode_past_known_length_is_error() {
        let d = decide(&input(ListStatus::Current, 3, 14, Some(12)), &UpdatePolicy::default());
        assert_eq!(d.action, DecisionAction::Error);
        assert_eq!(d.reason, DecisionReason::EpisodeOutOfRange { episode: 14, last: 12 });

        // An assumed length is not enough to refuse.
        let mut low = input(ListStatus::Current, 3, 14, Some(12));
        low.confidence = Confidence::Low;
        assert_eq!(decide(&low, &UpdatePolicy::default()).action, DecisionAction::Write);
    }

    #[test]
    fn test_progress_only_moves_forward_except_rewatch() {
        for policy in all_policies() {
            for status in ALL_STATUSES {
                for progress in 0..=13 {
                    for episode in 1..=13 {
                        let d = decide(&input(status, progress, episode, Some(12)), &policy);
                        if d.action != DecisionAction::Write {
                            assert_eq!(d.new_progress, None);
                            continue;
                        }
                        if d.reason == DecisionReason::RewatchStarted {
                            assert_eq!(status, ListStatus::Completed);
                            assert_eq!(episode, 1);
                            continue;
                        }
                        assert!(d.new_progress.unwrap() > progress || status == ListStatus::None);
                        assert_eq!(d.new_progress, Some(episode));
                    }
                }
            }
        }
    }

    #[test]
    fn test_completed_only_from_last_episode() {
        for policy in all_policies() {
            for status in ALL_STATUSES {
                for episode in 1..=12 {
                    let d = decide(&input(status, 0, episode, Some(12)), &policy);
                    if d.new_status == Some(ListStatus::Completed) {
                        assert_eq!(episode, 12);
                        assert!(matches!(status, ListStatus::Current | ListStatus::Repeating));
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_input_same_decision() {
        let policy = UpdatePolicy::default();
        let i = input(ListStatus::Current, 5, 6, Some(12));
        assert_eq!(decide(&i, &policy), decide(&i, &policy));
    }
}
