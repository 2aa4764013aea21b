//! Upload/judging session state machine.
//!
//! A session walks Idle -> Staged -> Submitting -> Completed (or Failed) and
//! hands out a [`SubmitToken`] when a submission starts. Responses are only
//! applied when they present the token of the submission still in flight;
//! anything else is a leftover from an abandoned attempt and is discarded.

use thiserror::Error;
use uuid::Uuid;

use crate::{dto::judgement::PhotoUpload, state::model::Judgement};

/// Where the session currently is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionPhase {
    /// Nothing staged.
    #[default]
    Idle,
    /// Photos picked and waiting for submission.
    Staged(Vec<PhotoUpload>),
    /// Batch sent, response pending.
    Submitting(Vec<PhotoUpload>),
    /// Batch judged; results are in.
    Completed(Vec<Judgement>),
    /// Submission failed; the batch is kept for a retry.
    Failed {
        /// Operator-facing failure message.
        message: String,
        /// The batch that failed.
        photos: Vec<PhotoUpload>,
    },
}

/// Proof of the submission currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitToken {
    id: Uuid,
    epoch: u64,
}

/// Rejected session transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Staging is blocked while a batch is in flight.
    #[error("cannot stage photos while a submission is in flight")]
    StageWhileSubmitting,
    /// Submission requires a staged (or previously failed) batch.
    #[error("no photos staged for submission")]
    NothingStaged,
    /// Only one submission may be in flight at a time.
    #[error("a submission is already in flight")]
    AlreadySubmitting,
}

/// Single-competition judging session.
#[derive(Debug, Default)]
pub struct JudgingSession {
    phase: SessionPhase,
    epoch: u64,
    pending: Option<SubmitToken>,
}

impl JudgingSession {
    /// Current phase.
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Stage a batch of files, keeping only images.
    ///
    /// A non-empty selection replaces any previously staged batch, even when
    /// every file is filtered out; an empty selection changes nothing.
    /// Returns how many files were kept.
    pub fn stage(&mut self, photos: Vec<PhotoUpload>) -> Result<usize, SessionError> {
        if matches!(self.phase, SessionPhase::Submitting(_)) {
            return Err(SessionError::StageWhileSubmitting);
        }
        if photos.is_empty() {
            return Ok(0);
        }
        let kept: Vec<PhotoUpload> = photos.into_iter().filter(|p| p.is_image()).collect();
        if kept.is_empty() {
            self.phase = SessionPhase::Idle;
            return Ok(0);
        }
        let count = kept.len();
        self.phase = SessionPhase::Staged(kept);
        Ok(count)
    }

    /// Move the staged (or previously failed) batch into flight.
    ///
    /// Returns the token the eventual response must present, plus the batch
    /// to send.
    pub fn begin_submit(&mut self) -> Result<(SubmitToken, Vec<PhotoUpload>), SessionError> {
        let photos = match std::mem::replace(&mut self.phase, SessionPhase::Idle) {
            SessionPhase::Staged(photos) | SessionPhase::Failed { photos, .. } => photos,
            submitting @ SessionPhase::Submitting(_) => {
                self.phase = submitting;
                return Err(SessionError::AlreadySubmitting);
            }
            other => {
                self.phase = other;
                return Err(SessionError::NothingStaged);
            }
        };

        let token = SubmitToken {
            id: Uuid::new_v4(),
            epoch: self.epoch,
        };
        self.pending = Some(token);
        self.phase = SessionPhase::Submitting(photos.clone());
        Ok((token, photos))
    }

    /// Apply judgement results for the submission holding `token`.
    ///
    /// Returns `false` when the token is stale; the results are discarded.
    pub fn complete(&mut self, token: SubmitToken, results: Vec<Judgement>) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        self.phase = SessionPhase::Completed(results);
        true
    }

    /// Record a failure for the submission holding `token`, keeping the batch
    /// for a retry.
    ///
    /// Returns `false` when the token is stale.
    pub fn fail(&mut self, token: SubmitToken, message: String) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        match std::mem::replace(&mut self.phase, SessionPhase::Idle) {
            SessionPhase::Submitting(photos) => {
                self.pending = None;
                self.phase = SessionPhase::Failed { message, photos };
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    /// Drop everything and return to idle.
    ///
    /// Bumping the epoch invalidates any token still in flight, so a response
    /// from before the reset can never land.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.pending = None;
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::model::JudgementDetails;
    use time::OffsetDateTime;

    fn image(name: &str) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            media_type: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn text_file(name: &str) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            media_type: "text/plain".to_string(),
            bytes: vec![1],
        }
    }

    fn judgement(id: i64) -> Judgement {
        Judgement {
            id,
            competition_id: 1,
            original_filename: format!("photo-{id}.jpg"),
            stored_filename: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            details: JudgementDetails::default(),
        }
    }

    #[test]
    fn staged_batch_flows_to_completed() {
        let mut session = JudgingSession::default();
        assert_eq!(session.stage(vec![image("a.jpg"), image("b.jpg")]), Ok(2));

        let (token, photos) = session.begin_submit().unwrap();
        assert_eq!(photos.len(), 2);
        assert!(matches!(session.phase(), SessionPhase::Submitting(_)));

        assert!(session.complete(token, vec![judgement(1), judgement(2)]));
        match session.phase() {
            SessionPhase::Completed(results) => assert_eq!(results.len(), 2),
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[test]
    fn failure_keeps_the_batch_for_retry() {
        let mut session = JudgingSession::default();
        session.stage(vec![image("a.jpg")]).unwrap();
        let (token, _) = session.begin_submit().unwrap();

        assert!(session.fail(token, "backend down".to_string()));
        match session.phase() {
            SessionPhase::Failed { message, photos } => {
                assert_eq!(message, "backend down");
                assert_eq!(photos.len(), 1);
            }
            other => panic!("unexpected phase: {other:?}"),
        }

        // Retry goes straight from the failed phase with the same batch.
        let (_, photos) = session.begin_submit().unwrap();
        assert_eq!(photos[0].file_name, "a.jpg");
    }

    #[test]
    fn stale_token_after_reset_is_discarded() {
        let mut session = JudgingSession::default();
        session.stage(vec![image("a.jpg")]).unwrap();
        let (token, _) = session.begin_submit().unwrap();

        session.reset();
        assert!(!session.complete(token, vec![judgement(1)]));
        assert!(!session.fail(token, "late failure".to_string()));
        assert_eq!(session.phase(), &SessionPhase::Idle);
    }

    #[test]
    fn stale_token_from_previous_submission_is_discarded() {
        let mut session = JudgingSession::default();
        session.stage(vec![image("a.jpg")]).unwrap();
        let (first, _) = session.begin_submit().unwrap();
        session.fail(first, "timeout".to_string());

        let (second, _) = session.begin_submit().unwrap();
        assert!(!session.complete(first, vec![judgement(1)]));
        assert!(session.complete(second, vec![judgement(2)]));
    }

    #[test]
    fn staging_keeps_only_images() {
        let mut session = JudgingSession::default();
        assert_eq!(
            session.stage(vec![image("a.jpg"), text_file("notes.txt")]),
            Ok(1)
        );
        match session.phase() {
            SessionPhase::Staged(photos) => assert_eq!(photos.len(), 1),
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[test]
    fn staging_only_non_images_clears_the_batch() {
        let mut session = JudgingSession::default();
        session.stage(vec![image("keep.jpg")]).unwrap();

        assert_eq!(session.stage(vec![text_file("a.txt")]), Ok(0));
        assert_eq!(session.phase(), &SessionPhase::Idle);
    }

    #[test]
    fn staging_an_empty_selection_changes_nothing() {
        let mut session = JudgingSession::default();
        session.stage(vec![image("keep.jpg")]).unwrap();

        assert_eq!(session.stage(vec![]), Ok(0));
        match session.phase() {
            SessionPhase::Staged(photos) => assert_eq!(photos[0].file_name, "keep.jpg"),
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[test]
    fn restaging_replaces_the_batch() {
        let mut session = JudgingSession::default();
        session.stage(vec![image("a.jpg"), image("b.jpg")]).unwrap();
        session.stage(vec![image("c.jpg")]).unwrap();
        match session.phase() {
            SessionPhase::Staged(photos) => {
                assert_eq!(photos.len(), 1);
                assert_eq!(photos[0].file_name, "c.jpg");
            }
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[test]
    fn submission_needs_a_staged_batch() {
        let mut session = JudgingSession::default();
        assert_eq!(
            session.begin_submit().map(|_| ()),
            Err(SessionError::NothingStaged)
        );

        session.stage(vec![image("a.jpg")]).unwrap();
        let (token, _) = session.begin_submit().unwrap();
        session.complete(token, vec![judgement(1)]);
        assert_eq!(
            session.begin_submit().map(|_| ()),
            Err(SessionError::NothingStaged)
        );
    }

    #[test]
    fn one_submission_in_flight_at_a_time() {
        let mut session = JudgingSession::default();
        session.stage(vec![image("a.jpg")]).unwrap();
        session.begin_submit().unwrap();

        assert_eq!(
            session.begin_submit().map(|_| ()),
            Err(SessionError::AlreadySubmitting)
        );
        assert_eq!(
            session.stage(vec![image("b.jpg")]),
            Err(SessionError::StageWhileSubmitting)
        );
    }
}
