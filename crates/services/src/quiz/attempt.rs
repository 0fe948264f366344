use chrono::{DateTime, Duration, Utc};
use rand::rng;
use rand::seq::SliceRandom;
use std::fmt;

use mehfil_core::model::{Question, QuizKind};

use super::progress::QuizProgress;
use crate::error::QuizError;

/// Fixed per-question countdown, in seconds.
pub const QUESTION_TIME_LIMIT_SECS: i64 = 45;

/// The per-question countdown as a duration.
#[must_use]
pub fn question_time_limit() -> Duration {
    Duration::seconds(QUESTION_TIME_LIMIT_SECS)
}

/// The current question as presented.
///
/// Display options were shuffled once when the question became current and
/// stay stable until the index advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentQuestion {
    pub index: usize,
    pub total: usize,
    pub text: String,
    pub options: Vec<String>,
    pub deadline: DateTime<Utc>,
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One in-memory quiz attempt.
///
/// The question sequence is shuffled once at construction; each question
/// independently shuffles its display options when it becomes current.
/// Selecting an option records (or overwrites) the answer for the current
/// index; advancing past the last question finishes the attempt, and a
/// finished attempt is absorbing. Loading the bank and its failure modes
/// live with `QuizService`, which constructs the attempt.
pub struct QuizAttempt {
    kind: QuizKind,
    questions: Vec<Question>,
    answers: Vec<Option<String>>,
    current: usize,
    options: Vec<String>,
    deadline: DateTime<Utc>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    result_id: Option<i64>,
}

impl QuizAttempt {
    /// Build an attempt over the given bank, shuffling the question order.
    ///
    /// `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if the bank is empty.
    pub(crate) fn new(
        kind: QuizKind,
        mut questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        questions.shuffle(&mut rng());

        let answers = vec![None; questions.len()];
        let mut attempt = Self {
            kind,
            questions,
            answers,
            current: 0,
            options: Vec::new(),
            deadline: started_at,
            started_at,
            finished_at: None,
            result_id: None,
        };
        attempt.arm_current(started_at);
        Ok(attempt)
    }

    // Re-shuffle display options and re-arm the countdown for the question
    // at `current`. The single deadline is the re-armed timer: an expiry
    // observed after advancing cannot fire a second time.
    fn arm_current(&mut self, now: DateTime<Utc>) {
        if let Some(question) = self.questions.get(self.current) {
            let mut options = question.options();
            options.shuffle(&mut rng());
            self.options = options;
            self.deadline = now + question_time_limit();
        }
    }

    #[must_use]
    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn result_id(&self) -> Option<i64> {
        self.result_id
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Total number of questions in this attempt.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions with a recorded answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Number of questions not yet passed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.questions.len().saturating_sub(self.current)
    }

    /// Returns a summary of the current attempt progress.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            total: self.total_questions(),
            answered: self.answered_count(),
            remaining: self.remaining(),
            is_finished: self.is_finished(),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<CurrentQuestion> {
        if self.is_finished() {
            return None;
        }
        self.questions.get(self.current).map(|question| CurrentQuestion {
            index: self.current,
            total: self.questions.len(),
            text: question.text().to_owned(),
            options: self.options.clone(),
            deadline: self.deadline,
        })
    }

    /// Countdown left for the current question, clamped at zero.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.deadline - now).max(Duration::zero())
    }

    /// Record (or overwrite) the answer for the current question.
    ///
    /// The answer takes effect immediately; there is no separate confirm
    /// step, so a later timeout submits exactly what was selected.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Finished` once the attempt is over.
    pub fn select_answer(&mut self, answer: impl Into<String>) -> Result<(), QuizError> {
        if self.is_finished() {
            return Err(QuizError::Finished);
        }
        self.answers[self.current] = Some(answer.into());
        Ok(())
    }

    /// Move past the current question, finishing the attempt after the last
    /// one.
    ///
    /// `now` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Finished` once the attempt is over.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<(), QuizError> {
        if self.is_finished() {
            return Err(QuizError::Finished);
        }
        self.current += 1;
        if self.current >= self.questions.len() {
            self.finished_at = Some(now);
        } else {
            self.arm_current(now);
        }
        Ok(())
    }

    /// Timer poll: when the current deadline has passed, advance as if the
    /// user submitted with whatever answer (possibly none) is recorded.
    ///
    /// Returns whether an auto-advance happened. Advancing re-arms the
    /// deadline, so one expiry advances exactly once.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_finished() || now < self.deadline {
            return false;
        }
        let _ = self.advance(now);
        true
    }

    /// Count of questions whose recorded answer equals the correct answer.
    #[must_use]
    pub fn score(&self) -> u32 {
        let count = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| {
                answer
                    .as_deref()
                    .is_some_and(|answer| question.is_correct(answer))
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub(crate) fn set_result_id(&mut self, id: i64) {
        self.result_id = Some(id);
    }
}

impl fmt::Debug for QuizAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizAttempt")
            .field("kind", &self.kind)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answered_count())
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .field("result_id", &self.result_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use mehfil_core::time::fixed_now;
    use std::collections::HashSet;

    fn build_question(id: usize) -> Question {
        Question::new(
            format!("Q{id}"),
            format!("right-{id}"),
            vec![format!("wrong-{id}-a"), format!("wrong-{id}-b")],
        )
        .unwrap()
    }

    fn build_bank(len: usize) -> Vec<Question> {
        (0..len).map(build_question).collect()
    }

    #[test]
    fn empty_bank_is_rejected() {
        let err = QuizAttempt::new(QuizKind::Demo, Vec::new(), fixed_now()).unwrap_err();
        assert!(matches!(err, QuizError::NoQuestions));
    }

    #[test]
    fn shuffling_keeps_every_question() {
        let attempt = QuizAttempt::new(QuizKind::Main, build_bank(10), fixed_now()).unwrap();
        let texts: HashSet<&str> = attempt.questions.iter().map(Question::text).collect();
        assert_eq!(texts.len(), 10);
        for id in 0..10 {
            assert!(texts.contains(format!("Q{id}").as_str()));
        }
    }

    #[test]
    fn displayed_options_are_a_permutation_of_the_bank_options() {
        let attempt = QuizAttempt::new(QuizKind::Main, build_bank(5), fixed_now()).unwrap();
        let current = attempt.current_question().unwrap();
        let question = &attempt.questions[attempt.current];

        let mut expected = question.options();
        expected.sort();
        let mut displayed = current.options.clone();
        displayed.sort();
        assert_eq!(displayed, expected);

        // Shuffling display order never changes which option is correct.
        let correct: Vec<&String> = current
            .options
            .iter()
            .filter(|option| question.is_correct(option.as_str()))
            .collect();
        assert_eq!(correct.len(), 1);
        assert_eq!(correct[0], question.correct_answer());
    }

    #[test]
    fn selecting_overwrites_the_recorded_answer() {
        let mut attempt = QuizAttempt::new(QuizKind::Main, build_bank(2), fixed_now()).unwrap();
        attempt.select_answer("first pick").unwrap();
        attempt.select_answer("second pick").unwrap();
        assert_eq!(attempt.answered_count(), 1);
        assert_eq!(attempt.answers[0].as_deref(), Some("second pick"));
    }

    #[test]
    fn advancing_past_the_last_question_finishes() {
        let mut attempt = QuizAttempt::new(QuizKind::Main, build_bank(2), fixed_now()).unwrap();
        assert!(!attempt.is_finished());

        attempt.advance(fixed_now()).unwrap();
        assert!(!attempt.is_finished());
        assert_eq!(attempt.progress().remaining, 1);

        let end = fixed_now() + Duration::seconds(30);
        attempt.advance(end).unwrap();
        assert!(attempt.is_finished());
        assert_eq!(attempt.finished_at(), Some(end));
        assert_eq!(attempt.current_question(), None);

        let err = attempt.advance(end).unwrap_err();
        assert!(matches!(err, QuizError::Finished));
        let err = attempt.select_answer("late").unwrap_err();
        assert!(matches!(err, QuizError::Finished));
    }

    #[test]
    fn scoring_counts_exact_matches() {
        let mut attempt = QuizAttempt::new(QuizKind::Main, build_bank(3), fixed_now()).unwrap();

        // Answer the first two correctly, leave the third unanswered.
        for _ in 0..2 {
            let correct = attempt.questions[attempt.current].correct_answer().to_owned();
            attempt.select_answer(correct).unwrap();
            attempt.advance(fixed_now()).unwrap();
        }
        attempt.advance(fixed_now()).unwrap();

        assert!(attempt.is_finished());
        assert_eq!(attempt.score(), 2);
    }

    #[test]
    fn timeout_auto_advances_with_recorded_answer() {
        let start = fixed_now();
        let mut attempt = QuizAttempt::new(QuizKind::Main, build_bank(2), start).unwrap();
        let correct = attempt.questions[0].correct_answer().to_owned();
        attempt.select_answer(correct).unwrap();

        // Before the deadline nothing happens.
        assert!(!attempt.tick(start + Duration::seconds(44)));
        assert_eq!(attempt.progress().remaining, 2);

        let expiry = start + question_time_limit();
        assert!(attempt.tick(expiry));
        assert_eq!(attempt.progress().remaining, 1);

        // The deadline was re-armed; the same instant cannot fire again.
        assert!(!attempt.tick(expiry));

        // Second question times out with no answer recorded.
        assert!(attempt.tick(expiry + question_time_limit()));
        assert!(attempt.is_finished());
        assert_eq!(attempt.score(), 1);
    }

    #[test]
    fn tick_is_inert_after_finish() {
        let start = fixed_now();
        let mut attempt = QuizAttempt::new(QuizKind::Demo, build_bank(1), start).unwrap();
        assert!(attempt.tick(start + question_time_limit()));
        assert!(attempt.is_finished());
        assert!(!attempt.tick(start + Duration::hours(1)));
    }

    #[test]
    fn time_remaining_clamps_at_zero() {
        let start = fixed_now();
        let attempt = QuizAttempt::new(QuizKind::Demo, build_bank(1), start).unwrap();
        assert_eq!(
            attempt.time_remaining(start),
            question_time_limit()
        );
        assert_eq!(
            attempt.time_remaining(start + Duration::hours(1)),
            Duration::zero()
        );
    }
}
