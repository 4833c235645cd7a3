use chrono::{DateTime, Utc};
use log::info;

use crate::{
    db::PollStore,
    error::{add_error, FormErrors, PollError},
    models::{
        poll_api_model::{
            NewQuestionRequest, PollOptionResult, PollResults, QuestionDetail, QuestionList,
            QuestionSummary,
        },
        poll_model::{AuthUser, Choice, Question},
    },
};

pub const MAX_TEXT_LENGTH: usize = 200;
pub const NO_POLLS_AVAILABLE: &str = "No polls are available.";

pub async fn published_questions(
    store: &dyn PollStore,
    now: DateTime<Utc>,
) -> Result<QuestionList, PollError> {
    let questions = store.published_questions(now).await?;
    let notice = questions
        .is_empty()
        .then(|| NO_POLLS_AVAILABLE.to_string());
    Ok(QuestionList {
        latest_question_list: questions
            .into_iter()
            .map(|q| QuestionSummary::from_question(q, now))
            .collect(),
        notice,
    })
}

/// Ballot for a published, votable question, with the caller's previous
/// choice when there is one.
pub async fn question_detail(
    store: &dyn PollStore,
    identity: Option<&AuthUser>,
    question_id: &str,
    now: DateTime<Utc>,
) -> Result<QuestionDetail, PollError> {
    let question = match store.find_question(question_id).await? {
        Some(question) if question.is_published(now) => question,
        _ => return Err(PollError::NotFound(question_id.to_string())),
    };
    if !question.can_vote(now) {
        return Err(PollError::NotVotable(question_id.to_string()));
    }

    let prev_vote = match identity {
        Some(user) => store
            .find_vote(&user.id, &question.id)
            .await?
            .map(|vote| vote.choice_id),
        None => None,
    };
    let choices = store.choices_for(&question.id).await?;
    Ok(QuestionDetail {
        question,
        choices,
        prev_vote,
    })
}

/// Results are shown under the same predicate that gates voting.
pub async fn question_results(
    store: &dyn PollStore,
    question_id: &str,
    now: DateTime<Utc>,
) -> Result<PollResults, PollError> {
    let question = store
        .find_question(question_id)
        .await?
        .ok_or_else(|| PollError::NotFound(question_id.to_string()))?;
    if !question.can_vote(now) {
        return Err(PollError::NotOpened(question_id.to_string()));
    }

    let choices = store.choices_for(&question.id).await?;
    let tally = store.tally(&question.id).await?;
    let total_votes: i64 = choices
        .iter()
        .map(|c| tally.get(&c.id).copied().unwrap_or(0))
        .sum();
    let options = choices
        .into_iter()
        .map(|choice| {
            let votes_count = tally.get(&choice.id).copied().unwrap_or(0);
            let votes_percentage = if total_votes == 0 {
                0.0
            } else {
                votes_count as f64 * 100.0 / total_votes as f64
            };
            PollOptionResult {
                id: choice.id,
                text: choice.text,
                votes_count,
                votes_percentage,
            }
        })
        .collect();

    Ok(PollResults {
        id: question.id,
        title: question.text,
        total_votes,
        options,
    })
}

pub fn require_staff(identity: Option<&AuthUser>) -> Result<&AuthUser, PollError> {
    match identity {
        None => Err(PollError::Unauthorized),
        Some(user) if !user.is_staff => Err(PollError::Forbidden),
        Some(user) => Ok(user),
    }
}

pub async fn all_questions(
    store: &dyn PollStore,
    identity: Option<&AuthUser>,
    now: DateTime<Utc>,
) -> Result<Vec<QuestionSummary>, PollError> {
    require_staff(identity)?;
    let questions = store.all_questions().await?;
    Ok(questions
        .into_iter()
        .map(|q| QuestionSummary::from_question(q, now))
        .collect())
}

fn check_text(errors: &mut FormErrors, field: &str, text: &str) {
    if text.trim().is_empty() {
        add_error(errors, field, "This field is required.");
    } else if text.chars().count() > MAX_TEXT_LENGTH {
        add_error(
            errors,
            field,
            &format!("Ensure this value has at most {} characters.", MAX_TEXT_LENGTH),
        );
    }
}

pub async fn create_question(
    store: &dyn PollStore,
    identity: Option<&AuthUser>,
    request: NewQuestionRequest,
    now: DateTime<Utc>,
) -> Result<(Question, Vec<Choice>), PollError> {
    let admin = require_staff(identity)?;

    let mut errors = FormErrors::new();
    check_text(&mut errors, "text", &request.text);
    for (i, choice) in request.choices.iter().enumerate() {
        check_text(&mut errors, &format!("choices.{}", i), &choice.text);
    }
    let publication_time = request.publication_time.unwrap_or(now);
    if let Some(end_time) = request.end_time {
        if end_time < publication_time {
            add_error(
                &mut errors,
                "end_time",
                "End time must not be before the publication time.",
            );
        }
    }
    if !errors.is_empty() {
        return Err(PollError::Validation(errors));
    }

    let question = Question::new(request.text.trim(), publication_time, request.end_time);
    let choices: Vec<Choice> = request
        .choices
        .iter()
        .map(|c| Choice::new(&question.id, c.text.trim()))
        .collect();
    store
        .insert_question(question.clone(), choices.clone())
        .await?;
    info!("{} created question {}", admin.username, question.id);
    Ok((question, choices))
}

pub async fn delete_question(
    store: &dyn PollStore,
    identity: Option<&AuthUser>,
    question_id: &str,
) -> Result<(), PollError> {
    let admin = require_staff(identity)?;
    if !store.delete_question(question_id).await? {
        return Err(PollError::NotFound(question_id.to_string()));
    }
    info!("{} deleted question {}", admin.username, question_id);
    Ok(())
}
