use chrono::{DateTime, Utc};
use log::info;

use crate::{
    db::PollStore,
    error::PollError,
    models::poll_model::{AuthUser, Choice, Vote},
};

/// Records `identity`'s choice on a question, replacing any earlier vote on
/// the same question. Returns the choice now held by the vote.
pub async fn cast_vote(
    store: &dyn PollStore,
    identity: Option<&AuthUser>,
    question_id: &str,
    choice_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Choice, PollError> {
    let user = identity.ok_or(PollError::Unauthorized)?;

    let question = store
        .find_question(question_id)
        .await?
        .ok_or_else(|| PollError::NotFound(question_id.to_string()))?;
    if !question.can_vote(now) {
        return Err(PollError::NotVotable(question_id.to_string()));
    }

    let choice_id = match choice_id.map(str::trim) {
        Some(choice_id) if !choice_id.is_empty() => choice_id,
        _ => return Err(PollError::NoChoiceSelected),
    };
    let choice = store
        .find_choice(&question.id, choice_id)
        .await?
        .ok_or(PollError::NoChoiceSelected)?;

    store
        .upsert_vote(Vote {
            user_id: user.id.clone(),
            question_id: question.id.clone(),
            choice_id: choice.id.clone(),
        })
        .await?;
    info!("{} voted {} on {}", user.username, choice.id, question.id);
    Ok(choice)
}
