use slack_morphism::SlackHistoryMessage;
use slack_morphism::events::SlackMessageEventType;

/// Retains only messages that carry conversation content: authored by a user,
/// not a join/leave/edit/delete event, and with non-blank text.
#[must_use]
pub fn filter_content_messages(messages: Vec<SlackHistoryMessage>) -> Vec<SlackHistoryMessage> {
    messages
        .into_iter()
        .filter(|msg| {
            let is_user_message = msg.sender.user.is_some();
            let is_noise_event = match &msg.subtype {
                Some(subtype) => matches!(
                    subtype,
                    SlackMessageEventType::ChannelJoin
                        | SlackMessageEventType::ChannelLeave
                        | SlackMessageEventType::MessageChanged
                        | SlackMessageEventType::MessageDeleted
                ),
                None => false,
            };
            let has_text = msg
                .content
                .text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty());

            is_user_message && !is_noise_event && has_text
        })
        .collect()
}
