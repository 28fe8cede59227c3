use anyhow::{bail, Result};
use edu_core::conversation::Message;
use edu_core::AssistantKind;

use super::App;
use crate::HistoryAction;

pub async fn run(app: &App, kind: AssistantKind, action: HistoryAction) -> Result<()> {
    let controller = app.session.chat_controller(kind).await;

    controller.with_history(|history| match action {
        HistoryAction::List => {
            for conversation in history.conversations() {
                let marker = if conversation.id == history.active_id() { '*' } else { ' ' };
                println!(
                    "{} {}  {} ({} messages)\n    {}",
                    marker, conversation.id, conversation.title, conversation.message_count, conversation.preview
                );
            }
            Ok(())
        }
        HistoryAction::Show => {
            print_messages(history.active_messages());
            Ok(())
        }
        HistoryAction::New => {
            println!("{}", history.create());
            Ok(())
        }
        HistoryAction::Select { id } => match history.select(&id) {
            Some(messages) => {
                print_messages(&messages);
                Ok(())
            }
            None => bail!("Unknown conversation: {}", id),
        },
        HistoryAction::Delete { id } => {
            if history.conversation(&id).is_none() {
                bail!("Unknown conversation: {}", id);
            }
            if let Some(messages) = history.remove(&id) {
                println!("Active conversation is now {}", history.active_id());
                print_messages(&messages);
            }
            Ok(())
        }
    })
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        let status = if message.failed { " [failed]" } else { "" };
        let image = if message.image_attachment.is_some() { " [image]" } else { "" };
        println!("{}{}{} ({})", message.role.as_str(), status, image, message.id);
        if !message.content.is_empty() {
            println!("  {}", message.content.replace('\n', "\n  "));
        }
    }
}
