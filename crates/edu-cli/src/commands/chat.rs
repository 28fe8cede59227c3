use std::path::Path;

use anyhow::{bail, Result};
use edu_application::{ChatController, SendOutcome};
use edu_core::AssistantKind;

use super::App;
use crate::attachment::image_data_url;

pub async fn send(app: &App, kind: AssistantKind, message: &str, image: Option<&Path>) -> Result<()> {
    let image = image.map(image_data_url).transpose()?;
    let controller = app.session.chat_controller(kind).await;

    let outcome = controller.send(message, image, None).await;
    report(&controller, outcome)
}

pub async fn retry(app: &App, kind: AssistantKind, message_id: &str) -> Result<()> {
    let controller = app.session.chat_controller(kind).await;

    let outcome = controller.retry(message_id).await;
    if outcome == SendOutcome::Ignored {
        bail!("No failed message {} in the active {} conversation", message_id, kind.label());
    }
    report(&controller, outcome)
}

fn report(controller: &ChatController, outcome: SendOutcome) -> Result<()> {
    match outcome {
        SendOutcome::Ignored => bail!("Nothing to send"),
        SendOutcome::Delivered { reply_id, .. } => {
            let messages = controller.messages();
            if let Some(reply) = messages.iter().find(|m| m.id == reply_id) {
                println!("{}", reply.content);
            }
            Ok(())
        }
        SendOutcome::Failed { message_id, error } => {
            bail!(
                "{}\nRetry with: edu retry {} {}",
                error,
                controller.kind(),
                message_id
            )
        }
    }
}
