// Interactive terminal chat: the message list is printed as it grows and
// every stdin line is submitted as a new turn.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::info;

use crate::alert::Alert;
use crate::controller::{ChatController, InFlightPolicy};
use crate::conversation::{ConversationState, Message, Role};

pub const QUIT_COMMAND: &str = "/quit";

pub fn format_message(message: &Message) -> String {
    match message.role {
        Role::User => format!("You: {}", message.text),
        Role::Assistant => format!("Tutor: {}", message.text),
    }
}

/// Writes every message past `printed` and advances it.
pub async fn render_new<W>(out: &mut W, state: &ConversationState, printed: &mut usize) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    for message in state.messages.iter().skip(*printed) {
        out.write_all(format_message(message).as_bytes()).await?;
        out.write_all(b"\n\n").await?;
        *printed += 1;
    }
    out.flush().await?;
    Ok(())
}

/// Runs the chat until `/quit` or end of input.
///
/// Every line goes through the controller's input buffer. Without a
/// single-slot policy, sends are spawned and not awaited before the next
/// line is read, so replies may arrive out of submission order and a line
/// typed before the introduction resolves is shown above it. With a
/// single-slot policy the introduction and each reply are awaited before
/// the next line is read. On end of input the pending replies are awaited;
/// `/quit` abandons them.
pub async fn run_chat(
    controller: Arc<ChatController>,
    mut alerts: mpsc::UnboundedReceiver<Alert>,
) -> Result<()> {
    info!("Starting interactive chat session...");
    let store = controller.store().clone();

    let mut updates = store.subscribe();
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let renderer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        let mut printed = 0;
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = &mut shutdown_rx => break,
            }
            let state = updates.borrow_and_update().clone();
            render_new(&mut stdout, &state, &mut printed).await?;
        }
        // Catch anything appended after the last wake-up.
        let state = updates.borrow().clone();
        render_new(&mut stdout, &state, &mut printed).await
    });

    let alert_printer = tokio::spawn(async move {
        while let Some(alert) = alerts.recv().await {
            eprintln!("! {}", alert);
        }
    });

    let single_slot = controller.policy() == InFlightPolicy::SingleSlot;
    let mut requests = JoinSet::new();
    if single_slot {
        // One request at a time: the introduction has to land before the
        // first line can go out.
        let _ = controller.bootstrap().await;
    } else {
        let controller = controller.clone();
        requests.spawn(async move {
            // Failures are already alerted and logged by the controller.
            let _ = controller.bootstrap().await;
        });
        // Input is only taken once the introduction is on its way.
        store
            .subscribe()
            .wait_for(|state| state.initialized)
            .await
            .context("Conversation store closed before bootstrap")?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        if line.trim() == QUIT_COMMAND {
            quit = true;
            break;
        }
        controller.set_input(line);
        if single_slot {
            let _ = controller.submit().await;
        } else {
            let request = controller.submit_detached();
            requests.spawn(async move {
                let _ = request.await;
            });
        }
    }

    if quit {
        info!("Quit requested, abandoning {} pending request(s)", requests.len());
        requests.abort_all();
    }
    while requests.join_next().await.is_some() {}

    let _ = shutdown_tx.send(());
    renderer.await.context("Renderer task failed")??;
    // Dropping the last controller closes the alert channel.
    drop(controller);
    alert_printer.await.context("Alert printer failed")?;

    info!("Chat session finished.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_prefixes_role() {
        assert_eq!(format_message(&Message::user("Hallo")), "You: Hallo");
        assert_eq!(format_message(&Message::assistant("Hallo du!")), "Tutor: Hallo du!");
    }

    #[tokio::test]
    async fn test_render_new_skips_printed_messages() {
        let state = ConversationState {
            messages: vec![
                Message::assistant("Hi, I am your German teacher."),
                Message::user("Wie geht es dir?"),
                Message::assistant("Mir geht es gut!"),
            ],
            initialized: true,
        };

        let mut out = Vec::new();
        let mut printed = 1;
        render_new(&mut out, &state, &mut printed).await.unwrap();

        assert_eq!(printed, 3);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "You: Wie geht es dir?\n\nTutor: Mir geht es gut!\n\n");
    }
}
