use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::session::PendingExchange;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

pub struct StreamParams {
    pub exchange: PendingExchange,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

/// Runs generation streams on background tasks and reports what they produce
/// as `(message, stream_id)` pairs. Every stream ends with `End`, including
/// failed ones; a cancelled stream reports nothing further.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                exchange,
                cancel_token,
                stream_id,
            } = params;

            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "stream cancelled");
                }
                _ = drive_stream(exchange, &tx, stream_id) => {}
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

async fn drive_stream(
    exchange: PendingExchange,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) {
    let mut stream = match exchange.open().await {
        Ok(stream) => stream,
        Err(err) => {
            let _ = tx.send((StreamMessage::Error(err.to_string()), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            return;
        }
    };

    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                let _ = tx.send((StreamMessage::Chunk(fragment), stream_id));
            }
            Err(err) => {
                let _ = tx.send((StreamMessage::Error(err.to_string()), stream_id));
                break;
            }
        }
    }

    let _ = tx.send((StreamMessage::End, stream_id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credential::Credential;
    use crate::core::session::{SessionConfig, SessionFactory};
    use crate::utils::test_utils::{ScriptedReply, ScriptedService};
    use std::sync::Arc;

    fn exchange_for(reply: ScriptedReply) -> PendingExchange {
        let service = Arc::new(ScriptedService::new().reply(reply));
        let mut factory = SessionFactory::new(
            SessionConfig {
                model: "gemini-2.5-flash".into(),
                system_instruction: String::new(),
            },
            service,
        );
        factory.create(Credential::new("good-key")).exchange("hello")
    }

    async fn collect(
        rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    ) -> Vec<(StreamMessage, u64)> {
        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            let done = item.0 == StreamMessage::End;
            received.push(item);
            if done {
                break;
            }
        }
        received
    }

    #[tokio::test]
    async fn fragments_are_forwarded_in_order_then_end() {
        let (service, mut rx) = ChatStreamService::new();
        service.spawn_stream(StreamParams {
            exchange: exchange_for(ScriptedReply::fragments(["Hi", " there", "!"])),
            cancel_token: CancellationToken::new(),
            stream_id: 7,
        });

        assert_eq!(
            collect(&mut rx).await,
            vec![
                (StreamMessage::Chunk("Hi".into()), 7),
                (StreamMessage::Chunk(" there".into()), 7),
                (StreamMessage::Chunk("!".into()), 7),
                (StreamMessage::End, 7),
            ]
        );
    }

    #[tokio::test]
    async fn failure_reports_error_before_end() {
        let (service, mut rx) = ChatStreamService::new();
        service.spawn_stream(StreamParams {
            exchange: exchange_for(ScriptedReply::fail_after(["Hi"], "reset by peer")),
            cancel_token: CancellationToken::new(),
            stream_id: 3,
        });

        let received = collect(&mut rx).await;
        assert_eq!(received.len(), 3);
        assert_eq!(received[0], (StreamMessage::Chunk("Hi".into()), 3));
        assert!(matches!(&received[1].0, StreamMessage::Error(msg) if msg.contains("reset by peer")));
        assert_eq!(received[2], (StreamMessage::End, 3));
    }

    #[tokio::test]
    async fn cancelled_stream_sends_nothing() {
        let (service, mut rx) = ChatStreamService::new();
        let token = CancellationToken::new();
        token.cancel();
        service.spawn_stream(StreamParams {
            exchange: exchange_for(ScriptedReply::fragments(["never"])),
            cancel_token: token,
            stream_id: 1,
        });
        drop(service);

        assert!(rx.recv().await.is_none());
    }
}
