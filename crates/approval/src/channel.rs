//! Channel-backed gateway
//!
//! `ChannelGateway::confirm` hands the request to a [`ReviewQueue`] and
//! suspends until whoever drains the queue (a console, a web handler, a
//! chat bot) answers. Other transactions keep moving in the meantime.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::error::GatewayError;
use crate::gateway::{ConfirmationGateway, ConfirmationRequest};
use crate::verdict::RawResponse;

/// A request waiting for its answer
#[derive(Debug)]
pub struct PendingConfirmation {
    pub request: ConfirmationRequest,
    responder: oneshot::Sender<RawResponse>,
}

impl PendingConfirmation {
    /// Answer the request. Fails if the waiting side has gone away
    /// (cancelled run).
    pub fn respond(self, response: RawResponse) -> Result<(), GatewayError> {
        self.responder.send(response).map_err(|_| GatewayError::Closed)
    }
}

/// Gateway half: sends requests out
#[derive(Debug, Clone)]
pub struct ChannelGateway {
    sender: mpsc::Sender<PendingConfirmation>,
}

/// Queue half: receives requests for a reviewer to answer
#[derive(Debug)]
pub struct ReviewQueue {
    receiver: mpsc::Receiver<PendingConfirmation>,
}

impl ChannelGateway {
    /// Create a connected gateway/queue pair. `capacity` bounds the number
    /// of requests waiting to be picked up.
    pub fn new(capacity: usize) -> (Self, ReviewQueue) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, ReviewQueue { receiver })
    }
}

impl ReviewQueue {
    /// Next request, or `None` once every gateway handle is dropped
    pub async fn next(&mut self) -> Option<PendingConfirmation> {
        self.receiver.recv().await
    }
}

#[async_trait]
impl ConfirmationGateway for ChannelGateway {
    fn name(&self) -> &str {
        "ChannelGateway"
    }

    async fn confirm(&self, request: &ConfirmationRequest) -> Result<RawResponse, GatewayError> {
        let (tx, rx) = oneshot::channel();
        let pending = PendingConfirmation {
            request: request.clone(),
            responder: tx,
        };

        self.sender
            .send(pending)
            .await
            .map_err(|_| GatewayError::Closed)?;

        rx.await.map_err(|_| GatewayError::Closed)
    }
}
