use async_trait::async_trait;

use crate::{
    domain::SessionKey,
    errors::PlaybackError,
    playback::types::{PlayRequest, PlayResult, QueueSnapshot, SkipResult},
};

/// Port for the external playback service.
///
/// Every call is a single attempt. `play` and `skip` mutate the remote session,
/// so implementations must never retry them on their own.
#[async_trait]
pub trait PlaybackService: Send + Sync {
    async fn play(&self, req: &PlayRequest) -> Result<PlayResult, PlaybackError>;

    async fn get_queue(&self, session: &SessionKey) -> Result<QueueSnapshot, PlaybackError>;

    async fn skip(&self, session: &SessionKey) -> Result<SkipResult, PlaybackError>;
}
