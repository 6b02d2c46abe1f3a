use crate::app::ports::SleeperPort;
use async_trait::async_trait;
use std::time::Duration;

pub struct TokioSleeper;

#[async_trait]
impl SleeperPort for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
