use std::sync::Arc;

use crate::adapters::{AppConfig, FFmpegAdapter};
use crate::app::encode_interactor::EncodeInteractor;
use crate::error::SizeFitResult;
use crate::ports::EncoderPort;

pub trait AppContainer: Send + Sync {
    fn encode_interactor(&self) -> Arc<EncodeInteractor>;
}

pub struct DefaultAppContainer {
    encode_interactor: Arc<EncodeInteractor>,
}

impl DefaultAppContainer {
    /// Locate the encoder from `config` and wire it into the interactors
    pub fn new(config: &AppConfig) -> SizeFitResult<Self> {
        let encoder = FFmpegAdapter::locate(config.encoder.as_deref())?;
        Ok(Self::with_encoder(
            Arc::new(encoder) as Arc<dyn EncoderPort>,
            config,
        ))
    }

    /// Wire an already constructed encoder port
    pub fn with_encoder(encoder: Arc<dyn EncoderPort>, config: &AppConfig) -> Self {
        let encode_interactor = Arc::new(EncodeInteractor::new(encoder, config.container.clone()));
        Self { encode_interactor }
    }
}

impl AppContainer for DefaultAppContainer {
    fn encode_interactor(&self) -> Arc<EncodeInteractor> {
        Arc::clone(&self.encode_interactor)
    }
}
