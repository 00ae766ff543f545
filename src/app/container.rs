use std::sync::Arc;

use crate::adapters::{FFmpegAdapter, FFprobeAdapter, SlicerConfig};
use crate::app::{retry_controller::RetryController, split_interactor::SplitInteractor};
use crate::ports::{EncoderPort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn split_interactor(&self) -> Arc<SplitInteractor>;
    fn retry_controller(&self) -> Arc<RetryController>;
    fn probe(&self) -> Arc<dyn ProbePort>;
}

pub struct DefaultAppContainer {
    split_interactor: Arc<SplitInteractor>,
    retry_controller: Arc<RetryController>,
    probe: Arc<dyn ProbePort>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg/ffprobe adapters configured in `config`
    pub fn new(config: &SlicerConfig) -> Self {
        let encoder = Arc::new(FFmpegAdapter::new(&config.encoder.ffmpeg_path));
        let probe = Arc::new(FFprobeAdapter::new(&config.encoder.ffprobe_path));
        Self::with_ports(config, encoder, probe)
    }

    /// Wire arbitrary ports, for alternative encoders and tests
    pub fn with_ports(
        config: &SlicerConfig,
        encoder: Arc<dyn EncoderPort>,
        probe: Arc<dyn ProbePort>,
    ) -> Self {
        let split_interactor = Arc::new(SplitInteractor::new(
            encoder,
            config.job_settings(),
            config.orchestrator_settings(),
        ));
        let retry_controller = Arc::new(RetryController::new(Arc::clone(&split_interactor)));

        Self {
            split_interactor,
            retry_controller,
            probe,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn split_interactor(&self) -> Arc<SplitInteractor> {
        Arc::clone(&self.split_interactor)
    }

    fn retry_controller(&self) -> Arc<RetryController> {
        Arc::clone(&self.retry_controller)
    }

    fn probe(&self) -> Arc<dyn ProbePort> {
        Arc::clone(&self.probe)
    }
}
