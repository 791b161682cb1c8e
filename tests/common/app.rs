//! Test pipeline factory with a recording transform and a scripted prompter.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dither_live::error::TransformError;
use dither_live::models::{PendingDecision, PipelineConfig, UserChoice};
use dither_live::services::{
    KernelTransform, MemoryPreferences, PipelineSession, PixelTransform, Prompter, TransformArgs,
};

/// One call made to the pixel-transform capability.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformCall {
    pub variant: String,
    pub width: u32,
    pub height: u32,
    pub args: TransformArgs,
}

/// Capability that records its calls. In passthrough mode the buffer is left
/// as it is, which makes palette and geometry results exact.
pub struct RecordingTransform {
    passthrough: bool,
    calls: Mutex<Vec<TransformCall>>,
}

impl RecordingTransform {
    pub fn passthrough() -> Self {
        Self {
            passthrough: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn kernels() -> Self {
        Self {
            passthrough: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<TransformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl PixelTransform for RecordingTransform {
    fn transform(
        &self,
        variant: &str,
        data: &mut [u8],
        width: u32,
        height: u32,
        args: &TransformArgs,
    ) -> Result<(), TransformError> {
        self.calls.lock().unwrap().push(TransformCall {
            variant: variant.to_string(),
            width,
            height,
            args: *args,
        });
        if self.passthrough {
            Ok(())
        } else {
            KernelTransform.transform(variant, data, width, height, args)
        }
    }
}

/// Prompter answering from a script. With the script exhausted it never
/// answers, like a user who walked away.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<UserChoice>>,
    asked: Mutex<Vec<PendingDecision>>,
    notifications: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = UserChoice>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn push(&self, choice: UserChoice) {
        self.answers.lock().unwrap().push_back(choice);
    }

    pub fn asked(&self) -> Vec<PendingDecision> {
        self.asked.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&self, decision: &PendingDecision) -> UserChoice {
        self.asked.lock().unwrap().push(decision.clone());
        let next = self.answers.lock().unwrap().pop_front();
        match next {
            Some(choice) => choice,
            None => std::future::pending().await,
        }
    }

    async fn notify(&self, message: &str) {
        self.notifications.lock().unwrap().push(message.to_string());
    }
}

/// A session plus handles on its collaborators.
pub struct TestPipeline {
    pub session: PipelineSession,
    pub transform: Arc<RecordingTransform>,
    pub prompter: Arc<ScriptedPrompter>,
    pub prefs: Arc<MemoryPreferences>,
}

impl TestPipeline {
    /// Passthrough transform, default configuration, no scripted answers.
    pub fn new() -> Self {
        Self::build(
            PipelineConfig::default(),
            RecordingTransform::passthrough(),
            ScriptedPrompter::default(),
        )
    }

    /// Real dithering kernels behind the recorder.
    pub fn with_kernels() -> Self {
        Self::build(
            PipelineConfig::default(),
            RecordingTransform::kernels(),
            ScriptedPrompter::default(),
        )
    }

    pub fn with_answers(answers: impl IntoIterator<Item = UserChoice>) -> Self {
        Self::build(
            PipelineConfig::default(),
            RecordingTransform::passthrough(),
            ScriptedPrompter::new(answers),
        )
    }

    pub fn build(
        config: PipelineConfig,
        transform: RecordingTransform,
        prompter: ScriptedPrompter,
    ) -> Self {
        let transform = Arc::new(transform);
        let prompter = Arc::new(prompter);
        let prefs = Arc::new(MemoryPreferences::new());
        let session = PipelineSession::new(config, prompter.clone(), prefs.clone())
            .with_transform(transform.clone());
        Self {
            session,
            transform,
            prompter,
            prefs,
        }
    }
}
