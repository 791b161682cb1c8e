use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::models::{NegotiationState, PendingDecision, Resolution, Trigger, UserChoice};
use crate::services::preferences::{downscale_suppressed, PreferenceStore, SUPPRESS_DOWNSCALE_KEY};

/// Surface that asks the user about a downscale and shows notifications.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Wait for the user's answer. Never returning is allowed: the
    /// negotiation then stays suspended.
    async fn ask(&self, decision: &PendingDecision) -> UserChoice;

    async fn notify(&self, message: &str);
}

/// A question delivered through a [`ChannelPrompter`].
#[derive(Debug)]
pub struct PromptRequest {
    pub decision: PendingDecision,
    respond: oneshot::Sender<UserChoice>,
}

impl PromptRequest {
    pub fn answer(self, choice: UserChoice) {
        // the asker may already be gone; nothing left to resolve then
        let _ = self.respond.send(choice);
    }
}

#[derive(Debug)]
pub enum PromptEvent {
    Decide(PromptRequest),
    Notify(String),
}

/// Prompter that forwards to whoever holds the receiving end of a channel.
#[derive(Clone)]
pub struct ChannelPrompter {
    events: mpsc::UnboundedSender<PromptEvent>,
}

impl ChannelPrompter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PromptEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }
}

#[async_trait]
impl Prompter for ChannelPrompter {
    async fn ask(&self, decision: &PendingDecision) -> UserChoice {
        let (respond, answer) = oneshot::channel();
        let request = PromptRequest {
            decision: decision.clone(),
            respond,
        };
        if self.events.send(PromptEvent::Decide(request)).is_ok() {
            if let Ok(choice) = answer.await {
                return choice;
            }
        }
        tracing::warn!(trigger = %decision.trigger, "Prompt dropped without an answer");
        std::future::pending().await
    }

    async fn notify(&self, message: &str) {
        let _ = self.events.send(PromptEvent::Notify(message.to_string()));
    }
}

/// Gates large allocations behind a user decision.
#[derive(Clone)]
pub struct DownscaleNegotiator {
    prompter: Arc<dyn Prompter>,
    prefs: Arc<dyn PreferenceStore>,
    state: Arc<RwLock<NegotiationState>>,
}

impl DownscaleNegotiator {
    pub fn new(prompter: Arc<dyn Prompter>, prefs: Arc<dyn PreferenceStore>) -> Self {
        Self {
            prompter,
            prefs,
            state: Arc::new(RwLock::new(NegotiationState::Idle)),
        }
    }

    pub async fn state(&self) -> NegotiationState {
        self.state.read().await.clone()
    }

    pub fn preferences(&self) -> &Arc<dyn PreferenceStore> {
        &self.prefs
    }

    /// Decide what to do with a `width` x `height` request.
    ///
    /// Requests at or below `threshold` pixels proceed without any state
    /// change. With the suppress preference set, larger requests proceed
    /// silently. Otherwise the prompter is asked and this future does not
    /// complete until it answers.
    pub async fn negotiate(
        &self,
        trigger: Trigger,
        width: u32,
        height: u32,
        threshold: u64,
    ) -> Resolution {
        let pixels = width as u64 * height as u64;
        if pixels <= threshold {
            return Resolution::Proceed;
        }

        let suppressed = downscale_suppressed(self.prefs.as_ref())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(%e, "Failed to read downscale preference");
                false
            });
        if suppressed {
            tracing::debug!(%trigger, width, height, "Downscale prompt suppressed");
            *self.state.write().await = NegotiationState::Resolved(Resolution::Proceed);
            return Resolution::Proceed;
        }

        let proposed = downscale_dimensions(width, height, threshold);
        let decision = PendingDecision {
            trigger,
            requested: (width, height),
            proposed,
            threshold,
            message: prompt_message(trigger, pixels),
        };
        *self.state.write().await = NegotiationState::Prompting(decision.clone());
        tracing::info!(%trigger, width, height, pixels, threshold, "Asking about downscale");

        let choice = self.prompter.ask(&decision).await;

        if choice.remember {
            if let Err(e) = self.prefs.set(SUPPRESS_DOWNSCALE_KEY, "true").await {
                tracing::warn!(%e, "Failed to save downscale preference");
            }
        }

        let resolution = if choice.downscale {
            Resolution::Downscale {
                width: proposed.0,
                height: proposed.1,
            }
        } else {
            Resolution::Proceed
        };
        self.prompter
            .notify(&outcome_message(trigger, resolution))
            .await;
        tracing::info!(%trigger, ?resolution, remember = choice.remember, "Downscale resolved");
        *self.state.write().await = NegotiationState::Resolved(resolution);
        resolution
    }
}

/// Largest aspect-preserving size with at most `threshold` pixels, scaling
/// both sides by `sqrt(threshold / (width * height))` and flooring.
pub fn downscale_dimensions(width: u32, height: u32, threshold: u64) -> (u32, u32) {
    let pixels = width as u64 * height as u64;
    if pixels <= threshold || pixels == 0 {
        return (width, height);
    }
    let t = (threshold as f64).sqrt();
    let p = (pixels as f64).sqrt();
    let mut w = ((width as f64 * t) / p).floor().max(1.0) as u32;
    let mut h = ((height as f64 * t) / p).floor().max(1.0) as u32;
    // float error can leave one pixel row too many
    while w as u64 * h as u64 > threshold && (w > 1 || h > 1) {
        if w >= h {
            w -= 1;
        } else {
            h -= 1;
        }
    }
    (w, h)
}

fn prompt_message(trigger: Trigger, pixels: u64) -> String {
    match trigger {
        Trigger::ImageLoad => format!(
            "This image has {} pixels which exceeds our optimal threshold. Downscale?",
            group_thousands(pixels)
        ),
        Trigger::OutputSize => "The output dimensions are large and might cause performance \
                                issues. Would you like to automatically downscale the image?"
            .to_string(),
    }
}

fn outcome_message(trigger: Trigger, resolution: Resolution) -> String {
    match (trigger, resolution) {
        (Trigger::ImageLoad, Resolution::Downscale { width, height }) => {
            format!("Image has been downscaled to {width}×{height}")
        }
        (Trigger::ImageLoad, Resolution::Proceed) => {
            "Proceeding with original dimensions; performance may be affected.".to_string()
        }
        (Trigger::OutputSize, Resolution::Downscale { width, height }) => {
            format!("Output dimensions have been downscaled to {width}×{height}")
        }
        (Trigger::OutputSize, Resolution::Proceed) => {
            "Proceeding with large dimensions; performance may be affected.".to_string()
        }
    }
}

/// `4080400` -> `"4,080,400"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
