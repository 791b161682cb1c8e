use std::fmt;

/// What caused a downscale negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A freshly loaded image exceeds the optimal pixel count
    ImageLoad,
    /// Requested output dimensions exceed the output threshold
    OutputSize,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::ImageLoad => f.write_str("image-load"),
            Trigger::OutputSize => f.write_str("output-size"),
        }
    }
}

/// A question put to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDecision {
    pub trigger: Trigger,
    pub requested: (u32, u32),
    pub proposed: (u32, u32),
    pub threshold: u64,
    pub message: String,
}

/// Outcome of a negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Proceed,
    Downscale { width: u32, height: u32 },
}

impl Resolution {
    /// Dimensions to use for a request of `width` x `height`.
    pub fn apply(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            Resolution::Proceed => (width, height),
            Resolution::Downscale { width, height } => (width, height),
        }
    }

    pub fn is_downscale(&self) -> bool {
        matches!(self, Resolution::Downscale { .. })
    }
}

/// The user's answer to a [`PendingDecision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserChoice {
    pub downscale: bool,
    /// Persist "don't ask again"
    pub remember: bool,
}

impl UserChoice {
    pub fn downscale() -> Self {
        Self {
            downscale: true,
            remember: false,
        }
    }

    pub fn proceed() -> Self {
        Self::default()
    }

    pub fn remembered(mut self) -> Self {
        self.remember = true;
        self
    }
}

/// Where a negotiator currently is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NegotiationState {
    #[default]
    Idle,
    Prompting(PendingDecision),
    Resolved(Resolution),
}
