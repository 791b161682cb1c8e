pub mod canvas_surface;
pub mod frame_scheduler;
pub mod negotiator;
pub mod palette_mapper;
pub mod parameter_store;
pub mod preferences;
pub mod session;
pub mod transform_invoker;

pub use canvas_surface::CanvasSurface;
pub use frame_scheduler::{FrameClock, FrameScheduler, ImmediateClock, IntervalClock};
pub use negotiator::{ChannelPrompter, DownscaleNegotiator, PromptEvent, PromptRequest, Prompter};
pub use palette_mapper::{PaletteMapper, Rgb};
pub use parameter_store::ParameterStore;
pub use preferences::{JsonFilePreferences, MemoryPreferences, PreferenceStore, Theme};
pub use session::{ChangeKind, IncomingImage, LoadOutcome, LoadTicket, PipelineSession};
pub use transform_invoker::{KernelTransform, PixelTransform, TransformArgs, TransformInvoker};
