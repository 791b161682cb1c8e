use std::future::Future;
use std::sync::Arc;

use crate::error::{PaletteError, PipelineError};
use crate::models::{
    ParamField, ParamValue, PipelineConfig, PipelineParameters, PixelBuffer, Resolution, Trigger,
    Variant, ViewTransform,
};
use crate::rendering::{decode_png, rotate, QuarterTurn};
use crate::services::canvas_surface::CanvasSurface;
use crate::services::frame_scheduler::{FrameClock, FrameScheduler};
use crate::services::negotiator::{DownscaleNegotiator, Prompter};
use crate::services::palette_mapper::PaletteMapper;
use crate::services::parameter_store::ParameterStore;
use crate::services::preferences::PreferenceStore;
use crate::services::transform_invoker::{PixelTransform, TransformInvoker};

/// A decoded image as delivered by the ingestion boundary.
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub pixels: PixelBuffer,
    /// Size of the encoded file
    pub byte_size: u64,
}

/// An accepted load waiting for its downscale decision.
#[derive(Debug)]
pub struct LoadTicket {
    seq: u64,
    image: PixelBuffer,
}

impl LoadTicket {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { width: u32, height: u32 },
    /// A later load started before this one committed
    Superseded,
}

/// How a control reported its change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Still being dragged or typed
    Input,
    /// Released or confirmed
    Commit,
}

/// The image pipeline: parameters in, presented pixels out.
pub struct PipelineSession {
    config: PipelineConfig,
    store: ParameterStore,
    invoker: TransformInvoker,
    palette: PaletteMapper,
    negotiator: DownscaleNegotiator,
    scheduler: FrameScheduler,
    surface: CanvasSurface,
    view: ViewTransform,
    source: Option<PixelBuffer>,
    output_size: Option<(u32, u32)>,
    load_seq: u64,
    live_preview: bool,
    dimension_lock: bool,
}

impl PipelineSession {
    pub fn new(
        config: PipelineConfig,
        prompter: Arc<dyn Prompter>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        let params = PipelineParameters {
            variant: config.default_variant,
            ..Default::default()
        };
        let view = ViewTransform::new(config.initial_pan, config.initial_zoom, config.min_zoom);
        Self {
            store: ParameterStore::new(params),
            invoker: TransformInvoker::default(),
            palette: PaletteMapper::new(),
            negotiator: DownscaleNegotiator::new(prompter, prefs),
            scheduler: FrameScheduler::new(),
            surface: CanvasSurface::new(),
            view,
            source: None,
            output_size: None,
            load_seq: 0,
            live_preview: true,
            dimension_lock: true,
            config,
        }
    }

    /// Use a different pixel-transform capability.
    pub fn with_transform(mut self, capability: Arc<dyn PixelTransform>) -> Self {
        self.invoker = TransformInvoker::new(capability);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn params(&self) -> PipelineParameters {
        self.store.get()
    }

    pub fn palette(&self) -> &PaletteMapper {
        &self.palette
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn negotiator(&self) -> &DownscaleNegotiator {
        &self.negotiator
    }

    /// Size the snapshot was captured at, before rotation.
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.output_size
    }

    pub fn source_dimensions(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(PixelBuffer::dimensions)
    }

    pub fn presented_dimensions(&self) -> Option<(u32, u32)> {
        self.surface.presented_dimensions()
    }

    // --- ingestion ---

    /// Reject files above the configured size limit.
    pub fn check_ingestion(&self, byte_size: u64) -> Result<(), PipelineError> {
        if byte_size > self.config.max_file_size {
            tracing::warn!(byte_size, max = self.config.max_file_size, "Rejected oversized file");
            return Err(PipelineError::FileTooLarge {
                size: byte_size,
                max: self.config.max_file_size,
            });
        }
        Ok(())
    }

    /// Check the size of an encoded PNG and decode it.
    pub fn ingest_png(&self, bytes: &[u8]) -> Result<IncomingImage, PipelineError> {
        let byte_size = bytes.len() as u64;
        self.check_ingestion(byte_size)?;
        Ok(IncomingImage {
            pixels: decode_png(bytes)?,
            byte_size,
        })
    }

    /// Accept an image for loading. Starting a load makes every earlier
    /// uncommitted ticket stale.
    pub fn begin_load(&mut self, incoming: IncomingImage) -> Result<LoadTicket, PipelineError> {
        self.check_ingestion(incoming.byte_size)?;
        self.load_seq += 1;
        let (width, height) = incoming.pixels.dimensions();
        tracing::info!(seq = self.load_seq, width, height, "Loading image");
        Ok(LoadTicket {
            seq: self.load_seq,
            image: incoming.pixels,
        })
    }

    /// Downscale decision for a ticket. The future owns everything it needs,
    /// so the session stays usable (for a newer load) while it is pending.
    pub fn negotiate_load(
        &self,
        ticket: &LoadTicket,
    ) -> impl Future<Output = Resolution> + Send + 'static {
        let negotiator = self.negotiator.clone();
        let (width, height) = ticket.dimensions();
        let threshold = self.config.optimal_pixel_count;
        async move {
            negotiator
                .negotiate(Trigger::ImageLoad, width, height, threshold)
                .await
        }
    }

    /// Capture the snapshot for a resolved ticket, unless a newer load
    /// started in the meantime.
    pub fn commit_load(&mut self, ticket: LoadTicket, resolution: Resolution) -> LoadOutcome {
        if ticket.seq != self.load_seq {
            tracing::debug!(seq = ticket.seq, latest = self.load_seq, "Dropping stale load");
            return LoadOutcome::Superseded;
        }
        let (w, h) = ticket.dimensions();
        let (width, height) = resolution.apply(w, h);
        self.surface.capture_snapshot(&ticket.image, width, height);
        self.source = Some(ticket.image);
        self.output_size = Some((width, height));
        self.view
            .reset(self.config.initial_pan, self.config.initial_zoom);
        self.scheduler.request();
        LoadOutcome::Loaded { width, height }
    }

    /// Begin, negotiate and commit a load in one go.
    pub async fn load_image(&mut self, incoming: IncomingImage) -> Result<LoadOutcome, PipelineError> {
        let ticket = self.begin_load(incoming)?;
        let resolution = self.negotiate_load(&ticket).await;
        Ok(self.commit_load(ticket, resolution))
    }

    // --- output size ---

    /// Resize the snapshot to `width` x `height`, asking first when the
    /// request is above the output threshold.
    pub async fn apply_output_size(
        &mut self,
        width: i64,
        height: i64,
    ) -> Result<(u32, u32), PipelineError> {
        let invalid = PipelineError::InvalidDimensions { width, height };
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(invalid);
        };
        if w == 0 || h == 0 {
            return Err(invalid);
        }
        if self.source.is_none() {
            return Err(PipelineError::NoImage);
        }

        let resolution = self
            .negotiator
            .negotiate(Trigger::OutputSize, w, h, self.config.output_pixel_threshold)
            .await;
        let (w, h) = resolution.apply(w, h);

        let Some(source) = self.source.as_ref() else {
            return Err(PipelineError::NoImage);
        };
        self.surface.capture_snapshot(source, w, h);
        self.output_size = Some((w, h));
        self.scheduler.request();
        tracing::info!(width = w, height = h, "Output size applied");
        Ok((w, h))
    }

    /// Scale the loaded image's natural size by `factor`, then apply it.
    pub async fn scale_output_size(&mut self, factor: f64) -> Result<(u32, u32), PipelineError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PipelineError::InvalidScale(factor));
        }
        let (w, h) = self.source_dimensions().ok_or(PipelineError::NoImage)?;
        let width = ((w as f64 * factor).floor() as i64).max(1);
        let height = ((h as f64 * factor).floor() as i64).max(1);
        self.apply_output_size(width, height).await
    }

    pub fn dimension_lock(&self) -> bool {
        self.dimension_lock
    }

    pub fn set_dimension_lock(&mut self, locked: bool) {
        self.dimension_lock = locked;
    }

    /// Height to pair with an edited width while the lock is on.
    pub fn companion_height(&self, width: u32) -> Option<u32> {
        self.dimension_lock
            .then(|| self.surface.height_for_width(width))
            .flatten()
    }

    /// Width to pair with an edited height while the lock is on.
    pub fn companion_width(&self, height: u32) -> Option<u32> {
        self.dimension_lock
            .then(|| self.surface.width_for_height(height))
            .flatten()
    }

    // --- parameters ---

    pub fn live_preview(&self) -> bool {
        self.live_preview
    }

    /// Toggle live preview. Turning it on catches up on pending changes.
    pub fn toggle_live_preview(&mut self) -> bool {
        self.live_preview = !self.live_preview;
        if self.live_preview && self.store.is_dirty() {
            self.scheduler.request();
        }
        self.live_preview
    }

    /// Set a parameter from control text. Input changes only schedule a
    /// recomputation while live preview is on; commits always do.
    pub fn set_param(&mut self, field: ParamField, raw: &str, kind: ChangeKind) -> ParamValue {
        let value = self.store.set(field, raw);
        if self.live_preview || kind == ChangeKind::Commit {
            self.scheduler.request();
        }
        value
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.store.set_variant(variant);
        self.scheduler.request();
    }

    pub fn rotate_left(&mut self) -> i32 {
        let angle = self.store.rotate_left();
        self.scheduler.request();
        angle
    }

    pub fn rotate_right(&mut self) -> i32 {
        let angle = self.store.rotate_right();
        self.scheduler.request();
        angle
    }

    pub fn reset_controls(&mut self) {
        self.store.reset_controls();
        self.scheduler.request();
    }

    /// Mutate the palette; a successful edit schedules a recomputation.
    pub fn edit_palette<T>(
        &mut self,
        edit: impl FnOnce(&mut PaletteMapper) -> Result<T, PaletteError>,
    ) -> Result<T, PaletteError> {
        let out = edit(&mut self.palette)?;
        self.scheduler.request();
        Ok(out)
    }

    // --- view ---

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Pan and zoom only move the presented result; no recomputation.
    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    pub fn reset_view(&mut self) {
        self.view
            .reset(self.config.initial_pan, self.config.initial_zoom);
    }

    // --- frames ---

    /// Run the pending recomputation, if any. Returns whether one ran.
    pub fn on_frame(&mut self) -> Result<bool, PipelineError> {
        if !self.scheduler.is_scheduled() {
            return Ok(false);
        }
        let result = self.recompute();
        self.scheduler.mark_ran();
        self.store.take_dirty();
        result.map(|_| true)
    }

    /// Wait for the next tick of `clock`, then run [`Self::on_frame`].
    pub async fn next_frame(&mut self, clock: &mut dyn FrameClock) -> Result<bool, PipelineError> {
        clock.next_tick().await;
        self.on_frame()
    }

    /// One full pass from the original snapshot: transform, invert, palette,
    /// rotate, present.
    fn recompute(&mut self) -> Result<(), PipelineError> {
        let params = self.store.get();
        let mut work = self.surface.working_copy()?;
        self.invoker.run(&params, &mut work)?;
        if params.invert {
            work.invert_rgb();
        }
        self.palette.apply(&mut work);
        let turn = QuarterTurn::from_degrees(params.rotation);
        let rotated = rotate(&work, turn);
        tracing::debug!(
            variant = %params.variant,
            rotation = turn.degrees(),
            width = rotated.width(),
            height = rotated.height(),
            "Presenting frame"
        );
        self.surface.present(rotated);
        Ok(())
    }

    pub fn export_png(&self) -> Result<Vec<u8>, PipelineError> {
        self.surface.export_png()
    }
}
