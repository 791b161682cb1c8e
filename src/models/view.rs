/// Pan and zoom of the displayed result. Display-only: never feeds back
/// into the pixel pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub pan_x: f64,
    pub pan_y: f64,
    zoom: f64,
    min_zoom: f64,
}

pub const ZOOM_STEP: f64 = 0.05;

impl ViewTransform {
    pub fn new(pan: (f64, f64), zoom: f64, min_zoom: f64) -> Self {
        let mut view = Self {
            pan_x: pan.0,
            pan_y: pan.1,
            zoom: min_zoom,
            min_zoom,
        };
        view.set_zoom(zoom);
        view
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    /// Set zoom, rounded to two decimals and floored at the minimum.
    /// Non-finite input is ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let rounded = (zoom * 100.0).round() / 100.0;
        self.zoom = rounded.max(self.min_zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.pan_x += dx;
            self.pan_y += dy;
        }
    }

    pub fn reset(&mut self, pan: (f64, f64), zoom: f64) {
        self.pan_x = pan.0;
        self.pan_y = pan.1;
        self.set_zoom(zoom);
    }

    /// Affine matrix mapping canvas pixels to display coordinates for a
    /// canvas of `width` x `height`, scaled about its centre.
    pub fn matrix(&self, width: u32, height: u32) -> [[f64; 3]; 3] {
        let z = self.zoom;
        let tx = self.pan_x - z * width as f64 / 2.0;
        let ty = self.pan_y - z * height as f64 / 2.0;
        [[z, 0.0, tx], [0.0, z, ty], [0.0, 0.0, 1.0]]
    }

    pub fn to_display(&self, width: u32, height: u32, point: (f64, f64)) -> (f64, f64) {
        let m = self.matrix(width, height);
        (
            m[0][0] * point.0 + m[0][2],
            m[1][1] * point.1 + m[1][2],
        )
    }

    pub fn to_canvas(&self, width: u32, height: u32, point: (f64, f64)) -> (f64, f64) {
        let m = self.matrix(width, height);
        ((point.0 - m[0][2]) / m[0][0], (point.1 - m[1][2]) / m[1][1])
    }
}
