//! Random zoom windows for the inpainting modes.

use crate::common::*;

/// A window described by its center and size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomWindow {
    pub cy: f64,
    pub cx: f64,
    pub h: f64,
    pub w: f64,
}

impl ZoomWindow {
    /// The window covering the whole `height` by `width` frame.
    pub fn full_frame(height: i64, width: i64) -> Self {
        let h = height as f64;
        let w = width as f64;
        Self {
            cy: h / 2.0,
            cx: w / 2.0,
            h,
            w,
        }
    }

    /// Top, left, bottom and right coordinates.
    pub fn tlbr(&self) -> [f64; 4] {
        let Self { cy, cx, h, w } = *self;
        [cy - h / 2.0, cx - w / 2.0, cy + h / 2.0, cx + w / 2.0]
    }

    pub fn to_tensor(&self) -> Tensor {
        let Self { cy, cx, h, w } = *self;
        Tensor::of_slice(&[cy as f32, cx as f32, h as f32, w as f32])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RandomZoomInit {
    pub min_zoom: R64,
    pub max_zoom: R64,
}

impl RandomZoomInit {
    pub fn build(self) -> Result<RandomZoom> {
        let Self { min_zoom, max_zoom } = self;
        ensure!(
            min_zoom >= 1.0 && min_zoom <= max_zoom,
            "zoom range must satisfy 1 <= min_zoom <= max_zoom"
        );
        Ok(RandomZoom {
            min_zoom: min_zoom.raw(),
            max_zoom: max_zoom.raw(),
        })
    }
}

impl Default for RandomZoomInit {
    fn default() -> Self {
        Self {
            min_zoom: r64(1.25),
            max_zoom: r64(1.5),
        }
    }
}

/// Draws a `(zoom_from, zoom_to)` window pair on a frame.
#[derive(Debug, Clone)]
pub struct RandomZoom {
    min_zoom: f64,
    max_zoom: f64,
}

impl RandomZoom {
    /// Sample a window pair on a `height` by `width` frame.
    ///
    /// `zoom_from` is the full frame. `zoom_to` shrinks the frame by a random
    /// zoom factor and is placed uniformly inside the frame.
    pub fn sample<R>(&self, height: i64, width: i64, rng: &mut R) -> (ZoomWindow, ZoomWindow)
    where
        R: Rng + ?Sized,
    {
        let zoom_from = ZoomWindow::full_frame(height, width);

        let zoom = if self.min_zoom < self.max_zoom {
            rng.gen_range(self.min_zoom..=self.max_zoom)
        } else {
            self.min_zoom
        };
        let h = zoom_from.h / zoom;
        let w = zoom_from.w / zoom;
        let cy = h / 2.0 + rng.gen::<f64>() * (zoom_from.h - h);
        let cx = w / 2.0 + rng.gen::<f64>() * (zoom_from.w - w);
        let zoom_to = ZoomWindow { cy, cx, h, w };

        (zoom_from, zoom_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zoom_to_lies_inside_frame() -> Result<()> {
        let zoom = RandomZoomInit::default().build()?;
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let (zoom_from, zoom_to) = zoom.sample(378, 512, &mut rng);
            assert_eq!(zoom_from.tlbr(), [0.0, 0.0, 378.0, 512.0]);

            let [t, l, b, r] = zoom_to.tlbr();
            assert!(t >= -1e-9 && l >= -1e-9);
            assert!(b <= 378.0 + 1e-9 && r <= 512.0 + 1e-9);

            let factor = 378.0 / zoom_to.h;
            assert!((1.25 - 1e-9..=1.5 + 1e-9).contains(&factor));
            assert_abs_diff_eq!(factor, 512.0 / zoom_to.w, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn fixed_zoom_factor() -> Result<()> {
        let zoom = RandomZoomInit {
            min_zoom: r64(2.0),
            max_zoom: r64(2.0),
        }
        .build()?;
        let mut rng = StdRng::seed_from_u64(0);
        let (_, zoom_to) = zoom.sample(100, 200, &mut rng);
        assert_abs_diff_eq!(zoom_to.h, 50.0);
        assert_abs_diff_eq!(zoom_to.w, 100.0);
        Ok(())
    }

    #[test]
    fn reject_shrinking_zoom() {
        let init = RandomZoomInit {
            min_zoom: r64(0.5),
            max_zoom: r64(1.5),
        };
        assert!(init.build().is_err());
    }
}
