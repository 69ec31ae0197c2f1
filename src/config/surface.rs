use crate::foundation::core::Canvas;

/// Largest edge the CPU rasterizer accepts (`vello_cpu` pixmaps are `u16`-sized).
pub const MAX_SURFACE_EDGE: u32 = u16::MAX as u32;

/// Target raster dimensions for every frame of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl SurfaceConfig {
    /// Parse a `WxH` resolution string such as `"1080x1920"`.
    ///
    /// Both edges must be in `1..=MAX_SURFACE_EDGE`. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        let width = parse_edge(w)?;
        let height = parse_edge(h)?;
        Some(Self { width, height })
    }

    /// Apply a resolution string, keeping the current dimensions when it does not parse.
    pub fn with_resolution(self, s: &str) -> Self {
        match Self::parse(s) {
            Some(next) => next,
            None => {
                tracing::warn!(
                    resolution = s,
                    width = self.width,
                    height = self.height,
                    "unparsable resolution, keeping previous surface size"
                );
                self
            }
        }
    }

    /// Dimensions as a [`Canvas`].
    pub fn canvas(self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}

fn parse_edge(s: &str) -> Option<u32> {
    let v = s.trim().parse::<u32>().ok()?;
    (1..=MAX_SURFACE_EDGE).contains(&v).then_some(v)
}

#[cfg(test)]
#[path = "../../tests/unit/config/surface.rs"]
mod tests;
