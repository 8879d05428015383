//! Anchor ring and position resolution for the evasive target.
//!
//! Positions are expressed in viewport pixels. The ring is a fixed table
//! of fractional offsets from the reference container's center; a
//! resolved position is the top-left corner of the target.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_measurable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.left + self.width / 2.0,
            y: self.top + self.height / 2.0,
        }
    }
}

/// A named point on the ring, as fractions of the usable half-extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub name: &'static str,
    pub x_offset: f64,
    pub y_offset: f64,
}

/// Clockwise ring starting at left-center.
pub const ANCHORS: [Anchor; 8] = [
    Anchor { name: "left-center", x_offset: -1.0, y_offset: 0.0 },
    Anchor { name: "top-left", x_offset: -0.7, y_offset: -0.7 },
    Anchor { name: "top-center", x_offset: 0.0, y_offset: -1.0 },
    Anchor { name: "top-right", x_offset: 0.7, y_offset: -0.7 },
    Anchor { name: "right-center", x_offset: 1.0, y_offset: 0.0 },
    Anchor { name: "bottom-right", x_offset: 0.7, y_offset: 0.7 },
    Anchor { name: "bottom-center", x_offset: 0.0, y_offset: 1.0 },
    Anchor { name: "bottom-left", x_offset: -0.7, y_offset: 0.7 },
];

/// Resting place of the target once it gives up.
pub const TERMINAL_ANCHOR: usize = 6;

/// Index that follows `current` on the ring. `None` means "not yet placed".
pub fn next_anchor(current: Option<usize>) -> usize {
    match current {
        Some(i) => (i + 1) % ANCHORS.len(),
        None => 0,
    }
}

/// Read-only view of the host layout.
///
/// Implemented by the renderer. Every method is queried at the moment a
/// transition fires, so the position always reflects the current layout.
pub trait LayoutProbe {
    fn viewport(&self) -> Size;

    /// Reference container bounds, `None` while it is not mounted.
    fn container(&self) -> Option<Rect>;

    /// Measured size of the evasive target, `None` before first paint.
    fn target_size(&self) -> Option<Size>;
}

/// Fixed layout, for terminals, tests and simulations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticLayout {
    pub viewport: Size,
    pub container: Option<Rect>,
    pub target: Option<Size>,
}

impl StaticLayout {
    /// A 500px-wide card centered in a desktop-sized viewport.
    pub fn desktop() -> Self {
        Self {
            viewport: Size::new(1280.0, 800.0),
            container: Some(Rect::new(390.0, 160.0, 500.0, 480.0)),
            target: Some(Size::new(120.0, 44.0)),
        }
    }

    /// Layout before the card has been laid out.
    pub fn unmounted(viewport: Size) -> Self {
        Self {
            viewport,
            container: None,
            target: None,
        }
    }
}

impl LayoutProbe for StaticLayout {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn container(&self) -> Option<Rect> {
        self.container
    }

    fn target_size(&self) -> Option<Size> {
        self.target
    }
}

/// Margins and fallbacks used when placing the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Minimum distance from every viewport edge.
    pub viewport_margin: f64,
    /// Inset from the container edge.
    pub container_margin: f64,
    /// Size assumed when the target has not been measured yet.
    pub fallback_target: Size,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            viewport_margin: 10.0,
            container_margin: 20.0,
            fallback_target: Size::new(120.0, 44.0),
        }
    }
}

impl Placement {
    /// Resolve the anchor at `index` against the current layout.
    ///
    /// Returns `None` when the container is not measurable; callers keep
    /// the target where it is.
    pub fn resolve(&self, index: usize, layout: &dyn LayoutProbe) -> Option<Point> {
        let anchor = ANCHORS.get(index)?;
        let container = layout.container()?;
        if !Size::new(container.width, container.height).is_measurable() {
            return None;
        }
        let target = layout
            .target_size()
            .filter(Size::is_measurable)
            .unwrap_or(self.fallback_target);
        let viewport = layout.viewport();

        let center = container.center();
        let max_offset_x =
            (container.width / 2.0 - target.width / 2.0 - self.container_margin).max(0.0);
        let max_offset_y =
            (container.height / 2.0 - target.height / 2.0 - self.container_margin).max(0.0);

        let x = center.x + anchor.x_offset * max_offset_x - target.width / 2.0;
        let y = center.y + anchor.y_offset * max_offset_y - target.height / 2.0;

        let m = self.viewport_margin;
        Some(Point {
            x: x.min(viewport.width - target.width - m).max(m),
            y: y.min(viewport.height - target.height - m).max(m),
        })
    }
}
