#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A transient zero/NaN report from an observer; never stored.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }
}

/// Visible viewport, from `visualViewport` when the browser has one.
pub type Viewport = Size;

/// Interior box of the stage container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerBox {
    pub client_height: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
}

impl ContainerBox {
    #[must_use]
    pub fn interior_height(&self) -> f64 {
        self.client_height - self.padding_top - self.padding_bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportBand {
    SmallMobile,
    Mobile,
    Tablet,
    Desktop,
}

impl ViewportBand {
    /// Mobile widths cap the user zoom so the stage cannot overflow.
    #[must_use]
    pub fn is_narrow(self) -> bool {
        matches!(self, Self::SmallMobile | Self::Mobile)
    }
}

/// Margins and edge buffer applied within one band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSpacing {
    pub margin_x: f64,
    pub margin_y: f64,
    /// Multiplier below 1 keeping the stage off the viewport edges.
    pub buffer: f64,
}

/// Tunable constants for the stage scale.
///
/// Overridable through `GameStage`'s `policy` prop.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalePolicy {
    pub small_mobile_max_width: f64,
    pub mobile_max_width: f64,
    pub tablet_max_width: f64,
    pub small_mobile: BandSpacing,
    pub mobile: BandSpacing,
    pub tablet: BandSpacing,
    pub desktop: BandSpacing,
    /// Assumed content size until the first observation arrives.
    pub design_size: Size,
    /// Content sizes below this are clamped up before dividing.
    pub min_content: Size,
    pub min_available_width: f64,
    pub max_scale: f64,
    pub narrow_zoom_ceiling: f64,
}

impl Default for ScalePolicy {
    fn default() -> Self {
        Self {
            small_mobile_max_width: 375.0,
            mobile_max_width: 480.0,
            tablet_max_width: 1024.0,
            small_mobile: BandSpacing {
                margin_x: 6.0,
                margin_y: 6.0,
                buffer: 0.98,
            },
            mobile: BandSpacing {
                margin_x: 12.0,
                margin_y: 12.0,
                buffer: 0.97,
            },
            tablet: BandSpacing {
                margin_x: 32.0,
                margin_y: 32.0,
                buffer: 0.95,
            },
            desktop: BandSpacing {
                margin_x: 48.0,
                margin_y: 48.0,
                buffer: 0.92,
            },
            design_size: Size::new(360.0, 640.0),
            min_content: Size::new(280.0, 350.0),
            min_available_width: 280.0,
            max_scale: 1.5,
            narrow_zoom_ceiling: 1.0,
        }
    }
}

impl ScalePolicy {
    #[must_use]
    pub fn band(&self, viewport_width: f64) -> ViewportBand {
        if viewport_width <= self.small_mobile_max_width {
            ViewportBand::SmallMobile
        } else if viewport_width <= self.mobile_max_width {
            ViewportBand::Mobile
        } else if viewport_width <= self.tablet_max_width {
            ViewportBand::Tablet
        } else {
            ViewportBand::Desktop
        }
    }

    #[must_use]
    pub fn spacing(&self, band: ViewportBand) -> BandSpacing {
        match band {
            ViewportBand::SmallMobile => self.small_mobile,
            ViewportBand::Mobile => self.mobile,
            ViewportBand::Tablet => self.tablet,
            ViewportBand::Desktop => self.desktop,
        }
    }

    /// Zoom actually applied: bad input falls back to 1, narrow bands are
    /// capped at the ceiling.
    #[must_use]
    pub fn effective_zoom(&self, band: ViewportBand, zoom: f64) -> f64 {
        let zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            1.0
        };
        if band.is_narrow() {
            zoom.min(self.narrow_zoom_ceiling)
        } else {
            zoom
        }
    }
}

/// Everything `compute_scale` reads, captured at flush time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleInputs {
    pub viewport: Viewport,
    /// `None` when there is no container; the viewport height stands in.
    pub container: Option<ContainerBox>,
    pub content: Size,
    pub reserved_height: f64,
    pub zoom: f64,
}

/// Scale factor fitting `content` into the viewport above the reserved strip.
#[must_use]
pub fn compute_scale(policy: &ScalePolicy, inputs: &ScaleInputs) -> f64 {
    let ScaleInputs {
        viewport,
        container,
        content,
        reserved_height,
        zoom,
    } = *inputs;
    if viewport.is_degenerate() {
        return 1.0;
    }

    let band = policy.band(viewport.width);
    let spacing = policy.spacing(band);

    let content_width = content.width.max(policy.min_content.width);
    let content_height = content.height.max(policy.min_content.height);

    let interior = container.map_or(viewport.height, |c| c.interior_height());
    let reserved = if reserved_height.is_finite() {
        reserved_height.max(0.0)
    } else {
        0.0
    };
    let available_height = (interior - reserved - spacing.margin_y).max(0.0);
    let available_width = (viewport.width - spacing.margin_x).max(policy.min_available_width);

    let width_ratio = available_width / content_width;
    let height_ratio = available_height / content_height;
    let auto_scale = width_ratio.min(height_ratio) * spacing.buffer;

    let scale = auto_scale * policy.effective_zoom(band, zoom);
    scale.min(policy.max_scale).max(0.0)
}
