//! Scene views and the host surfaces they attach to.
//!
//! [`SceneView`] is the seam to the rendering toolkit. [`HeadlessView`]
//! implements it without a GPU: it keeps the scene contents, frames the
//! camera from unit bounds and counts redraws.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;
use tracing::{debug, error, trace};

use super::scalar_bar::ScalarBar;
use super::unit::{UnitId, UnitRef};
use crate::util::{Bounds, Error, Result};

/// Default view background.
pub const DEFAULT_BACKGROUND: [f64; 3] = [0.2, 0.3, 0.4];

/// Drawable surface resolved from a host.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pub element_id: String,
    pub width: u32,
    pub height: u32,
}

/// Host document able to resolve drawable surfaces by element id.
pub trait Host {
    fn resolve_surface(&self, element_id: &str) -> Option<Surface>;
}

/// Host with a fixed set of surfaces.
#[derive(Clone, Debug, Default)]
pub struct StaticHost {
    surfaces: HashMap<String, (u32, u32)>,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(mut self, element_id: impl Into<String>, width: u32, height: u32) -> Self {
        self.surfaces.insert(element_id.into(), (width, height));
        self
    }
}

impl Host for StaticHost {
    fn resolve_surface(&self, element_id: &str) -> Option<Surface> {
        self.surfaces.get(element_id).map(|&(width, height)| Surface {
            element_id: element_id.to_string(),
            width,
            height,
        })
    }
}

/// Scene operations consumed by the orchestrator.
pub trait SceneView {
    fn add_unit(&mut self, unit: UnitRef);
    fn remove_unit(&mut self, id: UnitId) -> bool;
    fn add_scalar_bar(&mut self, bar: ScalarBar);
    fn remove_scalar_bar(&mut self, id: UnitId) -> bool;
    /// Number of renderable units (legends excluded).
    fn unit_count(&self) -> usize;
    fn set_background(&mut self, rgb: [f64; 3]);
    /// Pixel size of the attached surface.
    fn size(&self) -> (u32, u32);
    /// Frame the camera around everything visible.
    fn reset_camera(&mut self);
    /// Issue a redraw.
    fn render(&mut self);
}

/// Shared handle to a view.
pub type ViewRef = Rc<RefCell<dyn SceneView>>;

/// Camera placement produced by [`SceneView::reset_camera`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub focal_point: Vec3,
    pub position: Vec3,
    /// Vertical view angle in degrees
    pub view_angle: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            focal_point: Vec3::ZERO,
            position: Vec3::new(0.0, 0.0, 1.0),
            view_angle: 30.0,
        }
    }
}

impl Camera {
    /// Place the camera on +Z so the bounding sphere fills the view.
    pub fn frame(&mut self, bounds: &Bounds) {
        if !bounds.is_valid() {
            *self = Self { view_angle: self.view_angle, ..Self::default() };
            return;
        }
        let radius = bounds.radius().max(0.5);
        let half_angle = (self.view_angle * 0.5).to_radians();
        let distance = radius / half_angle.sin();
        self.focal_point = bounds.center();
        self.position = self.focal_point + Vec3::Z * distance;
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.focal_point).length()
    }
}

/// View without a rasterizer.
#[derive(Debug)]
pub struct HeadlessView {
    surface: Surface,
    background: [f64; 3],
    units: Vec<UnitRef>,
    scalar_bars: Vec<ScalarBar>,
    camera: Camera,
    frames_rendered: u64,
    camera_resets: u64,
}

impl HeadlessView {
    /// Attach a view to the surface named `element_id`.
    ///
    /// Fails with [`Error::UnresolvedElement`] before allocating anything when
    /// the host has no such surface.
    pub fn attach(host: &dyn Host, element_id: &str) -> Result<Self> {
        let Some(surface) = host.resolve_surface(element_id) else {
            error!(element_id, "Drawable surface not found");
            return Err(Error::UnresolvedElement(element_id.to_string()));
        };
        debug!(element_id, width = surface.width, height = surface.height, "View attached");
        Ok(Self::with_surface(surface))
    }

    pub fn with_surface(surface: Surface) -> Self {
        Self {
            surface,
            background: DEFAULT_BACKGROUND,
            units: Vec::new(),
            scalar_bars: Vec::new(),
            camera: Camera::default(),
            frames_rendered: 0,
            camera_resets: 0,
        }
    }

    pub fn into_ref(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn units(&self) -> &[UnitRef] {
        &self.units
    }

    pub fn scalar_bars(&self) -> &[ScalarBar] {
        &self.scalar_bars
    }

    pub fn background(&self) -> [f64; 3] {
        self.background
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn camera_resets(&self) -> u64 {
        self.camera_resets
    }

    /// Bounds of every visible unit with bound geometry.
    pub fn visible_bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        for unit in &self.units {
            let unit = unit.borrow();
            if !unit.visible {
                continue;
            }
            if let Some(dataset) = unit.mapper.input() {
                bounds.merge(&dataset.data().bounds());
            }
        }
        bounds
    }
}

impl SceneView for HeadlessView {
    fn add_unit(&mut self, unit: UnitRef) {
        let id = unit.borrow().id();
        if self.units.iter().any(|u| u.borrow().id() == id) {
            return;
        }
        self.units.push(unit);
    }

    fn remove_unit(&mut self, id: UnitId) -> bool {
        let before = self.units.len();
        self.units.retain(|u| u.borrow().id() != id);
        self.units.len() != before
    }

    fn add_scalar_bar(&mut self, bar: ScalarBar) {
        self.scalar_bars.push(bar);
    }

    fn remove_scalar_bar(&mut self, id: UnitId) -> bool {
        let before = self.scalar_bars.len();
        self.scalar_bars.retain(|b| b.id() != id);
        self.scalar_bars.len() != before
    }

    fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn set_background(&mut self, rgb: [f64; 3]) {
        self.background = rgb;
    }

    fn size(&self) -> (u32, u32) {
        (self.surface.width, self.surface.height)
    }

    fn reset_camera(&mut self) {
        let bounds = self.visible_bounds();
        self.camera.frame(&bounds);
        self.camera_resets += 1;
    }

    fn render(&mut self) {
        self.frames_rendered += 1;
        trace!(frame = self.frames_rendered, units = self.units.len(), "Render");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, PolyData};
    use crate::scene::RenderableUnit;

    fn host() -> StaticHost {
        StaticHost::new().with_surface("render", 800, 600)
    }

    #[test]
    fn test_attach_reports_size() {
        let view = HeadlessView::attach(&host(), "render").unwrap();
        assert_eq!(view.size(), (800, 600));
        assert_eq!(view.background(), DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_attach_unresolved_element() {
        let err = HeadlessView::attach(&host(), "missing").err().unwrap();
        assert!(matches!(err, Error::UnresolvedElement(id) if id == "missing"));
    }

    #[test]
    fn test_reset_camera_frames_units() {
        let mut view = HeadlessView::attach(&host(), "render").unwrap();
        let mut pd = PolyData::new();
        pd.points = vec![Vec3::new(-1.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0)];
        let unit = RenderableUnit::with_dataset("box", Dataset::new("box", pd)).into_ref();
        view.add_unit(unit);
        view.reset_camera();
        assert_eq!(view.camera().focal_point, Vec3::new(1.0, 0.0, 0.0));
        assert!(view.camera().distance() > 3.0);
    }

    #[test]
    fn test_add_is_idempotent_and_remove() {
        let mut view = HeadlessView::attach(&host(), "render").unwrap();
        let unit = RenderableUnit::new("u").into_ref();
        let id = unit.borrow().id();
        view.add_unit(unit.clone());
        view.add_unit(unit);
        assert_eq!(view.unit_count(), 1);
        assert!(view.remove_unit(id));
        assert!(!view.remove_unit(id));
        assert_eq!(view.unit_count(), 0);
    }
}
