//! Scene-side types: renderable units, legends and views.

mod scalar_bar;
mod unit;
mod view;

pub use scalar_bar::ScalarBar;
pub use unit::{ColorMode, Mapper, RenderableUnit, ScalarMode, UnitId, UnitRef};
pub use view::{
    Camera, HeadlessView, Host, SceneView, StaticHost, Surface, ViewRef, DEFAULT_BACKGROUND,
};
