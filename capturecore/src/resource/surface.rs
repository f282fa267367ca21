use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::host::{ModuleUi, RenderSurface};
use crate::preview::PreviewTransformCalculator;
use crate::refcount::RefCounted;
use crate::resource::tracker::ResourceTracker;
use crate::types::{PreviewTransform, Rotation, Size};

#[derive(Debug, Clone, Copy)]
struct Layout {
    surface_size: Size,
    preview: Option<(Size, Rotation)>,
}

/// The rendering surface plus the preview geometry derived from it.
pub struct ResourceSurface {
    surface: Arc<dyn RenderSurface>,
    calculator: PreviewTransformCalculator,
    module_ui: Arc<dyn ModuleUi>,
    layout: Mutex<Layout>,
}

impl ResourceSurface {
    /// Tracker label for this bundle.
    pub const KIND: &'static str = "surface";

    /// Wraps a surface that just became available.
    ///
    /// The surface is released when the last reference goes away.
    pub fn create(
        surface: Arc<dyn RenderSurface>,
        calculator: PreviewTransformCalculator,
        module_ui: Arc<dyn ModuleUi>,
        tracker: &Arc<ResourceTracker>,
    ) -> RefCounted<Self> {
        let surface_size = surface.size();
        RefCounted::new_tracked(
            Self::KIND,
            Self {
                surface,
                calculator,
                module_ui,
                layout: Mutex::new(Layout {
                    surface_size,
                    preview: None,
                }),
            },
            tracker,
            |resource: &Self| resource.surface.release(),
        )
    }

    /// The host's rendering surface.
    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    /// Calculator bound to orientation state.
    pub fn calculator(&self) -> &PreviewTransformCalculator {
        &self.calculator
    }

    /// Last known surface size.
    pub fn surface_size(&self) -> Size {
        self.layout.lock().surface_size
    }

    /// Preview size bound to the surface, if a camera is streaming into it.
    pub fn preview_size(&self) -> Option<Size> {
        self.layout.lock().preview.map(|(size, _)| size)
    }

    /// Records a new surface size reported by the host.
    pub fn set_surface_size(&self, size: Size) {
        self.layout.lock().surface_size = size;
    }

    /// Binds the preview stream geometry and sizes the surface buffers to it.
    pub fn bind_preview(&self, preview_size: Size, sensor_orientation: Rotation) {
        self.layout.lock().preview = Some((preview_size, sensor_orientation));
        self.surface.set_default_buffer_size(preview_size);
    }

    /// Forgets the preview geometry once no camera streams into the surface.
    pub fn unbind_preview(&self) {
        self.layout.lock().preview = None;
    }

    /// Recomputes the preview transform and publishes it to the UI.
    ///
    /// Returns `None` when no preview is bound yet.
    pub fn update_preview_transform(&self) -> Option<PreviewTransform> {
        let layout = *self.layout.lock();
        let (preview_size, sensor_orientation) = layout.preview?;
        let transform = self
            .calculator
            .compute(layout.surface_size, preview_size, sensor_orientation);
        tracing::debug!(
            surface = %layout.surface_size,
            preview = %preview_size,
            rotation = transform.rotation.degrees(),
            "preview transform updated"
        );
        self.module_ui.update_preview_transform(transform);
        Some(transform)
    }
}

impl fmt::Debug for ResourceSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSurface")
            .field("layout", &*self.layout.lock())
            .finish_non_exhaustive()
    }
}
