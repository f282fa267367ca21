use std::fmt;
use std::sync::Arc;

use crate::config::LifecycleConfig;
use crate::driver::EventSender;
use crate::host::{
    CameraManager, CameraOpener, FacingSetting, HostServices, ModuleUi, OrientationManager,
};
use crate::preview::PreviewTransformCalculator;
use crate::refcount::RefCounted;
use crate::resource::tracker::ResourceTracker;
use crate::types::Facing;

/// Host services shared by every state for the lifetime of the module.
pub struct ResourceConstructed {
    services: HostServices,
    events: EventSender,
    tracker: Arc<ResourceTracker>,
    config: LifecycleConfig,
}

impl ResourceConstructed {
    /// Tracker label for this bundle.
    pub const KIND: &'static str = "constructed";

    /// Builds the bundle and starts orientation tracking.
    ///
    /// Tracking stops again when the last reference is released.
    pub fn create(
        services: HostServices,
        events: EventSender,
        tracker: Arc<ResourceTracker>,
        config: LifecycleConfig,
    ) -> RefCounted<Self> {
        services.orientation_manager.resume();
        let registry = Arc::clone(&tracker);
        RefCounted::new_tracked(
            Self::KIND,
            Self {
                services,
                events,
                tracker,
                config,
            },
            &registry,
            Self::close,
        )
    }

    fn close(&self) {
        self.services.orientation_manager.pause();
        tracing::info!("module resources torn down");
    }

    /// Hardware manager.
    pub fn camera_manager(&self) -> &dyn CameraManager {
        self.services.camera_manager.as_ref()
    }

    /// Camera opener.
    pub fn camera_opener(&self) -> &dyn CameraOpener {
        self.services.camera_opener.as_ref()
    }

    /// Orientation tracking.
    pub fn orientation_manager(&self) -> &Arc<dyn OrientationManager> {
        &self.services.orientation_manager
    }

    /// UI binding.
    pub fn module_ui(&self) -> &Arc<dyn ModuleUi> {
        &self.services.module_ui
    }

    /// Facing preference store.
    pub fn facing_setting(&self) -> &dyn FacingSetting {
        self.services.facing_setting.as_ref()
    }

    /// Preferred facing, falling back to the configured default.
    pub fn camera_facing(&self) -> Facing {
        self.facing_setting()
            .camera_facing()
            .unwrap_or(self.config.fallback_facing)
    }

    /// A calculator bound to this module's orientation state.
    pub fn preview_calculator(&self) -> PreviewTransformCalculator {
        PreviewTransformCalculator::new(Arc::clone(&self.services.orientation_manager))
    }

    /// Queue through which asynchronous completions are delivered.
    pub fn events(&self) -> &EventSender {
        &self.events
    }

    /// Registry of counted resources created by this module.
    pub fn tracker(&self) -> &Arc<ResourceTracker> {
        &self.tracker
    }

    /// Lifecycle configuration.
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }
}

impl fmt::Debug for ResourceConstructed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceConstructed")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
