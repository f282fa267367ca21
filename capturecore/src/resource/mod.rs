//! Counted resource bundles owned by lifecycle states.
//!
//! - [`ResourceConstructed`]: module-scoped host services, alive from module
//!   construction to shutdown.
//! - [`ResourceSurface`]: the rendering surface and its preview geometry, alive
//!   while any state needs the surface (possibly across a pause and resume).
//! - [`ResourceOpenedCamera`]: an opened camera device, closed when the last
//!   state holding it leaves.
//!
//! Each bundle is created through a `create` function returning a
//! [`RefCounted`](crate::refcount::RefCounted) with a count of 1 and registered
//! with the module's [`ResourceTracker`].

mod constructed;
mod opened_camera;
mod surface;
pub mod tracker;

pub use constructed::ResourceConstructed;
pub use opened_camera::ResourceOpenedCamera;
pub use surface::ResourceSurface;
pub use tracker::{ResourceStats, ResourceTracker};
