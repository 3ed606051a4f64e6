//! Command groups shipped with the binary.

pub mod appinstances;
pub mod cluster;
pub mod logs;

use crate::plugin::Plugin;

pub use appinstances::AppInstances;
pub use cluster::Cluster;

/// Every built-in plugin, in registration order.
#[must_use]
pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
    vec![Box::new(AppInstances), Box::new(Cluster)]
}
