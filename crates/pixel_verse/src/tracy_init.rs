//! Tracy profiler initialization.

use tracing_subscriber::prelude::*;
use tracing_tracy::TracyLayer;

/// Initialize Tracy profiling.
///
/// Call this early in your application (e.g., in `main()` before `App::run()`).
/// Does nothing if a global subscriber is already installed.
pub fn init_tracy() {
  if let Err(e) = tracing_subscriber::registry()
    .with(TracyLayer::default())
    .try_init()
  {
    log::warn!("Tracy subscriber not installed: {}", e);
  }
}
