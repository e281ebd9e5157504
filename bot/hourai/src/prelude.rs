pub use std::{sync::Arc, time::Duration};
pub use tracing::{debug, error, info, warn};
