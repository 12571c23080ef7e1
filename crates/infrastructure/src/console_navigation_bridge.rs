//! Console navigation bridge for development. Logs redirects to tracing
//! output instead of driving a host shell.

use promodesk_application::NavigationBridge;
use tracing::info;

/// Development navigation bridge that records redirect intents in the log.
#[derive(Clone)]
pub struct ConsoleNavigationBridge;

impl ConsoleNavigationBridge {
    /// Creates a new console navigation bridge.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNavigationBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationBridge for ConsoleNavigationBridge {
    fn go_to_discount_list(&self) {
        info!("--- NAVIGATION (console) --- redirecting to the discount list");
    }
}
