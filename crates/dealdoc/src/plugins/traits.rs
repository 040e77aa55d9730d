//! Base plugin trait definition.
//!
//! Every pluggable component (format extractors and the library backends they
//! delegate to) implements [`Plugin`] for identification and lifecycle.

use crate::Result;

/// Base trait that all plugins must implement.
///
/// # Thread Safety
///
/// All plugins must be `Send + Sync`; they are shared across concurrent
/// extractions behind `Arc<dyn ...>`.
///
/// # Example
///
/// ```rust
/// use dealdoc::plugins::Plugin;
/// use dealdoc::Result;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct AuditedBackend {
///     ready: AtomicBool,
/// }
///
/// impl Plugin for AuditedBackend {
///     fn name(&self) -> &str {
///         "audited-backend"
///     }
///
///     fn version(&self) -> String {
///         "1.0.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         self.ready.store(true, Ordering::Release);
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique, lowercase, hyphenated identifier (e.g. `"pdf-extract"`).
    ///
    /// Appears in logs next to every extraction the plugin takes part in.
    fn name(&self) -> &str;

    /// Semantic version of the plugin or of the library it wraps.
    fn version(&self) -> String;

    /// Prepare the plugin for use.
    ///
    /// Called once by [`ExtractorBuilder::build`](crate::core::extractor::ExtractorBuilder::build)
    /// for every installed extractor; extractors forward it to their backends.
    /// Takes `&self` so the plugin can live behind `Arc`; use interior
    /// mutability for state.
    ///
    /// # Errors
    ///
    /// An error makes `build` fail.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Release resources.
    ///
    /// Called by [`Extractor::shutdown`](crate::core::extractor::Extractor::shutdown),
    /// which logs errors and otherwise ignores them.
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    /// Optional plugin description for debugging and logging.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestPlugin {
        initialized: AtomicBool,
    }

    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            "test-plugin"
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            self.initialized.store(true, Ordering::Release);
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            self.initialized.store(false, Ordering::Release);
            Ok(())
        }

        fn description(&self) -> &str {
            "A test plugin"
        }
    }

    struct MinimalPlugin;

    impl Plugin for MinimalPlugin {
        fn name(&self) -> &str {
            "minimal"
        }

        fn version(&self) -> String {
            "0.1.0".to_string()
        }
    }

    #[test]
    fn test_plugin_metadata() {
        let plugin = TestPlugin {
            initialized: AtomicBool::new(false),
        };
        assert_eq!(plugin.name(), "test-plugin");
        assert_eq!(plugin.version(), "1.0.0");
        assert_eq!(plugin.description(), "A test plugin");
    }

    #[test]
    fn test_plugin_lifecycle() {
        let plugin = TestPlugin {
            initialized: AtomicBool::new(false),
        };

        plugin.initialize().unwrap();
        assert!(plugin.initialized.load(Ordering::Acquire));

        plugin.shutdown().unwrap();
        assert!(!plugin.initialized.load(Ordering::Acquire));
    }

    #[test]
    fn test_default_lifecycle_is_noop() {
        let plugin = MinimalPlugin;
        assert!(plugin.initialize().is_ok());
        assert!(plugin.shutdown().is_ok());
        assert_eq!(plugin.description(), "");
    }
}
