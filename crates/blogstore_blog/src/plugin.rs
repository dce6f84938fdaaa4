//! Plugin states.

blog_repository!(
    /// Repository of the `plugin` table.
    ///
    /// Plugins are keyed by their own id rather than a generated one.
    PluginRepository,
    "plugin"
);
