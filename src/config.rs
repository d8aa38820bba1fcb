/*
 * Static configuration of the bridge: the names of the native library and
 * window class that provide the editor, and the managed-side classes and
 * method the notification dispatch is routed to. Defaults match the
 * `org.scintilla.editor` Java package; the lexer library and window class can
 * be overridden from the environment for side-by-side Scintilla builds.
 */

pub const ENV_LEXER_LIBRARY: &str = "SCIJNI_LEXER_LIBRARY";
pub const ENV_EDITOR_CLASS: &str = "SCIJNI_EDITOR_CLASS";
/// Log filter consulted by `env_logger` when the VM loads the library.
pub const ENV_LOG_FILTER: &str = "SCIJNI_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

const DEFAULT_LEXER_LIBRARY: &str = "SciLexer.dll";
const DEFAULT_EDITOR_CLASS: &str = "Scintilla";
const DEFAULT_HOST_CLASS: &str = "org/scintilla/editor/Scintilla";
const DEFAULT_DISPATCH_METHOD: &str = "dispatchNotificationEvent";
const DEFAULT_EVENT_CLASS: &str = "org/scintilla/editor/NotificationEvent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Native library that registers the editor window class on load.
    pub lexer_library: String,
    /// Window class name registered by `lexer_library`.
    pub editor_class: String,
    /// Internal (slash separated) name of the Java class owning the natives.
    pub host_class: String,
    /// Static method on `host_class` receiving notification events.
    pub dispatch_method: String,
    /// Internal name of the notification record class.
    pub event_class: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            lexer_library: DEFAULT_LEXER_LIBRARY.to_string(),
            editor_class: DEFAULT_EDITOR_CLASS.to_string(),
            host_class: DEFAULT_HOST_CLASS.to_string(),
            dispatch_method: DEFAULT_DISPATCH_METHOD.to_string(),
            event_class: DEFAULT_EVENT_CLASS.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /*
     * Builds a configuration from an arbitrary key lookup. Empty values are
     * treated as unset so an exported-but-blank variable does not produce an
     * unloadable library name.
     */
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(library) = non_empty(ENV_LEXER_LIBRARY) {
            log::debug!("Config: lexer library overridden to '{library}'");
            config.lexer_library = library;
        }
        if let Some(class) = non_empty(ENV_EDITOR_CLASS) {
            log::debug!("Config: editor window class overridden to '{class}'");
            config.editor_class = class;
        }
        config
    }

    /// JNI signature of the dispatch method: `(int, <event class>) -> void`.
    pub fn dispatch_signature(&self) -> String {
        format!("(IL{};)V", self.event_class)
    }

    /// Dotted form of an internal class name, used in error messages.
    pub(crate) fn dotted(class_name: &str) -> String {
        class_name.replace('/', ".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_signature_matches_notification_event_class() {
        let config = BridgeConfig::default();
        assert_eq!(
            config.dispatch_signature(),
            "(ILorg/scintilla/editor/NotificationEvent;)V"
        );
    }

    #[test]
    fn lookup_overrides_library_and_class() {
        // Arrange
        let vars: HashMap<&str, &str> = [
            (ENV_LEXER_LIBRARY, "Scintilla64.dll"),
            (ENV_EDITOR_CLASS, "Scintilla5"),
        ]
        .into_iter()
        .collect();
        // Act
        let config = BridgeConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        // Assert
        assert_eq!(config.lexer_library, "Scintilla64.dll");
        assert_eq!(config.editor_class, "Scintilla5");
        assert_eq!(config.host_class, "org/scintilla/editor/Scintilla");
    }

    #[test]
    fn blank_override_keeps_default() {
        let config = BridgeConfig::from_lookup(|key| {
            (key == ENV_LEXER_LIBRARY).then(|| "   ".to_string())
        });
        assert_eq!(config.lexer_library, "SciLexer.dll");
    }

    #[test]
    fn dotted_replaces_every_separator() {
        assert_eq!(
            BridgeConfig::dotted("org/scintilla/editor/NotificationEvent"),
            "org.scintilla.editor.NotificationEvent"
        );
    }
}
