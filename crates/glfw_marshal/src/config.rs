//! Configuration system
//!
//! Initialization hints and window creation hints as serde-serializable
//! structs, loadable from TOML or RON files. Every hint is optional: `None`
//! leaves the native default in place.

use std::os::raw::c_int;

pub use serde::{Deserialize, Serialize};

use crate::native::NativeApi;
use crate::sys;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            Self::from_toml(&contents)
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Parse from a TOML string
    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub(crate) const fn native_bool(value: bool) -> c_int {
    if value {
        sys::TRUE
    } else {
        sys::FALSE
    }
}

/// Hints applied before native initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    /// Expose joystick hats as extra buttons.
    pub joystick_hat_buttons: Option<bool>,
    /// macOS: change directory to the bundle's resources.
    pub cocoa_chdir_resources: Option<bool>,
    /// macOS: create a menu bar.
    pub cocoa_menubar: Option<bool>,
    /// Install an error callback that forwards native errors to `log`.
    pub log_native_errors: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            joystick_hat_buttons: None,
            cocoa_chdir_resources: None,
            cocoa_menubar: None,
            log_native_errors: true,
        }
    }
}

impl Config for InitConfig {}

impl InitConfig {
    pub(crate) fn apply(&self, api: &NativeApi) {
        let hints = [
            (sys::JOYSTICK_HAT_BUTTONS, self.joystick_hat_buttons),
            (sys::COCOA_CHDIR_RESOURCES, self.cocoa_chdir_resources),
            (sys::COCOA_MENUBAR, self.cocoa_menubar),
        ];
        for (hint, value) in hints {
            if let Some(value) = value {
                // SAFETY: init hints may be set at any time before init.
                unsafe { (api.init_hint)(hint, native_bool(value)) };
            }
        }
    }
}

/// Client API a window's context is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientApi {
    /// No context, e.g. for Vulkan rendering.
    NoApi,
    /// Desktop OpenGL.
    OpenGl,
    /// OpenGL ES.
    OpenGlEs,
}

impl ClientApi {
    const fn raw(self) -> c_int {
        match self {
            Self::NoApi => sys::NO_API,
            Self::OpenGl => sys::OPENGL_API,
            Self::OpenGlEs => sys::OPENGL_ES_API,
        }
    }
}

/// OpenGL profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenGlProfile {
    /// Let the driver decide.
    Any,
    /// Core profile.
    Core,
    /// Compatibility profile.
    Compat,
}

impl OpenGlProfile {
    const fn raw(self) -> c_int {
        match self {
            Self::Any => sys::OPENGL_ANY_PROFILE,
            Self::Core => sys::OPENGL_CORE_PROFILE,
            Self::Compat => sys::OPENGL_COMPAT_PROFILE,
        }
    }
}

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Content-area width in screen coordinates.
    pub width: i32,
    /// Content-area height in screen coordinates.
    pub height: i32,
    /// Initial title.
    pub title: String,
    /// User-resizable.
    pub resizable: Option<bool>,
    /// Initially visible.
    pub visible: Option<bool>,
    /// Has decorations.
    pub decorated: Option<bool>,
    /// Takes input focus on creation.
    pub focused: Option<bool>,
    /// Always on top.
    pub floating: Option<bool>,
    /// Initially maximized.
    pub maximized: Option<bool>,
    /// Transparent framebuffer.
    pub transparent_framebuffer: Option<bool>,
    /// Takes input focus when shown.
    pub focus_on_show: Option<bool>,
    /// Resize content area by monitor content scale.
    pub scale_to_monitor: Option<bool>,
    /// MSAA samples.
    pub samples: Option<i32>,
    /// Fullscreen refresh rate.
    pub refresh_rate: Option<i32>,
    /// sRGB-capable framebuffer.
    pub srgb_capable: Option<bool>,
    /// Double buffered framebuffer.
    pub doublebuffer: Option<bool>,
    /// Context client API.
    pub client_api: Option<ClientApi>,
    /// Requested context version `(major, minor)`.
    pub context_version: Option<(i32, i32)>,
    /// OpenGL profile.
    pub opengl_profile: Option<OpenGlProfile>,
    /// Forward-compatible OpenGL context.
    pub opengl_forward_compat: Option<bool>,
    /// Debug OpenGL context.
    pub opengl_debug_context: Option<bool>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "glfw_marshal".to_string(),
            resizable: Some(true),
            visible: None,
            decorated: None,
            focused: None,
            floating: None,
            maximized: None,
            transparent_framebuffer: None,
            focus_on_show: None,
            scale_to_monitor: None,
            samples: None,
            refresh_rate: None,
            srgb_capable: None,
            doublebuffer: None,
            client_api: None,
            context_version: None,
            opengl_profile: None,
            opengl_forward_compat: None,
            opengl_debug_context: None,
        }
    }
}

impl Config for WindowConfig {}

impl WindowConfig {
    /// Config for a window of the given size and title.
    pub fn new(width: i32, height: i32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Configure for Vulkan rendering (no client API context).
    #[must_use]
    pub fn for_vulkan(mut self) -> Self {
        self.client_api = Some(ClientApi::NoApi);
        self
    }

    /// Native `(hint, value)` pairs for every hint that is set.
    pub(crate) fn hints(&self) -> Vec<(c_int, c_int)> {
        let flags = [
            (sys::RESIZABLE, self.resizable),
            (sys::VISIBLE, self.visible),
            (sys::DECORATED, self.decorated),
            (sys::FOCUSED, self.focused),
            (sys::FLOATING, self.floating),
            (sys::MAXIMIZED, self.maximized),
            (sys::TRANSPARENT_FRAMEBUFFER, self.transparent_framebuffer),
            (sys::FOCUS_ON_SHOW, self.focus_on_show),
            (sys::SCALE_TO_MONITOR, self.scale_to_monitor),
            (sys::SRGB_CAPABLE, self.srgb_capable),
            (sys::DOUBLEBUFFER, self.doublebuffer),
            (sys::OPENGL_FORWARD_COMPAT, self.opengl_forward_compat),
            (sys::OPENGL_DEBUG_CONTEXT, self.opengl_debug_context),
        ];
        let mut hints: Vec<(c_int, c_int)> = flags
            .into_iter()
            .filter_map(|(hint, value)| value.map(|v| (hint, native_bool(v))))
            .collect();

        if let Some(samples) = self.samples {
            hints.push((sys::SAMPLES, samples));
        }
        if let Some(rate) = self.refresh_rate {
            hints.push((sys::REFRESH_RATE, rate));
        }
        if let Some(api) = self.client_api {
            hints.push((sys::CLIENT_API, api.raw()));
        }
        if let Some((major, minor)) = self.context_version {
            hints.push((sys::CONTEXT_VERSION_MAJOR, major));
            hints.push((sys::CONTEXT_VERSION_MINOR, minor));
        }
        if let Some(profile) = self.opengl_profile {
            hints.push((sys::OPENGL_PROFILE, profile.raw()));
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_config_from_partial_toml() {
        let config = WindowConfig::from_toml(
            r#"
            width = 640
            height = 480
            title = "Asteroids"
            client_api = "NoApi"
            "#,
        )
        .unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.title, "Asteroids");
        assert_eq!(config.client_api, Some(ClientApi::NoApi));
        assert_eq!(config.resizable, Some(true));
    }

    #[test]
    fn test_hints_skip_unset_values() {
        let config = WindowConfig {
            resizable: None,
            ..WindowConfig::new(320, 200, "t")
        };
        assert!(config.hints().is_empty());

        let config = WindowConfig::new(320, 200, "t").for_vulkan();
        let hints = config.hints();
        assert!(hints.contains(&(sys::RESIZABLE, sys::TRUE)));
        assert!(hints.contains(&(sys::CLIENT_API, sys::NO_API)));
    }

    #[test]
    fn test_context_version_expands_to_two_hints() {
        let config = WindowConfig {
            context_version: Some((4, 5)),
            opengl_profile: Some(OpenGlProfile::Core),
            ..WindowConfig::default()
        };
        let hints = config.hints();
        assert!(hints.contains(&(sys::CONTEXT_VERSION_MAJOR, 4)));
        assert!(hints.contains(&(sys::CONTEXT_VERSION_MINOR, 5)));
        assert!(hints.contains(&(sys::OPENGL_PROFILE, sys::OPENGL_CORE_PROFILE)));
    }

    #[test]
    fn test_init_config_round_trips_through_ron() {
        let config = InitConfig {
            joystick_hat_buttons: Some(false),
            ..InitConfig::default()
        };
        let text = ron::ser::to_string(&config).unwrap();
        let parsed: InitConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = InitConfig::load_from_file("settings.ini").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_) | ConfigError::UnsupportedFormat(_)));
    }
}
