//! Window capabilities for the authorization handshake.
//!
//! The launcher is written against these traits so the handshake logic can be
//! driven by fake windows in tests and by embedders that own real windows.

/// Visible bounds of the screen the parent runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1280,
            height: 800,
        }
    }
}

pub const DEFAULT_POPUP_WIDTH: u32 = 600;
pub const DEFAULT_POPUP_HEIGHT: u32 = 700;

/// Size and position of the authorization window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
}

impl Geometry {
    /// Centers a `width` x `height` window on `screen`. A window larger than
    /// the screen is pinned to the screen's corner rather than pushed
    /// off-screen.
    pub fn centered(screen: ScreenBounds, width: u32, height: u32) -> Self {
        let left = screen.x + (screen.width.saturating_sub(width) / 2) as i32;
        let top = screen.y + (screen.height.saturating_sub(height) / 2) as i32;
        Self {
            width,
            height,
            left,
            top,
        }
    }
}

/// Everything the opener needs to create one authorization window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRequest {
    pub url: String,
    pub name: String,
    pub geometry: Geometry,
}

impl PopupRequest {
    /// Builds a request centered on `screen` at the default popup size.
    pub fn new(url: impl Into<String>, name: impl Into<String>, screen: ScreenBounds) -> Self {
        Self::with_size(url, name, screen, DEFAULT_POPUP_WIDTH, DEFAULT_POPUP_HEIGHT)
    }

    pub fn with_size(
        url: impl Into<String>,
        name: impl Into<String>,
        screen: ScreenBounds,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            geometry: Geometry::centered(screen, width, height),
        }
    }
}

/// Handle to an opened authorization window.
pub trait PopupHandle: Send + 'static {
    /// Whether the window has been closed since it was opened.
    fn is_closed(&self) -> bool;

    /// Closes the window. Must be safe to call on an already-closed window.
    fn close(&mut self);
}

/// Opens authorization windows.
pub trait PopupOpener {
    type Handle: PopupHandle;

    /// Opens a window for `request`, or returns `None` when the environment
    /// refuses to open one (the popup-blocked condition).
    fn open(&self, request: &PopupRequest) -> Option<Self::Handle>;
}

/// Opener backed by the user's default browser.
///
/// An external browser tab can be neither observed nor closed from here, so
/// the handle never reports closed and `close` is a no-op. Abandonment of
/// the flow is caught by the caller's overall timeout rather than the
/// closure watchdog.
pub struct SystemBrowser;

pub struct SystemBrowserTab {
    _opened: (),
}

impl PopupHandle for SystemBrowserTab {
    fn is_closed(&self) -> bool {
        false
    }

    fn close(&mut self) {}
}

impl PopupOpener for SystemBrowser {
    type Handle = SystemBrowserTab;

    fn open(&self, request: &PopupRequest) -> Option<SystemBrowserTab> {
        webbrowser::open(&request.url)
            .ok()
            .map(|_| SystemBrowserTab { _opened: () })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_centers_on_screen() {
        let screen = ScreenBounds {
            x: 0,
            y: 0,
            width: 1280,
            height: 800,
        };
        let geometry = Geometry::centered(screen, 600, 700);
        assert_eq!(geometry.left, 340);
        assert_eq!(geometry.top, 50);
    }

    #[test]
    fn test_geometry_respects_screen_offset() {
        // Secondary monitor to the right of a 1920-wide primary.
        let screen = ScreenBounds {
            x: 1920,
            y: 0,
            width: 1280,
            height: 800,
        };
        let geometry = Geometry::centered(screen, 600, 700);
        assert_eq!(geometry.left, 1920 + 340);
        assert_eq!(geometry.top, 50);
    }

    #[test]
    fn test_geometry_clamps_oversized_window() {
        let screen = ScreenBounds {
            x: 0,
            y: 0,
            width: 500,
            height: 400,
        };
        let geometry = Geometry::centered(screen, 600, 700);
        assert_eq!(geometry.left, 0);
        assert_eq!(geometry.top, 0);
    }

    #[test]
    fn test_request_uses_default_size() {
        let request = PopupRequest::new(
            "https://example.com/authorize",
            "crosspost-auth",
            ScreenBounds::default(),
        );
        assert_eq!(request.geometry.width, DEFAULT_POPUP_WIDTH);
        assert_eq!(request.geometry.height, DEFAULT_POPUP_HEIGHT);
    }
}
