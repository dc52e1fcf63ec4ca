use glam::IVec2;

use crate::config::WindowConfig;

/// Window geometry and lifecycle flags for the current frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowState {
    pub title: String,
    /// Screen position of the client area's top-left corner.
    pub position: IVec2,
    /// Client area size in pixels.
    pub size: IVec2,
    /// Set when a resize was observed during this frame's message pump.
    pub resized: bool,
    pub centered: bool,
}

/// Client-area geometry reported by a window provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientGeometry {
    pub position: IVec2,
    pub size: IVec2,
}

/// Where to create the window. `None` leaves the choice to the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowPlacement {
    pub position: Option<IVec2>,
    /// Requested client-area size.
    pub size: Option<IVec2>,
}

/// Client size used for an axis the configuration leaves unset.
pub const DEFAULT_SIZE: IVec2 = IVec2::new(800, 600);

impl WindowPlacement {
    /// Axes are resolved independently: a zero (or negative size) component is unset.
    /// When every axis of position or size is unset the platform picks; otherwise an
    /// unset position axis sits at the screen edge and an unset size axis takes
    /// [`DEFAULT_SIZE`]. Centering needs a size and a known screen size; it overrides
    /// any requested position.
    pub fn resolve(config: &WindowConfig, screen_size: Option<IVec2>) -> Self {
        let position = config.position();
        let size = config.size();

        let position_set = position.cmpne(IVec2::ZERO);
        let size_set = size.cmpgt(IVec2::ZERO);

        let mut placement = Self {
            position: position_set
                .any()
                .then(|| IVec2::select(position_set, position, IVec2::ZERO)),
            size: size_set
                .any()
                .then(|| IVec2::select(size_set, size, DEFAULT_SIZE)),
        };

        if config.centered {
            match (placement.size, screen_size) {
                (Some(size), Some(screen)) => {
                    placement.position = Some((screen - size) / 2);
                }
                (None, _) => {
                    log::debug!("Centering ignored: window size left to the platform");
                }
                (Some(_), None) => {
                    log::debug!("Centering ignored: screen size unknown");
                }
            }
        }
        placement
    }
}
