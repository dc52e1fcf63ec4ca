use std::sync::Arc;

use fpi_core::window::WindowPlacement;
use fpi_core::InitError;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

/// Window creation parameters held until the event loop hands out an `ActiveEventLoop`.
#[derive(Debug, Clone)]
pub struct WindowRequest {
    pub title: String,
    pub placement: WindowPlacement,
}

pub fn window_attributes(request: &WindowRequest) -> WindowAttributes {
    let mut attrs = WindowAttributes::default().with_title(&request.title);
    if let Some(size) = request.placement.size {
        attrs = attrs.with_inner_size(PhysicalSize::new(size.x as u32, size.y as u32));
    }
    if let Some(position) = request.placement.position {
        attrs = attrs.with_position(PhysicalPosition::new(position.x, position.y));
    }
    attrs
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    request: &WindowRequest,
) -> Result<Arc<Window>, InitError> {
    let window = event_loop
        .create_window(window_attributes(request))
        .map_err(|e| InitError::WindowCreation(e.to_string()))?;
    Ok(Arc::new(window))
}
