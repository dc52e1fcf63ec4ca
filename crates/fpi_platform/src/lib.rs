//! Desktop collaborators for `fpi_core`: winit windowing and messages, wgpu
//! presentation, gilrs controllers and a monotonic counter.

pub mod controller;
pub mod counter;
pub mod presenter;
pub mod window;
pub mod winit_backend;

use fpi_core::{Backends, InitError};

pub use controller::GilrsController;
pub use counter::InstantCounter;
pub use presenter::WgpuPresenter;
pub use winit_backend::WinitBackend;

/// Builds the desktop backend set. Must be called on the main thread.
pub fn desktop_backends() -> Result<Backends, InitError> {
    Ok(Backends {
        window: Box::new(WinitBackend::new()?),
        controller: Box::new(GilrsController::new()),
        counter: Box::new(InstantCounter::new()),
    })
}
