//! Ownership of the single live chart.
//!
//! Renderers hand back a [`ChartInstance`]; [`ChartHandle`] keeps at most one
//! of them alive and destroys it before anything replaces it.

use std::fmt::Debug;

use crate::{error::RenderError, series::ChartSpec};

/// Something that can draw a [`ChartSpec`] somewhere.
pub trait ChartRenderer: Send + Debug {
    fn render(&mut self, spec: &ChartSpec) -> Result<Box<dyn ChartInstance>, RenderError>;
}

/// A rendered chart that must be released before it is replaced.
pub trait ChartInstance: Send + Debug {
    fn destroy(self: Box<Self>);
}

#[derive(Debug)]
pub struct ChartHandle<R> {
    renderer: R,
    live: Option<Box<dyn ChartInstance>>,
}

impl<R: ChartRenderer> ChartHandle<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer, live: None }
    }

    /// Destroy the current chart (if any), then render `spec`.
    ///
    /// On render failure the handle is left empty.
    pub fn replace(&mut self, spec: &ChartSpec) -> Result<(), RenderError> {
        self.clear();
        let instance = self.renderer.render(spec)?;
        self.live = Some(instance);
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(instance) = self.live.take() {
            log::debug!("Destroying previous chart");
            instance.destroy();
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Event, RecordingRenderer};
    use super::*;

    fn spec() -> ChartSpec {
        ChartSpec { labels: vec!["00:00".into()], datasets: vec![], axes: vec![] }
    }

    #[test]
    fn replace_destroys_previous_before_creating_next() {
        let renderer = RecordingRenderer::default();
        let mut handle = ChartHandle::new(renderer.clone());

        handle.replace(&spec()).unwrap();
        handle.replace(&spec()).unwrap();

        assert_eq!(
            renderer.events(),
            [Event::Created(0), Event::Destroyed(0), Event::Created(1)]
        );
        assert!(handle.is_live());
    }

    #[test]
    fn clear_is_idempotent() {
        let renderer = RecordingRenderer::default();
        let mut handle = ChartHandle::new(renderer.clone());

        handle.clear();
        handle.replace(&spec()).unwrap();
        handle.clear();
        handle.clear();

        assert_eq!(renderer.events(), [Event::Created(0), Event::Destroyed(0)]);
        assert!(!handle.is_live());
    }
}
