//! Linked selection controls driving a single mounted view artifact.
//!
//! A [`LinkedControls`] owns the controls of one view, the render callback
//! and the artifact currently on display. A change batch applies new control
//! values, renders once with the final values of every control, and only then
//! swaps the new artifact in. When the render fails the previous artifact and
//! the previous control values stay in place, so the controls always describe
//! what is mounted.

use std::collections::BTreeMap;

use crate::domain::error::DashboardError;

pub const CITY_CONTROL: &str = "city";
pub const METRIC_CONTROL: &str = "metric";

/// A single-choice selector with a fixed option list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectControl {
    name: String,
    options: Vec<String>,
    value: String,
}

impl SelectControl {
    pub fn new(name: &str, options: Vec<String>, value: &str) -> Result<Self, DashboardError> {
        let mut control = Self {
            name: name.to_string(),
            options,
            value: String::new(),
        };
        control.set(value)?;
        Ok(control)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    fn set(&mut self, value: &str) -> Result<(), DashboardError> {
        if !self.options.iter().any(|o| o == value) {
            return Err(DashboardError::InvalidControlValue {
                control: self.name.clone(),
                value: value.to_string(),
            });
        }
        self.value = value.to_string();
        Ok(())
    }
}

/// Values of every bound control at render time, keyed by control name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: BTreeMap<String, String>,
}

impl Selection {
    pub fn get(&self, control: &str) -> Option<&str> {
        self.values.get(control).map(String::as_str)
    }

    /// Like [`Selection::get`] but a missing control is an error.
    pub fn require(&self, control: &str) -> Result<&str, DashboardError> {
        self.get(control)
            .ok_or_else(|| DashboardError::UnknownControl(control.to_string()))
    }
}

/// The artifact on display and how many rebuilds produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mounted<A> {
    pub artifact: A,
    pub generation: u64,
}

pub type RenderFn<A> = Box<dyn Fn(&Selection) -> Result<A, DashboardError> + Send>;

pub struct LinkedControls<A> {
    view: String,
    controls: Vec<SelectControl>,
    render: RenderFn<A>,
    mounted: Mounted<A>,
}

impl<A> LinkedControls<A> {
    /// Renders the initial artifact from the controls' starting values.
    pub fn mount(view: &str, controls: Vec<SelectControl>, render: RenderFn<A>) -> Result<Self, DashboardError> {
        let selection = selection_of(&controls);
        let artifact = render(&selection)?;
        tracing::debug!("Mounted view {} with {:?}", view, selection);

        Ok(Self {
            view: view.to_string(),
            controls,
            render,
            mounted: Mounted {
                artifact,
                generation: 0,
            },
        })
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn mounted(&self) -> &Mounted<A> {
        &self.mounted
    }

    pub fn controls(&self) -> &[SelectControl] {
        &self.controls
    }

    pub fn selection(&self) -> Selection {
        selection_of(&self.controls)
    }

    /// Applies a batch of `(control, value)` changes with exactly one rebuild.
    ///
    /// Returns the artifact that was detached. On any error nothing changes.
    pub fn apply(&mut self, changes: &[(&str, &str)]) -> Result<A, DashboardError> {
        let previous_values: Vec<String> = self.controls.iter().map(|c| c.value.clone()).collect();

        if let Err(e) = self.set_all(changes) {
            self.restore(previous_values);
            tracing::warn!("Rejected control change for view {}: {}", self.view, e);
            return Err(e);
        }

        let selection = self.selection();
        let artifact = match (self.render)(&selection) {
            Ok(artifact) => artifact,
            Err(e) => {
                self.restore(previous_values);
                tracing::warn!("Render failed for view {} with {:?}: {}", self.view, selection, e);
                return Err(e);
            }
        };

        let generation = self.mounted.generation + 1;
        let detached = std::mem::replace(&mut self.mounted, Mounted { artifact, generation });
        tracing::info!("Rebuilt view {} (generation {}) with {:?}", self.view, generation, selection);

        Ok(detached.artifact)
    }

    fn set_all(&mut self, changes: &[(&str, &str)]) -> Result<(), DashboardError> {
        for (name, value) in changes {
            let control = self
                .controls
                .iter_mut()
                .find(|c| c.name == *name)
                .ok_or_else(|| DashboardError::UnknownControl(name.to_string()))?;
            control.set(value)?;
        }
        Ok(())
    }

    fn restore(&mut self, values: Vec<String>) {
        for (control, value) in self.controls.iter_mut().zip(values) {
            control.value = value;
        }
    }
}

fn selection_of(controls: &[SelectControl]) -> Selection {
    Selection {
        values: controls
            .iter()
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect(),
    }
}
