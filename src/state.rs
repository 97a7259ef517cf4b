use crate::color::ColorMap;
use crate::data::evaluate::{Evaluation, evaluate};
use crate::data::filter::ConstraintSet;
use crate::data::model::HotelDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file). Never mutated.
    pub dataset: Option<HotelDataset>,

    /// Current slider / checkbox values.
    pub constraints: Option<ConstraintSet>,

    /// Result of the last recomputation (cached).
    pub evaluation: Option<Evaluation>,

    /// Colour per region, shared by plots and the region list.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset, reset constraints and recompute.
    pub fn set_dataset(&mut self, dataset: HotelDataset) {
        self.constraints = Some(ConstraintSet::unconstrained(&dataset));
        self.color_map = Some(ColorMap::new(&dataset.regions));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the evaluation from a snapshot of the current constraints.
    pub fn refresh(&mut self) {
        self.evaluation = match (&self.dataset, &self.constraints) {
            (Some(ds), Some(constraints)) => {
                let snapshot = constraints.clone();
                Some(evaluate(ds, &snapshot))
            }
            _ => None,
        };
    }

    /// Toggle a single region in the selection.
    pub fn toggle_region(&mut self, region: &str) {
        if let Some(c) = &mut self.constraints {
            if !c.selected_regions.remove(region) {
                c.selected_regions.insert(region.to_string());
            }
            self.refresh();
        }
    }

    /// Select every region.
    pub fn select_all(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let all = ds.regions.iter().cloned().collect();
        if let Some(c) = &mut self.constraints {
            c.selected_regions = all;
            self.refresh();
        }
    }

    /// Deselect every region.
    pub fn select_none(&mut self) {
        if let Some(c) = &mut self.constraints {
            c.selected_regions.clear();
            self.refresh();
        }
    }

    /// Put every slider back to its unconstrained position.
    pub fn reset_constraints(&mut self) {
        if let Some(ds) = &self.dataset {
            self.constraints = Some(ConstraintSet::unconstrained(ds));
            self.refresh();
        }
    }

    /// Rows matching the current constraints.
    pub fn matched(&self) -> usize {
        self.evaluation.as_ref().map_or(0, |e| e.matched)
    }
}
