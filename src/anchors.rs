use std::collections::BTreeMap;

use glam::Mat4;

use crate::tracking::{Anchor, AnchorId, ArDisplay};

/// Latest known transform of every anchor the display has reported.
#[derive(Debug, Default)]
pub struct AnchorManager {
    anchors: BTreeMap<AnchorId, Mat4>,
}

impl AnchorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains anchor updates from the display. Returns the updated anchors.
    pub fn update(&mut self, display: &mut dyn ArDisplay) -> Vec<Anchor> {
        let updated = display.take_updated_anchors();

        for anchor in &updated {
            let position = anchor.transform.w_axis.truncate();
            log::info!("Anchor {} updated at {}", anchor.id, position);
            self.anchors.insert(anchor.id, anchor.transform);
        }

        updated
    }

    /// Anchors ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (AnchorId, &Mat4)> + '_ {
        self.anchors.iter().map(|(id, transform)| (*id, transform))
    }
}
