// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use floorplan_model::SourceRange;

/// Text editor adapter handed to the sync bridge
///
/// The bridge never reads or writes text; it only asks the surface to show
/// ranges. Implementations wrap whatever editor widget hosts the source.
pub trait TextSurface {
    /// Map an index range onto the current document
    ///
    /// Returns `None` when the range no longer fits the text, for example
    /// while the index is stale after a failed parse.
    fn resolve_range(&self, range: SourceRange) -> Option<SourceRange> {
        Some(range)
    }

    /// Scroll so the range is visible and move the cursor to its start
    fn reveal(&mut self, range: SourceRange);

    /// Replace the persistent decorations marking selected entities
    fn set_selection_decorations(&mut self, ranges: &[SourceRange]);

    /// Show a short-lived emphasis on a range
    fn flash(&mut self, range: SourceRange);

    fn clear_flash(&mut self);
}

/// Surface for headless use, ignores every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl TextSurface for NullSurface {
    fn reveal(&mut self, _range: SourceRange) {}

    fn set_selection_decorations(&mut self, _ranges: &[SourceRange]) {}

    fn flash(&mut self, _range: SourceRange) {}

    fn clear_flash(&mut self) {}
}
