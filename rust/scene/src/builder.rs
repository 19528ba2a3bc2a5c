// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor/Scene Builder
//!
//! Turns a validated scene description into a [`SceneGraph`] plus a
//! [`MeshRegistry`]. Loading is all-or-nothing: the description is validated
//! first, then the previous scene is torn down completely, then every floor is
//! built bottom-up with the shafts of each floor passed to the one above.
//!
//! Floors are stacked along Y by the cumulative resolved floor height plus
//! `max_separation * exploded_factor` per level. Changing the factor only
//! rewrites floor group translations.

use crate::annotations::{room_annotations, DimensionAnnotation};
use crate::error::{BuildWarning, Error, Result, WarningKind};
use crate::floor::FloorBuilder;
use crate::graph::SceneGraph;
use crate::keys::NodeKey;
use crate::registry::MeshRegistry;
use crate::vertical::Penetration;
use floorplan_geometry::{ClippingProcessor, Vector3};
use floorplan_model::{resolve_height, LengthUnit, SceneDescription, StyleCatalog, StyleResolver};

/// Summary of one build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub floors: usize,
    pub rooms: usize,
    pub walls_rendered: usize,
    pub walls_suppressed: usize,
    /// Number of cutter applications across all wall pieces
    pub openings_cut: usize,
    pub warnings: Vec<BuildWarning>,
}

impl BuildReport {
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &BuildWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// Placement of one floor in the stack
#[derive(Debug, Clone)]
pub struct FloorLayout {
    pub id: String,
    pub index: usize,
    pub group: NodeKey,
    /// Resolved storey height used for stacking
    pub height: f64,
    /// Shafts received from the floor below
    pub penetrations: Vec<Penetration>,
}

/// A built floorplan: scene graph, registry and stacking state
#[derive(Debug)]
pub struct FloorplanScene {
    graph: SceneGraph,
    registry: MeshRegistry,
    floors: Vec<FloorLayout>,
    annotations: Vec<DimensionAnnotation>,
    exploded_factor: f64,
    max_separation: f64,
    unit: LengthUnit,
    generation: u64,
}

impl Default for FloorplanScene {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorplanScene {
    /// An empty scene
    pub fn new() -> Self {
        Self {
            graph: SceneGraph::new(),
            registry: MeshRegistry::new(),
            floors: Vec::new(),
            annotations: Vec::new(),
            exploded_factor: 0.0,
            max_separation: 0.0,
            unit: LengthUnit::default(),
            generation: 0,
        }
    }

    /// Build a scene, resolving styles from the description's own definitions
    pub fn from_description(description: &SceneDescription) -> Result<(Self, BuildReport)> {
        let catalog = StyleCatalog::from_definitions(&description.styles, description.config.theme);
        Self::build(description, &catalog)
    }

    /// Build a scene with an externally supplied style resolver
    pub fn build<R: StyleResolver + ?Sized>(
        description: &SceneDescription,
        resolver: &R,
    ) -> Result<(Self, BuildReport)> {
        let mut scene = Self::new();
        let report = scene.rebuild(description, resolver)?;
        Ok((scene, report))
    }

    /// Replace the whole scene with one built from `description`
    ///
    /// Validation runs before anything is torn down, so an invalid description
    /// leaves the current scene untouched.
    pub fn rebuild<R: StyleResolver + ?Sized>(
        &mut self,
        description: &SceneDescription,
        resolver: &R,
    ) -> Result<BuildReport> {
        description.validate()?;

        self.teardown();
        let report = self.populate(description, resolver);
        self.generation += 1;

        tracing::info!(
            floors = report.floors,
            rooms = report.rooms,
            walls = report.walls_rendered,
            suppressed = report.walls_suppressed,
            openings = report.openings_cut,
            warnings = report.warnings.len(),
            entities = self.registry.len(),
            "scene built"
        );
        Ok(report)
    }

    fn teardown(&mut self) {
        self.registry.clear();
        self.graph.clear();
        self.floors.clear();
        self.annotations.clear();
    }

    fn populate<R: StyleResolver + ?Sized>(
        &mut self,
        description: &SceneDescription,
        resolver: &R,
    ) -> BuildReport {
        let config = &description.config;
        let mut report = BuildReport::default();

        for connection in &description.connections {
            if description.connection_floor(connection).is_none() {
                let message = format!(
                    "connection {} does not belong to any floor",
                    connection.id()
                );
                tracing::warn!(connection = %connection.id(), "{}", message);
                report.warnings.push(
                    BuildWarning::new(WarningKind::MalformedReference, message)
                        .at(connection.source_range),
                );
            }
        }

        let mut below: Vec<Penetration> = Vec::new();
        let mut layouts = Vec::with_capacity(description.floors.len());
        {
            let mut builder = FloorBuilder {
                graph: &mut self.graph,
                registry: &mut self.registry,
                report: &mut report,
                description,
                resolver,
                clipper: ClippingProcessor::new(),
            };
            for (index, floor) in description.floors.iter().enumerate() {
                let output = builder.build_floor(floor, &below);
                layouts.push(FloorLayout {
                    id: floor.id.clone(),
                    index,
                    group: output.group,
                    height: resolve_height(None, floor.height, config),
                    penetrations: std::mem::take(&mut below),
                });
                below = output.penetrations;
            }
        }

        for floor in &description.floors {
            for room in &floor.rooms {
                self.annotations
                    .extend(room_annotations(floor, room, config));
            }
        }

        report.floors = layouts.len();
        self.floors = layouts;
        self.max_separation = config.max_exploded_separation();
        self.unit = config.unit;
        self.restack();
        report
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable graph access for visibility and highlight state
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn registry(&self) -> &MeshRegistry {
        &self.registry
    }

    pub fn floors(&self) -> &[FloorLayout] {
        &self.floors
    }

    pub fn floor(&self, id: &str) -> Option<&FloorLayout> {
        self.floors.iter().find(|f| f.id == id)
    }

    pub fn annotations(&self) -> &[DimensionAnnotation] {
        &self.annotations
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Incremented on every successful rebuild
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn exploded_factor(&self) -> f64 {
        self.exploded_factor
    }

    pub fn max_separation(&self) -> f64 {
        self.max_separation
    }

    /// Set the exploded-view factor (clamped to 0..=1) and restack the floors
    pub fn set_exploded_view(&mut self, factor: f64) {
        self.exploded_factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.restack();
    }

    fn restack(&mut self) {
        let separation = self.max_separation * self.exploded_factor;
        let mut y = 0.0;
        for layout in &self.floors {
            self.graph
                .set_translation(layout.group, Vector3::new(0.0, y, 0.0));
            y += layout.height + separation;
        }
    }

    /// Y offset of a floor group
    pub fn floor_offset(&self, id: &str) -> Option<f64> {
        self.floor(id)
            .and_then(|f| self.graph.node(f.group))
            .map(|node| node.translation.y)
    }

    pub fn set_floor_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        let group = self
            .floor(id)
            .map(|f| f.group)
            .ok_or_else(|| Error::UnknownFloor(id.to_string()))?;
        self.graph.set_visible(group, visible);
        Ok(())
    }

    pub fn is_floor_visible(&self, id: &str) -> Option<bool> {
        self.floor(id)
            .and_then(|f| self.graph.node(f.group))
            .map(|node| node.visible)
    }
}
