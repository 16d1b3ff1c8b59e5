use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{AxisId, ElementId, FigureId, GridPosition};
use crate::error::{CaptureError, CaptureResult};
use crate::scene::{AxisFormatter, SceneElement, TickLabel};

/// Address of one rendered primitive inside an [`AxisScene`].
///
/// `part` selects a sub-primitive (bar patch, point, mesh cell, candle);
/// `None` addresses the whole element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementPath {
    pub element: usize,
    pub part: Option<usize>,
}

impl ElementPath {
    #[must_use]
    pub const fn whole(element: usize) -> Self {
        Self {
            element,
            part: None,
        }
    }

    #[must_use]
    pub const fn part(element: usize, part: usize) -> Self {
        Self {
            element,
            part: Some(part),
        }
    }
}

/// Highlight annotation: attaches an element id to one rendered primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTag {
    pub path: ElementPath,
    pub id: ElementId,
}

/// Snapshot of one rendered axis as handed over by the host adapter.
///
/// `elements` keeps the native draw order. `tags` holds highlight
/// annotations only; it never feeds back into geometry or style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScene {
    pub id: AxisId,
    pub figure: FigureId,
    pub grid: GridPosition,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub shared_x_label: Option<String>,
    pub legend_title: Option<String>,
    pub x_ticks: Vec<TickLabel>,
    pub y_ticks: Vec<TickLabel>,
    pub x_formatter: Option<AxisFormatter>,
    pub y_formatter: Option<AxisFormatter>,
    pub elements: Vec<SceneElement>,
    pub tags: IndexMap<ElementPath, ElementId>,
}

impl AxisScene {
    #[must_use]
    pub fn new(id: AxisId, figure: FigureId) -> Self {
        Self {
            id,
            figure,
            grid: GridPosition::default(),
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            shared_x_label: None,
            legend_title: None,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            x_formatter: None,
            y_formatter: None,
            elements: Vec::new(),
            tags: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_grid(mut self, grid: GridPosition) -> Self {
        self.grid = grid;
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: SceneElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn validate(&self) -> CaptureResult<()> {
        for element in &self.elements {
            if let SceneElement::ColorMesh(mesh) = element {
                mesh.validate()?;
            }
        }
        for path in self.tags.keys() {
            self.check_path(*path)?;
        }
        Ok(())
    }

    fn check_path(&self, path: ElementPath) -> CaptureResult<()> {
        let element = self.elements.get(path.element).ok_or_else(|| {
            CaptureError::InvalidData(format!(
                "element index {} out of range for axis {}",
                path.element, self.id
            ))
        })?;
        if let Some(part) = path.part {
            if part >= element.part_count() {
                return Err(CaptureError::InvalidData(format!(
                    "part {part} out of range for {} element {}",
                    element.kind(),
                    path.element
                )));
            }
        }
        Ok(())
    }

    /// Stores highlight tags. All paths are checked before any tag is written.
    pub fn apply_tags(&mut self, tags: &[ElementTag]) -> CaptureResult<()> {
        for tag in tags {
            self.check_path(tag.path)?;
        }
        for tag in tags {
            self.tags.insert(tag.path, tag.id.clone());
        }
        Ok(())
    }

    #[must_use]
    pub fn tag_for(&self, path: ElementPath) -> Option<&ElementId> {
        self.tags.get(&path)
    }

    /// Enumerates elements of one variant along with their native index.
    pub fn elements_of<'a, T: 'a>(
        &'a self,
        select: impl Fn(&'a SceneElement) -> Option<&'a T> + 'a,
    ) -> impl Iterator<Item = (usize, &'a T)> + 'a {
        self.elements
            .iter()
            .enumerate()
            .filter_map(move |(index, element)| select(element).map(|value| (index, value)))
    }
}
