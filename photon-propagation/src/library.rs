use crate::{deposit::Position, visibility::VisibilityProvider};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Invalid Library Document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Voxel grid axis {axis} has no steps")]
    EmptyAxis { axis: usize },
    #[error("Voxel grid axis {axis} has lower bound {lower} not below upper bound {upper}")]
    InvalidBounds { axis: usize, lower: f64, upper: f64 },
    #[error("Voxel grid with steps {steps:?} has more voxels than can be addressed")]
    GridTooLarge { steps: [usize; 3] },
    #[error("Library has {found} voxel entries, the grid has {expected}")]
    VoxelCount { expected: usize, found: usize },
    #[error("Voxel {voxel} has {found} visibilities, the library has {expected} channels")]
    ChannelCount {
        voxel: usize,
        expected: usize,
        found: usize,
    },
    #[error("Voxel {voxel} channel {channel} has visibility {value} outside [0, 1]")]
    VisibilityRange {
        voxel: usize,
        channel: usize,
        value: f64,
    },
}

/// A regular grid of voxels spanning `[lower, upper)` on each axis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VoxelGrid {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
    pub steps: [usize; 3],
}

impl VoxelGrid {
    /// `None` if the voxel count does not fit in a `usize`.
    pub fn num_voxels(&self) -> Option<usize> {
        self.steps
            .iter()
            .try_fold(1usize, |total, &steps| total.checked_mul(steps))
    }

    /// Checks the grid shape and returns its voxel count.
    fn validate(&self) -> Result<usize, LibraryError> {
        let axes = self.lower.iter().zip(&self.upper).zip(&self.steps);
        for (axis, ((&lower, &upper), &steps)) in axes.enumerate() {
            if steps == 0 {
                return Err(LibraryError::EmptyAxis { axis });
            }
            if !(lower < upper) {
                return Err(LibraryError::InvalidBounds { axis, lower, upper });
            }
        }
        self.num_voxels()
            .ok_or(LibraryError::GridTooLarge { steps: self.steps })
    }

    fn axis_index(&self, axis: usize, coordinate: f64) -> Option<usize> {
        let lower = *self.lower.get(axis)?;
        let upper = *self.upper.get(axis)?;
        let steps = *self.steps.get(axis)?;
        if !(lower..upper).contains(&coordinate) {
            return None;
        }
        let index = ((coordinate - lower) / (upper - lower) * steps as f64) as usize;
        // Guards against rounding up at the upper edge.
        Some(index.min(steps - 1))
    }

    /// Voxel containing `position`, numbered with x varying fastest.
    pub fn voxel_id(&self, position: &Position) -> Option<usize> {
        let [x, y, z] = position.as_array();
        let ix = self.axis_index(0, x)?;
        let iy = self.axis_index(1, y)?;
        let iz = self.axis_index(2, z)?;
        let [nx, ny, _] = self.steps;
        Some(ix + nx * (iy + ny * iz))
    }
}

/// Tabulated visibilities over a voxel grid.
/// Voxels without an entry have no data rather than zero visibility.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PhotonLibrary {
    num_channels: usize,
    voxels: VoxelGrid,
    visibilities: Vec<Option<Vec<f64>>>,
}

impl PhotonLibrary {
    pub fn new(
        num_channels: usize,
        voxels: VoxelGrid,
        visibilities: Vec<Option<Vec<f64>>>,
    ) -> Result<Self, LibraryError> {
        let library = Self {
            num_channels,
            voxels,
            visibilities,
        };
        library.validate()?;
        Ok(library)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, LibraryError> {
        let library: Self = serde_json::from_reader(reader)?;
        library.validate()?;
        debug!(
            "Loaded photon library with {} voxels and {} channels",
            library.visibilities.len(),
            library.num_channels
        );
        Ok(library)
    }

    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LibraryError> {
        let library = Self::from_reader(BufReader::new(File::open(path.as_ref())?))?;
        info!(
            "Photon library covers {} of {} voxels",
            library.mapped_voxels(),
            library.visibilities.len()
        );
        Ok(library)
    }

    pub fn mapped_voxels(&self) -> usize {
        self.visibilities.iter().flatten().count()
    }

    fn validate(&self) -> Result<(), LibraryError> {
        let num_voxels = self.voxels.validate()?;
        if self.visibilities.len() != num_voxels {
            return Err(LibraryError::VoxelCount {
                expected: num_voxels,
                found: self.visibilities.len(),
            });
        }
        for (voxel, entry) in self.visibilities.iter().enumerate() {
            let Some(entry) = entry else { continue };
            if entry.len() != self.num_channels {
                return Err(LibraryError::ChannelCount {
                    voxel,
                    expected: self.num_channels,
                    found: entry.len(),
                });
            }
            if let Some((channel, &value)) = entry
                .iter()
                .enumerate()
                .find(|(_, value)| !(0.0..=1.0).contains(*value))
            {
                return Err(LibraryError::VisibilityRange {
                    voxel,
                    channel,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl VisibilityProvider for PhotonLibrary {
    fn channel_count(&self) -> usize {
        self.num_channels
    }

    fn visibilities(&self, position: &Position) -> Option<&[f64]> {
        let voxel = self.voxels.voxel_id(position)?;
        self.visibilities.get(voxel)?.as_deref()
    }
}
