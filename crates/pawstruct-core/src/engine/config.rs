use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lower distance bound separating an atom from itself when centers and neighbors come from
/// the same set. Expressed in the caller's length unit, so callers working in anything other
/// than Ångström or bohr should override it.
pub const DEFAULT_SELF_EXCLUSION: f64 = 0.01;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Failed to read configuration file '{path}': {message}", path = path.display())]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

fn positive_length(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("expected a finite positive length, got {value}"),
        })
    }
}

fn self_exclusion_below(value: f64, cutoff: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 && value < cutoff {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name: "self_exclusion",
            reason: format!("expected 0 <= value < {cutoff}, got {value}"),
        })
    }
}

/// Distance window `self_exclusion < d < cutoff` used by the radial, angular and neighbor
/// collectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborCriterion {
    cutoff: f64,
    self_exclusion: f64,
}

impl NeighborCriterion {
    pub fn new(cutoff: f64) -> Result<Self, ConfigError> {
        let cutoff = positive_length("cutoff", cutoff)?;
        Ok(Self {
            cutoff,
            self_exclusion: self_exclusion_below(DEFAULT_SELF_EXCLUSION, cutoff)?,
        })
    }

    pub fn with_self_exclusion(self, self_exclusion: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            self_exclusion: self_exclusion_below(self_exclusion, self.cutoff)?,
            ..self
        })
    }

    #[inline]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    #[inline]
    pub fn self_exclusion(&self) -> f64 {
        self.self_exclusion
    }

    #[inline]
    pub fn accepts(&self, distance: f64) -> bool {
        self.self_exclusion < distance && distance < self.cutoff
    }
}

/// Geometric hydrogen-bond criterion.
///
/// A donor, acceptor and hydrogen form a bond when the donor–acceptor distance lies inside
/// `(self_exclusion, heavy_cutoff)`, both heavy–hydrogen distances are below
/// `hydrogen_cutoff`, and the donor–H···acceptor angle at the hydrogen exceeds
/// `angle_threshold` degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HbondCriterion {
    heavy_cutoff: f64,
    hydrogen_cutoff: f64,
    angle_threshold: f64,
    self_exclusion: f64,
}

impl HbondCriterion {
    #[inline]
    pub fn heavy_cutoff(&self) -> f64 {
        self.heavy_cutoff
    }

    #[inline]
    pub fn hydrogen_cutoff(&self) -> f64 {
        self.hydrogen_cutoff
    }

    #[inline]
    pub fn angle_threshold(&self) -> f64 {
        self.angle_threshold
    }

    #[inline]
    pub fn self_exclusion(&self) -> f64 {
        self.self_exclusion
    }

    #[inline]
    pub fn accepts_heavy_pair(&self, distance: f64) -> bool {
        self.self_exclusion < distance && distance < self.heavy_cutoff
    }

    #[inline]
    pub fn accepts_hydrogen(&self, distance: f64) -> bool {
        distance < self.hydrogen_cutoff
    }
}

#[derive(Default)]
pub struct HbondCriterionBuilder {
    heavy_cutoff: Option<f64>,
    hydrogen_cutoff: Option<f64>,
    angle_threshold: Option<f64>,
    self_exclusion: Option<f64>,
}

impl HbondCriterionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heavy_cutoff(mut self, cutoff: f64) -> Self {
        self.heavy_cutoff = Some(cutoff);
        self
    }
    pub fn hydrogen_cutoff(mut self, cutoff: f64) -> Self {
        self.hydrogen_cutoff = Some(cutoff);
        self
    }
    pub fn angle_threshold(mut self, degrees: f64) -> Self {
        self.angle_threshold = Some(degrees);
        self
    }
    pub fn self_exclusion(mut self, distance: f64) -> Self {
        self.self_exclusion = Some(distance);
        self
    }

    pub fn build(self) -> Result<HbondCriterion, ConfigError> {
        let heavy_cutoff = positive_length(
            "heavy_cutoff",
            self.heavy_cutoff
                .ok_or(ConfigError::MissingParameter("heavy_cutoff"))?,
        )?;
        let hydrogen_cutoff = positive_length(
            "hydrogen_cutoff",
            self.hydrogen_cutoff
                .ok_or(ConfigError::MissingParameter("hydrogen_cutoff"))?,
        )?;
        let angle_threshold = self
            .angle_threshold
            .ok_or(ConfigError::MissingParameter("angle_threshold"))?;
        if !(0.0..=180.0).contains(&angle_threshold) {
            return Err(ConfigError::InvalidParameter {
                name: "angle_threshold",
                reason: format!("expected degrees within [0, 180], got {angle_threshold}"),
            });
        }
        let self_exclusion = self_exclusion_below(
            self.self_exclusion.unwrap_or(DEFAULT_SELF_EXCLUSION),
            heavy_cutoff,
        )?;

        Ok(HbondCriterion {
            heavy_cutoff,
            hydrogen_cutoff,
            angle_threshold,
            self_exclusion,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FileNeighborConfig {
    cutoff: Option<f64>,
    self_exclusion: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FileHbondConfig {
    heavy_cutoff: Option<f64>,
    hydrogen_cutoff: Option<f64>,
    angle_threshold: Option<f64>,
    self_exclusion: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FileAnalysisConfig {
    self_exclusion: Option<f64>,
    radial: Option<FileNeighborConfig>,
    angular: Option<FileNeighborConfig>,
    hbonds: Option<FileHbondConfig>,
}

/// Criteria preset loaded from a TOML file.
///
/// ```toml
/// self-exclusion = 0.01
///
/// [radial]
/// cutoff = 6.0
///
/// [angular]
/// cutoff = 3.3
///
/// [hbonds]
/// heavy-cutoff = 3.5
/// hydrogen-cutoff = 2.5
/// angle-threshold = 150.0
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    pub radial: Option<NeighborCriterion>,
    pub angular: Option<NeighborCriterion>,
    pub hbonds: Option<HbondCriterion>,
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: FileAnalysisConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let shared_exclusion = file.self_exclusion.unwrap_or(DEFAULT_SELF_EXCLUSION);

        let neighbor = |table: FileNeighborConfig| -> Result<NeighborCriterion, ConfigError> {
            let cutoff = table.cutoff.ok_or(ConfigError::MissingParameter("cutoff"))?;
            NeighborCriterion::new(cutoff)?
                .with_self_exclusion(table.self_exclusion.unwrap_or(shared_exclusion))
        };

        let hbonds = file
            .hbonds
            .map(|table| {
                let mut builder = HbondCriterionBuilder::new()
                    .self_exclusion(table.self_exclusion.unwrap_or(shared_exclusion));
                if let Some(v) = table.heavy_cutoff {
                    builder = builder.heavy_cutoff(v);
                }
                if let Some(v) = table.hydrogen_cutoff {
                    builder = builder.hydrogen_cutoff(v);
                }
                if let Some(v) = table.angle_threshold {
                    builder = builder.angle_threshold(v);
                }
                builder.build()
            })
            .transpose()?;

        Ok(Self {
            radial: file.radial.map(neighbor).transpose()?,
            angular: file.angular.map(neighbor).transpose()?,
            hbonds,
        })
    }
}
