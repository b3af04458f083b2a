use crate::engine::interactions::contacts::ContactType;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Failed to load parameters from '{path}': {message}")]
    Load { path: PathBuf, message: String },
    #[error("Failed to parse parameters: {0}")]
    Parse(String),
}

pub mod defaults {
    pub const MAX_HYDROPHOBIC_DIST: f64 = 4.0;

    pub const MAX_HBOND_DIST: f64 = 3.5;
    pub const MAX_HBOND_SULFUR_DIST: f64 = 4.1;
    pub const MAX_HBOND_ACC_ANGLE: f64 = 45.0;
    pub const MAX_HBOND_DON_ANGLE: f64 = 45.0;
    pub const MAX_HBOND_ACC_PLANE_ANGLE: f64 = 90.0;
    pub const MAX_HBOND_DON_PLANE_ANGLE: f64 = 30.0;

    pub const MAX_PI_STACKING_DIST: f64 = 5.5;
    pub const MAX_PI_STACKING_OFFSET: f64 = 2.0;
    pub const MAX_PI_STACKING_ANGLE: f64 = 30.0;
    pub const MAX_CATION_PI_DIST: f64 = 6.0;
    pub const MAX_CATION_PI_OFFSET: f64 = 2.0;
    pub const MAX_IONIC_DIST: f64 = 5.0;

    pub const MAX_HALOGEN_BOND_DIST: f64 = 4.0;
    pub const MAX_HALOGEN_BOND_ANGLE: f64 = 30.0;

    pub const MAX_METAL_DIST: f64 = 3.0;
    pub const MAX_METAL_COORDINATION: usize = 6;

    pub const LINE_OF_SIGHT_DIST_FACTOR: f64 = 1.0;
}

/// Thresholds and switches for contact detection and refinement.
///
/// Distances are in Angstrom and angles in degrees. Every field has a default,
/// so a TOML file only needs the values it changes:
///
/// ```toml
/// max-hbond-dist = 3.2
/// weak-hydrogen-bond = true
/// master-model-index = 0
/// ```
///
/// The enable flags select which contact types are reported; detection and
/// refinement always run on every family so refinement decisions do not depend
/// on what is displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct ContactParams {
    pub hydrophobic: bool,
    pub hydrogen_bond: bool,
    pub weak_hydrogen_bond: bool,
    pub water_hydrogen_bond: bool,
    pub backbone_hydrogen_bond: bool,
    pub halogen_bond: bool,
    pub ionic_interaction: bool,
    pub metal_coordination: bool,
    pub cation_pi: bool,
    pub pi_stacking: bool,

    pub max_hydrophobic_dist: f64,

    pub max_hbond_dist: f64,
    pub max_hbond_sulfur_dist: f64,
    pub max_hbond_acc_angle: f64,
    pub max_hbond_don_angle: f64,
    pub max_hbond_acc_plane_angle: f64,
    pub max_hbond_don_plane_angle: f64,

    pub max_pi_stacking_dist: f64,
    pub max_pi_stacking_offset: f64,
    pub max_pi_stacking_angle: f64,
    pub max_cation_pi_dist: f64,
    pub max_cation_pi_offset: f64,
    pub max_ionic_dist: f64,

    pub max_halogen_bond_dist: f64,
    pub max_halogen_bond_angle: f64,

    pub max_metal_dist: f64,
    pub max_metal_coordination: usize,

    pub refine_salt_bridges: bool,
    /// Contacts between different models are only kept when exactly one side
    /// belongs to this model. A negative value in a file means "none".
    #[serde(
        deserialize_with = "deserialize_model_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub master_model_index: Option<usize>,
    pub line_of_sight_dist_factor: f64,
}

fn deserialize_model_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(value.and_then(|v| usize::try_from(v).ok()))
}

impl Default for ContactParams {
    fn default() -> Self {
        use defaults::*;
        Self {
            hydrophobic: true,
            hydrogen_bond: true,
            weak_hydrogen_bond: false,
            water_hydrogen_bond: false,
            backbone_hydrogen_bond: false,
            halogen_bond: true,
            ionic_interaction: true,
            metal_coordination: true,
            cation_pi: true,
            pi_stacking: true,

            max_hydrophobic_dist: MAX_HYDROPHOBIC_DIST,

            max_hbond_dist: MAX_HBOND_DIST,
            max_hbond_sulfur_dist: MAX_HBOND_SULFUR_DIST,
            max_hbond_acc_angle: MAX_HBOND_ACC_ANGLE,
            max_hbond_don_angle: MAX_HBOND_DON_ANGLE,
            max_hbond_acc_plane_angle: MAX_HBOND_ACC_PLANE_ANGLE,
            max_hbond_don_plane_angle: MAX_HBOND_DON_PLANE_ANGLE,

            max_pi_stacking_dist: MAX_PI_STACKING_DIST,
            max_pi_stacking_offset: MAX_PI_STACKING_OFFSET,
            max_pi_stacking_angle: MAX_PI_STACKING_ANGLE,
            max_cation_pi_dist: MAX_CATION_PI_DIST,
            max_cation_pi_offset: MAX_CATION_PI_OFFSET,
            max_ionic_dist: MAX_IONIC_DIST,

            max_halogen_bond_dist: MAX_HALOGEN_BOND_DIST,
            max_halogen_bond_angle: MAX_HALOGEN_BOND_ANGLE,

            max_metal_dist: MAX_METAL_DIST,
            max_metal_coordination: MAX_METAL_COORDINATION,

            refine_salt_bridges: true,
            master_model_index: None,
            line_of_sight_dist_factor: LINE_OF_SIGHT_DIST_FACTOR,
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("expected a positive distance, got {value}"),
        })
    }
}

fn angle(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("expected an angle between 0 and 180 degrees, got {value}"),
        })
    }
}

impl ContactParams {
    /// Parses parameters from TOML text and validates them.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let params: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Reads and validates a TOML parameter file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse(message) => ConfigError::Load {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Serializes the parameters as TOML, e.g. to write a template file.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Whether contacts of this type are reported.
    pub fn is_enabled(&self, contact_type: ContactType) -> bool {
        match contact_type {
            ContactType::Hydrophobic => self.hydrophobic,
            ContactType::HydrogenBond => self.hydrogen_bond,
            ContactType::WeakHydrogenBond => self.weak_hydrogen_bond,
            ContactType::WaterHydrogenBond => self.water_hydrogen_bond,
            ContactType::BackboneHydrogenBond => self.backbone_hydrogen_bond,
            ContactType::HalogenBond => self.halogen_bond,
            ContactType::IonicInteraction => self.ionic_interaction,
            ContactType::MetalCoordination => self.metal_coordination,
            ContactType::CationPi => self.cation_pi,
            ContactType::PiStacking => self.pi_stacking,
            ContactType::Unknown => false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max-hydrophobic-dist", self.max_hydrophobic_dist)?;
        positive("max-hbond-dist", self.max_hbond_dist)?;
        positive("max-hbond-sulfur-dist", self.max_hbond_sulfur_dist)?;
        angle("max-hbond-acc-angle", self.max_hbond_acc_angle)?;
        angle("max-hbond-don-angle", self.max_hbond_don_angle)?;
        angle("max-hbond-acc-plane-angle", self.max_hbond_acc_plane_angle)?;
        angle("max-hbond-don-plane-angle", self.max_hbond_don_plane_angle)?;
        positive("max-pi-stacking-dist", self.max_pi_stacking_dist)?;
        positive("max-pi-stacking-offset", self.max_pi_stacking_offset)?;
        angle("max-pi-stacking-angle", self.max_pi_stacking_angle)?;
        positive("max-cation-pi-dist", self.max_cation_pi_dist)?;
        positive("max-cation-pi-offset", self.max_cation_pi_offset)?;
        positive("max-ionic-dist", self.max_ionic_dist)?;
        positive("max-halogen-bond-dist", self.max_halogen_bond_dist)?;
        angle("max-halogen-bond-angle", self.max_halogen_bond_angle)?;
        positive("max-metal-dist", self.max_metal_dist)?;
        positive("line-of-sight-dist-factor", self.line_of_sight_dist_factor)?;
        if self.max_metal_coordination == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max-metal-coordination",
                reason: "at least one coordination partner must be allowed".to_string(),
            });
        }
        Ok(())
    }
}

/// Starts from [`ContactParams::default`] and overrides selected values.
#[derive(Default)]
pub struct ContactParamsBuilder {
    base: Option<ContactParams>,
    max_hydrophobic_dist: Option<f64>,
    max_hbond_dist: Option<f64>,
    max_hbond_sulfur_dist: Option<f64>,
    max_ionic_dist: Option<f64>,
    max_pi_stacking_dist: Option<f64>,
    max_cation_pi_dist: Option<f64>,
    max_halogen_bond_dist: Option<f64>,
    max_metal_dist: Option<f64>,
    max_metal_coordination: Option<usize>,
    refine_salt_bridges: Option<bool>,
    master_model_index: Option<Option<usize>>,
    line_of_sight_dist_factor: Option<f64>,
    weak_hydrogen_bond: Option<bool>,
    water_hydrogen_bond: Option<bool>,
    backbone_hydrogen_bond: Option<bool>,
}

impl ContactParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `params` instead of the defaults as the starting point.
    pub fn from_params(params: ContactParams) -> Self {
        Self {
            base: Some(params),
            ..Self::default()
        }
    }

    pub fn max_hydrophobic_dist(mut self, dist: f64) -> Self {
        self.max_hydrophobic_dist = Some(dist);
        self
    }
    pub fn max_hbond_dist(mut self, dist: f64) -> Self {
        self.max_hbond_dist = Some(dist);
        self
    }
    pub fn max_hbond_sulfur_dist(mut self, dist: f64) -> Self {
        self.max_hbond_sulfur_dist = Some(dist);
        self
    }
    pub fn max_ionic_dist(mut self, dist: f64) -> Self {
        self.max_ionic_dist = Some(dist);
        self
    }
    pub fn max_pi_stacking_dist(mut self, dist: f64) -> Self {
        self.max_pi_stacking_dist = Some(dist);
        self
    }
    pub fn max_cation_pi_dist(mut self, dist: f64) -> Self {
        self.max_cation_pi_dist = Some(dist);
        self
    }
    pub fn max_halogen_bond_dist(mut self, dist: f64) -> Self {
        self.max_halogen_bond_dist = Some(dist);
        self
    }
    pub fn max_metal_dist(mut self, dist: f64) -> Self {
        self.max_metal_dist = Some(dist);
        self
    }
    pub fn max_metal_coordination(mut self, limit: usize) -> Self {
        self.max_metal_coordination = Some(limit);
        self
    }
    pub fn refine_salt_bridges(mut self, enabled: bool) -> Self {
        self.refine_salt_bridges = Some(enabled);
        self
    }
    pub fn master_model_index(mut self, model: Option<usize>) -> Self {
        self.master_model_index = Some(model);
        self
    }
    pub fn line_of_sight_dist_factor(mut self, factor: f64) -> Self {
        self.line_of_sight_dist_factor = Some(factor);
        self
    }
    pub fn weak_hydrogen_bond(mut self, enabled: bool) -> Self {
        self.weak_hydrogen_bond = Some(enabled);
        self
    }
    pub fn water_hydrogen_bond(mut self, enabled: bool) -> Self {
        self.water_hydrogen_bond = Some(enabled);
        self
    }
    pub fn backbone_hydrogen_bond(mut self, enabled: bool) -> Self {
        self.backbone_hydrogen_bond = Some(enabled);
        self
    }

    pub fn build(self) -> Result<ContactParams, ConfigError> {
        let mut params = self.base.unwrap_or_default();
        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    params.$field = value;
                })*
            };
        }
        apply!(
            max_hydrophobic_dist,
            max_hbond_dist,
            max_hbond_sulfur_dist,
            max_ionic_dist,
            max_pi_stacking_dist,
            max_cation_pi_dist,
            max_halogen_bond_dist,
            max_metal_dist,
            max_metal_coordination,
            refine_salt_bridges,
            master_model_index,
            line_of_sight_dist_factor,
            weak_hydrogen_bond,
            water_hydrogen_bond,
            backbone_hydrogen_bond,
        );
        params.validate()?;
        Ok(params)
    }
}
