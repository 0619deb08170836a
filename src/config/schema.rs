//! Configuration schema definitions

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::control::{ParamId, TapSettings};
use crate::error::ConfigError;

/// Main configuration for sirenbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SirenboxConfig {
    /// Where outbound messages go
    #[serde(default)]
    pub osc: OscConfig,

    /// Scheduler settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Tap tempo tuning
    #[serde(default)]
    pub tap: TapSettings,

    /// Continuous controls. Entries given in the file replace the built-in
    /// entry for that id, the rest keep their defaults.
    #[serde(default = "default_parameters", deserialize_with = "merge_parameters")]
    pub parameters: BTreeMap<ParamId, ParamConfig>,

    /// Outbound channels, in send order. A list given in the file replaces
    /// the built-in list entirely.
    #[serde(default = "default_outputs")]
    pub outputs: Vec<OutputConfig>,
}

impl Default for SirenboxConfig {
    fn default() -> Self {
        Self {
            osc: OscConfig::default(),
            engine: EngineConfig::default(),
            tap: TapSettings::default(),
            parameters: default_parameters(),
            outputs: default_outputs(),
        }
    }
}

impl SirenboxConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TICK_HZ..=MAX_TICK_HZ).contains(&self.engine.tick_hz) {
            return Err(ConfigError::InvalidTickRate(self.engine.tick_hz));
        }

        let tap = &self.tap;
        if !(tap.interval_min > 0.0 && tap.interval_min < tap.interval_max) {
            return Err(ConfigError::InvalidTapBand {
                min: tap.interval_min,
                max: tap.interval_max,
            });
        }
        if tap.history < 2 || tap.intervals < 2 {
            return Err(ConfigError::InvalidTapCapacity);
        }

        for id in ParamId::ALL {
            if !self.parameters.contains_key(&id) {
                return Err(ConfigError::MissingParameter(id.to_string()));
            }
        }

        for (id, param) in &self.parameters {
            param.validate(*id)?;
        }

        let mut seen = HashSet::new();
        for output in &self.outputs {
            output.validate()?;
            if !self.parameters.contains_key(&output.source) {
                return Err(ConfigError::UnknownSource {
                    address: output.address.clone(),
                    source_id: output.source.to_string(),
                });
            }
            if !seen.insert(output.address.trim_start_matches('/')) {
                return Err(ConfigError::DuplicateAddress(output.address.clone()));
            }
        }

        Ok(())
    }

    /// Tick period in seconds
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.engine.tick_hz)
    }
}

/// OSC destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscConfig {
    /// Host running the sound engine (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// UDP port (default: 57120, sclang)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 57120 }

/// Scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Control ticks per second (default: 120). Smoothing coefficients are
    /// tuned against this rate.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
        }
    }
}

fn default_tick_hz() -> f64 { 120.0 }

/// Accepted tick rates, Hz
pub const MIN_TICK_HZ: f64 = 1.0;
pub const MAX_TICK_HZ: f64 = 10_000.0;

/// One continuous control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamConfig {
    /// Value at startup
    pub default: f64,

    /// Hard lower bound
    pub min: f64,

    /// Hard upper bound
    pub max: f64,

    /// Smoothing coefficient per tick, in (0, 1] (default: 0.1)
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Increment for one key press (default: 0.01)
    #[serde(default = "default_step")]
    pub step: f64,

    /// Skip smoothing and send the target as-is
    #[serde(default)]
    pub instant: bool,
}

fn default_alpha() -> f64 { 0.1 }
fn default_step() -> f64 { 0.01 }

impl ParamConfig {
    fn new(default: f64, min: f64, max: f64, alpha: f64, step: f64) -> Self {
        Self {
            default,
            min,
            max,
            alpha,
            step,
            instant: false,
        }
    }

    fn unit(default: f64, alpha: f64) -> Self {
        Self::new(default, 0.0, 1.0, alpha, 0.01)
    }

    fn validate(&self, id: ParamId) -> Result<(), ConfigError> {
        for (field, value) in [("default", self.default), ("min", self.min), ("max", self.max)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue {
                    id: id.to_string(),
                    field,
                    value,
                });
            }
        }
        if !(self.min <= self.max) {
            return Err(ConfigError::InvertedRange {
                id: id.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::InvalidAlpha {
                id: id.to_string(),
                alpha: self.alpha,
            });
        }
        if !(self.step >= 0.0) {
            return Err(ConfigError::InvalidStep {
                id: id.to_string(),
                step: self.step,
            });
        }
        Ok(())
    }
}

/// How an output derives its value from its source parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputMap {
    /// Send the smoothed value itself (default)
    #[default]
    Direct,
    /// Map a 0..1 control geometrically into `[min, max]`
    Exponential { min: f64, max: f64 },
}

/// One outbound channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Message address, e.g. `siren/freq`
    pub address: String,

    /// Parameter the value is derived from
    pub source: ParamId,

    /// Mapping from the smoothed parameter to the sent value
    #[serde(default)]
    pub map: OutputMap,

    /// Minimum change worth a new message
    pub epsilon: f64,
}

impl OutputConfig {
    fn new(address: &str, source: ParamId, map: OutputMap, epsilon: f64) -> Self {
        Self {
            address: address.to_string(),
            source,
            map,
            epsilon,
        }
    }

    fn direct(address: &str, source: ParamId, epsilon: f64) -> Self {
        Self::new(address, source, OutputMap::Direct, epsilon)
    }

    fn exponential(address: &str, source: ParamId, min: f64, max: f64, epsilon: f64) -> Self {
        Self::new(address, source, OutputMap::Exponential { min, max }, epsilon)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim_start_matches('/').is_empty() {
            return Err(ConfigError::EmptyAddress);
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(ConfigError::InvalidEpsilon {
                address: self.address.clone(),
                epsilon: self.epsilon,
            });
        }
        if let OutputMap::Exponential { min, max } = self.map {
            if !(min > 0.0 && max > 0.0 && min.is_finite() && max.is_finite()) {
                return Err(ConfigError::NonPositiveExpRange {
                    address: self.address.clone(),
                    min,
                    max,
                });
            }
            if min > max {
                return Err(ConfigError::InvertedExpRange {
                    address: self.address.clone(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Built-in controls
pub fn default_parameters() -> BTreeMap<ParamId, ParamConfig> {
    let mut volume = ParamConfig::new(0.25, 0.0, 1.0, 1.0, 0.05);
    volume.instant = true;

    BTreeMap::from([
        (ParamId::DelayTime, ParamConfig::new(0.33, 0.03, 2.0, 0.06, 0.02)),
        (ParamId::Feedback, ParamConfig::new(0.55, 0.0, 0.92, 0.06, 0.03)),
        (ParamId::Volume, volume),
        (ParamId::Pitch, ParamConfig::unit(0.55, 0.10)),
        (ParamId::Rate, ParamConfig::unit(0.45, 0.12)),
        (ParamId::SirenDepth, ParamConfig::unit(0.55, 0.10)),
        (ParamId::AirDepth, ParamConfig::unit(0.60, 0.10)),
        (ParamId::BensTone, ParamConfig::unit(0.25, 0.12)),
        (ParamId::BensDrive, ParamConfig::unit(0.15, 0.12)),
    ])
}

/// Built-in outbound channels. Epsilons are hand-tuned per field.
pub fn default_outputs() -> Vec<OutputConfig> {
    use ParamId::*;

    vec![
        OutputConfig::direct("delay/time", DelayTime, 0.0005),
        OutputConfig::direct("delay/fb", Feedback, 0.0005),
        OutputConfig::direct("master/vol", Volume, 0.0005),
        OutputConfig::exponential("siren/freq", Pitch, 500.0, 5000.0, 1.0),
        OutputConfig::exponential("siren/rate", Rate, 0.05, 5.0, 0.01),
        OutputConfig::direct("siren/depth", SirenDepth, 0.003),
        OutputConfig::exponential("air/freq", Pitch, 200.0, 2000.0, 0.7),
        OutputConfig::exponential("air/rate", Rate, 0.05, 1.5, 0.005),
        OutputConfig::direct("air/depth", AirDepth, 0.003),
        OutputConfig::exponential("bens/freq", Pitch, 500.0, 5000.0, 1.0),
        OutputConfig::exponential("bens/rate", Rate, 0.5, 12.0, 0.01),
        OutputConfig::direct("bens/tone", BensTone, 0.003),
        OutputConfig::direct("bens/drive", BensDrive, 0.003),
    ]
}

fn merge_parameters<'de, D>(deserializer: D) -> Result<BTreeMap<ParamId, ParamConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<ParamId, ParamConfig>::deserialize(deserializer)?;
    let mut parameters = default_parameters();
    parameters.extend(overrides);
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SirenboxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.outputs.len(), 13);
        assert_eq!(config.parameters.len(), ParamId::ALL.len());
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config: SirenboxConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SirenboxConfig::default());
    }

    #[test]
    fn test_osc_config() {
        let yaml = r#"
osc:
  port: 4559
"#;
        let config: SirenboxConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.osc.host, "127.0.0.1"); // default
        assert_eq!(config.osc.port, 4559);
    }

    #[test]
    fn test_parameter_override_keeps_other_defaults() {
        let yaml = r#"
parameters:
  feedback:
    default: 0.3
    min: 0.0
    max: 0.8
    alpha: 0.2
"#;
        let config: SirenboxConfig = serde_yaml::from_str(yaml).unwrap();
        let fb = &config.parameters[&ParamId::Feedback];
        assert_eq!(fb.max, 0.8);
        assert_eq!(fb.step, 0.01); // field default
        assert_eq!(config.parameters[&ParamId::DelayTime].default, 0.33);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_config() {
        let yaml = r#"
address: siren/freq
source: pitch
map:
  kind: exponential
  min: 300
  max: 3000
epsilon: 0.5
"#;
        let output: OutputConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(output.source, ParamId::Pitch);
        assert_eq!(output.map, OutputMap::Exponential { min: 300.0, max: 3000.0 });
    }

    #[test]
    fn test_output_map_defaults_to_direct() {
        let yaml = "address: delay/fb\nsource: feedback\nepsilon: 0.001\n";
        let output: OutputConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(output.map, OutputMap::Direct);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut config = SirenboxConfig::default();
        if let Some(param) = config.parameters.get_mut(&ParamId::Feedback) {
            param.min = 1.0;
            param.max = 0.5;
        }
        assert!(matches!(config.validate(), Err(ConfigError::InvertedRange { .. })));
    }

    #[test]
    fn test_bad_alpha_is_rejected() {
        for alpha in [0.0, -0.1, 1.5, f64::NAN] {
            let mut config = SirenboxConfig::default();
            if let Some(param) = config.parameters.get_mut(&ParamId::Pitch) {
                param.alpha = alpha;
            }
            assert!(matches!(config.validate(), Err(ConfigError::InvalidAlpha { .. })));
        }
    }

    #[test]
    fn test_non_positive_exp_range_is_rejected() {
        let mut config = SirenboxConfig::default();
        config.outputs.push(OutputConfig::exponential("test/freq", ParamId::Pitch, 0.0, 100.0, 1.0));
        assert!(matches!(config.validate(), Err(ConfigError::NonPositiveExpRange { .. })));
    }

    #[test]
    fn test_inverted_exp_range_is_rejected() {
        let yaml = r#"
outputs:
  - { address: siren/freq, source: pitch, map: { kind: exponential, min: 5000, max: 500 }, epsilon: 1.0 }
"#;
        let config: SirenboxConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedExpRange {
                address: "siren/freq".to_string(),
                min: 5000.0,
                max: 500.0,
            })
        );

        let mut config = SirenboxConfig::default();
        config.outputs.push(OutputConfig::exponential("test/freq", ParamId::Pitch, 10.0, f64::INFINITY, 1.0));
        assert!(matches!(config.validate(), Err(ConfigError::NonPositiveExpRange { .. })));
    }

    #[test]
    fn test_non_finite_parameter_values_are_rejected() {
        let yaml = r#"
parameters:
  pitch:
    default: .nan
    min: 0.0
    max: 1.0
"#;
        let config: SirenboxConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteValue { field: "default", .. })
        ));

        let mut config = SirenboxConfig::default();
        if let Some(param) = config.parameters.get_mut(&ParamId::Feedback) {
            param.max = f64::INFINITY;
        }
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteValue { field: "max", .. })
        ));
    }

    #[test]
    fn test_duplicate_address_is_rejected() {
        let mut config = SirenboxConfig::default();
        config.outputs.push(OutputConfig::direct("/delay/time", ParamId::DelayTime, 0.001));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateAddress("/delay/time".to_string()))
        );
    }

    #[test]
    fn test_negative_epsilon_is_rejected() {
        let mut config = SirenboxConfig::default();
        config.outputs[0].epsilon = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidEpsilon { .. })));

        config.outputs[0].epsilon = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidEpsilon { .. })));
    }

    #[test]
    fn test_bad_tick_rate_is_rejected() {
        let mut config = SirenboxConfig::default();
        config.engine.tick_hz = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickRate(0.0)));

        for tick_hz in [1e-300, 0.5, 1e6, f64::INFINITY, f64::NAN] {
            config.engine.tick_hz = tick_hz;
            assert!(matches!(config.validate(), Err(ConfigError::InvalidTickRate(_))));
        }

        config.engine.tick_hz = MIN_TICK_HZ;
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_period(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_bad_tap_band_is_rejected() {
        let mut config = SirenboxConfig::default();
        config.tap.interval_min = 3.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTapBand { .. })));

        let mut config = SirenboxConfig::default();
        config.tap.intervals = 1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTapCapacity));
    }

    #[test]
    fn test_missing_parameter_is_rejected() {
        let mut config = SirenboxConfig::default();
        config.parameters.remove(&ParamId::Rate);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingParameter("rate".to_string()))
        );
    }

    #[test]
    fn test_tick_period() {
        let config = SirenboxConfig::default();
        let period = config.tick_period();
        assert!((period.as_secs_f64() - 1.0 / 120.0).abs() < 1e-9);
    }
}
