use crate::error::SimError;
use crate::species::StageConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vital statistics a creature can carry. Declaration order is the update order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    Health,
    Satiety,
}

impl ParameterKind {
    pub fn default_rule(&self) -> UpdateRule {
        match self {
            ParameterKind::Health => UpdateRule::StarveBelow {
                source: ParameterKind::Satiety,
                step: 0.5,
            },
            ParameterKind::Satiety => UpdateRule::Decrement { step: 1.0 },
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Health => write!(f, "Health"),
            ParameterKind::Satiety => write!(f, "Satiety"),
        }
    }
}

/// Per-tick rule applied to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum UpdateRule {
    /// Lose `step` every tick.
    Decrement { step: f64 },
    /// Lose `step` while `source` sits below a quarter of its stage template's `min + max`.
    StarveBelow { source: ParameterKind, step: f64 },
}

/// Declared starting value and bounds of a parameter for one maturity stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTemplate {
    pub kind: ParameterKind,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<UpdateRule>,
}

impl ParameterTemplate {
    pub fn new(kind: ParameterKind, value: f64, min: f64, max: f64) -> Self {
        Self {
            kind,
            value,
            min,
            max,
            rule: None,
        }
    }

    pub fn with_rule(mut self, rule: UpdateRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule.unwrap_or_else(|| self.kind.default_rule())
    }

    /// Value below which a dependent parameter starts to suffer.
    pub fn critical_threshold(&self) -> f64 {
        (self.min + self.max) / 4.0
    }

    pub fn instantiate(&self) -> Result<Parameter, SimError> {
        Parameter::new(self.kind, self.value, self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    kind: ParameterKind,
    value: f64,
    min: f64,
    max: f64,
}

impl Parameter {
    pub fn new(kind: ParameterKind, value: f64, min: f64, max: f64) -> Result<Self, SimError> {
        for number in [value, min, max] {
            if !number.is_finite() {
                return Err(SimError::InvalidParameterType {
                    kind,
                    found: number.to_string(),
                });
            }
        }
        if min > max || value < min || value > max {
            return Err(SimError::InvalidParameterValue {
                kind,
                value,
                min,
                max,
            });
        }

        Ok(Self {
            kind,
            value,
            min,
            max,
        })
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Stores `value` clamped into the current range.
    pub fn set_value(&mut self, value: f64) -> Result<(), SimError> {
        if !value.is_finite() {
            return Err(SimError::InvalidParameterType {
                kind: self.kind,
                found: value.to_string(),
            });
        }
        self.store_clamped(value);
        Ok(())
    }

    /// Same as [`Parameter::set_value`] for values arriving as loose JSON.
    pub fn set_value_json(&mut self, value: &serde_json::Value) -> Result<(), SimError> {
        match value.as_f64() {
            Some(number) => self.set_value(number),
            None => Err(SimError::InvalidParameterType {
                kind: self.kind,
                found: value.to_string(),
            }),
        }
    }

    pub fn add(&mut self, delta: f64) {
        self.store_clamped(self.value + delta);
    }

    /// Replaces the bounds and pulls the current value back inside them.
    pub fn rebound(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
        self.store_clamped(self.value);
    }

    /// Raw value this parameter would take after one tick, before clamping.
    fn decayed_value(&self, rule: UpdateRule, vitals: &Vitals, stage: &StageConfig) -> f64 {
        match rule {
            UpdateRule::Decrement { step } => self.value - step,
            UpdateRule::StarveBelow { source, step } => {
                let threshold = match stage.template(source) {
                    Some(template) => template.critical_threshold(),
                    None => return self.value,
                };
                match vitals.value(source) {
                    Some(current) if current < threshold => self.value - step,
                    _ => self.value,
                }
            }
        }
    }

    fn store_clamped(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
    }
}

/// The live parameters of one creature, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Vitals {
    params: Vec<Parameter>,
}

impl Vitals {
    pub fn from_templates(templates: &[ParameterTemplate]) -> Result<Self, SimError> {
        let params = templates
            .iter()
            .map(ParameterTemplate::instantiate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { params })
    }

    pub fn get(&self, kind: ParameterKind) -> Option<&Parameter> {
        self.params.iter().find(|p| p.kind == kind)
    }

    pub fn get_mut(&mut self, kind: ParameterKind) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.kind == kind)
    }

    pub fn value(&self, kind: ParameterKind) -> Option<f64> {
        self.get(kind).map(Parameter::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Applies every parameter's stage rule once, in declaration order.
    /// Later parameters observe the already-updated values of earlier ones.
    pub fn update(&mut self, stage: &StageConfig) {
        for idx in 0..self.params.len() {
            let kind = self.params[idx].kind;
            let rule = stage
                .template(kind)
                .map(ParameterTemplate::rule)
                .unwrap_or_else(|| kind.default_rule());
            let next = {
                let vitals: &Vitals = self;
                vitals.params[idx].decayed_value(rule, vitals, stage)
            };
            self.params[idx].store_clamped(next);
        }
    }

    /// Moves every parameter onto the bounds declared by `stage`.
    pub fn rebound_to(&mut self, stage: &StageConfig) {
        for template in &stage.parameters {
            if let Some(param) = self.get_mut(template.kind) {
                param.rebound(template.min, template.max);
            }
        }
    }
}
