//! A small typed model of a CloudFormation template.
//!
//! Resource properties are modelled as plain serde structs implementing
//! [`CfnResource`]; the template stores them as JSON so resources of any type
//! can live in one map. Maps are ordered so the rendered template is stable
//! from run to run.

use crate::utils::error::{AlertError, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Ties a property struct to its CloudFormation resource type.
pub trait CfnResource: Serialize {
    const TYPE: &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,
}

impl Parameter {
    pub fn string(description: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            parameter_type: "String".to_string(),
            description: description.into(),
            default: Some(default.into()),
            allowed_pattern: None,
        }
    }

    pub fn with_allowed_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.allowed_pattern = Some(pattern.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: BTreeMap<String, Value>,
    pub resources: BTreeMap<String, Resource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: description.into(),
            parameters: BTreeMap::new(),
            conditions: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn add_parameter(&mut self, logical_id: &str, parameter: Parameter) -> Result<()> {
        self.ensure_unused(logical_id)?;
        self.parameters.insert(logical_id.to_string(), parameter);
        Ok(())
    }

    pub fn add_resource<R: CfnResource>(
        &mut self,
        logical_id: &str,
        properties: &R,
    ) -> Result<&mut Resource> {
        self.ensure_unused(logical_id)?;
        let resource = Resource {
            resource_type: R::TYPE.to_string(),
            properties: serde_json::to_value(properties)?,
            depends_on: Vec::new(),
        };
        Ok(self
            .resources
            .entry(logical_id.to_string())
            .or_insert(resource))
    }

    /// Declares a named condition, e.g. `Fn::Not`/`Fn::Equals` over a
    /// parameter.
    pub fn add_condition(&mut self, name: &str, expression: Value) -> Result<()> {
        self.ensure_unused(name)?;
        self.conditions.insert(name.to_string(), expression);
        Ok(())
    }

    pub fn add_output(&mut self, logical_id: &str, value: Value, description: &str) -> Result<()> {
        self.insert_output(logical_id, value, description, None)
    }

    /// An output that only exists when `condition` holds at deploy time.
    pub fn add_conditional_output(
        &mut self,
        logical_id: &str,
        value: Value,
        description: &str,
        condition: &str,
    ) -> Result<()> {
        self.insert_output(logical_id, value, description, Some(condition.to_string()))
    }

    fn insert_output(
        &mut self,
        logical_id: &str,
        value: Value,
        description: &str,
        condition: Option<String>,
    ) -> Result<()> {
        if self.outputs.contains_key(logical_id) {
            return Err(AlertError::TemplateError {
                message: format!("Duplicate output '{}'", logical_id),
            });
        }
        self.outputs.insert(
            logical_id.to_string(),
            Output {
                value,
                description: description.to_string(),
                condition,
            },
        );
        Ok(())
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }

    /// Checks that every `Ref`, `Fn::GetAtt`, `DependsOn` and condition name
    /// points at something declared in this template. Pseudo parameters
    /// (`AWS::*`) always resolve.
    pub fn validate_references(&self) -> Result<()> {
        let mut targets = Vec::new();
        for expression in self.conditions.values() {
            collect_references(expression, &mut targets);
        }
        for resource in self.resources.values() {
            collect_references(&resource.properties, &mut targets);
            for dependency in &resource.depends_on {
                targets.push(Target::Resource(dependency.clone()));
            }
        }
        for output in self.outputs.values() {
            collect_references(&output.value, &mut targets);
            if let Some(condition) = &output.condition {
                targets.push(Target::Condition(condition.clone()));
            }
        }

        for target in targets {
            let resolved = match &target {
                Target::Ref(id) => {
                    id.starts_with("AWS::")
                        || self.resources.contains_key(id)
                        || self.parameters.contains_key(id)
                }
                Target::Resource(id) => self.resources.contains_key(id),
                Target::Condition(name) => self.conditions.contains_key(name),
            };
            if !resolved {
                return Err(AlertError::TemplateError {
                    message: format!("Reference to undeclared {}", target),
                });
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        self.validate_references()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn ensure_unused(&self, logical_id: &str) -> Result<()> {
        if logical_id.is_empty() || !logical_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AlertError::TemplateError {
                message: format!("Logical id '{}' must be non-empty and alphanumeric", logical_id),
            });
        }
        if self.resources.contains_key(logical_id)
            || self.parameters.contains_key(logical_id)
            || self.conditions.contains_key(logical_id)
        {
            return Err(AlertError::TemplateError {
                message: format!("Duplicate logical id '{}'", logical_id),
            });
        }
        Ok(())
    }
}

enum Target {
    /// `Ref`: a parameter, a resource or a pseudo parameter.
    Ref(String),
    /// `Fn::GetAtt` and `DependsOn` only work on resources.
    Resource(String),
    Condition(String),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Ref(id) | Target::Resource(id) => write!(f, "logical id '{}'", id),
            Target::Condition(name) => write!(f, "condition '{}'", name),
        }
    }
}

fn collect_references(value: &Value, out: &mut Vec<Target>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(target)) = map.get("Ref") {
                    out.push(Target::Ref(target.clone()));
                    return;
                }
                if let Some(Value::Array(parts)) = map.get("Fn::GetAtt") {
                    if let Some(Value::String(target)) = parts.first() {
                        out.push(Target::Resource(target.clone()));
                    }
                    return;
                }
                if let Some(Value::Array(parts)) = map.get("Fn::If") {
                    if let Some(Value::String(condition)) = parts.first() {
                        out.push(Target::Condition(condition.clone()));
                    }
                    for branch in parts.iter().skip(1) {
                        collect_references(branch, out);
                    }
                    return;
                }
                if let Some(Value::String(condition)) = map.get("Condition") {
                    out.push(Target::Condition(condition.clone()));
                    return;
                }
            }
            for nested in map.values() {
                collect_references(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

pub fn cfn_ref(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn sub(template: &str) -> Value {
    json!({ "Fn::Sub": template })
}

pub fn if_condition(condition: &str, when_true: Value, when_false: Value) -> Value {
    json!({ "Fn::If": [condition, when_true, when_false] })
}

/// True when the string parameter `parameter` is not empty.
pub fn parameter_is_set(parameter: &str) -> Value {
    json!({ "Fn::Not": [{ "Fn::Equals": [cfn_ref(parameter), ""] }] })
}

pub fn no_value() -> Value {
    cfn_ref("AWS::NoValue")
}
