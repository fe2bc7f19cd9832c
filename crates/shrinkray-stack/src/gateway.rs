//! REST API methods backed by direct service integrations.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::intrinsics::{get_att, reference, sub};

/// Target of an `AWS` integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationTarget {
    /// Query-protocol action, e.g. `sns:action/Subscribe`.
    Action { service: String, action: String },
    /// Path-style request, e.g. `s3:path/{bucket}/{filename}`.
    Path { service: String, path: String },
}

impl IntegrationTarget {
    pub fn uri(&self) -> Value {
        let suffix = match self {
            IntegrationTarget::Action { service, action } => format!("{}:action/{}", service, action),
            IntegrationTarget::Path { service, path } => format!("{}:path/{}", service, path),
        };
        sub(&format!(
            "arn:${{AWS::Partition}}:apigateway:${{AWS::Region}}:{}",
            suffix
        ))
    }
}

#[derive(Debug, Clone)]
pub struct IntegrationSpec {
    pub target: IntegrationTarget,
    pub http_method: String,
    /// Logical id of the role the gateway assumes for the call.
    pub credentials_role: String,
    pub request_parameters: BTreeMap<String, Value>,
    pub request_templates: BTreeMap<String, Value>,
    pub passthrough_behavior: Option<String>,
    /// `application/json` body returned on a 200 from the service.
    pub success_template: String,
}

impl IntegrationSpec {
    fn to_json(&self) -> Value {
        let mut integration = json!({
            "Type": "AWS",
            "IntegrationHttpMethod": self.http_method,
            "Uri": self.target.uri(),
            "Credentials": get_att(&self.credentials_role, "Arn"),
            "IntegrationResponses": [{
                "StatusCode": "200",
                "ResponseTemplates": { "application/json": self.success_template }
            }]
        });

        if !self.request_parameters.is_empty() {
            integration["RequestParameters"] = to_object(&self.request_parameters);
        }
        if !self.request_templates.is_empty() {
            integration["RequestTemplates"] = to_object(&self.request_templates);
        }
        if let Some(behavior) = &self.passthrough_behavior {
            integration["PassthroughBehavior"] = Value::from(behavior.as_str());
        }
        integration
    }
}

/// A path segment under the API root or another resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    pub logical_id: String,
    /// `None` for a child of the root resource.
    pub parent: Option<String>,
    pub path_part: String,
}

impl ResourceSpec {
    pub fn to_resource(&self, api_id: &str) -> Value {
        let parent = match &self.parent {
            Some(parent) => reference(parent),
            None => get_att(api_id, "RootResourceId"),
        };
        json!({
            "Type": "AWS::ApiGateway::Resource",
            "Properties": {
                "RestApiId": reference(api_id),
                "ParentId": parent,
                "PathPart": self.path_part
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub logical_id: String,
    pub resource: String,
    pub http_method: String,
    pub request_parameters: BTreeMap<String, bool>,
    pub request_models: BTreeMap<String, String>,
    pub integration: IntegrationSpec,
}

impl MethodSpec {
    pub fn to_resource(&self, api_id: &str) -> Value {
        let mut properties = json!({
            "RestApiId": reference(api_id),
            "ResourceId": reference(&self.resource),
            "HttpMethod": self.http_method,
            "AuthorizationType": "NONE",
            "Integration": self.integration.to_json(),
            "MethodResponses": [{ "StatusCode": "200" }]
        });

        if !self.request_parameters.is_empty() {
            properties["RequestParameters"] = json!(self.request_parameters);
        }
        if !self.request_models.is_empty() {
            properties["RequestModels"] = json!(self.request_models);
        }

        json!({ "Type": "AWS::ApiGateway::Method", "Properties": properties })
    }
}

fn to_object(map: &BTreeMap<String, Value>) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Map<_, _>>())
}
