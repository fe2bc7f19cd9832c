//! IAM roles and inline policy statements.

use serde::Serialize;
use serde_json::{json, Value};

use crate::intrinsics::sub;

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicePrincipal {
    Lambda,
    ApiGateway,
    S3,
}

impl ServicePrincipal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServicePrincipal::Lambda => "lambda.amazonaws.com",
            ServicePrincipal::ApiGateway => "apigateway.amazonaws.com",
            ServicePrincipal::S3 => "s3.amazonaws.com",
        }
    }
}

/// An `Allow` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyStatement {
    #[serde(rename = "Effect")]
    effect: &'static str,
    #[serde(rename = "Action")]
    pub actions: Vec<String>,
    #[serde(rename = "Resource")]
    pub resources: Vec<Value>,
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resources: Vec<Value>) -> Self {
        Self {
            effect: "Allow",
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoleSpec {
    pub logical_id: String,
    pub principal: ServicePrincipal,
    /// AWS managed policy names, e.g. `service-role/AWSLambdaBasicExecutionRole`.
    pub managed_policies: Vec<String>,
    pub statements: Vec<PolicyStatement>,
}

impl RoleSpec {
    pub fn new(logical_id: impl Into<String>, principal: ServicePrincipal) -> Self {
        Self {
            logical_id: logical_id.into(),
            principal,
            managed_policies: Vec::new(),
            statements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_managed_policy(mut self, name: &str) -> Self {
        self.managed_policies.push(name.to_string());
        self
    }

    #[must_use]
    pub fn with_statement(mut self, statement: PolicyStatement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Every action granted by the inline policy, in declaration order.
    pub fn actions(&self) -> Vec<&str> {
        self.statements
            .iter()
            .flat_map(|s| s.actions.iter().map(String::as_str))
            .collect()
    }

    pub fn to_resource(&self) -> Value {
        let mut properties = json!({
            "AssumeRolePolicyDocument": {
                "Version": POLICY_VERSION,
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": self.principal.as_str() },
                    "Action": "sts:AssumeRole"
                }]
            },
            "Policies": [{
                "PolicyName": format!("{}Policy", self.logical_id),
                "PolicyDocument": {
                    "Version": POLICY_VERSION,
                    "Statement": self.statements
                }
            }]
        });

        if !self.managed_policies.is_empty() {
            let arns: Vec<Value> = self
                .managed_policies
                .iter()
                .map(|name| sub(&format!("arn:${{AWS::Partition}}:iam::aws:policy/{}", name)))
                .collect();
            properties["ManagedPolicyArns"] = Value::Array(arns);
        }

        json!({ "Type": "AWS::IAM::Role", "Properties": properties })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_serializes_with_iam_field_names() {
        let statement = PolicyStatement::allow(&["sns:Publish"], vec![json!("arn:topic")]);
        assert_eq!(
            serde_json::to_value(&statement).unwrap(),
            json!({ "Effect": "Allow", "Action": ["sns:Publish"], "Resource": ["arn:topic"] })
        );
    }

    #[test]
    fn managed_policies_use_partition() {
        let role = RoleSpec::new("Role", ServicePrincipal::Lambda)
            .with_managed_policy("service-role/AWSLambdaBasicExecutionRole");
        let resource = role.to_resource();
        assert_eq!(
            resource["Properties"]["ManagedPolicyArns"][0],
            json!({ "Fn::Sub": "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole" })
        );
        assert_eq!(
            resource["Properties"]["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"],
            "lambda.amazonaws.com"
        );
    }

    #[test]
    fn role_without_managed_policies_omits_the_key() {
        let resource = RoleSpec::new("Role", ServicePrincipal::ApiGateway).to_resource();
        assert!(resource["Properties"].get("ManagedPolicyArns").is_none());
    }
}
