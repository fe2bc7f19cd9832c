//! The image pipeline stack
//!
//! Raw bucket -> queue -> resize function -> processed bucket + topic, fronted
//! by a REST API that writes straight to the buckets and subscribes emails to
//! the topic.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::gateway::{IntegrationSpec, IntegrationTarget, MethodSpec, ResourceSpec};
use crate::iam::{PolicyStatement, RoleSpec, ServicePrincipal};
use crate::intrinsics::{bucket_objects, get_att, reference, sub};
use crate::props::StackProps;

/// Logical ids of the stack's resources, parameters and outputs.
pub mod ids {
    pub const RAW_BUCKET: &str = "RawImageBucket";
    pub const PROCESSED_BUCKET: &str = "ResizedImageBucket";
    pub const TOPIC: &str = "ImageResizeTopic";
    pub const QUEUE: &str = "ImageResizeQueue";
    pub const QUEUE_POLICY: &str = "ImageResizeQueuePolicy";
    pub const HANDLER_ROLE: &str = "LambdaExecutionRole";
    pub const GATEWAY_ROLE: &str = "ApiGatewayServiceRole";
    pub const HANDLER: &str = "ImageResizeHandler";
    pub const EVENT_SOURCE: &str = "ImageResizeHandlerQueueSource";
    pub const API: &str = "ImageUploadApi";
    pub const SUBSCRIBE_RESOURCE: &str = "SubscribeResource";
    pub const SUBSCRIBE_METHOD: &str = "SubscribeMethod";
    pub const UPLOAD_RESOURCE: &str = "UploadImageResource";
    pub const UPLOAD_BUCKET_RESOURCE: &str = "UploadImageBucketResource";
    pub const UPLOAD_FILENAME_RESOURCE: &str = "UploadImageFilenameResource";
    pub const UPLOAD_METHOD: &str = "UploadImageMethod";
    pub const DEPLOYMENT: &str = "ImageUploadApiDeployment";
    pub const STAGE: &str = "ImageUploadApiStage";
    pub const CODE_BUCKET_PARAM: &str = "HandlerCodeBucket";
    pub const CODE_KEY_PARAM: &str = "HandlerCodeKey";
    pub const SUBSCRIBE_URL_OUTPUT: &str = "SubscribeMethodUrl";
    pub const UPLOAD_URL_OUTPUT: &str = "UploadImageMethodUrl";
}

pub const SUBSCRIBE_RESPONSE_TEMPLATE: &str = r#"{"Message":"Subscription request has been sent."}"#;
pub const UPLOAD_RESPONSE_TEMPLATE: &str =
    r#"{"Message": "Image was uploaded successfully. Make sure to subscribe to receive the image link."}"#;

const HANDLER_RUNTIME: &str = "provided.al2023";
const HANDLER_ENTRY: &str = "bootstrap";
const HANDLER_MANAGED_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";
const TEMPLATE_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone)]
pub struct QueueSpec {
    pub visibility_timeout_secs: u32,
}

#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub runtime: String,
    pub handler: String,
    pub timeout_secs: u32,
    pub memory_mb: u32,
    /// Environment variable name to value (an intrinsic).
    pub environment: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct EventSourceSpec {
    pub batch_size: u32,
}

#[derive(Debug, Clone)]
pub struct RestApiSpec {
    pub name: String,
    pub description: String,
    pub binary_media_types: Vec<String>,
    pub stage_name: String,
    pub resources: Vec<ResourceSpec>,
    pub methods: Vec<MethodSpec>,
}

/// Declarative model of the pipeline. Building it has no side effects;
/// [`ImagePipelineStack::synth`] renders the CloudFormation template.
#[derive(Debug, Clone)]
pub struct ImagePipelineStack {
    pub description: String,
    pub queue: QueueSpec,
    pub handler_role: RoleSpec,
    pub gateway_role: RoleSpec,
    pub function: FunctionSpec,
    pub event_source: EventSourceSpec,
    pub api: RestApiSpec,
}

impl ImagePipelineStack {
    pub fn new(props: StackProps) -> Self {
        let handler_role = RoleSpec::new(ids::HANDLER_ROLE, ServicePrincipal::Lambda)
            .with_managed_policy(HANDLER_MANAGED_POLICY)
            .with_statement(PolicyStatement::allow(
                &["s3:GetObject", "s3:PutObject", "s3:DeleteObject"],
                vec![
                    bucket_objects(ids::RAW_BUCKET),
                    bucket_objects(ids::PROCESSED_BUCKET),
                ],
            ))
            .with_statement(PolicyStatement::allow(
                &["sns:Publish"],
                vec![reference(ids::TOPIC)],
            ))
            .with_statement(PolicyStatement::allow(
                &[
                    "sqs:ReceiveMessage",
                    "sqs:DeleteMessage",
                    "sqs:GetQueueAttributes",
                    "sqs:ChangeMessageVisibility",
                ],
                vec![get_att(ids::QUEUE, "Arn")],
            ));

        let gateway_role = RoleSpec::new(ids::GATEWAY_ROLE, ServicePrincipal::ApiGateway)
            .with_statement(PolicyStatement::allow(
                &["s3:PutObject"],
                vec![
                    bucket_objects(ids::RAW_BUCKET),
                    bucket_objects(ids::PROCESSED_BUCKET),
                ],
            ))
            .with_statement(PolicyStatement::allow(
                &["sns:Publish", "sns:Subscribe"],
                vec![reference(ids::TOPIC)],
            ));

        let mut environment = BTreeMap::new();
        environment.insert(
            "PROCESSED_BUCKET_NAME".to_string(),
            reference(ids::PROCESSED_BUCKET),
        );
        environment.insert("SNS_TOPIC_ARN".to_string(), reference(ids::TOPIC));

        let function = FunctionSpec {
            runtime: HANDLER_RUNTIME.to_string(),
            handler: HANDLER_ENTRY.to_string(),
            timeout_secs: props.function_timeout_secs,
            memory_mb: props.function_memory_mb,
            environment,
        };

        let api = RestApiSpec {
            name: props.rest_api_name,
            description: "Service for uploading and processing images.".to_string(),
            binary_media_types: props.binary_media_types,
            stage_name: props.stage_name,
            resources: api_resources(),
            methods: vec![subscribe_method(), upload_method()],
        };

        Self {
            description: props.description,
            queue: QueueSpec {
                visibility_timeout_secs: props.queue_visibility_timeout_secs,
            },
            handler_role,
            gateway_role,
            function,
            event_source: EventSourceSpec {
                batch_size: props.batch_size,
            },
            api,
        }
    }

    pub fn method(&self, logical_id: &str) -> Option<&MethodSpec> {
        self.api.methods.iter().find(|m| m.logical_id == logical_id)
    }

    /// Render the CloudFormation template.
    pub fn synth(&self) -> Value {
        let mut resources = Map::new();

        resources.insert(ids::RAW_BUCKET.to_string(), self.raw_bucket());
        resources.insert(
            ids::PROCESSED_BUCKET.to_string(),
            json!({ "Type": "AWS::S3::Bucket" }),
        );
        resources.insert(ids::TOPIC.to_string(), json!({ "Type": "AWS::SNS::Topic" }));
        resources.insert(
            ids::QUEUE.to_string(),
            json!({
                "Type": "AWS::SQS::Queue",
                "Properties": { "VisibilityTimeout": self.queue.visibility_timeout_secs }
            }),
        );
        resources.insert(ids::QUEUE_POLICY.to_string(), queue_policy());
        resources.insert(ids::HANDLER_ROLE.to_string(), self.handler_role.to_resource());
        resources.insert(ids::GATEWAY_ROLE.to_string(), self.gateway_role.to_resource());
        resources.insert(ids::HANDLER.to_string(), self.handler_function());
        resources.insert(
            ids::EVENT_SOURCE.to_string(),
            json!({
                "Type": "AWS::Lambda::EventSourceMapping",
                "Properties": {
                    "BatchSize": self.event_source.batch_size,
                    "EventSourceArn": get_att(ids::QUEUE, "Arn"),
                    "FunctionName": reference(ids::HANDLER)
                }
            }),
        );

        resources.insert(
            ids::API.to_string(),
            json!({
                "Type": "AWS::ApiGateway::RestApi",
                "Properties": {
                    "Name": self.api.name,
                    "Description": self.api.description,
                    "BinaryMediaTypes": self.api.binary_media_types
                }
            }),
        );
        for resource in &self.api.resources {
            resources.insert(resource.logical_id.clone(), resource.to_resource(ids::API));
        }
        for method in &self.api.methods {
            resources.insert(method.logical_id.clone(), method.to_resource(ids::API));
        }

        let method_ids: Vec<&str> = self
            .api
            .methods
            .iter()
            .map(|m| m.logical_id.as_str())
            .collect();
        resources.insert(
            ids::DEPLOYMENT.to_string(),
            json!({
                "Type": "AWS::ApiGateway::Deployment",
                "DependsOn": method_ids,
                "Properties": { "RestApiId": reference(ids::API) }
            }),
        );
        resources.insert(
            ids::STAGE.to_string(),
            json!({
                "Type": "AWS::ApiGateway::Stage",
                "Properties": {
                    "RestApiId": reference(ids::API),
                    "DeploymentId": reference(ids::DEPLOYMENT),
                    "StageName": self.api.stage_name
                }
            }),
        );

        json!({
            "AWSTemplateFormatVersion": TEMPLATE_VERSION,
            "Description": self.description,
            "Parameters": {
                ids::CODE_BUCKET_PARAM: {
                    "Type": "String",
                    "Description": "Bucket holding the handler deployment package"
                },
                ids::CODE_KEY_PARAM: {
                    "Type": "String",
                    "Description": "Key of the handler deployment package (zip with a bootstrap binary)"
                }
            },
            "Resources": resources,
            "Outputs": self.outputs()
        })
    }

    fn raw_bucket(&self) -> Value {
        json!({
            "Type": "AWS::S3::Bucket",
            "DependsOn": [ids::QUEUE_POLICY],
            "Properties": {
                "NotificationConfiguration": {
                    "QueueConfigurations": [{
                        "Event": "s3:ObjectCreated:*",
                        "Queue": get_att(ids::QUEUE, "Arn")
                    }]
                }
            }
        })
    }

    fn handler_function(&self) -> Value {
        json!({
            "Type": "AWS::Lambda::Function",
            "Properties": {
                "Runtime": self.function.runtime,
                "Handler": self.function.handler,
                "Timeout": self.function.timeout_secs,
                "MemorySize": self.function.memory_mb,
                "Role": get_att(ids::HANDLER_ROLE, "Arn"),
                "Code": {
                    "S3Bucket": reference(ids::CODE_BUCKET_PARAM),
                    "S3Key": reference(ids::CODE_KEY_PARAM)
                },
                "Environment": { "Variables": self.function.environment }
            }
        })
    }

    fn outputs(&self) -> Value {
        let base = format!(
            "https://${{{}}}.execute-api.${{AWS::Region}}.${{AWS::URLSuffix}}/{}/",
            ids::API,
            self.api.stage_name
        );
        json!({
            ids::SUBSCRIBE_URL_OUTPUT: {
                "Description": "URL for the subscribe method",
                "Value": sub(&format!("{}subscribe", base))
            },
            ids::UPLOAD_URL_OUTPUT: {
                "Description": "URL for the image upload method",
                "Value": sub(&format!("{}upload-image/${{{}}}/{{filename}}", base, ids::RAW_BUCKET))
            }
        })
    }
}

/// Lets the storage service deliver object-created notifications to the
/// queue. Scoped by source account: scoping by the raw bucket's ARN would make
/// the bucket and the policy depend on each other.
fn queue_policy() -> Value {
    json!({
        "Type": "AWS::SQS::QueuePolicy",
        "Properties": {
            "Queues": [reference(ids::QUEUE)],
            "PolicyDocument": {
                "Version": crate::iam::POLICY_VERSION,
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": ServicePrincipal::S3.as_str() },
                    "Action": "sqs:SendMessage",
                    "Resource": get_att(ids::QUEUE, "Arn"),
                    "Condition": {
                        "StringEquals": { "aws:SourceAccount": reference("AWS::AccountId") }
                    }
                }]
            }
        }
    })
}

fn api_resources() -> Vec<ResourceSpec> {
    vec![
        ResourceSpec {
            logical_id: ids::SUBSCRIBE_RESOURCE.to_string(),
            parent: None,
            path_part: "subscribe".to_string(),
        },
        ResourceSpec {
            logical_id: ids::UPLOAD_RESOURCE.to_string(),
            parent: None,
            path_part: "upload-image".to_string(),
        },
        ResourceSpec {
            logical_id: ids::UPLOAD_BUCKET_RESOURCE.to_string(),
            parent: Some(ids::UPLOAD_RESOURCE.to_string()),
            path_part: "{bucket}".to_string(),
        },
        ResourceSpec {
            logical_id: ids::UPLOAD_FILENAME_RESOURCE.to_string(),
            parent: Some(ids::UPLOAD_BUCKET_RESOURCE.to_string()),
            path_part: "{filename}".to_string(),
        },
    ]
}

fn subscribe_method() -> MethodSpec {
    let mut request_parameters = BTreeMap::new();
    request_parameters.insert(
        "integration.request.querystring.Endpoint".to_string(),
        Value::from("method.request.body.email"),
    );
    request_parameters.insert(
        "integration.request.querystring.Protocol".to_string(),
        Value::from("'email'"),
    );
    request_parameters.insert(
        "integration.request.querystring.TopicArn".to_string(),
        sub(&format!("'${{{}}}'", ids::TOPIC)),
    );

    let mut request_templates = BTreeMap::new();
    request_templates.insert(
        "application/json".to_string(),
        sub(&format!(
            r#"{{"Endpoint": "$input.path('$.email')", "Protocol": "email", "TopicArn": "${{{}}}"}}"#,
            ids::TOPIC
        )),
    );

    MethodSpec {
        logical_id: ids::SUBSCRIBE_METHOD.to_string(),
        resource: ids::SUBSCRIBE_RESOURCE.to_string(),
        http_method: "POST".to_string(),
        request_parameters: BTreeMap::new(),
        request_models: BTreeMap::new(),
        integration: IntegrationSpec {
            target: IntegrationTarget::Action {
                service: "sns".to_string(),
                action: "Subscribe".to_string(),
            },
            http_method: "POST".to_string(),
            credentials_role: ids::GATEWAY_ROLE.to_string(),
            request_parameters,
            request_templates,
            passthrough_behavior: None,
            success_template: SUBSCRIBE_RESPONSE_TEMPLATE.to_string(),
        },
    }
}

fn upload_method() -> MethodSpec {
    let mut method_parameters = BTreeMap::new();
    method_parameters.insert("method.request.path.bucket".to_string(), true);
    method_parameters.insert("method.request.path.filename".to_string(), true);

    let mut request_models = BTreeMap::new();
    request_models.insert("image/jpeg".to_string(), "Empty".to_string());

    let mut request_parameters = BTreeMap::new();
    request_parameters.insert(
        "integration.request.path.bucket".to_string(),
        Value::from("method.request.path.bucket"),
    );
    request_parameters.insert(
        "integration.request.path.filename".to_string(),
        Value::from("method.request.path.filename"),
    );

    MethodSpec {
        logical_id: ids::UPLOAD_METHOD.to_string(),
        resource: ids::UPLOAD_FILENAME_RESOURCE.to_string(),
        http_method: "PUT".to_string(),
        request_parameters: method_parameters,
        request_models,
        integration: IntegrationSpec {
            target: IntegrationTarget::Path {
                service: "s3".to_string(),
                path: "{bucket}/{filename}".to_string(),
            },
            http_method: "PUT".to_string(),
            credentials_role: ids::GATEWAY_ROLE.to_string(),
            request_parameters,
            request_templates: BTreeMap::new(),
            passthrough_behavior: Some("WHEN_NO_MATCH".to_string()),
            success_template: UPLOAD_RESPONSE_TEMPLATE.to_string(),
        },
    }
}
