//! Infrastructure definition for the image pipeline.
//!
//! The stack is modeled as plain data and synthesized to a CloudFormation
//! template; nothing here talks to AWS.

pub mod gateway;
pub mod iam;
pub mod intrinsics;
pub mod props;
pub mod stack;

pub use gateway::{IntegrationSpec, IntegrationTarget, MethodSpec, ResourceSpec};
pub use iam::{PolicyStatement, RoleSpec, ServicePrincipal};
pub use props::{StackError, StackProps};
pub use stack::{ids, ImagePipelineStack};
