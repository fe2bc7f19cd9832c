//! CloudFormation intrinsic functions as JSON values.

use serde_json::{json, Value};

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn join(parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": ["", parts] })
}

pub fn sub(template: &str) -> Value {
    json!({ "Fn::Sub": template })
}

/// ARN pattern matching every object of a bucket: `<bucket-arn>/*`.
pub fn bucket_objects(bucket_id: &str) -> Value {
    join(vec![get_att(bucket_id, "Arn"), Value::from("/*")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_objects_appends_wildcard() {
        assert_eq!(
            bucket_objects("RawImageBucket"),
            json!({ "Fn::Join": ["", [{ "Fn::GetAtt": ["RawImageBucket", "Arn"] }, "/*"]] })
        );
    }
}
