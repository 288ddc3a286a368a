use serde_json::json;
use webstacks::expr::{
    and, base64, condition, equals, find_in_map, fn_if, get_att, join, not, or, reference, sub,
    Value, AWS_REGION, AWS_STACK_NAME,
};
use webstacks::props;

#[test]
fn test_ref_serialization() {
    let value = reference("AssetsBucket");
    assert_eq!(serde_json::to_value(&value).unwrap(), json!({"Ref": "AssetsBucket"}));
}

#[test]
fn test_pseudo_parameter_ref() {
    let value = reference(AWS_STACK_NAME);
    assert_eq!(serde_json::to_value(&value).unwrap(), json!({"Ref": "AWS::StackName"}));
}

#[test]
fn test_get_att_serialization() {
    let value = get_att("DatabaseInstance", "Endpoint.Address");
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"Fn::GetAtt": ["DatabaseInstance", "Endpoint.Address"]})
    );
}

#[test]
fn test_join_serialization() {
    let value = join("-", vec![reference(AWS_STACK_NAME), "cache".into()]);
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"Fn::Join": ["-", [{"Ref": "AWS::StackName"}, "cache"]]})
    );
}

#[test]
fn test_nested_join() {
    let value = join("", vec!["https://*.".into(), reference("DomainName")]);
    let outer = join(",", vec![value, "other".into()]);
    assert_eq!(
        serde_json::to_value(&outer).unwrap(),
        json!({"Fn::Join": [",", [
            {"Fn::Join": ["", ["https://*.", {"Ref": "DomainName"}]]},
            "other",
        ]]})
    );
}

#[test]
fn test_if_serialization() {
    let value = fn_if("UsingRedis", reference("RedisCluster"), Value::NoValue);
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"Fn::If": ["UsingRedis", {"Ref": "RedisCluster"}, {"Ref": "AWS::NoValue"}]})
    );
}

#[test]
fn test_find_in_map_serialization() {
    let value = find_in_map("RdsEngineMap", reference("DatabaseEngine"), "Port");
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"Fn::FindInMap": ["RdsEngineMap", {"Ref": "DatabaseEngine"}, "Port"]})
    );
}

#[test]
fn test_condition_expressions() {
    let value = and(vec![
        equals(reference("DatabaseClass"), "(none)"),
        not(equals(reference("DatabaseEngine"), "")),
        or(vec![condition("UsingRedis"), condition("UsingMemcached")]),
    ]);
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"Fn::And": [
            {"Fn::Equals": [{"Ref": "DatabaseClass"}, "(none)"]},
            {"Fn::Not": [{"Fn::Equals": [{"Ref": "DatabaseEngine"}, ""]}]},
            {"Fn::Or": [{"Condition": "UsingRedis"}, {"Condition": "UsingMemcached"}]},
        ]})
    );
}

#[test]
fn test_not_wraps_operand_in_list() {
    let value = not(equals(reference("AMI"), ""));
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"Fn::Not": [{"Fn::Equals": [{"Ref": "AMI"}, ""]}]})
    );
}

#[test]
fn test_base64_and_sub() {
    let value = base64(sub("#!/bin/bash\necho ${AWS::StackName}\n"));
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"Fn::Base64": {"Fn::Sub": "#!/bin/bash\necho ${AWS::StackName}\n"}})
    );
}

#[test]
fn test_literals() {
    assert_eq!(serde_json::to_value(Value::from("plain")).unwrap(), json!("plain"));
    assert_eq!(serde_json::to_value(Value::from(true)).unwrap(), json!(true));
    assert_eq!(serde_json::to_value(Value::from(365)).unwrap(), json!(365));
}

#[test]
fn test_props_macro_mixes_literals_and_expressions() {
    let value = Value::Map(props! {
        "CidrBlock" => "10.0.0.0/16",
        "EnableDnsHostnames" => true,
        "AvailabilityZone" => join("", vec![reference(AWS_REGION), "a".into()]),
    });
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({
            "CidrBlock": "10.0.0.0/16",
            "EnableDnsHostnames": true,
            "AvailabilityZone": {"Fn::Join": ["", [{"Ref": "AWS::Region"}, "a"]]},
        })
    );
}
