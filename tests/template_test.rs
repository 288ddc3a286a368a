use serde_json::json;
use webstacks::expr::{equals, reference};
use webstacks::props;
use webstacks::template::{Output, Parameter, Resource, Template};

fn parameter(name: &str) -> Parameter {
    Parameter {
        description: Some(format!("{} parameter", name)),
        default: Some(String::new()),
        ..Parameter::new(name, "String")
    }
}

#[test]
fn test_add_parameter_returns_ref() {
    let mut template = Template::new();
    let value = template.add_parameter(parameter("DomainName"), None, None);
    assert_eq!(serde_json::to_value(&value).unwrap(), json!({"Ref": "DomainName"}));
    assert!(template.parameters.contains_key("DomainName"));
}

#[test]
fn test_interface_group_ordering() {
    let mut template = Template::new();
    template.set_group_order(["Global", "Database", "Cache"]);
    // "Cache" is listed but never used; "Load Balancer" is used but unlisted
    template.add_parameter(parameter("DatabaseName"), Some("Database"), None);
    template.add_parameter(parameter("SecretKey"), Some("Global"), None);
    template.add_parameter(parameter("WebWorkerPort"), Some("Load Balancer"), None);
    template.add_parameter(parameter("DatabaseUser"), Some("Database"), None);

    let rendered = template.to_value();
    let groups = &rendered["Metadata"]["AWS::CloudFormation::Interface"]["ParameterGroups"];
    let labels: Vec<&str> =
        groups.as_array().unwrap().iter().map(|g| g["Label"]["default"].as_str().unwrap()).collect();
    // listed groups first in listed order, then unlisted in first-use order
    assert_eq!(labels, vec!["Global", "Database", "Load Balancer"]);

    let database_members = &groups[1]["Parameters"];
    assert_eq!(*database_members, json!(["DatabaseName", "DatabaseUser"]));
}

#[test]
fn test_unused_listed_group_dropped() {
    let mut template = Template::new();
    template.set_group_order(["Global", "Database"]);
    template.add_parameter(parameter("DatabaseName"), Some("Database"), None);
    template.add_parameter(parameter("CacheNodeType"), Some("Cache"), None);

    let rendered = template.to_value();
    let groups = &rendered["Metadata"]["AWS::CloudFormation::Interface"]["ParameterGroups"];
    let labels: Vec<&str> =
        groups.as_array().unwrap().iter().map(|g| g["Label"]["default"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["Database", "Cache"]);
}

#[test]
fn test_unlisted_groups_follow_first_use_order() {
    let mut template = Template::new();
    template.add_parameter(parameter("B1"), Some("Beta"), None);
    template.add_parameter(parameter("A1"), Some("Alpha"), None);
    template.add_parameter(parameter("B2"), Some("Beta"), None);

    let rendered = template.to_value();
    let groups = &rendered["Metadata"]["AWS::CloudFormation::Interface"]["ParameterGroups"];
    let labels: Vec<&str> =
        groups.as_array().unwrap().iter().map(|g| g["Label"]["default"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["Beta", "Alpha"]);
}

#[test]
fn test_parameter_labels() {
    let mut template = Template::new();
    template.add_parameter(parameter("KeyName"), Some("Application Server"), Some("SSH Key Name"));

    let rendered = template.to_value();
    let labels = &rendered["Metadata"]["AWS::CloudFormation::Interface"]["ParameterLabels"];
    assert_eq!(*labels, json!({"KeyName": {"default": "SSH Key Name"}}));
}

#[test]
fn test_duplicate_names_last_write_wins() {
    let mut template = Template::new();
    template.add_resource(Resource {
        properties: props! {"CidrBlock" => "10.0.0.0/16"},
        ..Resource::new("Vpc", "AWS::EC2::VPC")
    });
    template.add_resource(Resource {
        properties: props! {"CidrBlock" => "172.16.0.0/16"},
        ..Resource::new("Vpc", "AWS::EC2::VPC")
    });

    assert_eq!(template.resources.len(), 1);
    let rendered = template.to_value();
    assert_eq!(rendered["Resources"]["Vpc"]["Properties"]["CidrBlock"], json!("172.16.0.0/16"));
}

#[test]
fn test_empty_sections_omitted() {
    let template = Template::new();
    let rendered = template.to_value();

    assert_eq!(rendered["AWSTemplateFormatVersion"], json!("2010-09-09"));
    assert!(rendered.get("Parameters").is_none());
    assert!(rendered.get("Conditions").is_none());
    assert!(rendered.get("Mappings").is_none());
    assert!(rendered.get("Outputs").is_none());
    // Resources and Metadata are always present
    assert_eq!(rendered["Resources"], json!({}));
    assert!(rendered.get("Metadata").is_some());
}

#[test]
fn test_resource_rendering() {
    let mut template = Template::new();
    template.add_condition("HasDatabase", equals(reference("DatabaseClass"), "(none)"));
    template.add_resource(Resource {
        condition: Some("HasDatabase".to_string()),
        deletion_policy: Some("Snapshot".to_string()),
        depends_on: vec!["Vpc".to_string()],
        properties: props! {"AllocatedStorage" => "20"},
        ..Resource::new("DatabaseInstance", "AWS::RDS::DBInstance")
    });

    let rendered = template.to_value();
    let resource = &rendered["Resources"]["DatabaseInstance"];
    assert_eq!(resource["Type"], json!("AWS::RDS::DBInstance"));
    assert_eq!(resource["Condition"], json!("HasDatabase"));
    assert_eq!(resource["DeletionPolicy"], json!("Snapshot"));
    assert_eq!(resource["DependsOn"], json!(["Vpc"]));
    assert_eq!(resource["Properties"]["AllocatedStorage"], json!("20"));
}

#[test]
fn test_conditional_output() {
    let mut template = Template::new();
    template.add_output(Output::conditional(
        "DatabaseURL",
        "Database connection string",
        reference("DatabaseInstance"),
        "HasDatabase",
    ));

    let rendered = template.to_value();
    assert_eq!(rendered["Outputs"]["DatabaseURL"]["Condition"], json!("HasDatabase"));
}

#[test]
fn test_no_echo_only_rendered_when_set() {
    let mut template = Template::new();
    template.add_parameter(
        Parameter { no_echo: true, ..Parameter::new("DatabasePassword", "String") },
        None,
        None,
    );
    template.add_parameter(Parameter::new("DatabaseUser", "String"), None, None);

    let rendered = template.to_value();
    assert_eq!(rendered["Parameters"]["DatabasePassword"]["NoEcho"], json!(true));
    assert!(rendered["Parameters"]["DatabaseUser"].get("NoEcho").is_none());
}

#[test]
fn test_serialization_is_idempotent() {
    let mut template = Template::new();
    template.set_group_order(["Global"]);
    template.add_parameter(parameter("SecretKey"), Some("Global"), Some("Secret Key"));
    template.add_resource(Resource {
        properties: props! {"CidrBlock" => "10.0.0.0/16"},
        ..Resource::new("Vpc", "AWS::EC2::VPC")
    });

    let first = template.to_json().unwrap();
    let second = template.to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_json_object_keys_sorted() {
    let mut template = Template::new();
    template.add_resource(Resource {
        properties: props! {
            "VersioningConfiguration" => props! {"Status" => "Enabled"},
            "AccessControl" => "PublicRead",
        },
        ..Resource::new("AssetsBucket", "AWS::S3::Bucket")
    });

    let json = template.to_json().unwrap();
    let access = json.find("\"AccessControl\"").unwrap();
    let versioning = json.find("\"VersioningConfiguration\"").unwrap();
    assert!(access < versioning);
}
