use serde_json::json;
use webstacks::config::{Infra, StackConfig};
use webstacks::defaults::Defaults;
use webstacks::stack::build_template;

fn build(infra: Infra, gov_cloud: bool) -> serde_json::Value {
    let config = StackConfig { infra, gov_cloud, defaults: Defaults::default() };
    build_template(&config).to_value()
}

#[test]
fn test_ecs_template_resources() {
    let rendered = build(Infra::Ecs, false);
    let resources = rendered["Resources"].as_object().unwrap();

    for name in [
        "Vpc",
        "PublicSubnet",
        "NatGateway",
        "LoadBalancer",
        "AssetsBucket",
        "PrivateAssetsBucket",
        "AssetsDistribution",
        "Certificate",
        "DatabaseInstance",
        "CacheCluster",
        "RedisReplicationGroup",
        "ContainerLogs",
        "ApplicationRepository",
        "Cluster",
        "WebTask",
        "AppService",
        "AutoScalingGroup",
    ] {
        assert!(resources.contains_key(name), "missing resource {}", name);
    }
}

#[test]
fn test_ecs_web_worker_port_default() {
    let rendered = build(Infra::Ecs, false);
    assert_eq!(rendered["Parameters"]["WebWorkerPort"]["Default"], json!("8000"));
}

#[test]
fn test_ec2_web_worker_port_default() {
    let rendered = build(Infra::Ec2, false);
    assert_eq!(rendered["Parameters"]["WebWorkerPort"]["Default"], json!("80"));
}

#[test]
fn test_ec2_template_has_no_container_resources() {
    let rendered = build(Infra::Ec2, false);
    let resources = rendered["Resources"].as_object().unwrap();

    assert!(resources.contains_key("LaunchConfiguration"));
    assert!(resources.contains_key("AutoScalingGroup"));
    assert!(!resources.contains_key("Cluster"));
    assert!(!resources.contains_key("WebTask"));
    assert!(!resources.contains_key("ApplicationRepository"));
    assert!(rendered["Parameters"].get("AMI").is_some());
    assert!(rendered["Parameters"].get("KeyName").is_some());
}

#[test]
fn test_eb_template_uses_option_settings() {
    let rendered = build(Infra::Eb, false);
    let resources = rendered["Resources"].as_object().unwrap();

    assert!(resources.contains_key("EBApplication"));
    assert!(resources.contains_key("EBEnvironment"));
    assert!(resources.contains_key("WebServerRole"));
    // Elastic Beanstalk creates the load balancer and scaling group itself
    assert!(!resources.contains_key("LoadBalancer"));
    assert!(!resources.contains_key("AutoScalingGroup"));

    let settings = resources["EBEnvironment"]["Properties"]["OptionSettings"].as_array().unwrap();
    let namespaces: Vec<&str> =
        settings.iter().map(|s| s["Namespace"].as_str().unwrap()).collect();
    assert!(namespaces.contains(&"aws:ec2:vpc"));
    assert!(namespaces.contains(&"aws:elasticbeanstalk:application:environment"));
}

#[test]
fn test_gov_cloud_skips_certificates_and_cdn() {
    let rendered = build(Infra::Ecs, true);
    let resources = rendered["Resources"].as_object().unwrap();

    assert!(!resources.contains_key("Certificate"));
    assert!(!resources.contains_key("AssetsDistribution"));
    assert!(rendered["Parameters"].get("CertificateValidationMethod").is_none());

    // HTTPS falls back to a TCP pass-through listener
    let listeners = resources["LoadBalancer"]["Properties"]["Listeners"].as_array().unwrap();
    assert!(listeners
        .contains(&json!({
            "LoadBalancerPort": 443,
            "InstanceProtocol": "TCP",
            "InstancePort": 443,
            "Protocol": "TCP",
        })));
}

#[test]
fn test_gov_cloud_arn_prefix() {
    let rendered = build(Infra::Ecs, true);
    let json = serde_json::to_string(&rendered).unwrap();
    assert!(json.contains("arn:aws-us-gov"));
}

#[test]
fn test_replica_url_uses_replica_endpoint() {
    let rendered = build(Infra::Ecs, false);
    let replica_url = serde_json::to_string(&rendered["Outputs"]["DatabaseReplicaURL"]).unwrap();

    assert!(replica_url.contains("DatabaseReplica"));
    // the replica URL must not point at the primary's endpoint
    assert!(!replica_url.contains("\"DatabaseInstance\""));
}

#[test]
fn test_common_tags_applied() {
    let rendered = build(Infra::Ecs, false);
    assert_eq!(
        rendered["Resources"]["Vpc"]["Properties"]["Tags"],
        json!([{"Key": "webstacks:stack-name", "Value": {"Ref": "AWS::StackName"}}])
    );
}

#[test]
fn test_interface_group_order() {
    let rendered = build(Infra::Ecs, false);
    let groups = &rendered["Metadata"]["AWS::CloudFormation::Interface"]["ParameterGroups"];
    let labels: Vec<&str> =
        groups.as_array().unwrap().iter().map(|g| g["Label"]["default"].as_str().unwrap()).collect();

    let global = labels.iter().position(|l| *l == "Global").unwrap();
    let app_server = labels.iter().position(|l| *l == "Application Server").unwrap();
    let database = labels.iter().position(|l| *l == "Database").unwrap();
    assert!(global < app_server);
    assert!(app_server < database);
    // Elasticsearch is in the preferred order but has no parameters
    assert!(!labels.contains(&"Elasticsearch"));
}

#[test]
fn test_defaults_override_applied() {
    let mut defaults = Defaults::default();
    defaults.set("ContainerInstanceType", "t2.large");
    let config = StackConfig { infra: Infra::Ecs, gov_cloud: false, defaults };

    let rendered = build_template(&config).to_value();
    assert_eq!(rendered["Parameters"]["ContainerInstanceType"]["Default"], json!("t2.large"));
}

#[test]
fn test_serialization_is_stable() {
    let config = StackConfig { infra: Infra::Ecs, gov_cloud: false, defaults: Defaults::default() };
    let template = build_template(&config);
    assert_eq!(template.to_json().unwrap(), template.to_json().unwrap());
}

#[test]
fn test_every_condition_reference_resolves() {
    for infra in [Infra::Ecs, Infra::Eb, Infra::Ec2] {
        let rendered = build(infra, false);
        let conditions = rendered["Conditions"].as_object().unwrap();
        for (name, resource) in rendered["Resources"].as_object().unwrap() {
            if let Some(condition) = resource.get("Condition") {
                let condition = condition.as_str().unwrap();
                assert!(
                    conditions.contains_key(condition),
                    "resource {} references unknown condition {}",
                    name,
                    condition
                );
            }
        }
    }
}
