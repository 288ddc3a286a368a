//! The classic ELB in front of the web workers, with an HTTP listener and
//! an HTTPS listener that is either a raw TCP pass-through (GovCloud) or
//! terminates TLS with the ACM certificate when one is available.

use crate::config::{Infra, StackConfig};
use crate::expr::{fn_if, get_att, join, Value};
use crate::props;
use crate::stack::certificates::Certificates;
use crate::stack::security_groups::SecurityGroups;
use crate::stack::vpc::Network;
use crate::tags::TagShape;
use crate::template::{Output, Parameter, Resource, Template};

pub struct LoadBalancer {
    pub load_balancer: Value,
    pub web_worker_port: Value,
    pub web_worker_health_check: Value,
}

pub fn build(
    template: &mut Template,
    config: &StackConfig,
    network: &Network,
    security_groups: &SecurityGroups,
    certificates: Option<&Certificates>,
) -> LoadBalancer {
    let defaults = &config.defaults;

    let web_worker_port = if config.infra == Infra::Ecs {
        template.add_parameter(
            defaults.apply(Parameter {
                description: Some("Web worker container exposed port".to_string()),
                default: Some("8000".to_string()),
                ..Parameter::new("WebWorkerPort", "Number")
            }),
            Some("Load Balancer"),
            Some("Web Worker Port"),
        )
    } else {
        // default to port 80 for the EC2 and Elastic Beanstalk options
        template.add_parameter(
            defaults.apply(Parameter {
                description: Some("Default web worker exposed port (non-HTTPS)".to_string()),
                default: Some("80".to_string()),
                ..Parameter::new("WebWorkerPort", "Number")
            }),
            Some("Load Balancer"),
            Some("Web Worker Port"),
        )
    };

    let web_worker_protocol = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Web worker instance protocol".to_string()),
            default: Some("HTTP".to_string()),
            allowed_values: vec!["HTTP".to_string(), "HTTPS".to_string()],
            ..Parameter::new("WebWorkerProtocol", "String")
        }),
        Some("Load Balancer"),
        Some("Web Worker Protocol"),
    );

    let web_worker_health_check_protocol = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Web worker health check protocol".to_string()),
            default: Some("TCP".to_string()),
            allowed_values: vec!["TCP".to_string(), "HTTP".to_string(), "HTTPS".to_string()],
            ..Parameter::new("WebWorkerHealthCheckProtocol", "String")
        }),
        Some("Load Balancer"),
        Some("Health Check: Protocol"),
    );

    let web_worker_health_check_port = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Web worker health check port".to_string()),
            default: Some("80".to_string()),
            ..Parameter::new("WebWorkerHealthCheckPort", "Number")
        }),
        Some("Load Balancer"),
        Some("Health Check: Port"),
    );

    let web_worker_health_check = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Web worker health check URL path, e.g., \"/health-check\"; required \
                 unless WebWorkerHealthCheckProtocol is TCP"
                    .to_string(),
            ),
            default: Some(String::new()),
            ..Parameter::new("WebWorkerHealthCheck", "String")
        }),
        Some("Load Balancer"),
        Some("Health Check: URL"),
    );

    let mut listeners = vec![Value::Map(props! {
        "LoadBalancerPort" => 80,
        "InstanceProtocol" => web_worker_protocol.clone(),
        "InstancePort" => web_worker_port.clone(),
        "Protocol" => "HTTP",
    })];

    match certificates {
        None => {
            // GovCloud doesn't support the Certificate Manager: pass TCP
            // traffic through directly so TLS terminates at the instances
            listeners.push(Value::Map(props! {
                "LoadBalancerPort" => 443,
                "InstanceProtocol" => "TCP",
                "InstancePort" => 443,
                "Protocol" => "TCP",
            }));
        }
        Some(certificates) => {
            listeners.push(fn_if(
                &certificates.cert_condition,
                Value::Map(props! {
                    "LoadBalancerPort" => 443,
                    "InstanceProtocol" => web_worker_protocol.clone(),
                    "InstancePort" => web_worker_port.clone(),
                    "Protocol" => "HTTPS",
                    "SSLCertificateId" => certificates.application.clone(),
                }),
                Value::NoValue,
            ));
        }
    }

    let load_balancer = template.add_resource(Resource {
        properties: props! {
            "Subnets" => vec![
                network.loadbalancer_a_subnet.clone(),
                network.loadbalancer_b_subnet.clone(),
            ],
            "SecurityGroups" => vec![security_groups.load_balancer.clone()],
            "Listeners" => listeners,
            "HealthCheck" => props! {
                "Target" => join("", vec![
                    web_worker_health_check_protocol.clone(),
                    ":".into(),
                    web_worker_health_check_port.clone(),
                    web_worker_health_check.clone(),
                ]),
                "HealthyThreshold" => "2",
                "UnhealthyThreshold" => "2",
                "Interval" => "100",
                "Timeout" => "10",
            },
            "CrossZone" => true,
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("LoadBalancer", "AWS::ElasticLoadBalancing::LoadBalancer")
    });

    template.add_output(Output::new(
        "LoadBalancerDNSName",
        "Loadbalancer DNS",
        get_att("LoadBalancer", "DNSName"),
    ));
    template.add_output(Output::new(
        "LoadBalancerHostedZoneID",
        "Loadbalancer hosted zone",
        get_att("LoadBalancer", "CanonicalHostedZoneNameID"),
    ));

    LoadBalancer { load_balancer, web_worker_port, web_worker_health_check }
}
