//! Security groups for the load balancer and the application instances.

use crate::expr::Value;
use crate::props;
use crate::stack::vpc::Network;
use crate::tags::TagShape;
use crate::template::{Resource, Template};

/// Port the web workers listen on behind the load balancer.
pub const WEB_WORKER_PORT: i64 = 80;

pub struct SecurityGroups {
    pub load_balancer: Value,
    pub container: Value,
}

fn ingress_rule(protocol: &str, port: i64, cidr: &str) -> Value {
    Value::Map(props! {
        "IpProtocol" => protocol,
        "FromPort" => port,
        "ToPort" => port,
        "CidrIp" => cidr,
    })
}

pub fn build(template: &mut Template, network: &Network) -> SecurityGroups {
    let load_balancer = template.add_resource(Resource {
        properties: props! {
            "GroupDescription" => "Web load balancer security group.",
            "VpcId" => network.vpc.clone(),
            "SecurityGroupIngress" => vec![
                ingress_rule("tcp", 443, "0.0.0.0/0"),
                ingress_rule("tcp", 80, "0.0.0.0/0"),
            ],
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("LoadBalancerSecurityGroup", "AWS::EC2::SecurityGroup")
    });

    // Workers take HTTP only from the load balancer subnets
    let container = template.add_resource(Resource {
        properties: props! {
            "GroupDescription" => "Container security group.",
            "VpcId" => network.vpc.clone(),
            "SecurityGroupIngress" => vec![
                ingress_rule("tcp", WEB_WORKER_PORT, &network.loadbalancer_a_subnet_cidr),
                ingress_rule("tcp", WEB_WORKER_PORT, &network.loadbalancer_b_subnet_cidr),
            ],
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("ContainerSecurityGroup", "AWS::EC2::SecurityGroup")
    });

    SecurityGroups { load_balancer, container }
}
