//! Network partitioning: a VPC with public subnets for the load balancer,
//! private subnets for application instances, and a NAT gateway so the
//! private side can reach out.

use crate::expr::{get_att, join, reference, Value, AWS_REGION};
use crate::props;
use crate::tags::TagShape;
use crate::template::{Resource, Template};

/// Symbolic references into the network layout, consumed by nearly every
/// other module.
pub struct Network {
    pub vpc: Value,
    pub public_subnet: Value,
    pub loadbalancer_a_subnet: Value,
    pub loadbalancer_a_subnet_cidr: String,
    pub loadbalancer_b_subnet: Value,
    pub loadbalancer_b_subnet_cidr: String,
    pub container_a_subnet: Value,
    pub container_a_subnet_cidr: String,
    pub container_b_subnet: Value,
    pub container_b_subnet_cidr: String,
}

/// Joins the deploying region with a zone suffix, e.g. `us-east-1` + `a`.
fn availability_zone(suffix: &str) -> Value {
    join("", vec![reference(AWS_REGION), suffix.into()])
}

fn add_association(template: &mut Template, name: &str, subnet: &Value, route_table: &Value) {
    template.add_resource(Resource {
        properties: props! {
            "RouteTableId" => route_table.clone(),
            "SubnetId" => subnet.clone(),
        },
        ..Resource::new(name, "AWS::EC2::SubnetRouteTableAssociation")
    });
}

pub fn build(template: &mut Template) -> Network {
    let vpc = template.add_resource(Resource {
        properties: props! {"CidrBlock" => "10.0.0.0/16"},
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("Vpc", "AWS::EC2::VPC")
    });

    // Allow outgoing to outside the VPC
    let internet_gateway = template.add_resource(Resource {
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("InternetGateway", "AWS::EC2::InternetGateway")
    });

    template.add_resource(Resource {
        properties: props! {
            "VpcId" => vpc.clone(),
            "InternetGatewayId" => internet_gateway.clone(),
        },
        ..Resource::new("GatewayAttachment", "AWS::EC2::VPCGatewayAttachment")
    });

    let public_route_table = template.add_resource(Resource {
        properties: props! {"VpcId" => vpc.clone()},
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("PublicRouteTable", "AWS::EC2::RouteTable")
    });

    template.add_resource(Resource {
        properties: props! {
            "GatewayId" => internet_gateway.clone(),
            "DestinationCidrBlock" => "0.0.0.0/0",
            "RouteTableId" => public_route_table.clone(),
        },
        ..Resource::new("PublicRoute", "AWS::EC2::Route")
    });

    // Holds public instances
    let public_subnet_cidr = "10.0.1.0/24";
    let public_subnet = template.add_resource(Resource {
        properties: props! {
            "VpcId" => vpc.clone(),
            "CidrBlock" => public_subnet_cidr,
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("PublicSubnet", "AWS::EC2::Subnet")
    });
    add_association(template, "PublicSubnetRouteTableAssociation", &public_subnet, &public_route_table);

    // NAT
    template.add_resource(Resource {
        properties: props! {"Domain" => "vpc"},
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("NatIp", "AWS::EC2::EIP")
    });

    template.add_resource(Resource {
        properties: props! {
            "AllocationId" => get_att("NatIp", "AllocationId"),
            "SubnetId" => public_subnet.clone(),
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("NatGateway", "AWS::EC2::NatGateway")
    });

    // Holds the load balancer
    let loadbalancer_a_subnet_cidr = "10.0.2.0/24";
    let loadbalancer_a_subnet = template.add_resource(Resource {
        properties: props! {
            "VpcId" => vpc.clone(),
            "CidrBlock" => loadbalancer_a_subnet_cidr,
            "AvailabilityZone" => availability_zone("a"),
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("LoadbalancerASubnet", "AWS::EC2::Subnet")
    });
    add_association(
        template,
        "LoadbalancerASubnetRouteTableAssociation",
        &loadbalancer_a_subnet,
        &public_route_table,
    );

    let loadbalancer_b_subnet_cidr = "10.0.3.0/24";
    let loadbalancer_b_subnet = template.add_resource(Resource {
        properties: props! {
            "VpcId" => vpc.clone(),
            "CidrBlock" => loadbalancer_b_subnet_cidr,
            "AvailabilityZone" => availability_zone("b"),
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("LoadbalancerBSubnet", "AWS::EC2::Subnet")
    });
    add_association(
        template,
        "LoadbalancerBSubnetRouteTableAssociation",
        &loadbalancer_b_subnet,
        &public_route_table,
    );

    let private_route_table = template.add_resource(Resource {
        properties: props! {"VpcId" => vpc.clone()},
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("PrivateRouteTable", "AWS::EC2::RouteTable")
    });

    template.add_resource(Resource {
        properties: props! {
            "RouteTableId" => private_route_table.clone(),
            "DestinationCidrBlock" => "0.0.0.0/0",
            "NatGatewayId" => reference("NatGateway"),
        },
        ..Resource::new("PrivateNatRoute", "AWS::EC2::Route")
    });

    // Holds application instances
    let container_a_subnet_cidr = "10.0.10.0/24";
    let container_a_subnet = template.add_resource(Resource {
        properties: props! {
            "VpcId" => vpc.clone(),
            "CidrBlock" => container_a_subnet_cidr,
            "AvailabilityZone" => availability_zone("a"),
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("ContainerASubnet", "AWS::EC2::Subnet")
    });
    add_association(template, "ContainerARouteTableAssociation", &container_a_subnet, &private_route_table);

    let container_b_subnet_cidr = "10.0.11.0/24";
    let container_b_subnet = template.add_resource(Resource {
        properties: props! {
            "VpcId" => vpc.clone(),
            "CidrBlock" => container_b_subnet_cidr,
            "AvailabilityZone" => availability_zone("b"),
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("ContainerBSubnet", "AWS::EC2::Subnet")
    });
    add_association(template, "ContainerBRouteTableAssociation", &container_b_subnet, &private_route_table);

    Network {
        vpc,
        public_subnet,
        loadbalancer_a_subnet,
        loadbalancer_a_subnet_cidr: loadbalancer_a_subnet_cidr.to_string(),
        loadbalancer_b_subnet,
        loadbalancer_b_subnet_cidr: loadbalancer_b_subnet_cidr.to_string(),
        container_a_subnet,
        container_a_subnet_cidr: container_a_subnet_cidr.to_string(),
        container_b_subnet,
        container_b_subnet_cidr: container_b_subnet_cidr.to_string(),
    }
}
