//! Plain EC2 deployment variant: an auto scaling group of instances built
//! from a user-supplied AMI, registered directly with the load balancer.

use crate::config::StackConfig;
use crate::expr::{equals, join, reference, Value, AWS_STACK_NAME};
use crate::props;
use crate::stack::assets::Assets;
use crate::stack::common::Common;
use crate::stack::load_balancer::LoadBalancer;
use crate::stack::logs::Logging;
use crate::stack::security_groups::SecurityGroups;
use crate::stack::vpc::Network;
use crate::template::{Parameter, Resource, Template};

#[allow(clippy::too_many_arguments)]
pub fn build(
    template: &mut Template,
    config: &StackConfig,
    common: &Common,
    network: &Network,
    security_groups: &SecurityGroups,
    load_balancer: &LoadBalancer,
    assets: &Assets,
    logging: &Logging,
) {
    let defaults = &config.defaults;

    let desired_container_instances = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Desired container instances count".to_string()),
            default: Some("2".to_string()),
            ..Parameter::new("DesiredScale", "Number")
        }),
        Some("Application Server"),
        Some("Desired Instance Count"),
    );

    let max_container_instances = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Maximum container instances count".to_string()),
            default: Some("4".to_string()),
            ..Parameter::new("MaxScale", "Number")
        }),
        Some("Application Server"),
        Some("Maximum Instance Count"),
    );

    let container_volume_size = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Size of instance EBS root volume (in GB)".to_string()),
            default: Some("8".to_string()),
            ..Parameter::new("ContainerVolumeSize", "Number")
        }),
        Some("Application Server"),
        Some("Root Volume Size"),
    );

    let ami = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "The Amazon Machine Image (AMI) to use for instances. Make sure to \
                 use the correct AMI for your region and instance type (t2 instances \
                 require HVM AMIs)."
                    .to_string(),
            ),
            default: Some(String::new()),
            ..Parameter::new("AMI", "String")
        }),
        Some("Application Server"),
        Some("Amazon Machine Image (AMI)"),
    );

    let key_name = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Name of an existing EC2 KeyPair to enable SSH access to the AWS EC2 \
                 instances"
                    .to_string(),
            ),
            constraint_description: Some(
                "must be the name of an existing EC2 KeyPair.".to_string(),
            ),
            ..Parameter::new("KeyName", "AWS::EC2::KeyPair::KeyName")
        }),
        Some("Application Server"),
        Some("SSH Key Name"),
    );

    template.add_condition(
        "TcpHealthCheck",
        equals(load_balancer.web_worker_health_check.clone(), ""),
    );

    let container_instance_role = template.add_resource(Resource {
        properties: props! {
            "AssumeRolePolicyDocument" => props! {
                "Statement" => vec![Value::Map(props! {
                    "Effect" => "Allow",
                    "Principal" => props! {"Service" => vec![Value::from("ec2.amazonaws.com")]},
                    "Action" => vec![Value::from("sts:AssumeRole")],
                })],
            },
            "Path" => "/",
            "Policies" => vec![
                assets.management_policy.clone(),
                logging.logging_policy.clone(),
            ],
        },
        ..Resource::new("ContainerInstanceRole", "AWS::IAM::Role")
    });

    let container_instance_profile = template.add_resource(Resource {
        properties: props! {
            "Path" => "/",
            "Roles" => vec![container_instance_role.clone()],
        },
        ..Resource::new("ContainerInstanceProfile", "AWS::IAM::InstanceProfile")
    });

    let launch_configuration = template.add_resource(Resource {
        properties: props! {
            "SecurityGroups" => vec![security_groups.container.clone()],
            "InstanceType" => common.instance_type.clone(),
            "ImageId" => ami.clone(),
            "IamInstanceProfile" => container_instance_profile.clone(),
            "BlockDeviceMappings" => vec![Value::Map(props! {
                "DeviceName" => "/dev/sda1",
                "Ebs" => props! {
                    "VolumeType" => "gp2",
                    "VolumeSize" => container_volume_size.clone(),
                    "Encrypted" => common.use_aes256_encryption.clone(),
                },
            })],
            "KeyName" => key_name.clone(),
        },
        ..Resource::new("LaunchConfiguration", "AWS::AutoScaling::LaunchConfiguration")
    });

    // Tags carry PropagateAtLaunch, so they live in the property bag rather
    // than going through the common tagging pass
    template.add_resource(Resource {
        properties: props! {
            "VPCZoneIdentifier" => vec![
                network.container_a_subnet.clone(),
                network.container_b_subnet.clone(),
            ],
            "MinSize" => desired_container_instances.clone(),
            "MaxSize" => max_container_instances.clone(),
            "DesiredCapacity" => desired_container_instances.clone(),
            "LaunchConfigurationName" => launch_configuration.clone(),
            "LoadBalancerNames" => vec![load_balancer.load_balancer.clone()],
            "HealthCheckType" => "EC2",
            "HealthCheckGracePeriod" => 300,
            "Tags" => vec![
                Value::Map(props! {
                    "Key" => "Name",
                    "Value" => join("-", vec![reference(AWS_STACK_NAME), "web_worker".into()]),
                    "PropagateAtLaunch" => true,
                }),
                Value::Map(props! {
                    "Key" => "webstacks:role",
                    "Value" => "worker",
                    "PropagateAtLaunch" => true,
                }),
            ],
        },
        ..Resource::new("AutoScalingGroup", "AWS::AutoScaling::AutoScalingGroup")
    });
}
