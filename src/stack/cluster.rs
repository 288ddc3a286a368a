//! ECS deployment variant: a cluster of container instances behind the
//! load balancer, a web worker task definition, and the service that keeps
//! it running.

use crate::config::StackConfig;
use crate::expr::{
    base64, equals, find_in_map, join, not, reference, Value, AWS_REGION, AWS_STACK_NAME,
};
use crate::props;
use crate::stack::assets::Assets;
use crate::stack::common::Common;
use crate::stack::load_balancer::LoadBalancer;
use crate::stack::logs::Logging;
use crate::stack::repository::Repository;
use crate::stack::security_groups::SecurityGroups;
use crate::stack::vpc::Network;
use crate::template::{Mapping, Parameter, Resource, Template};

/// ECS-optimized AMIs by region.
const ECS_REGION_AMIS: [(&str, &str); 9] = [
    ("us-east-1", "ami-eca289fb"),
    ("us-east-2", "ami-446f3521"),
    ("us-west-1", "ami-9fadf8ff"),
    ("us-west-2", "ami-7abc111a"),
    ("eu-west-1", "ami-a1491ad2"),
    ("eu-central-1", "ami-54f5303b"),
    ("ap-northeast-1", "ami-9cd57ffd"),
    ("ap-southeast-1", "ami-a900a3ca"),
    ("ap-southeast-2", "ami-5781be34"),
];

fn ecs_region_map() -> Mapping {
    ECS_REGION_AMIS.iter().map(|(region, ami)| (region.to_string(), props! {"AMI" => *ami})).collect()
}

fn allow_statement(actions: Vec<Value>, resource: Value) -> Value {
    Value::Map(props! {
        "Effect" => "Allow",
        "Action" => actions,
        "Resource" => resource,
    })
}

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
    repository: &Repository,
    environment: &[(String, Value)],
) {
    let defaults = &config.defaults;

    let web_worker_cpu = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Web worker CPU units".to_string()),
            default: Some("512".to_string()),
            ..Parameter::new("WebWorkerCPU", "Number")
        }),
        Some("Application Server"),
        Some("Web Worker CPU"),
    );

    let web_worker_memory = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Web worker memory".to_string()),
            default: Some("700".to_string()),
            ..Parameter::new("WebWorkerMemory", "Number")
        }),
        Some("Application Server"),
        Some("Web Worker Memory"),
    );

    let web_worker_desired_count = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Web worker task instance count".to_string()),
            default: Some("2".to_string()),
            ..Parameter::new("WebWorkerDesiredCount", "Number")
        }),
        Some("Application Server"),
        Some("Web Worker Count"),
    );

    let desired_container_instances = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Desired container instances count".to_string()),
            default: Some("3".to_string()),
            ..Parameter::new("DesiredScale", "Number")
        }),
        Some("Application Server"),
        Some("Desired Instance Count"),
    );

    let max_container_instances = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Maximum container instances count".to_string()),
            default: Some("3".to_string()),
            ..Parameter::new("MaxScale", "Number")
        }),
        Some("Application Server"),
        Some("Maximum Instance Count"),
    );

    let app_revision = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("An optional docker app revision to deploy".to_string()),
            default: Some(String::new()),
            ..Parameter::new("WebAppRevision", "String")
        }),
        Some("Application Server"),
        Some("App Revision"),
    );

    let deploy_condition = "Deploy";
    template.add_condition(deploy_condition, not(equals(app_revision.clone(), "")));

    template.add_mapping("ECSRegionMap", ecs_region_map());

    let cluster = template.add_resource(Resource::new("Cluster", "AWS::ECS::Cluster"));

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
                Value::Map(props! {
                    "PolicyName" => "ECSManagementPolicy",
                    "PolicyDocument" => props! {
                        "Statement" => vec![allow_statement(
                            vec!["ecs:*".into(), "elasticloadbalancing:*".into()],
                            "*".into(),
                        )],
                    },
                }),
                Value::Map(props! {
                    "PolicyName" => "ECRManagementPolicy",
                    "PolicyDocument" => props! {
                        "Statement" => vec![allow_statement(
                            vec![
                                "ecr:GetAuthorizationToken".into(),
                                "ecr:GetDownloadUrlForLayer".into(),
                                "ecr:BatchGetImage".into(),
                                "ecr:BatchCheckLayerAvailability".into(),
                            ],
                            "*".into(),
                        )],
                    },
                }),
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
            "ImageId" => find_in_map("ECSRegionMap", reference(AWS_REGION), "AMI"),
            "IamInstanceProfile" => container_instance_profile.clone(),
            // Register the instance with the cluster and enable CloudWatch
            // docker logging
            "UserData" => base64(join("", vec![
                "#!/bin/bash -xe\n".into(),
                "echo ECS_CLUSTER=".into(),
                cluster.clone(),
                " >> /etc/ecs/ecs.config\n".into(),
                "echo 'ECS_AVAILABLE_LOGGING_DRIVERS=".into(),
                "[\"json-file\",\"awslogs\"]'".into(),
                " >> /etc/ecs/ecs.config\n".into(),
            ])),
        },
        ..Resource::new("ContainerLaunchConfiguration", "AWS::AutoScaling::LaunchConfiguration")
    });

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
            // Since one instance within the group is a reserved slot for
            // rolling ECS service upgrade, it's not possible to rely on a
            // "dockerized" ELB health-check, else this reserved instance
            // will be flagged as unhealthy and won't stop respawning
            "HealthCheckType" => "EC2",
            "HealthCheckGracePeriod" => 300,
        },
        ..Resource::new("AutoScalingGroup", "AWS::AutoScaling::AutoScalingGroup")
    });

    let mut container_environment: Vec<Value> = environment
        .iter()
        .map(|(name, value)| {
            Value::Map(props! {"Name" => name.as_str(), "Value" => value.clone()})
        })
        .collect();
    container_environment.push(Value::Map(props! {
        "Name" => "PORT",
        "Value" => load_balancer.web_worker_port.clone(),
    }));

    let web_task_definition = template.add_resource(Resource {
        condition: Some(deploy_condition.to_string()),
        properties: props! {
            "ContainerDefinitions" => vec![Value::Map(props! {
                "Name" => "WebWorker",
                // 1024 is full CPU
                "Cpu" => web_worker_cpu.clone(),
                "Memory" => web_worker_memory.clone(),
                "Essential" => true,
                "Image" => join("", vec![
                    repository.url.clone(),
                    ":".into(),
                    app_revision.clone(),
                ]),
                "PortMappings" => vec![Value::Map(props! {
                    "ContainerPort" => load_balancer.web_worker_port.clone(),
                    "HostPort" => load_balancer.web_worker_port.clone(),
                })],
                "LogConfiguration" => props! {
                    "LogDriver" => "awslogs",
                    "Options" => props! {
                        "awslogs-group" => logging.log_group.clone(),
                        "awslogs-region" => reference(AWS_REGION),
                        "awslogs-stream-prefix" => reference(AWS_STACK_NAME),
                    },
                },
                "Environment" => container_environment,
            })],
        },
        ..Resource::new("WebTask", "AWS::ECS::TaskDefinition")
    });

    let app_service_role = template.add_resource(Resource {
        properties: props! {
            "AssumeRolePolicyDocument" => props! {
                "Statement" => vec![Value::Map(props! {
                    "Effect" => "Allow",
                    "Principal" => props! {"Service" => vec![Value::from("ecs.amazonaws.com")]},
                    "Action" => vec![Value::from("sts:AssumeRole")],
                })],
            },
            "Path" => "/",
            "Policies" => vec![Value::Map(props! {
                "PolicyName" => "WebServicePolicy",
                "PolicyDocument" => props! {
                    "Statement" => vec![allow_statement(
                        vec![
                            "elasticloadbalancing:Describe*".into(),
                            "elasticloadbalancing:DeregisterInstancesFromLoadBalancer".into(),
                            "elasticloadbalancing:RegisterInstancesWithLoadBalancer".into(),
                            "ec2:Describe*".into(),
                            "ec2:AuthorizeSecurityGroupIngress".into(),
                        ],
                        "*".into(),
                    )],
                },
            })],
        },
        ..Resource::new("AppServiceRole", "AWS::IAM::Role")
    });

    template.add_resource(Resource {
        condition: Some(deploy_condition.to_string()),
        depends_on: vec!["AutoScalingGroup".to_string()],
        properties: props! {
            "Cluster" => cluster.clone(),
            "DesiredCount" => web_worker_desired_count.clone(),
            "LoadBalancers" => vec![Value::Map(props! {
                "ContainerName" => "WebWorker",
                "ContainerPort" => load_balancer.web_worker_port.clone(),
                "LoadBalancerName" => load_balancer.load_balancer.clone(),
            })],
            "TaskDefinition" => web_task_definition.clone(),
            "Role" => app_service_role.clone(),
        },
        ..Resource::new("AppService", "AWS::ECS::Service")
    });
}
