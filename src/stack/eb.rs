//! Elastic Beanstalk deployment variant. Instead of creating the load
//! balancer and auto scaling group directly, everything is expressed as
//! option settings on an Elastic Beanstalk environment.

use crate::config::StackConfig;
use crate::expr::{find_in_map, get_att, join, reference, Value, AWS_REGION};
use crate::props;
use crate::stack::assets::Assets;
use crate::stack::certificates::Certificates;
use crate::stack::common::Common;
use crate::stack::logs::Logging;
use crate::stack::security_groups::SecurityGroups;
use crate::stack::vpc::Network;
use crate::template::{Mapping, Output, Parameter, Resource, Template};

const EC2_PRINCIPAL_REGIONS: [&str; 9] = [
    "ap-northeast-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "eu-central-1",
    "eu-west-1",
    "sa-east-1",
    "us-east-1",
    "us-west-1",
    "us-west-2",
];

/// IAM service principals vary by partition; cn-north-1 uses the .cn suffix.
fn region_to_principal_map() -> Mapping {
    let mut map: Mapping = EC2_PRINCIPAL_REGIONS
        .iter()
        .map(|region| (region.to_string(), props! {"EC2Principal" => "ec2.amazonaws.com"}))
        .collect();
    map.insert("cn-north-1".to_string(), props! {"EC2Principal" => "ec2.amazonaws.com.cn"});
    map
}

fn option_setting(namespace: &str, option_name: &str, value: impl Into<Value>) -> Value {
    Value::Map(props! {
        "Namespace" => namespace,
        "OptionName" => option_name,
        "Value" => value.into(),
    })
}

fn policy(name: &str, statement: Value) -> Value {
    Value::Map(props! {
        "PolicyName" => name,
        "PolicyDocument" => props! {"Statement" => vec![statement]},
    })
}

#[allow(clippy::too_many_arguments)]
pub fn build(
    template: &mut Template,
    config: &StackConfig,
    common: &Common,
    network: &Network,
    security_groups: &SecurityGroups,
    certificates: Option<&Certificates>,
    assets: &Assets,
    logging: &Logging,
    environment: &[(String, Value)],
) {
    let defaults = &config.defaults;

    let solution_stack = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Elastic Beanstalk solution stack name (do NOT change after stack \
                 creation). You most likely want to copy the italicized text from: \
                 http://docs.aws.amazon.com/elasticbeanstalk/latest/dg/concepts.\
                 platforms.html#concepts.platforms.mcdocker"
                    .to_string(),
            ),
            default: Some(String::new()),
            ..Parameter::new("SolutionStack", "String")
        }),
        Some("Application Server"),
        Some("Solution Stack"),
    );

    let key_name = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Name of an existing EC2 KeyPair to enable SSH access to the AWS \
                 Elastic Beanstalk instance"
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

    template.add_mapping("Region2Principal", region_to_principal_map());

    let web_server_role = template.add_resource(Resource {
        properties: props! {
            "AssumeRolePolicyDocument" => props! {
                "Statement" => vec![Value::Map(props! {
                    "Effect" => "Allow",
                    "Principal" => props! {
                        "Service" => vec![find_in_map(
                            "Region2Principal",
                            reference(AWS_REGION),
                            "EC2Principal",
                        )],
                    },
                    "Action" => vec![Value::from("sts:AssumeRole")],
                })],
            },
            "Path" => "/",
            "Policies" => vec![
                assets.management_policy.clone(),
                logging.logging_policy.clone(),
                policy("EBBucketAccess", Value::Map(props! {
                    "Effect" => "Allow",
                    "Action" => vec![
                        Value::from("s3:Get*"),
                        Value::from("s3:List*"),
                        Value::from("s3:PutObject"),
                    ],
                    "Resource" => vec![
                        Value::from("arn:aws:s3:::elasticbeanstalk-*"),
                        Value::from("arn:aws:s3:::elasticbeanstalk-*/*"),
                    ],
                })),
                policy("EBXRayAccess", Value::Map(props! {
                    "Effect" => "Allow",
                    "Action" => vec![
                        Value::from("xray:PutTraceSegments"),
                        Value::from("xray:PutTelemetryRecords"),
                    ],
                    "Resource" => "*",
                })),
                policy("EBCloudWatchLogsAccess", Value::Map(props! {
                    "Effect" => "Allow",
                    "Action" => vec![
                        Value::from("logs:PutLogEvents"),
                        Value::from("logs:CreateLogStream"),
                    ],
                    "Resource" => "arn:aws:logs:*:*:log-group:/aws/elasticbeanstalk*",
                })),
                policy("ECSManagementPolicy", Value::Map(props! {
                    "Effect" => "Allow",
                    "Action" => vec![
                        Value::from("ecs:*"),
                        Value::from("elasticloadbalancing:*"),
                    ],
                    "Resource" => "*",
                })),
                policy("ECRManagementPolicy", Value::Map(props! {
                    "Effect" => "Allow",
                    "Action" => vec![
                        Value::from("ecr:GetAuthorizationToken"),
                        Value::from("ecr:GetDownloadUrlForLayer"),
                        Value::from("ecr:BatchGetImage"),
                        Value::from("ecr:BatchCheckLayerAvailability"),
                    ],
                    "Resource" => "*",
                })),
            ],
        },
        ..Resource::new("WebServerRole", "AWS::IAM::Role")
    });

    let web_server_instance_profile = template.add_resource(Resource {
        properties: props! {
            "Path" => "/",
            "Roles" => vec![web_server_role.clone()],
        },
        ..Resource::new("WebServerInstanceProfile", "AWS::IAM::InstanceProfile")
    });

    let eb_application = template.add_resource(Resource {
        properties: props! {
            "Description" => "AWS Elastic Beanstalk Application",
        },
        ..Resource::new("EBApplication", "AWS::ElasticBeanstalk::Application")
    });

    let mut option_settings = vec![
        // VPC settings
        option_setting("aws:ec2:vpc", "VPCId", network.vpc.clone()),
        // instances sit behind the NAT gateway, so no public IPs
        option_setting("aws:ec2:vpc", "AssociatePublicIpAddress", "false"),
        option_setting(
            "aws:ec2:vpc",
            "Subnets",
            join(
                ",",
                vec![network.container_a_subnet.clone(), network.container_b_subnet.clone()],
            ),
        ),
        option_setting(
            "aws:ec2:vpc",
            "ELBSubnets",
            join(
                ",",
                vec![
                    network.loadbalancer_a_subnet.clone(),
                    network.loadbalancer_b_subnet.clone(),
                ],
            ),
        ),
        // Launch config settings
        option_setting(
            "aws:autoscaling:launchconfiguration",
            "InstanceType",
            common.instance_type.clone(),
        ),
        option_setting("aws:autoscaling:launchconfiguration", "EC2KeyName", key_name.clone()),
        option_setting(
            "aws:autoscaling:launchconfiguration",
            "IamInstanceProfile",
            web_server_instance_profile.clone(),
        ),
        option_setting(
            "aws:autoscaling:launchconfiguration",
            "SecurityGroups",
            join(",", vec![security_groups.container.clone()]),
        ),
        // Load balancer settings
        option_setting(
            "aws:elb:loadbalancer",
            "SecurityGroups",
            join(",", vec![security_groups.load_balancer.clone()]),
        ),
    ];

    // HTTPS listener (note, these will not appear in the console -- only
    // the deprecated options which we are not using will appear there)
    if let Some(certificates) = certificates {
        option_settings.extend([
            option_setting("aws:elb:listener:443", "ListenerProtocol", "HTTPS"),
            option_setting(
                "aws:elb:listener:443",
                "SSLCertificateId",
                certificates.application.clone(),
            ),
            option_setting("aws:elb:listener:443", "InstanceProtocol", "HTTP"),
            option_setting("aws:elb:listener:443", "InstancePort", "80"),
        ]);
    }

    // Logging configuration
    option_settings.extend([
        option_setting("aws:elasticbeanstalk:cloudwatch:logs", "StreamLogs", "true"),
        option_setting("aws:elasticbeanstalk:cloudwatch:logs", "DeleteOnTerminate", "false"),
        option_setting("aws:elasticbeanstalk:cloudwatch:logs", "RetentionInDays", "365"),
    ]);

    // Environment variables
    option_settings.extend(environment.iter().map(|(name, value)| {
        option_setting("aws:elasticbeanstalk:application:environment", name, value.clone())
    }));

    template.add_resource(Resource {
        properties: props! {
            "Description" => "AWS Elastic Beanstalk Environment",
            "ApplicationName" => eb_application.clone(),
            "SolutionStackName" => solution_stack.clone(),
            "OptionSettings" => option_settings,
        },
        ..Resource::new("EBEnvironment", "AWS::ElasticBeanstalk::Environment")
    });

    template.add_output(Output::new(
        "URL",
        "URL of the AWS Elastic Beanstalk Environment",
        join("", vec!["http://".into(), get_att("EBEnvironment", "EndpointURL")]),
    ));
}
