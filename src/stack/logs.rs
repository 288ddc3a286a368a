//! CloudWatch log group for application containers, plus the IAM policy
//! that lets application servers write to it.

use crate::expr::{join, Value};
use crate::props;
use crate::stack::common::Common;
use crate::template::{Resource, Template};

pub struct Logging {
    pub log_group: Value,
    /// Attached to the application server roles alongside the assets
    /// management policy.
    pub logging_policy: Value,
}

pub fn build(template: &mut Template, common: &Common) -> Logging {
    let log_group = template.add_resource(Resource {
        deletion_policy: Some("Retain".to_string()),
        properties: props! {"RetentionInDays" => 365},
        ..Resource::new("ContainerLogs", "AWS::Logs::LogGroup")
    });

    let logging_policy = Value::Map(props! {
        "PolicyName" => "LoggingPolicy",
        "PolicyDocument" => props! {
            "Statement" => vec![Value::Map(props! {
                "Effect" => "Allow",
                "Action" => vec![
                    Value::from("logs:Create*"),
                    Value::from("logs:PutLogEvents"),
                ],
                // allow logging to any log group
                "Resource" => join("", vec![
                    common.arn_prefix.clone(),
                    ":logs:*:*:*".into(),
                ]),
            })],
        },
    });

    Logging { log_group, logging_policy }
}
