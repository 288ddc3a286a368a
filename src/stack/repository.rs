//! ECR docker repository for application images.

use crate::expr::{join, reference, Value, AWS_ACCOUNT_ID, AWS_REGION};
use crate::props;
use crate::template::{Output, Resource, Template};

const PUSH_PULL_ACTIONS: [&str; 7] = [
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
    "ecr:BatchCheckLayerAvailability",
    "ecr:PutImage",
    "ecr:InitiateLayerUpload",
    "ecr:UploadLayerPart",
    "ecr:CompleteLayerUpload",
];

pub struct Repository {
    pub repository: Value,
    /// `<account>.dkr.ecr.<region>.amazonaws.com/<repository>`
    pub url: Value,
}

pub fn build(template: &mut Template) -> Repository {
    let repository = template.add_resource(Resource {
        properties: props! {
            "RepositoryName" => "application",
            // Allow all account users to manage images.
            "RepositoryPolicyText" => props! {
                "Version" => "2008-10-17",
                "Statement" => vec![Value::Map(props! {
                    "Sid" => "AllowPushPull",
                    "Effect" => "Allow",
                    "Principal" => props! {
                        "AWS" => vec![join("", vec![
                            "arn:aws:iam::".into(),
                            reference(AWS_ACCOUNT_ID),
                            ":root".into(),
                        ])],
                    },
                    "Action" => PUSH_PULL_ACTIONS
                        .iter()
                        .map(|action| Value::from(*action))
                        .collect::<Vec<_>>(),
                })],
            },
        },
        ..Resource::new("ApplicationRepository", "AWS::ECR::Repository")
    });

    let url = join(
        "",
        vec![
            reference(AWS_ACCOUNT_ID),
            ".dkr.ecr.".into(),
            reference(AWS_REGION),
            ".amazonaws.com/".into(),
            repository.clone(),
        ],
    );

    template.add_output(Output::new("RepositoryURL", "The docker repository URL", url.clone()));

    Repository { repository, url }
}
