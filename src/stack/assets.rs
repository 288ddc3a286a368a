//! Object storage for application assets, plus the CloudFront CDN in
//! front of the public bucket.

use crate::config::StackConfig;
use crate::expr::{get_att, join, Value};
use crate::props;
use crate::stack::common::Common;
use crate::stack::domain::Domain;
use crate::tags::TagShape;
use crate::template::{Output, Resource, Template};

pub struct Assets {
    pub assets_bucket: Value,
    pub private_assets_bucket: Value,
    /// Not supported by GovCloud, so only present when it was created.
    pub distribution: Option<Value>,
    /// IAM policy granting full access to both buckets, attached to the
    /// application server roles.
    pub management_policy: Value,
}

fn bucket_arn(arn_prefix: &Value, bucket: &Value, suffix: &str) -> Value {
    join("", vec![arn_prefix.clone(), ":s3:::".into(), bucket.clone(), suffix.into()])
}

pub fn build(
    template: &mut Template,
    config: &StackConfig,
    common: &Common,
    domain: &Domain,
) -> Assets {
    // Holds statics and media; deliberately retained if the stack goes away
    let assets_bucket = template.add_resource(Resource {
        deletion_policy: Some("Retain".to_string()),
        properties: props! {
            "AccessControl" => "PublicRead",
            "VersioningConfiguration" => props! {"Status" => "Enabled"},
            "CorsConfiguration" => props! {
                "CorsRules" => vec![Value::Map(props! {
                    "AllowedOrigins" => vec![join("", vec![
                        "https://*.".into(),
                        domain.domain_name.clone(),
                    ])],
                    "AllowedMethods" => vec![
                        "POST".into(),
                        "PUT".into(),
                        "HEAD".into(),
                        "GET".into(),
                    ],
                    "AllowedHeaders" => vec![Value::from("*")],
                })],
            },
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("AssetsBucket", "AWS::S3::Bucket")
    });

    template.add_output(Output::new(
        "AssetsBucketDomainName",
        "Assets bucket domain name",
        get_att("AssetsBucket", "DomainName"),
    ));

    // Holds files that should not be publicly accessible
    let private_assets_bucket = template.add_resource(Resource {
        deletion_policy: Some("Retain".to_string()),
        properties: props! {
            "AccessControl" => "Private",
            "VersioningConfiguration" => props! {"Status" => "Enabled"},
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("PrivateAssetsBucket", "AWS::S3::Bucket")
    });

    template.add_output(Output::new(
        "PrivateAssetsBucketDomainName",
        "Private assets bucket domain name",
        get_att("PrivateAssetsBucket", "DomainName"),
    ));

    let management_policy = Value::Map(props! {
        "PolicyName" => "AssetsManagementPolicy",
        "PolicyDocument" => props! {
            "Statement" => vec![
                Value::Map(props! {
                    "Effect" => "Allow",
                    "Action" => vec![Value::from("s3:ListBucket")],
                    "Resource" => vec![
                        bucket_arn(&common.arn_prefix, &assets_bucket, ""),
                        bucket_arn(&common.arn_prefix, &private_assets_bucket, ""),
                    ],
                }),
                Value::Map(props! {
                    "Effect" => "Allow",
                    "Action" => vec![Value::from("s3:*")],
                    "Resource" => vec![
                        bucket_arn(&common.arn_prefix, &assets_bucket, "/*"),
                        bucket_arn(&common.arn_prefix, &private_assets_bucket, "/*"),
                    ],
                }),
            ],
        },
    });

    // CloudFront is not available in GovCloud
    let distribution = if config.gov_cloud {
        None
    } else {
        let distribution = template.add_resource(Resource {
            properties: props! {
                "DistributionConfig" => props! {
                    "Origins" => vec![Value::Map(props! {
                        "Id" => "Assets",
                        "DomainName" => get_att("AssetsBucket", "DomainName"),
                        "S3OriginConfig" => props! {"OriginAccessIdentity" => ""},
                    })],
                    "DefaultCacheBehavior" => props! {
                        "TargetOriginId" => "Assets",
                        "ForwardedValues" => props! {"QueryString" => false},
                        "ViewerProtocolPolicy" => "allow-all",
                    },
                    "Enabled" => true,
                },
            },
            tag_shape: Some(TagShape::KeyValueList),
            ..Resource::new("AssetsDistribution", "AWS::CloudFront::Distribution")
        });

        template.add_output(Output::new(
            "AssetsDistributionDomainName",
            "The assets CDN domain name",
            get_att("AssetsDistribution", "DomainName"),
        ));

        Some(distribution)
    };

    Assets { assets_bucket, private_assets_bucket, distribution, management_policy }
}
