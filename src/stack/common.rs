//! Cross-cutting parameters referenced by several resource modules:
//! the do-not-create sentinel, application secret key, instance type,
//! encryption toggles, and the partition-aware ARN prefix.

use crate::config::StackConfig;
use crate::expr::{equals, not, Value};
use crate::template::{Parameter, Template};

/// Sentinel value for optional resources: parameter constraints don't
/// allow a blank value, so "(none)" stands in for "don't create this".
pub const DONT_CREATE: &str = "(none)";

const INSTANCE_TYPES: [&str; 24] = [
    "t2.nano",
    "t2.micro",
    "t2.small",
    "t2.medium",
    "t2.large",
    "t2.xlarge",
    "t2.2xlarge",
    "t3.micro",
    "t3.small",
    "t3.medium",
    "t3.large",
    "t3.xlarge",
    "t3.2xlarge",
    "m4.large",
    "m4.xlarge",
    "m4.2xlarge",
    "m5.large",
    "m5.xlarge",
    "m5.2xlarge",
    "c4.large",
    "c4.xlarge",
    "c5.large",
    "c5.xlarge",
    "r4.large",
];

/// References shared across the rest of the stack.
pub struct Common {
    pub secret_key: Value,
    pub instance_type: Value,
    /// "true"/"false" string, wired straight into encryption properties.
    pub use_aes256_encryption: Value,
    pub use_aes256_encryption_condition: String,
    pub cmk_arn: Value,
    pub use_cmk_arn_condition: String,
    pub arn_prefix: Value,
}

pub fn build(template: &mut Template, config: &StackConfig) -> Common {
    let defaults = &config.defaults;

    let secret_key = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Application secret key".to_string()),
            ..Parameter::new("SecretKey", "String")
        }),
        Some("Global"),
        Some("Secret Key"),
    );

    let instance_type = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("The application server instance type".to_string()),
            default: Some("t2.micro".to_string()),
            allowed_values: INSTANCE_TYPES.iter().map(|s| s.to_string()).collect(),
            constraint_description: Some("must select a valid instance type.".to_string()),
            ..Parameter::new("ContainerInstanceType", "String")
        }),
        Some("Application Server"),
        Some("Instance Type"),
    );

    let use_aes256_encryption = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Whether or not to use server side encryption for S3, EBS, RDS, and \
                 ElastiCache. When true, encryption is enabled for all resources."
                    .to_string(),
            ),
            default: Some("false".to_string()),
            allowed_values: vec!["true".to_string(), "false".to_string()],
            ..Parameter::new("UseAES256Encryption", "String")
        }),
        Some("Global"),
        Some("Enable AES-256 encryption"),
    );
    let use_aes256_encryption_condition = "UseAES256EncryptionCond".to_string();
    template.add_condition(
        &use_aes256_encryption_condition,
        equals(use_aes256_encryption.clone(), "true"),
    );

    let cmk_arn = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "The ARN of a customer managed KMS key to use for encryption, in place \
                 of the default AWS managed keys."
                    .to_string(),
            ),
            default: Some(String::new()),
            ..Parameter::new("CustomerManagedCmkArn", "String")
        }),
        Some("Global"),
        Some("Customer managed key ARN"),
    );
    let use_cmk_arn_condition = "CmkArnCondition".to_string();
    template.add_condition(&use_cmk_arn_condition, not(equals(cmk_arn.clone(), "")));

    let arn_prefix: Value =
        if config.gov_cloud { "arn:aws-us-gov".into() } else { "arn:aws".into() };

    Common {
        secret_key,
        instance_type,
        use_aes256_encryption,
        use_aes256_encryption_condition,
        cmk_arn,
        use_cmk_arn_condition,
        arn_prefix,
    }
}
