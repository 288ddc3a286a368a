//! ACM certificate for the application load balancer.
//!
//! The certificate either comes from an existing ARN supplied by the
//! operator, or is created in-stack with the chosen validation method.
//! Which one applies is decided by template conditions at apply time, not
//! here. GovCloud doesn't support the certificate manager, so this module
//! is skipped entirely for GovCloud templates.

use crate::config::StackConfig;
use crate::expr::{equals, fn_if, not, or, Value};
use crate::props;
use crate::stack::common::DONT_CREATE;
use crate::stack::domain::Domain;
use crate::tags::TagShape;
use crate::template::{Parameter, Resource, Template};

pub struct Certificates {
    /// The certificate ARN the load balancer should use: the custom ARN
    /// when supplied, the in-stack certificate otherwise.
    pub application: Value,
    /// True when any certificate (custom or in-stack) is available.
    pub cert_condition: String,
}

pub fn build(template: &mut Template, config: &StackConfig, domain: &Domain) -> Certificates {
    let validation_method = template.add_parameter(
        config.defaults.apply(Parameter {
            description: Some(
                "How to validate domain ownership for issuing an SSL certificate - \
                 highly recommend DNS. DNS and Email will pause stack creation until \
                 you do something to complete the validation. If omitted, an HTTPS \
                 listener can be manually attached to the load balancer after stack \
                 creation."
                    .to_string(),
            ),
            default: Some(DONT_CREATE.to_string()),
            allowed_values: vec![DONT_CREATE.to_string(), "DNS".to_string(), "Email".to_string()],
            ..Parameter::new("CertificateValidationMethod", "String")
        }),
        Some("Global"),
        Some("Certificate Validation Method"),
    );

    let custom_arn = template.add_parameter(
        config.defaults.apply(Parameter {
            description: Some(
                "An existing ACM certificate ARN to be used by the application ELB. \
                 DNS and Email validation will not work with this option."
                    .to_string(),
            ),
            default: Some(String::new()),
            ..Parameter::new("CustomAppCertificateArn", "String")
        }),
        Some("Global"),
        Some("Custom App Certificate ARN"),
    );

    let custom_arn_condition = "CustomAppCertArnCondition";
    template.add_condition(custom_arn_condition, not(equals(custom_arn.clone(), "")));

    let stack_cert_condition = "StackCertificateCondition";
    template
        .add_condition(stack_cert_condition, not(equals(validation_method.clone(), DONT_CREATE)));

    let cert_condition = "CertificateCondition".to_string();
    template.add_condition(
        &cert_condition,
        or(vec![
            not(equals(custom_arn.clone(), "")),
            not(equals(validation_method.clone(), DONT_CREATE)),
        ]),
    );

    let certificate = template.add_resource(Resource {
        condition: Some(stack_cert_condition.to_string()),
        properties: props! {
            "DomainName" => domain.domain_name.clone(),
            "DomainValidationOptions" => vec![Value::Map(props! {
                "DomainName" => domain.domain_name.clone(),
                "ValidationDomain" => domain.domain_name.clone(),
            })],
            "ValidationMethod" => validation_method.clone(),
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("Certificate", "AWS::CertificateManager::Certificate")
    });

    let application = fn_if(custom_arn_condition, custom_arn, certificate);

    Certificates { application, cert_condition }
}
