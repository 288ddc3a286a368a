//! The application domain name parameter.

use crate::config::StackConfig;
use crate::expr::Value;
use crate::template::{Parameter, Template};

pub struct Domain {
    pub domain_name: Value,
}

pub fn build(template: &mut Template, config: &StackConfig) -> Domain {
    let domain_name = template.add_parameter(
        config.defaults.apply(Parameter {
            description: Some("The fully-qualified domain name for the application".to_string()),
            ..Parameter::new("DomainName", "String")
        }),
        Some("Global"),
        Some("Domain Name"),
    );

    Domain { domain_name }
}
