//! The resource modules that make up a stack, and the composition root
//! that wires them together into a single template.

pub mod assets;
pub mod cache;
pub mod certificates;
pub mod cluster;
pub mod common;
pub mod database;
pub mod domain;
pub mod eb;
pub mod environment;
pub mod instances;
pub mod load_balancer;
pub mod logs;
pub mod repository;
pub mod security_groups;
pub mod vpc;

use log::debug;

use crate::config::{Infra, StackConfig};
use crate::tags;
use crate::template::Template;

/// Order in which parameter groups show up in the CloudFormation console.
/// Groups that end up unused for a given variant are dropped.
const GROUP_ORDER: [&str; 8] = [
    "Global",
    "Application Server",
    "Load Balancer",
    "Static Media",
    "Database",
    "Memcached",
    "Redis",
    "Elasticsearch",
];

/// Assembles the full template for the configured deployment variant.
pub fn build_template(config: &StackConfig) -> Template {
    debug!("building {:?} template (gov_cloud: {})", config.infra, config.gov_cloud);

    let mut template = Template::default();
    template.set_group_order(GROUP_ORDER);

    let common = common::build(&mut template, config);
    let network = vpc::build(&mut template);
    let security_groups = security_groups::build(&mut template, &network);
    let domain = domain::build(&mut template, config);

    // GovCloud doesn't support the Certificate Manager
    let certificates = if config.gov_cloud {
        None
    } else {
        Some(certificates::build(&mut template, config, &domain))
    };

    let assets = assets::build(&mut template, config, &common, &domain);
    let cache = cache::build(&mut template, config, &common, &network, &security_groups);
    let database = database::build(&mut template, config, &common, &network);
    let logging = logs::build(&mut template, &common);

    let environment =
        environment::environment_variables(&common, &domain, &assets, &cache, &database);

    match config.infra {
        Infra::Ecs => {
            let load_balancer = load_balancer::build(
                &mut template,
                config,
                &network,
                &security_groups,
                certificates.as_ref(),
            );
            let repository = repository::build(&mut template);
            cluster::build(
                &mut template,
                config,
                &common,
                &network,
                &security_groups,
                &load_balancer,
                &assets,
                &logging,
                &repository,
                &environment,
            );
        }
        Infra::Ec2 => {
            let load_balancer = load_balancer::build(
                &mut template,
                config,
                &network,
                &security_groups,
                certificates.as_ref(),
            );
            instances::build(
                &mut template,
                config,
                &common,
                &network,
                &security_groups,
                &load_balancer,
                &assets,
                &logging,
            );
        }
        Infra::Eb => {
            eb::build(
                &mut template,
                config,
                &common,
                &network,
                &security_groups,
                certificates.as_ref(),
                &assets,
                &logging,
                &environment,
            );
        }
    }

    tags::add_common_tags(&mut template);

    template
}
