//! Stack configuration.
//!
//! Describes the deployment variant to generate. The variant is chosen
//! explicitly here and passed into the composition function, rather than
//! being selected by environment flags at import time.

use crate::defaults::Defaults;
use clap::ValueEnum;

/// The compute flavor of the generated stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Infra {
    /// ECS cluster running containers on managed EC2 instances
    Ecs,
    /// Elastic Beanstalk application environment
    Eb,
    /// Plain EC2 instances behind an auto scaling group
    Ec2,
}

/// Everything the composition function needs to know to assemble one
/// template.
#[derive(Debug, Default)]
pub struct StackConfig {
    pub infra: Infra,
    /// GovCloud lacks the certificate manager and CloudFront, so those
    /// resource sets are skipped entirely when set.
    pub gov_cloud: bool,
    pub defaults: Defaults,
}

impl Default for Infra {
    fn default() -> Self {
        Infra::Ecs
    }
}
