//! Managed cache clusters: a memcached `CacheCluster` and/or a redis
//! `ReplicationGroup`, each gated on its node-type parameter being set to
//! something other than the do-not-create sentinel.

use crate::config::StackConfig;
use crate::expr::{
    and, condition, equals, fn_if, get_att, join, not, or, reference, Value, AWS_REGION,
    AWS_STACK_NAME,
};
use crate::props;
use crate::stack::common::{Common, DONT_CREATE};
use crate::stack::security_groups::SecurityGroups;
use crate::stack::vpc::Network;
use crate::tags::{TagShape, Tags};
use crate::template::{Output, Parameter, Resource, Template};

pub const MEMCACHED_PORT: i64 = 11211;
pub const REDIS_PORT: i64 = 6379;

const NODE_TYPES: [&str; 13] = [
    DONT_CREATE,
    "cache.t2.micro",
    "cache.t2.small",
    "cache.t2.medium",
    "cache.t3.micro",
    "cache.t3.small",
    "cache.t3.medium",
    "cache.m4.large",
    "cache.m4.xlarge",
    "cache.m5.large",
    "cache.m5.xlarge",
    "cache.r4.large",
    "cache.r4.xlarge",
];

// Parameter constraints (MinLength, AllowedPattern, etc.) don't allow a
// blank value, so the auth token gets its own do-not-create sentinel.
const AUTH_TOKEN_DONT_CREATE: &str = "DO_NOT_CREATE_AUTH_TOKEN";

pub struct Cache {
    pub using_memcached_condition: String,
    pub using_redis_condition: String,
    pub cache_url: Value,
    pub redis_url: Value,
}

fn node_type_values() -> Vec<String> {
    NODE_TYPES.iter().map(|s| s.to_string()).collect()
}

pub fn build(
    template: &mut Template,
    config: &StackConfig,
    common: &Common,
    network: &Network,
    security_groups: &SecurityGroups,
) -> Cache {
    let defaults = &config.defaults;

    let cache_node_type = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Cache instance type".to_string()),
            default: Some(DONT_CREATE.to_string()),
            allowed_values: node_type_values(),
            constraint_description: Some("must select a valid cache node type.".to_string()),
            ..Parameter::new("CacheNodeType", "String")
        }),
        Some("Memcached"),
        Some("Instance Type"),
    );

    let using_memcached_condition = "UsingMemcached".to_string();
    template.add_condition(
        &using_memcached_condition,
        not(equals(cache_node_type.clone(), DONT_CREATE)),
    );

    let redis_node_type = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Redis instance type".to_string()),
            default: Some(DONT_CREATE.to_string()),
            allowed_values: node_type_values(),
            constraint_description: Some("must select a valid cache node type.".to_string()),
            ..Parameter::new("RedisNodeType", "String")
        }),
        Some("Redis"),
        Some("Instance Type"),
    );

    let using_redis_condition = "UsingRedis".to_string();
    template
        .add_condition(&using_redis_condition, not(equals(redis_node_type.clone(), DONT_CREATE)));

    let redis_auth_token = template.add_parameter(
        defaults.apply(Parameter {
            no_echo: true,
            description: Some(
                "The password used to access a Redis ReplicationGroup (required for HIPAA)."
                    .to_string(),
            ),
            default: Some(AUTH_TOKEN_DONT_CREATE.to_string()),
            min_length: Some(16),
            max_length: Some(128),
            allowed_pattern: Some("[ !#-.0-?A-~]*".to_string()),
            constraint_description: Some(
                "must consist of 16-128 printable ASCII characters except \"/\", \"\\\"\", \
                 or \"@\"."
                    .to_string(),
            ),
            ..Parameter::new("RedisAuthToken", "String")
        }),
        Some("Redis"),
        Some("AuthToken"),
    );

    let using_auth_token_condition = "AuthTokenCondition";
    template.add_condition(
        using_auth_token_condition,
        not(equals(redis_auth_token.clone(), AUTH_TOKEN_DONT_CREATE)),
    );

    let redis_version = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Redis version to use. See available versions: \
                 aws elasticache describe-cache-engine-versions"
                    .to_string(),
            ),
            default: Some(String::new()),
            ..Parameter::new("RedisVersion", "String")
        }),
        Some("Redis"),
        Some("Redis Version"),
    );

    let redis_num_cache_clusters = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "The number of clusters this replication group initially has.".to_string(),
            ),
            default: Some("1".to_string()),
            ..Parameter::new("RedisNumCacheClusters", "Number")
        }),
        Some("Redis"),
        Some("Number of node groups"),
    );

    let redis_snapshot_retention_limit = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "The number of days for which ElastiCache retains automatic snapshots \
                 before deleting them. 0 = automatic backups are disabled for this cluster."
                    .to_string(),
            ),
            default: Some("0".to_string()),
            ..Parameter::new("RedisSnapshotRetentionLimit", "Number")
        }),
        Some("Redis"),
        Some("Snapshot retention limit"),
    );

    let redis_automatic_failover = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Specifies whether a read-only replica is automatically promoted to \
                 read/write primary if the existing primary fails."
                    .to_string(),
            ),
            default: Some("false".to_string()),
            allowed_values: vec!["true".to_string(), "false".to_string()],
            ..Parameter::new("RedisAutomaticFailover", "String")
        }),
        Some("Redis"),
        Some("Enable automatic failover"),
    );

    let redis_uses_automatic_failover = "RedisAutomaticFailoverCondition";
    template.add_condition(
        redis_uses_automatic_failover,
        equals(redis_automatic_failover.clone(), "true"),
    );

    let secure_redis_condition = "SecureRedisCondition";
    template.add_condition(
        secure_redis_condition,
        and(vec![
            condition(&using_redis_condition),
            condition(&common.use_aes256_encryption_condition),
        ]),
    );

    let using_either_cache_condition = "EitherCacheCondition";
    template.add_condition(
        using_either_cache_condition,
        or(vec![condition(&using_memcached_condition), condition(&using_redis_condition)]),
    );

    // Subnet and security group shared by both clusters

    let cache_subnet_group = template.add_resource(Resource {
        condition: Some(using_either_cache_condition.to_string()),
        properties: props! {
            "Description" => "Subnets available for the cache instance",
            "SubnetIds" => vec![
                network.container_a_subnet.clone(),
                network.container_b_subnet.clone(),
            ],
        },
        ..Resource::new("CacheSubnetGroup", "AWS::ElastiCache::SubnetGroup")
    });

    let cache_security_group = template.add_resource(Resource {
        condition: Some(using_either_cache_condition.to_string()),
        properties: props! {
            "GroupDescription" => "Cache security group.",
            "VpcId" => network.vpc.clone(),
            "SecurityGroupIngress" => vec![
                fn_if(
                    &using_memcached_condition,
                    Value::Map(props! {
                        "IpProtocol" => "tcp",
                        "FromPort" => MEMCACHED_PORT,
                        "ToPort" => MEMCACHED_PORT,
                        "SourceSecurityGroupId" => security_groups.container.clone(),
                    }),
                    Value::NoValue,
                ),
                fn_if(
                    &using_redis_condition,
                    Value::Map(props! {
                        "IpProtocol" => "tcp",
                        "FromPort" => REDIS_PORT,
                        "ToPort" => REDIS_PORT,
                        "SourceSecurityGroupId" => security_groups.container.clone(),
                    }),
                    Value::NoValue,
                ),
            ],
        },
        tag_shape: Some(TagShape::KeyValueList),
        tags: Some(Tags::name(join("-", vec![reference(AWS_STACK_NAME), "cache".into()]))),
        ..Resource::new("CacheSecurityGroup", "AWS::EC2::SecurityGroup")
    });

    template.add_resource(Resource {
        condition: Some(using_memcached_condition.clone()),
        properties: props! {
            "Engine" => "memcached",
            "CacheNodeType" => cache_node_type.clone(),
            "NumCacheNodes" => 1,
            "Port" => MEMCACHED_PORT,
            "VpcSecurityGroupIds" => vec![cache_security_group.clone()],
            "CacheSubnetGroupName" => cache_subnet_group.clone(),
        },
        tag_shape: Some(TagShape::KeyValueList),
        tags: Some(Tags::name(join("-", vec![reference(AWS_STACK_NAME), "cache".into()]))),
        ..Resource::new("CacheCluster", "AWS::ElastiCache::CacheCluster")
    });

    template.add_resource(Resource {
        condition: Some(using_redis_condition.clone()),
        properties: props! {
            "AtRestEncryptionEnabled" => common.use_aes256_encryption.clone(),
            "AutomaticFailoverEnabled" => redis_automatic_failover.clone(),
            "AuthToken" => fn_if(
                using_auth_token_condition,
                redis_auth_token.clone(),
                Value::NoValue,
            ),
            "Engine" => "redis",
            "EngineVersion" => redis_version.clone(),
            "CacheNodeType" => redis_node_type.clone(),
            "CacheSubnetGroupName" => cache_subnet_group.clone(),
            "NumCacheClusters" => redis_num_cache_clusters.clone(),
            "Port" => REDIS_PORT,
            "PreferredCacheClusterAZs" => fn_if(
                redis_uses_automatic_failover,
                Value::List(vec![
                    join("", vec![reference(AWS_REGION), "a".into()]),
                    join("", vec![reference(AWS_REGION), "b".into()]),
                ]),
                Value::NoValue,
            ),
            "ReplicationGroupDescription" => "Redis ReplicationGroup",
            "SecurityGroupIds" => vec![cache_security_group.clone()],
            "SnapshotRetentionLimit" => redis_snapshot_retention_limit.clone(),
            "TransitEncryptionEnabled" => common.use_aes256_encryption.clone(),
            "KmsKeyId" => fn_if(
                &common.use_cmk_arn_condition,
                common.cmk_arn.clone(),
                Value::NoValue,
            ),
        },
        tag_shape: Some(TagShape::KeyValueList),
        tags: Some(Tags::name(join("-", vec![reference(AWS_STACK_NAME), "redis".into()]))),
        ..Resource::new("RedisReplicationGroup", "AWS::ElastiCache::ReplicationGroup")
    });

    let cache_address = fn_if(
        &using_memcached_condition,
        get_att("CacheCluster", "ConfigurationEndpoint.Address"),
        "",
    );
    let cache_port = fn_if(
        &using_memcached_condition,
        get_att("CacheCluster", "ConfigurationEndpoint.Port"),
        "",
    );
    let cache_url = fn_if(
        &using_memcached_condition,
        join("", vec!["memcached://".into(), cache_address.clone(), ":".into(), cache_port]),
        "",
    );

    template.add_output(Output::conditional(
        "CacheAddress",
        "The DNS address for the cache node/cluster.",
        cache_address,
        &using_memcached_condition,
    ));
    template.add_output(Output::conditional(
        "CachePort",
        "The port number for the cache node/cluster.",
        get_att("CacheCluster", "ConfigurationEndpoint.Port"),
        &using_memcached_condition,
    ));
    template.add_output(Output::conditional(
        "CacheURL",
        "URL to connect to the cache node/cluster.",
        cache_url.clone(),
        &using_memcached_condition,
    ));

    let redis_address = fn_if(
        &using_redis_condition,
        get_att("RedisReplicationGroup", "PrimaryEndPoint.Address"),
        "",
    );
    let redis_port = fn_if(
        &using_redis_condition,
        get_att("RedisReplicationGroup", "PrimaryEndPoint.Port"),
        "",
    );
    let redis_url = fn_if(
        &using_redis_condition,
        join(
            "",
            vec![
                "redis".into(),
                fn_if(secure_redis_condition, "s", ""),
                "://".into(),
                fn_if(using_auth_token_condition, ":_PASSWORD_@", ""),
                redis_address.clone(),
                ":".into(),
                redis_port.clone(),
            ],
        ),
        "",
    );

    template.add_output(Output::conditional(
        "RedisAddress",
        "The DNS address for the Redis node/cluster.",
        redis_address,
        &using_redis_condition,
    ));
    template.add_output(Output::conditional(
        "RedisPort",
        "The port number for the Redis node/cluster.",
        redis_port,
        &using_redis_condition,
    ));
    template.add_output(Output::conditional(
        "RedisURL",
        "URL to connect to the Redis node/cluster.",
        redis_url.clone(),
        &using_redis_condition,
    ));

    Cache { using_memcached_condition, using_redis_condition, cache_url, redis_url }
}
