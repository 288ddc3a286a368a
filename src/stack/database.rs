//! Managed RDS database: a primary instance gated on the instance-class
//! parameter, an optional read replica, and connection-string outputs
//! assembled as deferred expressions.

use crate::config::StackConfig;
use crate::expr::{
    and, condition, equals, find_in_map, fn_if, get_att, join, not, reference, Value,
    AWS_STACK_NAME,
};
use crate::props;
use crate::stack::common::{Common, DONT_CREATE};
use crate::stack::vpc::Network;
use crate::tags::{TagShape, Tags};
use crate::template::{Mapping, Output, Parameter, Resource, Template};

const DB_CLASSES: [&str; 17] = [
    DONT_CREATE,
    "db.t2.micro",
    "db.t2.small",
    "db.t2.medium",
    "db.t3.micro",
    "db.t3.small",
    "db.t3.medium",
    "db.t3.large",
    "db.m4.large",
    "db.m4.xlarge",
    "db.m5.large",
    "db.m5.xlarge",
    "db.m5.2xlarge",
    "db.r4.large",
    "db.r4.xlarge",
    "db.r5.large",
    "db.r5.xlarge",
];

const ENGINES: [(&str, &str); 8] = [
    ("aurora", "3306"),
    ("mariadb", "3306"),
    ("mysql", "3306"),
    ("oracle-ee", "1521"),
    ("oracle-se2", "1521"),
    ("postgres", "5432"),
    ("sqlserver-ee", "1433"),
    ("sqlserver-ex", "1433"),
];

const PARAMETER_GROUP_FAMILIES: [&str; 12] = [
    "aurora-mysql5.7",
    "aurora-postgresql10",
    "mariadb10.2",
    "mariadb10.3",
    "mysql5.6",
    "mysql5.7",
    "mysql8.0",
    "postgres9.6",
    "postgres10",
    "postgres11",
    "postgres12",
    "sqlserver-ex-14.0",
];

pub struct Database {
    pub condition: String,
    pub instance: Value,
    pub name: Value,
    pub user: Value,
    pub password: Value,
    pub endpoint_address: Value,
    /// Connection URL with the password elided, for the stack outputs.
    pub url: Value,
}

/// The engine-to-port lookup table registered as `RdsEngineMap`.
fn rds_engine_map() -> Mapping {
    ENGINES
        .iter()
        .map(|(engine, port)| (engine.to_string(), props! {"Port" => *port}))
        .collect()
}

fn engine_port(db_engine: &Value) -> Value {
    find_in_map("RdsEngineMap", db_engine.clone(), "Port")
}

pub fn build(
    template: &mut Template,
    config: &StackConfig,
    common: &Common,
    network: &Network,
) -> Database {
    let defaults = &config.defaults;

    template.add_mapping("RdsEngineMap", rds_engine_map());

    let db_class = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Database instance class".to_string()),
            default: Some("db.t3.micro".to_string()),
            allowed_values: DB_CLASSES.iter().map(|s| s.to_string()).collect(),
            constraint_description: Some(
                "must select a valid database instance type.".to_string(),
            ),
            ..Parameter::new("DatabaseClass", "String")
        }),
        Some("Database"),
        Some("Instance Type"),
    );

    let db_condition = "DatabaseCondition".to_string();
    template.add_condition(&db_condition, not(equals(db_class.clone(), DONT_CREATE)));

    let db_replication = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Whether to create a database server replica - WARNING this will fail \
                 if DatabaseBackupRetentionDays is 0."
                    .to_string(),
            ),
            default: Some("false".to_string()),
            allowed_values: vec!["true".to_string(), "false".to_string()],
            ..Parameter::new("DatabaseReplication", "String")
        }),
        Some("Database"),
        Some("Database replication"),
    );

    let db_replication_condition = "DatabaseReplicationCondition".to_string();
    template.add_condition(
        &db_replication_condition,
        and(vec![condition(&db_condition), equals(db_replication.clone(), "true")]),
    );

    let db_engine = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Database engine to use".to_string()),
            default: Some("postgres".to_string()),
            allowed_values: ENGINES.iter().map(|(engine, _)| engine.to_string()).collect(),
            constraint_description: Some("must select a valid database engine.".to_string()),
            ..Parameter::new("DatabaseEngine", "String")
        }),
        Some("Database"),
        Some("Engine"),
    );

    let db_engine_version = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Database version to use".to_string()),
            default: Some(String::new()),
            ..Parameter::new("DatabaseEngineVersion", "String")
        }),
        Some("Database"),
        Some("Engine Version"),
    );

    let db_parameter_group_family = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Database parameter group family name; must match the engine and \
                 version of the RDS instance."
                    .to_string(),
            ),
            allowed_values: PARAMETER_GROUP_FAMILIES.iter().map(|s| s.to_string()).collect(),
            ..Parameter::new("DatabaseParameterGroupFamily", "String")
        }),
        Some("Database"),
        Some("Parameter Group Family"),
    );

    let db_parameter_group = template.add_resource(Resource {
        condition: Some(db_condition.clone()),
        properties: props! {
            "Description" => "Database parameter group.",
            "Family" => db_parameter_group_family.clone(),
            "Parameters" => Value::Map(props! {}),
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("DatabaseParameterGroup", "AWS::RDS::DBParameterGroup")
    });

    let db_name = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "Name of the database to create in the database server".to_string(),
            ),
            default: Some("app".to_string()),
            min_length: Some(1),
            max_length: Some(64),
            allowed_pattern: Some("[a-zA-Z][a-zA-Z0-9_]*".to_string()),
            constraint_description: Some(
                "must begin with a letter and contain only alphanumeric characters."
                    .to_string(),
            ),
            ..Parameter::new("DatabaseName", "String")
        }),
        Some("Database"),
        Some("Database Name"),
    );

    let db_user = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("The database admin account username".to_string()),
            default: Some("app".to_string()),
            min_length: Some(1),
            max_length: Some(63),
            allowed_pattern: Some("[a-zA-Z][a-zA-Z0-9_]*".to_string()),
            constraint_description: Some(
                "must begin with a letter and contain only alphanumeric characters \
                 and underscores."
                    .to_string(),
            ),
            ..Parameter::new("DatabaseUser", "String")
        }),
        Some("Database"),
        Some("Username"),
    );

    let db_password = template.add_parameter(
        defaults.apply(Parameter {
            no_echo: true,
            description: Some(
                "The database admin account password must consist of 10-41 printable \
                 ASCII characters except \"/\", \"\\\"\", or \"@\"."
                    .to_string(),
            ),
            min_length: Some(10),
            max_length: Some(41),
            allowed_pattern: Some("[ !#-.0-?A-~]*".to_string()),
            constraint_description: Some(
                "must consist of 10-41 printable ASCII characters except \"/\", \
                 \"\\\"\", or \"@\"."
                    .to_string(),
            ),
            ..Parameter::new("DatabasePassword", "String")
        }),
        Some("Database"),
        Some("Password"),
    );

    let db_allocated_storage = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("The size of the database (Gb)".to_string()),
            default: Some("20".to_string()),
            min_value: Some(5),
            max_value: Some(1024),
            constraint_description: Some("must be between 5 and 1024Gb.".to_string()),
            ..Parameter::new("DatabaseAllocatedStorage", "Number")
        }),
        Some("Database"),
        Some("Storage (GB)"),
    );

    let db_multi_az = template.add_parameter(
        defaults.apply(Parameter {
            description: Some("Whether or not to create a MultiAZ database".to_string()),
            default: Some("false".to_string()),
            allowed_values: vec!["true".to_string(), "false".to_string()],
            constraint_description: Some("must choose true or false.".to_string()),
            ..Parameter::new("DatabaseMultiAZ", "String")
        }),
        Some("Database"),
        Some("Enable MultiAZ"),
    );

    let db_backup_retention_days = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "The number of days for which automated backups are retained. Setting \
                 to 0 disables automated backups."
                    .to_string(),
            ),
            default: Some("30".to_string()),
            // 0-35 are the supported values
            allowed_values: (0..36).map(|days| days.to_string()).collect(),
            ..Parameter::new("DatabaseBackupRetentionDays", "Number")
        }),
        Some("Database"),
        Some("Backup Retention Days"),
    );

    let db_logging = template.add_parameter(
        defaults.apply(Parameter {
            description: Some(
                "A comma-separated list of the RDS log types (if any) to publish to \
                 CloudWatch Logs. Note that log types are database engine-specific."
                    .to_string(),
            ),
            default: Some(String::new()),
            ..Parameter::new("DatabaseCloudWatchLogTypes", "CommaDelimitedList")
        }),
        Some("Database"),
        Some("Database Log Types"),
    );

    let db_logging_condition = "DatabaseLoggingCondition";
    template.add_condition(
        db_logging_condition,
        not(equals(join(",", vec![db_logging.clone()]), "")),
    );

    let db_security_group = template.add_resource(Resource {
        condition: Some(db_condition.clone()),
        properties: props! {
            "GroupDescription" => "Database security group.",
            "VpcId" => network.vpc.clone(),
            "SecurityGroupIngress" => vec![
                // Database port in from the application subnets
                Value::Map(props! {
                    "IpProtocol" => "tcp",
                    "FromPort" => engine_port(&db_engine),
                    "ToPort" => engine_port(&db_engine),
                    "CidrIp" => network.container_a_subnet_cidr.as_str(),
                }),
                Value::Map(props! {
                    "IpProtocol" => "tcp",
                    "FromPort" => engine_port(&db_engine),
                    "ToPort" => engine_port(&db_engine),
                    "CidrIp" => network.container_b_subnet_cidr.as_str(),
                }),
            ],
        },
        tag_shape: Some(TagShape::KeyValueList),
        tags: Some(Tags::name(join("-", vec![reference(AWS_STACK_NAME), "rds".into()]))),
        ..Resource::new("DatabaseSecurityGroup", "AWS::EC2::SecurityGroup")
    });

    let db_subnet_group = template.add_resource(Resource {
        condition: Some(db_condition.clone()),
        properties: props! {
            "DBSubnetGroupDescription" => "Subnets available for the RDS DB Instance",
            "SubnetIds" => vec![
                network.container_a_subnet.clone(),
                network.container_b_subnet.clone(),
            ],
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("DatabaseSubnetGroup", "AWS::RDS::DBSubnetGroup")
    });

    let db_instance = template.add_resource(Resource {
        condition: Some(db_condition.clone()),
        deletion_policy: Some("Snapshot".to_string()),
        properties: props! {
            "DBName" => db_name.clone(),
            "AllocatedStorage" => db_allocated_storage.clone(),
            "DBInstanceClass" => db_class.clone(),
            "Engine" => db_engine.clone(),
            "EngineVersion" => db_engine_version.clone(),
            "MultiAZ" => db_multi_az.clone(),
            "StorageEncrypted" => common.use_aes256_encryption.clone(),
            "StorageType" => "gp2",
            "MasterUsername" => db_user.clone(),
            "MasterUserPassword" => db_password.clone(),
            "DBSubnetGroupName" => db_subnet_group.clone(),
            "VPCSecurityGroups" => vec![db_security_group.clone()],
            "DBParameterGroupName" => db_parameter_group.clone(),
            "BackupRetentionPeriod" => db_backup_retention_days.clone(),
            "EnableCloudwatchLogsExports" => fn_if(
                db_logging_condition,
                db_logging.clone(),
                Value::NoValue,
            ),
            "KmsKeyId" => fn_if(
                &common.use_cmk_arn_condition,
                common.cmk_arn.clone(),
                Value::NoValue,
            ),
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("DatabaseInstance", "AWS::RDS::DBInstance")
    });

    template.add_resource(Resource {
        condition: Some(db_replication_condition.clone()),
        properties: props! {
            "SourceDBInstanceIdentifier" => db_instance.clone(),
            "DBInstanceClass" => db_class.clone(),
            "Engine" => db_engine.clone(),
            "VPCSecurityGroups" => vec![db_security_group.clone()],
        },
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("DatabaseReplica", "AWS::RDS::DBInstance")
    });

    let db_url = fn_if(
        &db_condition,
        join(
            "",
            vec![
                db_engine.clone(),
                "://".into(),
                db_user.clone(),
                ":_PASSWORD_@".into(),
                get_att("DatabaseInstance", "Endpoint.Address"),
                ":".into(),
                get_att("DatabaseInstance", "Endpoint.Port"),
                "/".into(),
                db_name.clone(),
            ],
        ),
        // defaults to empty string if no DB was created
        "",
    );

    let db_replica_url = fn_if(
        &db_replication_condition,
        join(
            "",
            vec![
                db_engine.clone(),
                "://".into(),
                db_user.clone(),
                ":_PASSWORD_@".into(),
                get_att("DatabaseReplica", "Endpoint.Address"),
                ":".into(),
                get_att("DatabaseReplica", "Endpoint.Port"),
                "/".into(),
                db_name.clone(),
            ],
        ),
        "",
    );

    template.add_output(Output::conditional(
        "DatabaseURL",
        "URL to connect (without the password) to the database.",
        db_url.clone(),
        &db_condition,
    ));
    template.add_output(Output::conditional(
        "DatabaseReplicaURL",
        "URL to connect (without the password) to the database replica.",
        db_replica_url,
        &db_replication_condition,
    ));
    template.add_output(Output::conditional(
        "DatabasePort",
        "The port number on which the database accepts connections.",
        get_att("DatabaseInstance", "Endpoint.Port"),
        &db_condition,
    ));
    template.add_output(Output::conditional(
        "DatabaseAddress",
        "The connection endpoint for the database.",
        get_att("DatabaseInstance", "Endpoint.Address"),
        &db_condition,
    ));
    template.add_output(Output::conditional(
        "DatabaseReplicaAddress",
        "The connection endpoint for the database replica.",
        get_att("DatabaseReplica", "Endpoint.Address"),
        &db_replication_condition,
    ));

    Database {
        condition: db_condition,
        instance: db_instance,
        name: db_name,
        user: db_user,
        password: db_password,
        endpoint_address: get_att("DatabaseInstance", "Endpoint.Address"),
        url: db_url,
    }
}
