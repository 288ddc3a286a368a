//! Environment variables handed to the application servers. Connection
//! strings are assembled as deferred expressions so the values track the
//! actual endpoints CloudFormation assigns.

use crate::expr::{fn_if, get_att, join, Value};
use crate::stack::assets::Assets;
use crate::stack::cache::Cache;
use crate::stack::common::Common;
use crate::stack::database::Database;
use crate::stack::domain::Domain;

pub fn environment_variables(
    common: &Common,
    domain: &Domain,
    assets: &Assets,
    cache: &Cache,
    database: &Database,
) -> Vec<(String, Value)> {
    let database_url = join(
        "",
        vec![
            "postgres://".into(),
            database.user.clone(),
            ":".into(),
            database.password.clone(),
            "@".into(),
            database.endpoint_address.clone(),
            "/".into(),
            database.name.clone(),
        ],
    );

    // Whichever cache engine was selected; empty when neither is
    let cache_url =
        fn_if(&cache.using_redis_condition, cache.redis_url.clone(), cache.cache_url.clone());

    let mut variables = vec![
        ("AWS_STORAGE_BUCKET_NAME".to_string(), assets.assets_bucket.clone()),
        ("AWS_PRIVATE_STORAGE_BUCKET_NAME".to_string(), assets.private_assets_bucket.clone()),
        ("DOMAIN_NAME".to_string(), domain.domain_name.clone()),
        ("SECRET_KEY".to_string(), common.secret_key.clone()),
        ("DATABASE_URL".to_string(), database_url),
        ("CACHE_URL".to_string(), cache_url),
    ];

    // not supported by GovCloud, so add it only if it was created
    if assets.distribution.is_some() {
        variables
            .push(("CDN_DOMAIN_NAME".to_string(), get_att("AssetsDistribution", "DomainName")));
    }

    variables
}
