use serde_json::json;
use webstacks::expr::reference;
use webstacks::props;
use webstacks::tags::{add_common_tags, Tag, TagShape, Tags};
use webstacks::template::{Resource, Template};

#[test]
fn test_common_tags_added_to_untagged_resource() {
    let mut template = Template::new();
    template.add_resource(Resource {
        tag_shape: Some(TagShape::KeyValueList),
        ..Resource::new("Vpc", "AWS::EC2::VPC")
    });

    add_common_tags(&mut template);

    let rendered = template.to_value();
    assert_eq!(
        rendered["Resources"]["Vpc"]["Properties"]["Tags"],
        json!([{"Key": "webstacks:stack-name", "Value": {"Ref": "AWS::StackName"}}])
    );
}

#[test]
fn test_resource_tags_win_on_collision() {
    let mut template = Template::new();
    template.add_resource(Resource {
        tag_shape: Some(TagShape::KeyValueList),
        tags: Some(Tags::KeyValueList(vec![Tag {
            key: "webstacks:stack-name".to_string(),
            value: "pinned".into(),
        }])),
        ..Resource::new("AssetsBucket", "AWS::S3::Bucket")
    });

    add_common_tags(&mut template);

    let rendered = template.to_value();
    assert_eq!(
        rendered["Resources"]["AssetsBucket"]["Properties"]["Tags"],
        json!([{"Key": "webstacks:stack-name", "Value": "pinned"}])
    );
}

#[test]
fn test_existing_tags_preserved_alongside_common() {
    let mut template = Template::new();
    template.add_resource(Resource {
        tag_shape: Some(TagShape::KeyValueList),
        tags: Some(Tags::name(reference("AWS::StackName"))),
        ..Resource::new("CacheSecurityGroup", "AWS::EC2::SecurityGroup")
    });

    add_common_tags(&mut template);

    let rendered = template.to_value();
    let tags = rendered["Resources"]["CacheSecurityGroup"]["Properties"]["Tags"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(tags.len(), 2);
    assert!(tags.contains(&json!({"Key": "webstacks:stack-name", "Value": {"Ref": "AWS::StackName"}})));
    assert!(tags.contains(&json!({"Key": "Name", "Value": {"Ref": "AWS::StackName"}})));
}

#[test]
fn test_string_map_shape() {
    let mut template = Template::new();
    template.add_resource(Resource {
        tag_shape: Some(TagShape::StringMap),
        tags: Some(Tags::StringMap(props! {"environment" => "production"})),
        ..Resource::new("EBEnvironment", "AWS::ElasticBeanstalk::Environment")
    });

    add_common_tags(&mut template);

    let rendered = template.to_value();
    assert_eq!(
        rendered["Resources"]["EBEnvironment"]["Properties"]["Tags"],
        json!({
            "webstacks:stack-name": {"Ref": "AWS::StackName"},
            "environment": "production",
        })
    );
}

#[test]
fn test_resources_without_tag_shape_untouched() {
    let mut template = Template::new();
    // scaling groups manage tags directly in the property bag
    template.add_resource(Resource {
        properties: props! {
            "Tags" => vec![webstacks::expr::Value::Map(props! {
                "Key" => "Name",
                "Value" => "worker",
                "PropagateAtLaunch" => true,
            })],
        },
        ..Resource::new("AutoScalingGroup", "AWS::AutoScaling::AutoScalingGroup")
    });

    add_common_tags(&mut template);

    let rendered = template.to_value();
    assert_eq!(
        rendered["Resources"]["AutoScalingGroup"]["Properties"]["Tags"],
        json!([{"Key": "Name", "Value": "worker", "PropagateAtLaunch": true}])
    );
}
