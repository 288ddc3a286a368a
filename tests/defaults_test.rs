use std::io::Write;
use tempfile::NamedTempFile;
use webstacks::defaults::Defaults;
use webstacks::template::Parameter;

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_json() {
    let file = write_file(r#"{"ContainerInstanceType": "t2.medium", "MaxScale": "5"}"#);
    let defaults = Defaults::load(file.path()).unwrap();

    assert_eq!(defaults.get("ContainerInstanceType"), Some("t2.medium"));
    assert_eq!(defaults.get("MaxScale"), Some("5"));
    assert_eq!(defaults.get("DatabaseClass"), None);
}

#[test]
fn test_load_yaml() {
    let file = write_file("ContainerInstanceType: t2.medium\nDatabaseClass: db.t3.medium\n");
    let defaults = Defaults::load(file.path()).unwrap();

    assert_eq!(defaults.get("ContainerInstanceType"), Some("t2.medium"));
    assert_eq!(defaults.get("DatabaseClass"), Some("db.t3.medium"));
}

#[test]
fn test_scalars_coerced_to_strings() {
    let file = write_file(r#"{"MaxScale": 5, "UseAES256Encryption": true}"#);
    let defaults = Defaults::load(file.path()).unwrap();

    assert_eq!(defaults.get("MaxScale"), Some("5"));
    assert_eq!(defaults.get("UseAES256Encryption"), Some("true"));
}

#[test]
fn test_nested_values_rejected() {
    let file = write_file(r#"{"MaxScale": {"nested": "value"}}"#);
    assert!(Defaults::load(file.path()).is_err());
}

#[test]
fn test_invalid_content_rejected() {
    let file = write_file("{not valid json or yaml: [");
    assert!(Defaults::load(file.path()).is_err());
}

#[test]
fn test_missing_file() {
    assert!(Defaults::load("/nonexistent/defaults.json").is_err());
}

#[test]
fn test_apply_overrides_default() {
    let mut defaults = Defaults::default();
    defaults.set("AMI", "ami-078c57a94e9bdc6e0");

    let parameter = defaults.apply(Parameter {
        default: Some(String::new()),
        ..Parameter::new("AMI", "String")
    });
    assert_eq!(parameter.default.as_deref(), Some("ami-078c57a94e9bdc6e0"));
}

#[test]
fn test_apply_leaves_unlisted_parameters_alone() {
    let defaults = Defaults::default();

    let parameter = defaults.apply(Parameter {
        default: Some("t2.micro".to_string()),
        ..Parameter::new("ContainerInstanceType", "String")
    });
    assert_eq!(parameter.default.as_deref(), Some("t2.micro"));
}
