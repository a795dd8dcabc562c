//! ROS `package.xml` manifest parsing.
//!
//! The manifest is the package metadata document of the ROS ecosystem. Both
//! format 1 (`run_depend`) and format 2 (`depend`) documents are accepted;
//! the grouped tags are expanded into the underlying dependency classes the
//! same way catkin_pkg expands them.

use anyhow::{Context, Result};
use serde::Deserialize;

/// The parsed package.xml manifest.
///
/// Dependency lists keep document order within each class. A name that
/// appears in several classes stays in each of them; no deduplication
/// happens here or later.
#[derive(Debug, Clone, Default)]
pub struct PackageManifest {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Declared licenses, in document order
    pub licenses: Vec<String>,

    /// Declared URLs, in document order
    pub urls: Vec<String>,

    /// Run-time dependencies
    pub exec_depends: Vec<String>,

    /// Build toolchain dependencies (selects catkin vs cmake)
    pub buildtool_depends: Vec<String>,

    /// Toolchain dependencies exported to downstream packages
    pub buildtool_export_depends: Vec<String>,

    /// Build dependencies exported to downstream packages
    pub build_export_depends: Vec<String>,

    /// Build-time dependencies
    pub build_depends: Vec<String>,

    /// Test-only dependencies
    pub test_depends: Vec<String>,
}

/// An element whose text content is the value; attributes are ignored.
///
/// Covers `<license file="...">`, `<url type="...">` and the dependency tags,
/// which may carry `version_gte`-style attributes we do not evaluate.
// TODO: evaluate `condition` attributes against ROS_VERSION/ROS_DISTRO for
// format 3 manifests instead of taking every branch.
#[derive(Debug, Deserialize)]
struct TagValue {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Raw package.xml as deserialized by quick-xml.
#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,

    version: String,

    #[serde(default)]
    license: Vec<TagValue>,

    #[serde(default)]
    url: Vec<TagValue>,

    #[serde(default)]
    depend: Vec<TagValue>,

    #[serde(default)]
    build_depend: Vec<TagValue>,

    #[serde(default)]
    build_export_depend: Vec<TagValue>,

    #[serde(default)]
    buildtool_depend: Vec<TagValue>,

    #[serde(default)]
    buildtool_export_depend: Vec<TagValue>,

    #[serde(default)]
    exec_depend: Vec<TagValue>,

    #[serde(default)]
    run_depend: Vec<TagValue>,

    #[serde(default)]
    test_depend: Vec<TagValue>,
}

fn names(tags: &[TagValue]) -> Vec<String> {
    tags.iter().map(|t| t.value.trim().to_string()).collect()
}

impl PackageManifest {
    /// Parse a package.xml document.
    pub fn parse(xml: &str) -> Result<Self> {
        let raw: RawPackage =
            quick_xml::de::from_str(xml).context("failed to parse package.xml")?;

        // Grouped tags expand first, so their names lead each class.
        let depend = names(&raw.depend);
        let run_depend = names(&raw.run_depend);

        let mut build_depends = depend.clone();
        build_depends.extend(names(&raw.build_depend));

        let mut build_export_depends = depend.clone();
        build_export_depends.extend(names(&raw.build_export_depend));
        build_export_depends.extend(run_depend.clone());

        let mut exec_depends = depend;
        exec_depends.extend(names(&raw.exec_depend));
        exec_depends.extend(run_depend);

        Ok(PackageManifest {
            name: raw.name.trim().to_string(),
            version: raw.version.trim().to_string(),
            licenses: names(&raw.license),
            urls: names(&raw.url),
            exec_depends,
            buildtool_depends: names(&raw.buildtool_depend),
            buildtool_export_depends: names(&raw.buildtool_export_depend),
            build_export_depends,
            build_depends,
            test_depends: names(&raw.test_depend),
        })
    }

    /// First declared license, if any.
    pub fn license(&self) -> Option<&str> {
        self.licenses.first().map(|s| s.as_str())
    }

    /// First declared URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.urls.first().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format2_manifest() {
        let xml = r#"<?xml version="1.0"?>
<package format="2">
  <name>foo_node</name>
  <version>1.2.3</version>
  <description>Example package</description>
  <maintainer email="dev@example.com">Dev</maintainer>
  <license>BSD</license>
  <url type="website">http://example.com/foo</url>
  <buildtool_depend>catkin</buildtool_depend>
  <build_depend>roscpp</build_depend>
  <exec_depend>roscpp</exec_depend>
  <test_depend>rostest</test_depend>
</package>
"#;
        let pkg = PackageManifest::parse(xml).unwrap();
        assert_eq!(pkg.name, "foo_node");
        assert_eq!(pkg.version, "1.2.3");
        assert_eq!(pkg.licenses, vec!["BSD"]);
        assert_eq!(pkg.urls, vec!["http://example.com/foo"]);
        assert_eq!(pkg.buildtool_depends, vec!["catkin"]);
        assert_eq!(pkg.build_depends, vec!["roscpp"]);
        assert_eq!(pkg.exec_depends, vec!["roscpp"]);
        assert_eq!(pkg.test_depends, vec!["rostest"]);
    }

    #[test]
    fn test_depend_expands_into_three_classes() {
        let xml = r#"<?xml version="1.0"?>
<package format="2">
  <name>foo</name>
  <version>0.1.0</version>
  <license>MIT</license>
  <buildtool_depend>catkin</buildtool_depend>
  <depend>roscpp</depend>
  <build_depend>message_generation</build_depend>
  <exec_depend>message_runtime</exec_depend>
</package>
"#;
        let pkg = PackageManifest::parse(xml).unwrap();
        // Grouped names lead each class, class-specific names follow.
        assert_eq!(pkg.build_depends, vec!["roscpp", "message_generation"]);
        assert_eq!(pkg.build_export_depends, vec!["roscpp"]);
        assert_eq!(pkg.exec_depends, vec!["roscpp", "message_runtime"]);
    }

    #[test]
    fn test_run_depend_expands_into_export_and_exec() {
        let xml = r#"<?xml version="1.0"?>
<package>
  <name>legacy_pkg</name>
  <version>0.4.2</version>
  <license>BSD</license>
  <buildtool_depend>catkin</buildtool_depend>
  <build_depend>roscpp</build_depend>
  <run_depend>roscpp</run_depend>
  <run_depend>rospy</run_depend>
</package>
"#;
        let pkg = PackageManifest::parse(xml).unwrap();
        assert_eq!(pkg.build_depends, vec!["roscpp"]);
        assert_eq!(pkg.build_export_depends, vec!["roscpp", "rospy"]);
        assert_eq!(pkg.exec_depends, vec!["roscpp", "rospy"]);
    }

    #[test]
    fn test_multiple_licenses_and_urls_keep_order() {
        let xml = r#"<?xml version="1.0"?>
<package format="2">
  <name>foo</name>
  <version>0.1.0</version>
  <license>BSD</license>
  <license>LGPL</license>
  <url type="website">http://example.com/a</url>
  <url type="bugtracker">http://example.com/b</url>
  <buildtool_depend>cmake</buildtool_depend>
</package>
"#;
        let pkg = PackageManifest::parse(xml).unwrap();
        assert_eq!(pkg.license(), Some("BSD"));
        assert_eq!(pkg.url(), Some("http://example.com/a"));
        assert_eq!(pkg.licenses.len(), 2);
        assert_eq!(pkg.urls.len(), 2);
    }

    #[test]
    fn test_dependency_attributes_are_ignored() {
        let xml = r#"<?xml version="1.0"?>
<package format="2">
  <name>foo</name>
  <version>0.1.0</version>
  <license>MIT</license>
  <buildtool_depend>catkin</buildtool_depend>
  <build_depend version_gte="1.0">roscpp</build_depend>
</package>
"#;
        let pkg = PackageManifest::parse(xml).unwrap();
        assert_eq!(pkg.build_depends, vec!["roscpp"]);
    }

    #[test]
    fn test_invalid_xml_is_an_error() {
        let result = PackageManifest::parse("not xml at all");
        assert!(result.is_err());
    }
}
