//! APKBUILD assembly from a parsed manifest and resolved dependencies.
//!
//! The assembler emits metadata assignment lines followed by the `build()`,
//! `check()` and `package()` script bodies. The shape of the script bodies
//! depends on the package's toolchain: catkin packages build through
//! `catkin_make_isolated` against the distro install space, plain cmake
//! packages build in a nested build directory under their own source tree.

use anyhow::{Context, Result};

use crate::core::manifest::PackageManifest;
use crate::core::pkgname::native_pkgname;
use crate::recipe::{Recipe, Toolchain};
use crate::resolver::{Resolver, RuleSource};

/// Assemble an APKBUILD recipe for `pkg` targeting `ros_distro`.
///
/// `check` controls whether the `check()` block is emitted; when disabled,
/// an `options="!check"` line is emitted instead. Any resolution failure or
/// toolchain violation fails the whole call; no partial recipe is returned.
pub fn assemble(
    ros_distro: &str,
    pkg: &PackageManifest,
    check: bool,
    rules: &dyn RuleSource,
) -> Result<Recipe> {
    let resolver = Resolver::new(ros_distro, rules);
    let install_space = format!("/usr/ros/{ros_distro}");
    let install_space_fakeroot = format!("\"$pkgdir\"/usr/ros/{ros_distro}");

    let mut recipe = Recipe::new();

    recipe.push(format!("pkgname={}", native_pkgname(ros_distro, &pkg.name)));
    recipe.push(format!("pkgver={}", pkg.version));
    recipe.push("pkgrel=1");
    // Historical quoting: the closing quote lands before the distro name.
    // The shell concatenates both words into one value, so the output is
    // kept byte-compatible with existing recipes.
    recipe.push(format!(
        "pkgdesc=\"{} package for ROS \"{}",
        pkg.name, ros_distro
    ));
    match pkg.url() {
        Some(url) => recipe.push(format!("url=\"{url}\"")),
        None => recipe.push(format!("url=\"http://wiki.ros.org/{}\"", pkg.name)),
    }
    recipe.push("arch=\"all\"");
    let license = pkg
        .license()
        .context("package.xml declares no license")?;
    recipe.push(format!("license=\"{license}\""));
    if !check {
        recipe.push("options=\"!check\"");
    }

    // Run-time class: exec, then buildtool-export, then build-export.
    let mut depends = pkg.exec_depends.clone();
    depends.extend(pkg.buildtool_export_depends.iter().cloned());
    depends.extend(pkg.build_export_depends.iter().cloned());
    let depends_keys = resolver
        .resolve(&depends)
        .context("failed to resolve run-time dependencies")?;

    // Build-time class: buildtool, then build, then test. The toolchain is
    // fixed before the class is resolved.
    let toolchain = Toolchain::detect(&pkg.buildtool_depends)?;
    let mut makedepends = pkg.buildtool_depends.clone();
    makedepends.extend(pkg.build_depends.iter().cloned());
    makedepends.extend(pkg.test_depends.iter().cloned());
    let makedepends_keys = resolver
        .resolve(&makedepends)
        .context("failed to resolve build-time dependencies")?;

    recipe.push(format!("depends=\"{}\"", depends_keys.join(" ")));
    recipe.push(format!("makedepends=\"{}\"", makedepends_keys.join(" ")));
    recipe.push("subpackages=\"\"");
    recipe.push("source=\"\"");
    recipe.push("builddir=\"$srcdir\"");

    recipe.push("build() {");
    recipe.push("  cd \"$builddir\"");
    recipe.push("  mkdir -p src");
    recipe.push(format!(
        "  rosinstall_generator --rosdistro {} --flat {} | tee pkg.rosinstall",
        ros_distro, pkg.name
    ));
    recipe.push("  wstool init --shallow src pkg.rosinstall");
    match toolchain {
        Toolchain::Catkin => {
            recipe.push(format!("  source {install_space}/setup.sh"));
            recipe.push("  catkin_make_isolated");
        }
        Toolchain::Cmake => {
            recipe.push(format!("  mkdir src/{}/build", pkg.name));
            recipe.push(format!("  cd src/{}/build", pkg.name));
            recipe.push(format!(
                "  cmake .. -DCMAKE_INSTALL_PREFIX={install_space} -DCMAKE_INSTALL_LIBDIR=lib"
            ));
            recipe.push("  make");
        }
    }
    recipe.push("}");

    if check {
        recipe.push("check() {");
        recipe.push("  cd \"$builddir\"");
        match toolchain {
            Toolchain::Catkin => {
                recipe.push(format!("  source {install_space}/setup.sh"));
                recipe.push("  source devel_isolated/setup.sh");
                recipe.push("  catkin_make_isolated --catkin-make-args run_tests");
                recipe.push("  catkin_test_results");
            }
            Toolchain::Cmake => {
                recipe.push(format!("  cd src/{}/build", pkg.name));
                // `make -q test` probes for a test target; exit status 1
                // means the target exists but is out of date, 2 means no
                // such target. Only run the tests in the first case.
                recipe.push(
                    "  [ `make -q test > /dev/null 2> /dev/null; echo $?` -eq 1 ] \
                     && make test || true",
                );
            }
        }
        recipe.push("}");
    }

    recipe.push("package() {");
    recipe.push("  mkdir -p \"$pkgdir\"");
    recipe.push("  cd \"$builddir\"");
    recipe.push("  export DESTDIR=\"$pkgdir\"");
    match toolchain {
        Toolchain::Catkin => {
            recipe.push(format!("  source {install_space}/setup.sh"));
            recipe.push(format!(
                "  catkin_make_isolated --install-space {install_space}"
            ));
            recipe.push(format!(
                "  catkin_make_isolated --install --install-space {install_space}"
            ));
            // The environment-bootstrap files catkin drops into the install
            // space are meaningless inside a relocated package root.
            recipe.push(format!(
                "  rm {r}/setup.* {r}/.rosinstall {r}/_setup_util.py {r}/env.sh {r}/.catkin",
                r = install_space_fakeroot
            ));
        }
        Toolchain::Cmake => {
            recipe.push(format!("  cd src/{}/build", pkg.name));
            recipe.push("  make install");
        }
    }
    recipe.push("}");

    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{RuleValue, RuleView};

    /// Rule source that knows no names: everything takes the fallback path.
    struct NoRules;

    impl RuleSource for NoRules {
        fn lookup(&self, _name: &str) -> Option<RuleView> {
            None
        }

        fn resolve(&self, _installer: &str, rule: &RuleValue) -> Vec<String> {
            match rule {
                RuleValue::Packages(packages) => packages.clone(),
                RuleValue::Compound => Vec::new(),
            }
        }
    }

    /// Rule source where one name is known but has no rule for this platform.
    struct Mismatch(&'static str);

    impl RuleSource for Mismatch {
        fn lookup(&self, name: &str) -> Option<RuleView> {
            (name == self.0).then_some(RuleView::NoPlatformMatch)
        }

        fn resolve(&self, _installer: &str, _rule: &RuleValue) -> Vec<String> {
            Vec::new()
        }
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn catkin_pkg() -> PackageManifest {
        PackageManifest {
            name: "foo".to_string(),
            version: "1.2.3".to_string(),
            licenses: strings(&["BSD"]),
            urls: strings(&["http://example.com/foo"]),
            exec_depends: strings(&["some_custom_lib"]),
            buildtool_depends: strings(&["catkin"]),
            ..Default::default()
        }
    }

    fn cmake_pkg() -> PackageManifest {
        PackageManifest {
            name: "foolib".to_string(),
            version: "0.5.0".to_string(),
            licenses: strings(&["MIT"]),
            buildtool_depends: strings(&["cmake"]),
            ..Default::default()
        }
    }

    #[test]
    fn test_catkin_recipe_golden() {
        let recipe = assemble("melodic", &catkin_pkg(), true, &NoRules).unwrap();
        let expected = vec![
            "pkgname=ros-melodic-foo",
            "pkgver=1.2.3",
            "pkgrel=1",
            "pkgdesc=\"foo package for ROS \"melodic",
            "url=\"http://example.com/foo\"",
            "arch=\"all\"",
            "license=\"BSD\"",
            "depends=\"ros-melodic-some-custom-lib\"",
            "makedepends=\"ros-melodic-catkin\"",
            "subpackages=\"\"",
            "source=\"\"",
            "builddir=\"$srcdir\"",
            "build() {",
            "  cd \"$builddir\"",
            "  mkdir -p src",
            "  rosinstall_generator --rosdistro melodic --flat foo | tee pkg.rosinstall",
            "  wstool init --shallow src pkg.rosinstall",
            "  source /usr/ros/melodic/setup.sh",
            "  catkin_make_isolated",
            "}",
            "check() {",
            "  cd \"$builddir\"",
            "  source /usr/ros/melodic/setup.sh",
            "  source devel_isolated/setup.sh",
            "  catkin_make_isolated --catkin-make-args run_tests",
            "  catkin_test_results",
            "}",
            "package() {",
            "  mkdir -p \"$pkgdir\"",
            "  cd \"$builddir\"",
            "  export DESTDIR=\"$pkgdir\"",
            "  source /usr/ros/melodic/setup.sh",
            "  catkin_make_isolated --install-space /usr/ros/melodic",
            "  catkin_make_isolated --install --install-space /usr/ros/melodic",
            "  rm \"$pkgdir\"/usr/ros/melodic/setup.* \"$pkgdir\"/usr/ros/melodic/.rosinstall \"$pkgdir\"/usr/ros/melodic/_setup_util.py \"$pkgdir\"/usr/ros/melodic/env.sh \"$pkgdir\"/usr/ros/melodic/.catkin",
            "}",
        ];
        assert_eq!(recipe.lines(), expected.as_slice());
    }

    #[test]
    fn test_unknown_exec_depend_falls_back_to_ros_name() {
        let recipe = assemble("melodic", &catkin_pkg(), true, &NoRules).unwrap();
        assert!(recipe
            .lines()
            .contains(&"depends=\"ros-melodic-some-custom-lib\"".to_string()));
    }

    #[test]
    fn test_missing_url_synthesizes_wiki_url() {
        let mut pkg = catkin_pkg();
        pkg.urls.clear();
        let recipe = assemble("melodic", &pkg, true, &NoRules).unwrap();
        assert!(recipe
            .lines()
            .contains(&"url=\"http://wiki.ros.org/foo\"".to_string()));
    }

    #[test]
    fn test_nocheck_drops_check_block_and_adds_option() {
        for pkg in [catkin_pkg(), cmake_pkg()] {
            let recipe = assemble("melodic", &pkg, false, &NoRules).unwrap();
            let text = recipe.to_string();
            assert!(!text.contains("check() {"));
            assert!(recipe
                .lines()
                .contains(&"options=\"!check\"".to_string()));
        }
    }

    #[test]
    fn test_cmake_package_block() {
        let recipe = assemble("melodic", &cmake_pkg(), true, &NoRules).unwrap();
        let lines = recipe.lines();
        let cd = lines
            .iter()
            .rposition(|l| l == "  cd src/foolib/build")
            .unwrap();
        assert_eq!(lines[cd + 1], "  make install");
        // No catkin environment sourcing anywhere in a cmake recipe.
        assert!(!lines.iter().any(|l| l.contains("source /usr/ros")));
        assert!(!lines.iter().any(|l| l.contains("catkin_make_isolated")));
    }

    #[test]
    fn test_cmake_check_block_guards_missing_test_target() {
        let recipe = assemble("melodic", &cmake_pkg(), true, &NoRules).unwrap();
        let text = recipe.to_string();
        assert!(text.contains("make -q test"));
        assert!(text.contains("&& make test || true"));
    }

    #[test]
    fn test_runtime_class_concatenation_order() {
        let pkg = PackageManifest {
            name: "foo".to_string(),
            version: "1.0.0".to_string(),
            licenses: strings(&["BSD"]),
            exec_depends: strings(&["aaa"]),
            buildtool_depends: strings(&["catkin"]),
            buildtool_export_depends: strings(&["bbb"]),
            build_export_depends: strings(&["ccc"]),
            ..Default::default()
        };
        let recipe = assemble("melodic", &pkg, true, &NoRules).unwrap();
        assert!(recipe.lines().contains(
            &"depends=\"ros-melodic-aaa ros-melodic-bbb ros-melodic-ccc\"".to_string()
        ));
    }

    #[test]
    fn test_buildtime_class_concatenation_order() {
        let pkg = PackageManifest {
            name: "foo".to_string(),
            version: "1.0.0".to_string(),
            licenses: strings(&["BSD"]),
            buildtool_depends: strings(&["catkin"]),
            build_depends: strings(&["bbb"]),
            test_depends: strings(&["ttt"]),
            ..Default::default()
        };
        let recipe = assemble("melodic", &pkg, true, &NoRules).unwrap();
        assert!(recipe.lines().contains(
            &"makedepends=\"ros-melodic-catkin ros-melodic-bbb ros-melodic-ttt\"".to_string()
        ));
    }

    #[test]
    fn test_no_buildtool_is_fatal() {
        let mut pkg = catkin_pkg();
        pkg.buildtool_depends.clear();
        assert!(assemble("melodic", &pkg, true, &NoRules).is_err());
    }

    #[test]
    fn test_both_buildtools_is_fatal() {
        let mut pkg = catkin_pkg();
        pkg.buildtool_depends = strings(&["catkin", "cmake"]);
        let err = assemble("melodic", &pkg, true, &NoRules).unwrap_err();
        assert!(err.to_string().contains("unsupported buildtool"));
    }

    #[test]
    fn test_resolution_failure_is_fatal_and_names_the_package() {
        let mut pkg = catkin_pkg();
        pkg.exec_depends = strings(&["libweird"]);
        let err = assemble("melodic", &pkg, true, &Mismatch("libweird")).unwrap_err();
        assert!(format!("{err:#}").contains("libweird"));
    }

    #[test]
    fn test_missing_license_is_fatal() {
        let mut pkg = catkin_pkg();
        pkg.licenses.clear();
        assert!(assemble("melodic", &pkg, true, &NoRules).is_err());
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let a = assemble("melodic", &catkin_pkg(), true, &NoRules).unwrap();
        let b = assemble("melodic", &catkin_pkg(), true, &NoRules).unwrap();
        assert_eq!(a, b);
    }
}
