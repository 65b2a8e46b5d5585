//! End-to-end packaging runs against the fake toolchain.

mod common;

use common::FakeToolchain;
use framework_packager::bundler::{
    ConfigurationBuilder, Error, FrameworkPackager, TargetState,
    framework::layout::FrameworkLayout,
};
use std::fs;
use std::path::{Path, PathBuf};

fn link_target(path: &Path) -> PathBuf {
    fs::read_link(path).unwrap_or_else(|e| panic!("{} is not a symlink: {e}", path.display()))
}

fn root_symlinks(dir: &Path) -> Vec<String> {
    let mut links: Vec<String> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path_is_symlink())
        .map(|e| e.path().strip_prefix(dir).unwrap().to_string_lossy().into_owned())
        .collect();
    links.sort();
    links
}

#[tokio::test]
async fn static_single_arch_framework_is_flat() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new()
        .opencv_dir("/src/opencv")
        .macos_archs(["x86_64"])
        .legacy_build(true)
        .build()
        .unwrap();

    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("opencv2"));
    let framework = packager.package(out.path()).await.unwrap();

    let fwk = out.path().join("opencv2.framework");
    assert_eq!(framework.path, fwk);
    assert!(fwk.join("Headers/core.hpp").is_file());
    assert!(fwk.join("opencv2").is_file());
    assert!(fwk.join("Info.plist").is_file());
    assert!(!fwk.join("Modules").exists());
    assert!(!fwk.join("Versions").exists());
    assert!(root_symlinks(&fwk).is_empty());
    assert!(framework.links.is_empty());
    assert_eq!(packager.target_states(), &[TargetState::Built]);

    // Static slices are merged with libtool before lipo sees them
    let runner = packager.runner();
    let libtool = runner.commands_of("libtool");
    assert_eq!(libtool.len(), 1);
    let libtool_args = libtool[0].get_args();
    assert!(libtool_args.iter().any(|a| a.ends_with("install/lib/libopencv_core.a")));
    assert!(libtool_args.iter().any(|a| a.ends_with("install/lib/3rdparty/libzlib.a")));
    assert!(!libtool_args.iter().any(|a| a.ends_with("opencv2.framework/opencv2")));

    let lipo = runner.commands_of("lipo");
    assert_eq!(lipo.len(), 1);
    assert!(lipo[0].get_args()[1].ends_with("build-x86_64-macosx/lib/Release/libopencv_merged.a"));
}

#[tokio::test]
async fn dynamic_universal_framework_has_version_links() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new()
        .opencv_dir("/src/opencv")
        .macos_archs(["x86_64", "arm64"])
        .dynamic(true)
        .framework_name("OpenCV")
        .build()
        .unwrap();

    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("OpenCV"));
    let framework = packager.package(out.path()).await.unwrap();

    let fwk = out.path().join("OpenCV.framework");
    assert_eq!(
        root_symlinks(&fwk),
        vec!["Headers", "Modules", "OpenCV", "Resources", "Versions/Current"]
    );
    assert_eq!(framework.links.len(), 5);

    assert_eq!(link_target(&fwk.join("Versions/Current")), PathBuf::from("A"));
    assert_eq!(
        link_target(&fwk.join("Headers")),
        PathBuf::from("Versions/Current/Headers")
    );
    assert_eq!(
        link_target(&fwk.join("Resources")),
        PathBuf::from("Versions/Current/Resources")
    );
    assert_eq!(
        link_target(&fwk.join("Modules")),
        PathBuf::from("Versions/Current/Modules")
    );
    assert_eq!(
        link_target(&fwk.join("OpenCV")),
        PathBuf::from("Versions/Current/OpenCV")
    );

    let a = fwk.join("Versions/A");
    assert!(a.join("Headers/core.hpp").is_file());
    assert!(a.join("Headers/Mat.h").is_file());
    assert!(a.join("OpenCV").is_file());
    assert!(a.join("Resources/Info.plist").is_file());
    assert!(a.join("Modules/module.modulemap").is_file());
    assert!(a.join("Modules/OpenCV.swiftmodule/x86_64-apple-macos.swiftmodule").is_file());
    assert!(a.join("Modules/OpenCV.swiftmodule/arm64-apple-macos.swiftmodule").is_file());
    assert!(!a.join("Modules/OpenCV.swiftmodule/x86_64.swiftmodule").exists());

    // Links resolve through the version indirection
    assert!(fwk.join("Headers/core.hpp").is_file());
    assert!(fwk.join("Resources/Info.plist").is_file());

    // Dynamic builds feed the installed framework binary to lipo, no libtool
    let runner = packager.runner();
    assert!(runner.commands_of("libtool").is_empty());
    let lipo = runner.commands_of("lipo");
    assert_eq!(lipo.len(), 1);
    assert!(lipo[0].get_args()[1].ends_with("build-macosx/install/lib/OpenCV.framework/OpenCV"));
    assert_eq!(framework.binary, a.join("OpenCV"));
}

#[tokio::test]
async fn headers_are_rewritten_in_bundle_only() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new()
        .macos_archs(["arm64"])
        .framework_name("OpenCV")
        .build()
        .unwrap();

    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("OpenCV"));
    packager.package(out.path()).await.unwrap();

    let headers = out.path().join("OpenCV.framework/Headers");
    assert_eq!(
        fs::read_to_string(headers.join("core.hpp")).unwrap(),
        "#include <OpenCV/core/mat.hpp>\n"
    );
    assert_eq!(
        fs::read_to_string(headers.join("core/mat.hpp")).unwrap(),
        "#include <OpenCV/core/types.hpp>\n#include <vector>\n"
    );
    // Objective-C wrapper headers are copied after rewriting
    assert_eq!(
        fs::read_to_string(headers.join("Mat.h")).unwrap(),
        "#import \"CvType.h\"\n"
    );

    let installed = out
        .path()
        .join("build/build-arm64-macosx/install/include/opencv2/core.hpp");
    assert_eq!(
        fs::read_to_string(installed).unwrap(),
        "#include \"opencv2/core/mat.hpp\"\n"
    );
}

#[tokio::test]
async fn one_lipo_input_per_target() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new()
        .macos_archs(["x86_64"])
        .catalyst_archs(["arm64"])
        .build()
        .unwrap();

    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("opencv2"));
    packager.package(out.path()).await.unwrap();

    let lipo = packager.runner().commands_of("lipo");
    assert_eq!(lipo.len(), 1);
    let args = lipo[0].get_args();
    assert_eq!(args[0], "-create");
    assert_eq!(args.len(), 1 + 2 + 2);
    assert!(args[1].contains("build-x86_64-macosx"));
    assert!(args[2].contains("build-arm64-catalyst"));
    assert_eq!(args[3], "-o");
    assert!(args[4].ends_with("opencv2.framework/opencv2"));

    let xcodebuild = packager.runner().commands_of("xcodebuild");
    assert_eq!(xcodebuild.len(), 2);
    assert!(!xcodebuild[0].get_args().iter().any(|a| a == "SUPPORTS_MAC_CATALYST=YES"));
    assert!(xcodebuild[1].get_args().iter().any(|a| a == "SUPPORTS_MAC_CATALYST=YES"));
}

#[tokio::test]
async fn deployment_target_reaches_every_child_process() {
    let out = tempfile::tempdir().unwrap();
    let opencv = tempfile::tempdir().unwrap();
    fs::create_dir_all(opencv.path().join("doc")).unwrap();
    fs::write(opencv.path().join("doc/opencv.ico"), "ico").unwrap();
    let config = ConfigurationBuilder::new()
        .opencv_dir(opencv.path())
        .deployment_target("11.0")
        .run_tests(true)
        .build_docs(true)
        .build()
        .unwrap();

    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("opencv2"));
    packager.package(out.path()).await.unwrap();

    let commands = packager.runner().commands();
    let programs: Vec<&str> = commands
        .iter()
        .map(|c| c.program().rsplit('/').next().unwrap_or_default())
        .collect();
    for expected in [
        "cmake",
        "xcodebuild",
        "libtool",
        "lipo",
        "run_tests.py",
        "build_docs.py",
    ] {
        assert!(programs.contains(&expected), "{expected} never ran");
    }

    let missing: Vec<String> = commands
        .iter()
        .filter(|c| c.get_env("MACOSX_DEPLOYMENT_TARGET") != Some("11.0"))
        .map(|c| c.to_string())
        .collect();
    assert!(missing.is_empty(), "no MACOSX_DEPLOYMENT_TARGET for {missing:?}");
}

#[tokio::test]
async fn old_cmake_aborts_before_any_build() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new().build().unwrap();
    let runner = FakeToolchain::new("opencv2").with_cmake_version("3.16.2");

    let mut packager = FrameworkPackager::with_runner(config, runner);
    let err = packager.package(out.path()).await.unwrap_err();

    assert!(matches!(err, Error::UnsupportedToolchain { ref found, .. } if found == "3.16"));
    assert_eq!(packager.runner().commands().len(), 1);
    assert_eq!(packager.target_states(), &[TargetState::Pending]);
    assert!(!out.path().join("opencv2.framework").exists());
}

#[tokio::test]
async fn failed_build_halts_pipeline() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new()
        .macos_archs(["x86_64"])
        .catalyst_archs(["arm64"])
        .build()
        .unwrap();
    let runner = FakeToolchain::new("opencv2").failing("xcodebuild");

    let mut packager = FrameworkPackager::with_runner(config, runner);
    let err = packager.package(out.path()).await.unwrap_err();

    assert!(matches!(err, Error::ExternalProcess { code: Some(65), .. }));
    assert_eq!(
        packager.target_states(),
        &[TargetState::Failed, TargetState::Pending]
    );
    assert_eq!(packager.runner().commands_of("xcodebuild").len(), 1);
    assert!(packager.runner().commands_of("lipo").is_empty());
    assert!(!out.path().join("opencv2.framework").exists());
}

#[tokio::test]
async fn lipo_failure_is_fatal() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new().build().unwrap();
    let runner = FakeToolchain::new("opencv2").failing("lipo");

    let mut packager = FrameworkPackager::with_runner(config, runner);
    let err = packager.package(out.path()).await.unwrap_err();

    assert!(matches!(err, Error::ExternalProcess { .. }));
    let layout = FrameworkLayout::new(out.path(), "opencv2", false);
    assert!(!layout.info_plist().exists());
}

#[tokio::test]
async fn existing_framework_is_replaced() {
    let out = tempfile::tempdir().unwrap();
    let stale = out.path().join("opencv2.framework/stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old").unwrap();

    let config = ConfigurationBuilder::new().build().unwrap();
    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("opencv2"));
    packager.package(out.path()).await.unwrap();

    assert!(!stale.exists());
}

#[tokio::test]
async fn tests_and_docs_are_skipped_without_flags() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new()
        .opencv_dir("/src/opencv")
        .build()
        .unwrap();
    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("opencv2"));
    packager.package(out.path()).await.unwrap();

    assert!(
        packager
            .runner()
            .commands()
            .iter()
            .all(|c| !c.program().ends_with(".py"))
    );
}

#[tokio::test]
async fn run_tests_invokes_companion_script() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new()
        .opencv_dir("/src/opencv")
        .build_only_specified_archs(true)
        .catalyst_archs(["x86_64"])
        .run_tests(true)
        .build()
        .unwrap();
    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("opencv2"));
    packager.package(out.path()).await.unwrap();

    let tests = packager
        .runner()
        .commands_of("/src/opencv/platforms/osx/run_tests.py");
    assert_eq!(tests.len(), 1);
    let args = tests[0].get_args();
    assert_eq!(args[0], format!("--framework_dir={}", out.path().display()));
    assert_eq!(args[1], "--framework_name=opencv2");
    assert!(args[2].ends_with("build-x86_64-catalyst/modules/objc_bindings_generator/ios/test"));
}

#[tokio::test]
async fn build_docs_copies_docs_and_favicon() {
    let out = tempfile::tempdir().unwrap();
    let opencv = tempfile::tempdir().unwrap();
    fs::create_dir_all(opencv.path().join("doc")).unwrap();
    fs::write(opencv.path().join("doc/opencv.ico"), "ico").unwrap();

    let config = ConfigurationBuilder::new()
        .opencv_dir(opencv.path())
        .macos_archs(["arm64"])
        .build_docs(true)
        .build()
        .unwrap();
    let mut packager = FrameworkPackager::with_runner(config, FakeToolchain::new("opencv2"));
    packager.package(out.path()).await.unwrap();

    let script = opencv.path().join("platforms/osx/build_docs.py");
    let docs = packager
        .runner()
        .commands_of(&script.to_string_lossy());
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get_args().len(), 1);
    assert!(
        docs[0].get_args()[0].ends_with("build-arm64-macosx/modules/objc/framework_build")
    );

    let out_docs = out.path().join("docs");
    assert_eq!(
        fs::read_to_string(out_docs.join("index.html")).unwrap(),
        "<html/>"
    );
    assert_eq!(fs::read_to_string(out_docs.join("favicon.ico")).unwrap(), "ico");

    // Tests were not requested, so their script never ran
    assert!(
        packager
            .runner()
            .commands()
            .iter()
            .all(|c| !c.program().ends_with("run_tests.py"))
    );
}

#[tokio::test]
async fn build_docs_without_output_copies_nothing() {
    let out = tempfile::tempdir().unwrap();
    let config = ConfigurationBuilder::new()
        .opencv_dir("/src/opencv")
        .build_docs(true)
        .build()
        .unwrap();
    let runner = FakeToolchain::new("opencv2").without_docs();
    let mut packager = FrameworkPackager::with_runner(config, runner);
    packager.package(out.path()).await.unwrap();

    assert_eq!(
        packager
            .runner()
            .commands_of("/src/opencv/platforms/osx/build_docs.py")
            .len(),
        1
    );
    assert!(!out.path().join("docs").exists());
}
