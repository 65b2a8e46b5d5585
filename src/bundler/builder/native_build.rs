//! Native build of one target: CMake configure, xcodebuild, install, merge.

use super::runner::{CommandRunner, ToolCommand};
use crate::bundler::{
    error::{ErrorExt, Result},
    settings::{BuildConfiguration, BuildOutput, Target},
};
use std::path::{Path, PathBuf};

/// Environment variable every build tool must observe.
pub const DEPLOYMENT_TARGET_ENV: &str = "MACOSX_DEPLOYMENT_TARGET";

/// Name of the static library the per-target libraries are merged into.
pub const MERGED_STATIC_LIB: &str = "libopencv_merged.a";

/// CMake configure command for `target`, run inside its build directory.
pub fn cmake_configure_command(
    config: &BuildConfiguration,
    target: &Target,
    build_dir: &Path,
) -> ToolCommand {
    let mut cmd = ToolCommand::new("cmake").args([
        "-GXcode".to_string(),
        "-DAPPLE_FRAMEWORK=ON".to_string(),
        "-DCMAKE_INSTALL_PREFIX=install".to_string(),
        format!("-DCMAKE_BUILD_TYPE={}", config.configuration()),
        "-DOPENCV_INCLUDE_INSTALL_PATH=include".to_string(),
        "-DOPENCV_3P_LIB_INSTALL_PATH=lib/3rdparty".to_string(),
        format!("-DFRAMEWORK_NAME={}", config.framework_name()),
    ]);

    if config.dynamic() && !config.build_objc_wrapper() {
        cmd = cmd.args([
            "-DBUILD_SHARED_LIBS=ON",
            "-DCMAKE_MACOSX_BUNDLE=ON",
            "-DCMAKE_XCODE_ATTRIBUTE_CODE_SIGNING_REQUIRED=NO",
        ]);
    }
    if config.dynamic() {
        cmd = cmd.arg("-DDYNAMIC_PLIST=ON");
    }
    if config.enable_nonfree() {
        cmd = cmd.arg("-DOPENCV_ENABLE_NONFREE=ON");
    }
    if config.debug_info() {
        cmd = cmd.arg("-DBUILD_WITH_DEBUG_INFO=ON");
    }

    cmd = cmd
        .args(
            config
                .exclude()
                .iter()
                .map(|m| format!("-DBUILD_opencv_{}=OFF", m)),
        )
        .args(
            config
                .disable()
                .iter()
                .map(|f| format!("-DWITH_{}=OFF", f.to_uppercase())),
        );

    if let Some(contrib) = config.contrib_dir() {
        cmd = cmd.arg(format!(
            "-DOPENCV_EXTRA_MODULES_PATH={}",
            contrib.join("modules").display()
        ));
    }

    cmd.arg(format!(
        "-DCMAKE_OSX_ARCHITECTURES={}",
        target.archs_joined(";")
    ))
    .path_arg(config.opencv_dir())
    .current_dir(build_dir)
    .env(DEPLOYMENT_TARGET_ENV, config.deployment_target())
}

/// xcodebuild command line for `target`.
///
/// Catalyst targets get the extra settings that compile iOS code for macOS.
pub fn xcodebuild_command(config: &BuildConfiguration, target: &Target) -> ToolCommand {
    let platform = target.platform();
    let mut cmd = ToolCommand::new("xcodebuild").args([
        format!("{}={}", DEPLOYMENT_TARGET_ENV, config.deployment_target()),
        format!("ARCHS={}", target.archs_joined(" ")),
        "-sdk".to_string(),
        platform.sdk().to_string(),
        "-configuration".to_string(),
        config.configuration().to_string(),
        "-parallelizeTargets".to_string(),
        "-jobs".to_string(),
        config.jobs().to_string(),
    ]);

    if platform.is_catalyst() {
        let destination = match target.archs() {
            [arch] => format!("platform=macOS,arch={},variant=Mac Catalyst", arch),
            _ => "platform=macOS,variant=Mac Catalyst".to_string(),
        };
        cmd = cmd.arg("-destination").arg(destination).args([
            "-UseModernBuildSystem=YES",
            "SKIP_INSTALL=NO",
            "BUILD_LIBRARY_FOR_DISTRIBUTION=YES",
            "TARGETED_DEVICE_FAMILY=1,2",
            "SDKROOT=iphoneos",
            "SUPPORTS_MAC_CATALYST=YES",
        ]);
    }

    cmd.env(DEPLOYMENT_TARGET_ENV, config.deployment_target())
}

/// `cmake_install.cmake` invocation populating `install/`.
pub fn cmake_install_command(config: &BuildConfiguration, build_dir: &Path) -> ToolCommand {
    ToolCommand::new("cmake")
        .arg(format!("-DBUILD_TYPE={}", config.configuration()))
        .args(["-P", "cmake_install.cmake"])
        .current_dir(build_dir)
        .env(DEPLOYMENT_TARGET_ENV, config.deployment_target())
}

/// Path of the merged static library of a build directory.
pub fn merged_static_lib(config: &BuildConfiguration, build_dir: &Path) -> PathBuf {
    build_dir
        .join("lib")
        .join(config.configuration())
        .join(MERGED_STATIC_LIB)
}

/// Libraries installed by one target, in the order they are merged.
///
/// Module archives first, then 3rd-party archives, then the Objective-C
/// wrapper binary when it is built.
pub fn installed_static_libs(config: &BuildConfiguration, build_dir: &Path) -> Result<Vec<PathBuf>> {
    let lib_dir = build_dir.join("install").join("lib");
    let mut libs = glob_sorted(&lib_dir.join("*.a"))?;
    libs.extend(glob_sorted(&lib_dir.join("3rdparty").join("*.a"))?);
    if config.build_objc_wrapper() {
        let name = config.framework_name();
        libs.push(lib_dir.join(format!("{}.framework", name)).join(name));
    }
    Ok(libs)
}

fn glob_sorted(pattern: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| entry.ok())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Merges every installed static library into [`MERGED_STATIC_LIB`].
pub async fn merge_static_libs<R: CommandRunner>(
    runner: &R,
    config: &BuildConfiguration,
    build_dir: &Path,
) -> Result<PathBuf> {
    let merged = merged_static_lib(config, build_dir);
    if let Some(parent) = merged.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating merged library directory", parent)?;
    }

    let libs = installed_static_libs(config, build_dir)?;
    log::info!(
        "Merging libraries:\n\t{}",
        libs.iter()
            .map(|l| l.display().to_string())
            .collect::<Vec<_>>()
            .join("\n\t")
    );

    let cmd = ToolCommand::new("libtool")
        .args(["-static", "-o"])
        .path_arg(&merged)
        .args(libs.iter().map(|l| l.to_string_lossy().into_owned()))
        .current_dir(build_dir);
    runner.run(&cmd).await?;

    Ok(merged)
}

/// Builds and installs one target under `build_root`.
///
/// The build directory is created if needed and left in place afterwards.
pub async fn build_target<R: CommandRunner>(
    runner: &R,
    config: &BuildConfiguration,
    target: &Target,
    build_root: &Path,
) -> Result<BuildOutput> {
    let build_dir = target.build_dir(build_root);
    tokio::fs::create_dir_all(&build_dir)
        .await
        .fs_context("creating build directory", &build_dir)?;

    log::info!("Building {} in {}", target, build_dir.display());

    runner
        .run(&cmake_configure_command(config, target, &build_dir))
        .await?;

    let build = xcodebuild_command(config, target)
        .args(["-target", "ALL_BUILD", "build"])
        .current_dir(&build_dir);
    runner.run(&build).await?;

    runner
        .run(&cmake_install_command(config, &build_dir))
        .await?;

    if !config.dynamic() {
        merge_static_libs(runner, config, &build_dir).await?;
    }

    Ok(BuildOutput::new(target.clone(), build_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{Arch, ConfigurationBuilder, Platform};

    fn config() -> BuildConfiguration {
        ConfigurationBuilder::new()
            .opencv_dir("/src/opencv")
            .deployment_target("11.0")
            .jobs(8)
            .build()
            .unwrap()
    }

    #[test]
    fn macos_xcodebuild_has_no_catalyst_flags() {
        let target = Target::new(vec![Arch::X86_64, Arch::Arm64], Platform::MacOsx);
        let cmd = xcodebuild_command(&config(), &target);
        assert_eq!(
            cmd.get_args(),
            &[
                "MACOSX_DEPLOYMENT_TARGET=11.0",
                "ARCHS=x86_64 arm64",
                "-sdk",
                "macosx",
                "-configuration",
                "Release",
                "-parallelizeTargets",
                "-jobs",
                "8",
            ]
        );
        assert_eq!(cmd.get_env(DEPLOYMENT_TARGET_ENV), Some("11.0"));
    }

    #[test]
    fn catalyst_xcodebuild_appends_compatibility_flags() {
        let target = Target::new(vec![Arch::Arm64], Platform::Catalyst);
        let cmd = xcodebuild_command(&config(), &target);
        let args = cmd.get_args();
        let tail = &args[9..];
        assert_eq!(
            tail,
            &[
                "-destination",
                "platform=macOS,arch=arm64,variant=Mac Catalyst",
                "-UseModernBuildSystem=YES",
                "SKIP_INSTALL=NO",
                "BUILD_LIBRARY_FOR_DISTRIBUTION=YES",
                "TARGETED_DEVICE_FAMILY=1,2",
                "SDKROOT=iphoneos",
                "SUPPORTS_MAC_CATALYST=YES",
            ]
        );
    }

    #[test]
    fn configure_reflects_modules_and_features() {
        let config = ConfigurationBuilder::new()
            .opencv_dir("/src/opencv")
            .contrib_dir("/src/contrib")
            .without(["video"])
            .disable(["tbb"])
            .enable_nonfree(true)
            .dynamic(true)
            .legacy_build(true)
            .build()
            .unwrap();
        let target = Target::new(vec![Arch::X86_64], Platform::MacOsx);
        let cmd = cmake_configure_command(&config, &target, Path::new("/out/build/b"));
        let args = cmd.get_args();

        for expected in [
            "-DBUILD_SHARED_LIBS=ON",
            "-DDYNAMIC_PLIST=ON",
            "-DOPENCV_ENABLE_NONFREE=ON",
            "-DBUILD_opencv_video=OFF",
            "-DBUILD_opencv_objc=OFF",
            "-DWITH_TBB=OFF",
            "-DOPENCV_EXTRA_MODULES_PATH=/src/contrib/modules",
            "-DCMAKE_OSX_ARCHITECTURES=x86_64",
        ] {
            assert!(args.iter().any(|a| a == expected), "missing {expected}");
        }
        assert_eq!(args.last().map(String::as_str), Some("/src/opencv"));
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/out/build/b")));
    }

    #[test]
    fn merged_lib_lives_under_configuration_dir() {
        assert_eq!(
            merged_static_lib(&config(), Path::new("/b")),
            PathBuf::from("/b/lib/Release/libopencv_merged.a")
        );
    }
}
