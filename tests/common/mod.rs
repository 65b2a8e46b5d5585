//! Fake Apple toolchain shared by the integration tests.
//!
//! Records every command and produces the files cmake, libtool and lipo
//! would have written, so whole packaging runs can be checked on any host.

#![allow(dead_code)]

use framework_packager::bundler::{CommandRunner, Error, Result, ToolCommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct FakeToolchain {
    framework_name: String,
    cmake_version: String,
    fail_program: Option<String>,
    write_docs: bool,
    commands: Mutex<Vec<ToolCommand>>,
}

impl FakeToolchain {
    pub fn new(framework_name: &str) -> Self {
        Self {
            framework_name: framework_name.to_string(),
            cmake_version: "3.27.4".to_string(),
            fail_program: None,
            write_docs: true,
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn with_cmake_version(mut self, version: &str) -> Self {
        self.cmake_version = version.to_string();
        self
    }

    /// Makes every invocation of `program` exit with code 65.
    pub fn failing(mut self, program: &str) -> Self {
        self.fail_program = Some(program.to_string());
        self
    }

    /// Makes the docs script succeed without producing any output.
    pub fn without_docs(mut self) -> Self {
        self.write_docs = false;
        self
    }

    pub fn commands(&self) -> Vec<ToolCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn commands_of(&self, program: &str) -> Vec<ToolCommand> {
        self.commands()
            .into_iter()
            .filter(|c| c.program() == program)
            .collect()
    }

    fn record(&self, command: &ToolCommand) {
        self.commands.lock().unwrap().push(command.clone());
    }

    fn configured_archs(&self, build_dir: &Path) -> Vec<String> {
        self.commands()
            .iter()
            .filter(|c| c.program() == "cmake" && c.get_current_dir() == Some(build_dir))
            .flat_map(|c| c.get_args().to_vec())
            .find_map(|a| {
                a.strip_prefix("-DCMAKE_OSX_ARCHITECTURES=")
                    .map(|v| v.split(';').map(String::from).collect())
            })
            .unwrap_or_default()
    }

    fn fake_install(&self, build_dir: &Path) {
        let name = &self.framework_name;
        let install = build_dir.join("install");
        let include = install.join("include/opencv2");
        write(&include.join("core.hpp"), "#include \"opencv2/core/mat.hpp\"\n");
        write(
            &include.join("core/mat.hpp"),
            "#include \"types.hpp\"\n#include <vector>\n",
        );
        write(&include.join("core/types.hpp"), "#pragma once\n");
        write(&install.join("lib/libopencv_core.a"), "core");
        write(&install.join("lib/3rdparty/libzlib.a"), "zlib");

        let fwk = install.join(format!("lib/{name}.framework"));
        write(&fwk.join(name), "dylib");
        write(&fwk.join("Headers/Mat.h"), "#import \"CvType.h\"\n");
        for arch in self.configured_archs(build_dir) {
            write(
                &fwk.join(format!("Modules/{name}.swiftmodule/{arch}.swiftmodule")),
                "module",
            );
        }
        write(&fwk.join("Modules/module.modulemap"), "framework module");

        write(&build_dir.join("osx/Info.plist"), "<plist/>");
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn output_arg(command: &ToolCommand) -> Option<PathBuf> {
    let args = command.get_args();
    args.iter()
        .position(|a| a == "-o")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

impl CommandRunner for FakeToolchain {
    async fn run(&self, command: &ToolCommand) -> Result<()> {
        self.record(command);

        if self.fail_program.as_deref() == Some(command.program()) {
            return Err(Error::ExternalProcess {
                command: command.to_string(),
                code: Some(65),
            });
        }

        let args = command.get_args();
        match command.program() {
            "cmake" if args.iter().any(|a| a == "-P") => {
                self.fake_install(command.get_current_dir().unwrap());
            }
            "libtool" | "lipo" => {
                let out = output_arg(command).unwrap();
                write(&out, command.program());
            }
            program if program.ends_with("build_docs.py") && self.write_docs => {
                // framework_build sits next to doc_build
                let framework_build = Path::new(&args[0]);
                let docs = framework_build.parent().unwrap().join("doc_build/docs");
                write(&docs.join("index.html"), "<html/>");
            }
            _ => {}
        }
        Ok(())
    }

    async fn output(&self, command: &ToolCommand) -> Result<String> {
        self.record(command);
        Ok(format!("cmake version {}\n", self.cmake_version))
    }
}
